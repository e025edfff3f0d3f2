use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use super::handlers::{
    create_event, delete_event, get_event, list_events, record_catch, update_event,
};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_event))
        .route("/:event_id", patch(update_event))
        .route("/:event_id", delete(delete_event))
        .route("/:event_id/catches", post(record_catch))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    Router::new()
        .route("/", get(list_events))
        .route("/:event_id", get(get_event))
        .merge(protected)
}
