use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{list_results, submit_results};
use crate::middleware::auth::require_user;
use crate::state::AppState;

/// Results endpoints, nested under `/api/events`
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/:event_id/results", post(submit_results))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    Router::new()
        .route("/:event_id/results", get(list_results))
        .merge(protected)
}
