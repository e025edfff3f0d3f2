use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    list_participants, list_team_participations, register_individual, register_team,
    unregister_individual, unregister_team,
};
use crate::middleware::auth::require_user;
use crate::state::AppState;

/// Registration endpoints, nested under `/api/events`
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/:event_id/participants", post(register_individual))
        .route("/:event_id/participants", delete(unregister_individual))
        .route("/:event_id/teams", post(register_team))
        .route("/:event_id/teams", delete(unregister_team))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    Router::new()
        .route("/:event_id/participants", get(list_participants))
        .route("/:event_id/teams", get(list_team_participations))
        .merge(protected)
}
