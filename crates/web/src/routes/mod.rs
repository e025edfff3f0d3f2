use axum::Router;

use crate::features::{admin, events, participation, ratings, results, teams, users};
use crate::state::AppState;

/// Every API route under `/api`, with state attached
pub fn configure(state: AppState) -> Router {
    let event_routes = events::routes::routes(&state)
        .merge(participation::routes::routes(&state))
        .merge(results::routes::routes(&state));

    let api = Router::new()
        .nest("/events", event_routes)
        .nest("/ratings", ratings::routes::routes())
        .nest("/users", users::routes::routes(&state))
        .nest("/teams", teams::routes::routes(&state))
        .nest("/admin", admin::routes::routes(&state));

    Router::new().nest("/api", api).with_state(state)
}
