use axum::{Router, middleware, routing::post};

use super::handlers::rebuild_ratings;
use crate::middleware::auth::require_api_key;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ratings/rebuild", post(rebuild_ratings))
        .route_layer(middleware::from_fn_with_state(
            state.api_keys.clone(),
            require_api_key,
        ))
}
