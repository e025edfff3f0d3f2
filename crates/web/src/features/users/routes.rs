use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{current_user, register_user};
use crate::features::ratings::handlers::user_rating_history;
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(current_user))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    Router::new()
        .route("/", post(register_user))
        .route("/:user_id/rating-history", get(user_rating_history))
        .merge(protected)
}
