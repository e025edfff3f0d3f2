use axum::{Router, routing::get};

use super::handlers::{list_team_ratings, list_user_ratings};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_user_ratings))
        .route("/teams", get(list_team_ratings))
}
