use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use super::handlers::{
    add_member, create_team, delete_team, get_team, list_members, list_my_teams, remove_member,
    update_team,
};
use crate::features::ratings::handlers::team_rating_history;
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(list_my_teams))
        .route("/", post(create_team))
        .route("/:team_id", get(get_team))
        .route("/:team_id", patch(update_team))
        .route("/:team_id", delete(delete_team))
        .route("/:team_id/members", get(list_members))
        .route("/:team_id/members", post(add_member))
        .route("/:team_id/members/:member_id", delete(remove_member))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    Router::new()
        .route("/:team_id/rating-history", get(team_rating_history))
        .merge(protected)
}
