use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{Database, dto::ratings::RatingRebuildSummary};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/admin/ratings/rebuild",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Ratings recomputed from the ledgers", body = RatingRebuildSummary),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "admin"
)]
pub async fn rebuild_ratings(State(db): State<Database>) -> Result<Response, WebError> {
    let summary = services::rebuild_ratings(db.pool()).await?;

    Ok(Json(summary).into_response())
}
