use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        ratings::{RatingListFilter, TeamRatingEntry, UserRatingEntry},
    },
    models::{ParticipantType, RatingHistory},
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/ratings/users",
    params(RatingListFilter),
    responses(
        (status = 200, description = "Paginated user ratings", body = PaginatedResponse<UserRatingEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "ratings"
)]
pub async fn list_user_ratings(
    State(db): State<Database>,
    Query(filter): Query<RatingListFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::list_user_ratings(db.pool(), &filter).await?;

    let response = PaginatedResponse::new(entries, filter.pagination(), total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/ratings/teams",
    params(RatingListFilter),
    responses(
        (status = 200, description = "Paginated team ratings", body = PaginatedResponse<TeamRatingEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "ratings"
)]
pub async fn list_team_ratings(
    State(db): State<Database>,
    Query(filter): Query<RatingListFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::list_team_ratings(db.pool(), &filter).await?;

    let response = PaginatedResponse::new(entries, filter.pagination(), total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/rating-history",
    params(
        ("user_id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Rating ledger, newest first", body = Vec<RatingHistory>),
        (status = 404, description = "User not found")
    ),
    tag = "ratings"
)]
pub async fn user_rating_history(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let history = services::rating_history(db.pool(), ParticipantType::User, user_id).await?;

    Ok(Json(history).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/rating-history",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Rating ledger, newest first", body = Vec<RatingHistory>),
        (status = 404, description = "Team not found")
    ),
    tag = "ratings"
)]
pub async fn team_rating_history(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let history = services::rating_history(db.pool(), ParticipantType::Team, team_id).await?;

    Ok(Json(history).into_response())
}
