use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::SuccessResponse,
        participation::{
            RegisterIndividualRequest, RegisterTeamRequest, TeamParticipationDetail,
            UnregisterTeamQuery,
        },
    },
    models::{FishingParticipant, TeamParticipation},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/participants",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Individual participants in registration order", body = Vec<FishingParticipant>),
        (status = 404, description = "Event not found")
    ),
    tag = "participation"
)]
pub async fn list_participants(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let participants = services::list_participants(db.pool(), event_id).await?;

    Ok(Json(participants).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/participants",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = RegisterIndividualRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Registered", body = FishingParticipant),
        (status = 400, description = "Wrong format, already registered or event full"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "participation"
)]
pub async fn register_individual(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    body: Option<ApiJson<RegisterIndividualRequest>>,
) -> Result<Response, WebError> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    req.validate()?;

    let participant =
        services::register_individual(db.pool(), event_id, user.user_id, req.notes.as_deref())
            .await?;

    Ok((StatusCode::CREATED, Json(participant)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}/participants",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Unregistered", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found or caller not registered")
    ),
    tag = "participation"
)]
pub async fn unregister_individual(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::unregister_individual(db.pool(), event_id, user.user_id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Registered teams with their members", body = Vec<TeamParticipationDetail>),
        (status = 404, description = "Event not found")
    ),
    tag = "participation"
)]
pub async fn list_team_participations(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let teams = services::list_team_participations(db.pool(), event_id).await?;

    Ok(Json(teams).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = RegisterTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team registered", body = TeamParticipation),
        (status = 400, description = "Wrong format, size mismatch, member conflict, already registered or event full"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a member of the team"),
        (status = 404, description = "Event or team not found")
    ),
    tag = "participation"
)]
pub async fn register_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    ApiJson(req): ApiJson<RegisterTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let participation = services::register_team(
        db.pool(),
        event_id,
        req.team_id,
        user.user_id,
        req.notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(participation)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}/teams",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        UnregisterTeamQuery
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team unregistered", body = SuccessResponse),
        (status = 400, description = "Missing or malformed team_id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is neither a team member nor the event owner"),
        (status = 404, description = "Event, team or registration not found")
    ),
    tag = "participation"
)]
pub async fn unregister_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<UnregisterTeamQuery>,
) -> Result<Response, WebError> {
    services::unregister_team(db.pool(), event_id, query.team_id, user.user_id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}
