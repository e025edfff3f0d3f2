use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::SuccessResponse,
        participation::TeamMemberInfo,
        team::{AddMemberRequest, CreateTeamRequest, TeamDetailResponse, UpdateTeamRequest},
    },
    models::Team,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/teams",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Teams the caller owns or belongs to", body = Vec<TeamDetailResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "teams"
)]
pub async fn list_my_teams(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, WebError> {
    let teams = services::list_my_teams(db.pool(), user.user_id).await?;

    Ok(Json(teams).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team created with the caller as owner", body = TeamDetailResponse),
        (status = 400, description = "Validation error or too many members"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown member id")
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::create_team(db.pool(), user.user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(team)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team with members", body = TeamDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let team = services::get_team(db.pool(), team_id, user.user_id).await?;

    Ok(Json(team).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = UpdateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found or not owned by the caller")
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let team = services::update_team(db.pool(), team_id, user.user_id, &req).await?;

    Ok(Json(team).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team deleted", body = SuccessResponse),
        (status = 400, description = "Team is registered for an active event"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found or not owned by the caller")
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_team(db.pool(), team_id, user.user_id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/members",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team roster", body = Vec<TeamMemberInfo>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn list_members(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let members = services::list_members(db.pool(), team_id, user.user_id).await?;

    Ok(Json(members).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/members",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = AddMemberRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Member added", body = TeamMemberInfo),
        (status = 400, description = "Validation error, team full or already a member"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not owned by the caller or no user with that email")
    ),
    tag = "teams"
)]
pub async fn add_member(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(team_id): Path<Uuid>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let member = services::add_member(db.pool(), team_id, user.user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(member)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/members/{member_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id"),
        ("member_id" = Uuid, Path, description = "Membership id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Member removed", body = SuccessResponse),
        (status = 400, description = "Owner cannot be removed or team is in an active event"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team or membership not found")
    ),
    tag = "teams"
)]
pub async fn remove_member(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    services::remove_member(db.pool(), team_id, user.user_id, member_id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}
