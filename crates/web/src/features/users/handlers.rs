use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{Database, dto::user::RegisterUserRequest, models::User};
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Profile created with the default rating", body = User),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn register_user(
    State(db): State<Database>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let user = services::register_user(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile of the caller", body = User),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn current_user(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, WebError> {
    let profile = services::current_user(db.pool(), user.user_id).await?;

    Ok(Json(profile).into_response())
}
