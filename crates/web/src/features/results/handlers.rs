use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::results::{SubmitResultsRequest, SubmitResultsResponse},
    models::EventResult,
    services::results::ResultsSettings,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::extract::ApiJson;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Results ordered by place; empty until published", body = Vec<EventResult>),
        (status = 404, description = "Event not found")
    ),
    tag = "results"
)]
pub async fn list_results(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let results = services::list_results(db.pool(), event_id).await?;

    Ok(Json(results).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/results",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = SubmitResultsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Results published and ratings updated", body = SubmitResultsResponse),
        (status = 400, description = "Places are not a permutation of 1..N or a participant is repeated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the event"),
        (status = 404, description = "Event or participant not found")
    ),
    tag = "results"
)]
pub async fn submit_results(
    State(db): State<Database>,
    State(settings): State<ResultsSettings>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    ApiJson(req): ApiJson<SubmitResultsRequest>,
) -> Result<Response, WebError> {
    let results =
        services::submit_results(db.pool(), &settings, event_id, user.user_id, &req.results)
            .await?;

    Ok(Json(SubmitResultsResponse { results }).into_response())
}
