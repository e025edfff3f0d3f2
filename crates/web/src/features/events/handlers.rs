use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        catch::RecordCatchRequest,
        common::SuccessResponse,
        event::{CreateEventRequest, EventDetailResponse, UpdateEventRequest},
    },
    models::{Catch, FishingEvent},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::ApiJson;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events, latest start first", body = Vec<FishingEvent>)
    ),
    tag = "events"
)]
pub async fn list_events(State(db): State<Database>) -> Result<Response, WebError> {
    let events = services::list_events(db.pool()).await?;

    Ok(Json(events).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event with owner, participants, teams and catches", body = EventDetailResponse),
        (status = 400, description = "Malformed event id"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = services::get_event_detailed(db.pool(), event_id).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created", body = FishingEvent),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_dates()
        .map_err(|msg| WebError::BadRequest(msg.to_string()))?;

    let event = services::create_event(db.pool(), user.user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event updated", body = FishingEvent),
        (status = 400, description = "Validation error or format locked by registrations"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found or not owned by the caller")
    ),
    tag = "events"
)]
pub async fn update_event(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = services::update_event(db.pool(), event_id, user.user_id, &req).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found or not owned by the caller")
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_event(db.pool(), event_id, user.user_id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/catches",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = RecordCatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Catch recorded", body = Catch),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found or caller not registered")
    ),
    tag = "events"
)]
pub async fn record_catch(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    ApiJson(req): ApiJson<RecordCatchRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_measurements()
        .map_err(|msg| WebError::BadRequest(msg.to_string()))?;

    let catch = services::record_catch(db.pool(), event_id, user.user_id, &req).await?;

    Ok((StatusCode::CREATED, Json(catch)).into_response())
}
