use sqlx::PgPool;
use storage::{
    dto::{
        catch::RecordCatchRequest,
        event::{CreateEventRequest, EventDetailResponse, UpdateEventRequest},
    },
    error::Result,
    models::{Catch, FishingEvent},
    repository::{catch::CatchRepository, event::EventRepository},
};
use uuid::Uuid;

/// List all events, latest start first
pub async fn list_events(pool: &PgPool) -> Result<Vec<FishingEvent>> {
    let repo = EventRepository::new(pool);
    repo.list().await
}

/// Get an event with its owner, registrations and catches
pub async fn get_event_detailed(pool: &PgPool, event_id: Uuid) -> Result<EventDetailResponse> {
    let repo = EventRepository::new(pool);
    repo.find_detailed(event_id).await
}

pub async fn create_event(
    pool: &PgPool,
    owner_id: Uuid,
    request: &CreateEventRequest,
) -> Result<FishingEvent> {
    let repo = EventRepository::new(pool);
    let event = repo.create(owner_id, request).await?;

    tracing::info!("User {} created event {}", owner_id, event.event_id);
    Ok(event)
}

pub async fn update_event(
    pool: &PgPool,
    event_id: Uuid,
    requester_id: Uuid,
    request: &UpdateEventRequest,
) -> Result<FishingEvent> {
    let repo = EventRepository::new(pool);
    repo.update(event_id, requester_id, request).await
}

pub async fn delete_event(pool: &PgPool, event_id: Uuid, requester_id: Uuid) -> Result<()> {
    let repo = EventRepository::new(pool);
    repo.delete(event_id, requester_id).await?;

    tracing::info!("User {} deleted event {}", requester_id, event_id);
    Ok(())
}

pub async fn record_catch(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    request: &RecordCatchRequest,
) -> Result<Catch> {
    let repo = CatchRepository::new(pool);
    repo.create(event_id, user_id, request).await
}
