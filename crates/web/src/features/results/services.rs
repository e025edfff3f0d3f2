use sqlx::PgPool;
use storage::{
    dto::results::ResultEntry,
    error::Result,
    models::EventResult,
    repository::results::ResultsRepository,
    services::results::{self, ResultsSettings},
};
use uuid::Uuid;

/// Published results, best place first
pub async fn list_results(pool: &PgPool, event_id: Uuid) -> Result<Vec<EventResult>> {
    let repo = ResultsRepository::new(pool);
    repo.list_for_event(event_id).await
}

pub async fn submit_results(
    pool: &PgPool,
    settings: &ResultsSettings,
    event_id: Uuid,
    requester_id: Uuid,
    entries: &[ResultEntry],
) -> Result<Vec<EventResult>> {
    results::submit_results(pool, settings, event_id, requester_id, entries).await
}
