use sqlx::PgPool;
use storage::{
    dto::participation::TeamParticipationDetail,
    error::Result,
    models::{FishingParticipant, TeamParticipation},
    repository::{event::EventRepository, participation::ParticipationRepository},
    services::participation,
};
use uuid::Uuid;

pub async fn list_participants(pool: &PgPool, event_id: Uuid) -> Result<Vec<FishingParticipant>> {
    ensure_event_exists(pool, event_id).await?;

    let repo = ParticipationRepository::new(pool);
    repo.list_participants(event_id).await
}

pub async fn list_team_participations(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Vec<TeamParticipationDetail>> {
    ensure_event_exists(pool, event_id).await?;

    let repo = ParticipationRepository::new(pool);
    repo.list_team_participations(event_id).await
}

pub async fn register_individual(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    notes: Option<&str>,
) -> Result<FishingParticipant> {
    participation::register_individual(pool, event_id, user_id, notes).await
}

pub async fn unregister_individual(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<()> {
    participation::unregister_individual(pool, event_id, user_id).await
}

pub async fn register_team(
    pool: &PgPool,
    event_id: Uuid,
    team_id: Uuid,
    user_id: Uuid,
    notes: Option<&str>,
) -> Result<TeamParticipation> {
    participation::register_team(pool, event_id, team_id, user_id, notes).await
}

pub async fn unregister_team(
    pool: &PgPool,
    event_id: Uuid,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<()> {
    participation::unregister_team(pool, event_id, team_id, user_id).await
}

async fn ensure_event_exists(pool: &PgPool, event_id: Uuid) -> Result<()> {
    EventRepository::new(pool).find_by_id(event_id).await?;
    Ok(())
}
