use sqlx::PgPool;
use storage::{
    dto::ratings::{RatingListFilter, TeamRatingEntry, UserRatingEntry},
    error::Result,
    models::{ParticipantType, RatingHistory},
    repository::rating::RatingRepository,
};
use uuid::Uuid;

pub async fn list_user_ratings(
    pool: &PgPool,
    filter: &RatingListFilter,
) -> Result<(Vec<UserRatingEntry>, i64)> {
    let repo = RatingRepository::new(pool);
    repo.list_users(filter).await
}

pub async fn list_team_ratings(
    pool: &PgPool,
    filter: &RatingListFilter,
) -> Result<(Vec<TeamRatingEntry>, i64)> {
    let repo = RatingRepository::new(pool);
    repo.list_teams(filter).await
}

/// Rating ledger of a user or team, newest first
pub async fn rating_history(
    pool: &PgPool,
    subject_type: ParticipantType,
    subject_id: Uuid,
) -> Result<Vec<RatingHistory>> {
    let repo = RatingRepository::new(pool);
    repo.history(subject_type, subject_id).await
}
