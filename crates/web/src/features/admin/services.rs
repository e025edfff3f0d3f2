use sqlx::PgPool;
use storage::{dto::ratings::RatingRebuildSummary, error::Result, services::rating};

/// Reset every rating to what the ledgers add up to
pub async fn rebuild_ratings(pool: &PgPool) -> Result<RatingRebuildSummary> {
    rating::rebuild_ratings(pool).await
}
