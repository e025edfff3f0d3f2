use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{EventResult, ParticipantType};
use crate::repository::event::fetch_event;

const SELECT_RESULT: &str = r#"
    SELECT result_id, event_id, participant_type, participant_id, place, score,
           rating_change, created_at
    FROM event_results
"#;

/// Repository for published event results
pub struct ResultsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published results of an event, best place first
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<EventResult>> {
        let mut conn = self.pool.acquire().await?;
        if fetch_event(&mut conn, event_id).await?.is_none() {
            return Err(StorageError::EventNotFound);
        }

        existing_results(&mut conn, event_id).await
    }
}

pub(crate) async fn existing_results(
    conn: &mut PgConnection,
    event_id: Uuid,
) -> Result<Vec<EventResult>> {
    let sql = format!("{SELECT_RESULT} WHERE event_id = $1 ORDER BY place ASC");
    let results = sqlx::query_as::<_, EventResult>(&sql)
        .bind(event_id)
        .fetch_all(conn)
        .await?;

    Ok(results)
}

pub(crate) async fn delete_results(conn: &mut PgConnection, event_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM event_results WHERE event_id = $1")
        .bind(event_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn insert_result(
    conn: &mut PgConnection,
    event_id: Uuid,
    participant_type: ParticipantType,
    participant_id: Uuid,
    place: i32,
    score: Decimal,
    rating_change: i32,
) -> Result<EventResult> {
    let result = sqlx::query_as::<_, EventResult>(
        r#"
        INSERT INTO event_results
            (event_id, participant_type, participant_id, place, score, rating_change)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING result_id, event_id, participant_type, participant_id, place, score,
                  rating_change, created_at
        "#,
    )
    .bind(event_id)
    .bind(participant_type)
    .bind(participant_id)
    .bind(place)
    .bind(score)
    .bind(rating_change)
    .fetch_one(conn)
    .await?;

    Ok(result)
}
