use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catch::{CatchResponse, RecordCatchRequest};
use crate::error::{Result, StorageError};
use crate::models::Catch;
use crate::repository::event::fetch_event;
use crate::repository::participation::{in_registered_team, participant_exists};

/// Repository for catches logged during an event
pub struct CatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Catches of an event in the order they were caught
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<CatchResponse>> {
        let catches = sqlx::query_as::<_, CatchResponse>(
            r#"
            SELECT c.catch_id, c.event_id, c.user_id, u.name AS user_name, c.fish_type,
                   c.weight_kg, c.length_cm, c.caught_at, c.notes
            FROM catches c
            INNER JOIN users u ON u.user_id = c.user_id
            WHERE c.event_id = $1
            ORDER BY c.caught_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(catches)
    }

    /// Record a catch for a user registered for the event, either on their
    /// own or through a registered team
    pub async fn create(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        req: &RecordCatchRequest,
    ) -> Result<Catch> {
        let mut conn = self.pool.acquire().await?;

        if fetch_event(&mut conn, event_id).await?.is_none() {
            return Err(StorageError::EventNotFound);
        }

        let registered = participant_exists(&mut conn, event_id, user_id).await?
            || in_registered_team(&mut conn, event_id, user_id).await?;
        if !registered {
            return Err(StorageError::NotRegistered);
        }

        let catch = sqlx::query_as::<_, Catch>(
            r#"
            INSERT INTO catches (event_id, user_id, fish_type, weight_kg, length_cm, caught_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING catch_id, event_id, user_id, fish_type, weight_kg, length_cm, caught_at, notes
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(&req.fish_type)
        .bind(req.weight_kg)
        .bind(req.length_cm)
        .bind(req.caught_at.unwrap_or_else(Utc::now))
        .bind(&req.notes)
        .fetch_one(&mut *conn)
        .await?;

        Ok(catch)
    }
}
