use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::ratings::{RatingListFilter, RatingRebuildSummary, TeamRatingEntry, UserRatingEntry};
use crate::error::{Result, StorageError};
use crate::models::{DEFAULT_RATING, ParticipantType, RatingHistory};

/// Repository for current ratings and the rating ledgers
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Page of user ratings plus the total number of users
    pub async fn list_users(&self, filter: &RatingListFilter) -> Result<(Vec<UserRatingEntry>, i64)> {
        let pagination = filter.pagination();

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT user_id, name, rating, created_at
            FROM users
            ORDER BY {}
            LIMIT $1 OFFSET $2
            "#,
            filter.sort.as_order_by()
        );
        let entries = sqlx::query_as::<_, UserRatingEntry>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Page of team ratings with owner name and member count
    pub async fn list_teams(&self, filter: &RatingListFilter) -> Result<(Vec<TeamRatingEntry>, i64)> {
        let pagination = filter.pagination();

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teams")
            .fetch_one(self.pool)
            .await?;

        // ORDER BY resolves against the output column names
        let sql = format!(
            r#"
            SELECT t.team_id, t.name, t.description, t.rating, t.owner_id,
                   u.name AS owner_name,
                   (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.team_id) AS member_count,
                   t.created_at
            FROM teams t
            INNER JOIN users u ON u.user_id = t.owner_id
            ORDER BY {}
            LIMIT $1 OFFSET $2
            "#,
            filter.sort.as_order_by()
        );
        let entries = sqlx::query_as::<_, TeamRatingEntry>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Ledger of a user or team, newest entry first
    pub async fn history(
        &self,
        subject_type: ParticipantType,
        subject_id: Uuid,
    ) -> Result<Vec<RatingHistory>> {
        let mut conn = self.pool.acquire().await?;
        if fetch_rating(&mut conn, subject_type, subject_id).await?.is_none() {
            return Err(match subject_type {
                ParticipantType::User => StorageError::UserNotFound,
                ParticipantType::Team => StorageError::TeamNotFound,
            });
        }

        let sql = format!(
            r#"
            SELECT history_id, {id} AS subject_id, event_id, old_rating, new_rating,
                   change, reason, created_at
            FROM {table}
            WHERE {id} = $1
            ORDER BY created_at DESC
            "#,
            id = subject_type.id_column(),
            table = subject_type.history_table(),
        );
        let entries = sqlx::query_as::<_, RatingHistory>(&sql)
            .bind(subject_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(entries)
    }

    /// Reset every rating to the default plus the sum of its ledger changes
    pub async fn rebuild(&self) -> Result<RatingRebuildSummary> {
        let mut tx = self.pool.begin().await?;

        let users_updated = replay_ledger(&mut tx, ParticipantType::User).await?;
        let teams_updated = replay_ledger(&mut tx, ParticipantType::Team).await?;

        tx.commit().await?;

        Ok(RatingRebuildSummary {
            users_updated,
            teams_updated,
        })
    }
}

async fn replay_ledger(conn: &mut PgConnection, subject_type: ParticipantType) -> Result<u64> {
    let sql = format!(
        r#"
        UPDATE {table} s
        SET rating = $1 + COALESCE(
            (SELECT SUM(h.change) FROM {history} h WHERE h.{id} = s.{id}), 0
        )::INTEGER
        "#,
        table = subject_type.rating_table(),
        history = subject_type.history_table(),
        id = subject_type.id_column(),
    );
    let result = sqlx::query(&sql)
        .bind(DEFAULT_RATING)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

async fn fetch_rating(
    conn: &mut PgConnection,
    subject_type: ParticipantType,
    subject_id: Uuid,
) -> Result<Option<i32>> {
    let sql = format!(
        "SELECT rating FROM {} WHERE {} = $1",
        subject_type.rating_table(),
        subject_type.id_column()
    );
    let rating = sqlx::query_scalar::<_, i32>(&sql)
        .bind(subject_id)
        .fetch_optional(conn)
        .await?;

    Ok(rating)
}

/// Current rating of a user or team, row-locked until the transaction ends
pub(crate) async fn lock_rating(
    conn: &mut PgConnection,
    subject_type: ParticipantType,
    subject_id: Uuid,
) -> Result<Option<i32>> {
    let sql = format!(
        "SELECT rating FROM {} WHERE {} = $1 FOR UPDATE",
        subject_type.rating_table(),
        subject_type.id_column()
    );
    let rating = sqlx::query_scalar::<_, i32>(&sql)
        .bind(subject_id)
        .fetch_optional(conn)
        .await?;

    Ok(rating)
}

pub(crate) async fn set_rating(
    conn: &mut PgConnection,
    subject_type: ParticipantType,
    subject_id: Uuid,
    rating: i32,
) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET rating = $2 WHERE {} = $1",
        subject_type.rating_table(),
        subject_type.id_column()
    );
    sqlx::query(&sql)
        .bind(subject_id)
        .bind(rating)
        .execute(conn)
        .await?;

    Ok(())
}

/// Append one ledger entry; entries are never updated or deleted
pub(crate) async fn append_history(
    conn: &mut PgConnection,
    subject_type: ParticipantType,
    subject_id: Uuid,
    event_id: Uuid,
    old_rating: i32,
    new_rating: i32,
    reason: &str,
) -> Result<RatingHistory> {
    let sql = format!(
        r#"
        INSERT INTO {table} ({id}, event_id, old_rating, new_rating, change, reason)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING history_id, {id} AS subject_id, event_id, old_rating, new_rating,
                  change, reason, created_at
        "#,
        table = subject_type.history_table(),
        id = subject_type.id_column(),
    );
    let entry = sqlx::query_as::<_, RatingHistory>(&sql)
        .bind(subject_id)
        .bind(event_id)
        .bind(old_rating)
        .bind(new_rating)
        .bind(new_rating - old_rating)
        .bind(reason)
        .fetch_one(conn)
        .await?;

    Ok(entry)
}
