use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::user::RegisterUserRequest;
use crate::error::{Result, StorageError};
use crate::models::User;

/// Repository for User database operations
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user profile; the email must not be taken
    pub async fn create(&self, req: &RegisterUserRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING user_id, name, email, rating, created_at
            "#,
        )
        .bind(&req.name)
        .bind(req.email.trim().to_lowercase())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_unique_violation(StorageError::ConstraintViolation(
                "A user with this email already exists".to_string(),
            ))
        })?;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, user_id)
            .await?
            .ok_or(StorageError::UserNotFound)
    }
}

pub(crate) async fn fetch_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, name, email, rating, created_at
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// Ids from `user_ids` that have no user row
pub(crate) async fn missing_user_ids(
    conn: &mut PgConnection,
    user_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    let existing: Vec<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM users WHERE user_id = ANY($1)")
            .bind(user_ids)
            .fetch_all(conn)
            .await?;

    Ok(user_ids
        .iter()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect())
}
