use sqlx::PgPool;
use storage::{
    dto::user::RegisterUserRequest,
    error::{Result, StorageError},
    models::User,
    repository::user::UserRepository,
};
use uuid::Uuid;

/// Create the profile for an identity-provider account
pub async fn register_user(pool: &PgPool, request: &RegisterUserRequest) -> Result<User> {
    let repo = UserRepository::new(pool);
    let user = repo.create(request).await?;

    tracing::info!("Registered user {}", user.user_id);
    Ok(user)
}

/// Profile of the token subject; a token without a profile is not a session
pub async fn current_user(pool: &PgPool, user_id: Uuid) -> Result<User> {
    let repo = UserRepository::new(pool);
    repo.find_by_id(user_id).await.map_err(|e| match e {
        StorageError::UserNotFound => StorageError::NotAuthenticated,
        other => other,
    })
}
