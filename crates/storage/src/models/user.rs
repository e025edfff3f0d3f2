use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Rating every user and team starts with
pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown on registrations; falls back to the email
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if !self.email.is_empty() => self.email.clone(),
            _ => "Unknown participant".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: &str) -> User {
        User {
            user_id: Uuid::new_v4(),
            name: name.map(String::from),
            email: email.to_string(),
            rating: DEFAULT_RATING,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_prefers_name() {
        assert_eq!(user(Some("Ivan"), "ivan@example.com").display_name(), "Ivan");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(
            user(Some("  "), "ivan@example.com").display_name(),
            "ivan@example.com"
        );
        assert_eq!(user(None, "").display_name(), "Unknown participant");
    }
}
