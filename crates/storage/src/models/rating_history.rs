use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One entry of a user or team rating ledger.
///
/// Entries are only ever appended. `subject_id` is the user or team id,
/// depending on which ledger the row was read from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingHistory {
    pub history_id: Uuid,
    pub subject_id: Uuid,
    pub event_id: Option<Uuid>,
    pub old_rating: i32,
    pub new_rating: i32,
    pub change: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
