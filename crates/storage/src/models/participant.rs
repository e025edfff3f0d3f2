use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Individual registration to a solo event.
///
/// `name` and `contact` are copied from the user profile at registration time
/// and are not kept in sync afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FishingParticipant {
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub contact: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
