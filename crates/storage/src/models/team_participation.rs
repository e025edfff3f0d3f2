use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamParticipation {
    pub participation_id: Uuid,
    pub event_id: Uuid,
    pub team_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
