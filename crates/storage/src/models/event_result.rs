use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Who a result row (and a rating ledger entry) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "participant_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantType {
    User,
    Team,
}

impl ParticipantType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
        }
    }

    /// Table holding the subject's current rating
    pub(crate) fn rating_table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Team => "teams",
        }
    }

    /// Append-only ledger table for the subject
    pub(crate) fn history_table(self) -> &'static str {
        match self {
            Self::User => "user_rating_history",
            Self::Team => "team_rating_history",
        }
    }

    /// Primary key column shared by the rating and ledger tables
    pub(crate) fn id_column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Team => "team_id",
        }
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventResult {
    pub result_id: Uuid,
    pub event_id: Uuid,
    pub participant_type: ParticipantType,
    pub participant_id: Uuid,
    pub place: i32,
    pub score: Decimal,
    pub rating_change: i32,
    pub created_at: DateTime<Utc>,
}
