use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Catch {
    pub catch_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub fish_type: String,
    pub weight_kg: Option<Decimal>,
    pub length_cm: Option<Decimal>,
    pub caught_at: DateTime<Utc>,
    pub notes: Option<String>,
}
