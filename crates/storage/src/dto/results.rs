use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{EventResult, ParticipantType};

/// One ranked participant in a results submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResultEntry {
    pub participant_type: ParticipantType,
    pub participant_id: Uuid,
    pub place: i32,
    #[serde(default)]
    pub score: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResultsRequest {
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResultsResponse {
    pub results: Vec<EventResult>,
}
