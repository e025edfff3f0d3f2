use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordCatchRequest {
    #[validate(length(min = 1, max = 255, message = "Fish type is required"))]
    pub fish_type: String,

    pub weight_kg: Option<Decimal>,

    pub length_cm: Option<Decimal>,

    /// Defaults to the time of the request
    pub caught_at: Option<DateTime<Utc>>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl RecordCatchRequest {
    pub fn validate_measurements(&self) -> Result<(), &'static str> {
        if self.weight_kg.is_some_and(|w| w <= Decimal::ZERO) {
            return Err("Weight must be positive");
        }
        if self.length_cm.is_some_and(|l| l <= Decimal::ZERO) {
            return Err("Length must be positive");
        }
        Ok(())
    }
}

/// Catch joined with the angler's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatchResponse {
    pub catch_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub fish_type: String,
    pub weight_kg: Option<Decimal>,
    pub length_cm: Option<Decimal>,
    pub caught_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_weight_is_rejected() {
        let req = RecordCatchRequest {
            fish_type: "Pike".to_string(),
            weight_kg: Some(Decimal::ZERO),
            length_cm: None,
            caught_at: None,
            notes: None,
        };
        assert!(req.validate_measurements().is_err());
    }

    #[test]
    fn test_weight_accepts_json_number() {
        let req: RecordCatchRequest =
            serde_json::from_str(r#"{"fish_type":"Perch","weight_kg":1.25}"#).unwrap();
        assert_eq!(req.weight_kg, Some(Decimal::new(125, 2)));
        assert!(req.validate_measurements().is_ok());
    }
}
