use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::catch::CatchResponse;
use crate::dto::participation::TeamParticipationDetail;
use crate::dto::user::UserSummary;
use crate::models::{EventFormat, FishingEvent, FishingParticipant};

/// Request payload for creating a new fishing event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    pub start_date: DateTime<Utc>,

    pub end_date: Option<DateTime<Utc>>,

    #[validate(length(max = 1000))]
    pub fish_types: Option<String>,

    #[validate(length(max = 1000))]
    pub weather: Option<String>,

    #[serde(default)]
    pub format: EventFormat,

    #[validate(range(min = 1, message = "max_participants must be at least 1"))]
    pub max_participants: Option<i32>,
}

impl CreateEventRequest {
    /// Checks spanning more than one field
    pub fn validate_dates(&self) -> Result<(), &'static str> {
        check_date_order(self.start_date, self.end_date)
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    #[validate(length(max = 1000))]
    pub fish_types: Option<String>,

    #[validate(length(max = 1000))]
    pub weather: Option<String>,

    pub format: Option<EventFormat>,

    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
}

impl UpdateEventRequest {
    /// Merge the update onto the stored event without touching the database
    pub fn apply_to(&self, event: &FishingEvent) -> FishingEvent {
        let mut merged = event.clone();
        if let Some(ref title) = self.title {
            merged.title = title.clone();
        }
        if self.description.is_some() {
            merged.description = self.description.clone();
        }
        if let Some(latitude) = self.latitude {
            merged.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            merged.longitude = longitude;
        }
        if let Some(start_date) = self.start_date {
            merged.start_date = start_date;
        }
        if self.end_date.is_some() {
            merged.end_date = self.end_date;
        }
        if self.fish_types.is_some() {
            merged.fish_types = self.fish_types.clone();
        }
        if self.weather.is_some() {
            merged.weather = self.weather.clone();
        }
        if let Some(format) = self.format {
            merged.format = format;
        }
        if self.max_participants.is_some() {
            merged.max_participants = self.max_participants;
        }
        merged
    }

    pub fn changes_format_of(&self, event: &FishingEvent) -> bool {
        self.format.is_some_and(|format| format != event.format)
    }
}

pub(crate) fn check_date_order(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), &'static str> {
    match end {
        Some(end) if end < start => Err("End date must be on or after start date"),
        _ => Ok(()),
    }
}

/// Event with its owner, registrations and catches
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: FishingEvent,
    pub owner: UserSummary,
    pub participants: Vec<FishingParticipant>,
    pub teams: Vec<TeamParticipationDetail>,
    pub catches: Vec<CatchResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn create_request() -> CreateEventRequest {
        CreateEventRequest {
            title: "Spring Cup".to_string(),
            description: None,
            latitude: 55.0,
            longitude: 37.0,
            start_date: Utc::now(),
            end_date: None,
            fish_types: None,
            weather: None,
            format: EventFormat::Solo,
            max_participants: Some(1),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(create_request().validate().is_ok());
        assert!(create_request().validate_dates().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude_fails() {
        let mut req = create_request();
        req.latitude = 91.0;
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));
    }

    #[test]
    fn test_zero_capacity_fails() {
        let mut req = create_request();
        req.max_participants = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_end_before_start_fails() {
        let mut req = create_request();
        req.end_date = Some(req.start_date - Duration::hours(1));
        assert!(req.validate_dates().is_err());
    }

    #[test]
    fn test_format_defaults_to_solo() {
        let json = r#"{"title":"Cup","latitude":1.0,"longitude":2.0,"start_date":"2025-05-01T06:00:00Z"}"#;
        let req: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.format, EventFormat::Solo);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let json = r#"{"title":"Cup","latitude":1.0,"longitude":2.0,"start_date":"2025-05-01T06:00:00Z","format":"team_4"}"#;
        assert!(serde_json::from_str::<CreateEventRequest>(json).is_err());
    }

    #[test]
    fn test_update_merges_only_present_fields() {
        let now = Utc::now();
        let event = FishingEvent {
            event_id: Uuid::new_v4(),
            title: "Old".to_string(),
            description: Some("keep".to_string()),
            latitude: 1.0,
            longitude: 2.0,
            start_date: now,
            end_date: None,
            fish_types: None,
            weather: None,
            format: EventFormat::Solo,
            max_participants: None,
            owner_id: Uuid::new_v4(),
            created_at: now,
        };
        let update = UpdateEventRequest {
            title: Some("New".to_string()),
            format: Some(EventFormat::Team2),
            ..Default::default()
        };

        let merged = update.apply_to(&event);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.description.as_deref(), Some("keep"));
        assert_eq!(merged.format, EventFormat::Team2);
        assert!(update.changes_format_of(&event));
    }
}
