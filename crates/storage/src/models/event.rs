use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Participation format of an event
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "event_format")]
pub enum EventFormat {
    #[default]
    #[serde(rename = "solo")]
    #[sqlx(rename = "solo")]
    Solo,
    #[serde(rename = "team_2")]
    #[sqlx(rename = "team_2")]
    Team2,
    #[serde(rename = "team_3")]
    #[sqlx(rename = "team_3")]
    Team3,
}

impl EventFormat {
    /// Number of members a team needs for this format, `None` for solo events
    pub fn team_size(self) -> Option<usize> {
        match self {
            Self::Solo => None,
            Self::Team2 => Some(2),
            Self::Team3 => Some(3),
        }
    }

    pub fn is_team(self) -> bool {
        self.team_size().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Team2 => "team_2",
            Self::Team3 => "team_3",
        }
    }
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(Self::Solo),
            "team_2" => Ok(Self::Team2),
            "team_3" => Ok(Self::Team3),
            other => Err(format!(
                "Invalid event format '{}': expected solo, team_2 or team_3",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FishingEvent {
    pub event_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub fish_types: Option<String>,
    pub weather: Option<String>,
    pub format: EventFormat,
    pub max_participants: Option<i32>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FishingEvent {
    /// An event stays active until its end (or its start when no end is set)
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.unwrap_or(self.start_date) > now
    }

    /// Whether another registrant fits, given the current count
    pub fn has_capacity_for(&self, registered: i64) -> bool {
        match self.max_participants {
            Some(max) => registered < i64::from(max),
            None => true,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(format: EventFormat, max_participants: Option<i32>) -> FishingEvent {
        let now = Utc::now();
        FishingEvent {
            event_id: Uuid::new_v4(),
            title: "Spring Cup".to_string(),
            description: None,
            latitude: 55.75,
            longitude: 37.61,
            start_date: now,
            end_date: None,
            fish_types: None,
            weather: None,
            format,
            max_participants,
            owner_id: Uuid::new_v4(),
            created_at: now,
        }
    }

    #[test]
    fn test_team_size_per_format() {
        assert_eq!(EventFormat::Solo.team_size(), None);
        assert_eq!(EventFormat::Team2.team_size(), Some(2));
        assert_eq!(EventFormat::Team3.team_size(), Some(3));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("team_2".parse::<EventFormat>(), Ok(EventFormat::Team2));
        assert!("duo".parse::<EventFormat>().is_err());
    }

    #[test]
    fn test_format_serializes_with_underscore() {
        let json = serde_json::to_string(&EventFormat::Team3).unwrap();
        assert_eq!(json, "\"team_3\"");
    }

    #[test]
    fn test_capacity() {
        let capped = event(EventFormat::Solo, Some(1));
        assert!(capped.has_capacity_for(0));
        assert!(!capped.has_capacity_for(1));

        let open = event(EventFormat::Solo, None);
        assert!(open.has_capacity_for(10_000));
    }

    #[test]
    fn test_activity_uses_end_date_when_present() {
        let mut e = event(EventFormat::Solo, None);
        let now = Utc::now();
        e.start_date = now - Duration::days(2);
        e.end_date = Some(now + Duration::days(1));
        assert!(e.is_active_at(now));

        e.end_date = None;
        assert!(!e.is_active_at(now));
    }
}
