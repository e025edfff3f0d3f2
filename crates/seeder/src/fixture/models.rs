use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::models::EventFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub format_version: String,
    #[serde(default)]
    pub users: Vec<UserData>,
    #[serde(default)]
    pub teams: Vec<TeamData>,
    #[serde(default)]
    pub events: Vec<EventData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Team referenced by its owner's email; members join with the `member` role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_email: String,
    #[serde(default)]
    pub member_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fish_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default)]
    pub format: EventFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i32>,
    pub owner_email: String,
}

/// Emails are compared case-insensitively everywhere
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
