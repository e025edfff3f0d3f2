use super::FORMAT_VERSION;
use super::models::{Fixture, normalize_email};
use crate::{Result, SeederError};
use std::collections::HashSet;
use storage::models::MAX_TEAM_SIZE;
use tracing::warn;

pub struct FixtureValidator;

impl FixtureValidator {
    pub fn validate(fixture: &Fixture) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        if fixture.format_version != FORMAT_VERSION {
            report.errors.push(format!(
                "Unsupported format version: {}. Expected {}",
                fixture.format_version, FORMAT_VERSION
            ));
        }

        if fixture.users.is_empty() {
            report
                .warnings
                .push("Fixture contains no users".to_string());
        }

        let mut emails = HashSet::new();
        for user in &fixture.users {
            let email = normalize_email(&user.email);
            if email.is_empty() || !email.contains('@') {
                report
                    .errors
                    .push(format!("Invalid user email: '{}'", user.email));
                continue;
            }
            if !emails.insert(email) {
                report
                    .errors
                    .push(format!("Duplicate user email: '{}'", user.email));
            }
            if user.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
                report
                    .warnings
                    .push(format!("User '{}' has no name", user.email));
            }
        }

        let mut team_names = HashSet::new();
        for team in &fixture.teams {
            if team.name.trim().is_empty() {
                report.errors.push("Team name cannot be empty".to_string());
            }
            if !team_names.insert(team.name.trim().to_lowercase()) {
                report
                    .warnings
                    .push(format!("Team name '{}' is used more than once", team.name));
            }

            let owner = normalize_email(&team.owner_email);
            if !emails.contains(&owner) {
                report.errors.push(format!(
                    "Team '{}' has unknown owner: '{}'",
                    team.name, team.owner_email
                ));
            }

            let mut roster = HashSet::from([owner]);
            for member in &team.member_emails {
                let member_email = normalize_email(member);
                if !emails.contains(&member_email) {
                    report.errors.push(format!(
                        "Team '{}' has unknown member: '{}'",
                        team.name, member
                    ));
                }
                roster.insert(member_email);
            }

            if roster.len() > MAX_TEAM_SIZE {
                report.errors.push(format!(
                    "Team '{}' has {} members, at most {} allowed",
                    team.name,
                    roster.len(),
                    MAX_TEAM_SIZE
                ));
            }
            if roster.len() == 1 {
                report
                    .warnings
                    .push(format!("Team '{}' has no members besides its owner", team.name));
            }
        }

        for event in &fixture.events {
            if event.title.trim().is_empty() {
                report.errors.push("Event title cannot be empty".to_string());
            }
            if !(-90.0..=90.0).contains(&event.latitude) {
                report.errors.push(format!(
                    "Event '{}' has invalid latitude: {}",
                    event.title, event.latitude
                ));
            }
            if !(-180.0..=180.0).contains(&event.longitude) {
                report.errors.push(format!(
                    "Event '{}' has invalid longitude: {}",
                    event.title, event.longitude
                ));
            }
            if event.end_date.is_some_and(|end| end < event.start_date) {
                report.errors.push(format!(
                    "Event '{}' end_date must be >= start_date",
                    event.title
                ));
            }
            if event.max_participants.is_some_and(|max| max < 1) {
                report.errors.push(format!(
                    "Event '{}' max_participants must be >= 1",
                    event.title
                ));
            }
            if !emails.contains(&normalize_email(&event.owner_email)) {
                report.errors.push(format!(
                    "Event '{}' has unknown owner: '{}'",
                    event.title, event.owner_email
                ));
            }
            if event.end_date.is_none() {
                report
                    .warnings
                    .push(format!("Event '{}' has no end_date", event.title));
            }
        }

        if !report.errors.is_empty() {
            Err(SeederError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
