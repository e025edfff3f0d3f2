use super::models::{EventData, Fixture, TeamData, UserData, normalize_email};
use crate::{Result, SeederError};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEMO_USER_EMAIL: &str = "test@example.com";

type Tx<'t> = Transaction<'t, Postgres>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: usize,
    pub teams: usize,
    pub events: usize,
}

/// Writes a validated fixture in one transaction. Loading the same fixture
/// twice leaves the database unchanged.
pub struct FixtureLoader<'a> {
    pool: &'a PgPool,
}

impl<'a> FixtureLoader<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn load(&self, fixture: &Fixture) -> Result<LoadSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = LoadSummary::default();
        let mut user_ids = HashMap::new();

        for user in &fixture.users {
            let user_id = self.upsert_user(user, &mut tx).await?;
            user_ids.insert(normalize_email(&user.email), user_id);
            summary.users += 1;
        }

        for team in &fixture.teams {
            if self.insert_team(team, &user_ids, &mut tx).await? {
                summary.teams += 1;
            }
        }

        for event in &fixture.events {
            if self.insert_event(event, &user_ids, &mut tx).await? {
                summary.events += 1;
            }
        }

        tx.commit().await?;

        info!(
            users = summary.users,
            teams = summary.teams,
            events = summary.events,
            "Fixture loaded"
        );
        Ok(summary)
    }

    async fn upsert_user(&self, user: &UserData, tx: &mut Tx<'_>) -> Result<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, name)
            VALUES ($1, $2)
            ON CONFLICT (email)
            DO UPDATE SET name = COALESCE(EXCLUDED.name, users.name)
            RETURNING user_id
            "#,
        )
        .bind(normalize_email(&user.email))
        .bind(&user.name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(user_id)
    }

    /// Returns false when the owner already has a team with this name
    async fn insert_team(
        &self,
        team: &TeamData,
        user_ids: &HashMap<String, Uuid>,
        tx: &mut Tx<'_>,
    ) -> Result<bool> {
        let owner_id = lookup(user_ids, &team.owner_email)?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT team_id FROM teams WHERE name = $1 AND owner_id = $2",
        )
        .bind(&team.name)
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?;

        if existing.is_some() {
            debug!("Team '{}' already exists, skipping", team.name);
            return Ok(false);
        }

        let team_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO teams (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING team_id
            "#,
        )
        .bind(&team.name)
        .bind(&team.description)
        .bind(owner_id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, 'owner')
            ON CONFLICT (team_id, user_id) DO NOTHING
            "#,
        )
        .bind(team_id)
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;

        for email in &team.member_emails {
            let member_id = lookup(user_ids, email)?;
            if member_id == owner_id {
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO team_members (team_id, user_id, role)
                VALUES ($1, $2, 'member')
                ON CONFLICT (team_id, user_id) DO NOTHING
                "#,
            )
            .bind(team_id)
            .bind(member_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(true)
    }

    /// Returns false when the owner already has an event with this title and start
    async fn insert_event(
        &self,
        event: &EventData,
        user_ids: &HashMap<String, Uuid>,
        tx: &mut Tx<'_>,
    ) -> Result<bool> {
        let owner_id = lookup(user_ids, &event.owner_email)?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT event_id FROM fishing_events
            WHERE title = $1 AND start_date = $2 AND owner_id = $3
            "#,
        )
        .bind(&event.title)
        .bind(event.start_date)
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?;

        if existing.is_some() {
            debug!("Event '{}' already exists, skipping", event.title);
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO fishing_events (
                title, description, latitude, longitude, start_date, end_date,
                fish_types, weather, format, max_participants, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.fish_types)
        .bind(&event.weather)
        .bind(event.format)
        .bind(event.max_participants)
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;

        Ok(true)
    }
}

fn lookup(user_ids: &HashMap<String, Uuid>, email: &str) -> Result<Uuid> {
    user_ids
        .get(&normalize_email(email))
        .copied()
        .ok_or_else(|| SeederError::LoadError(format!("Unknown user email: '{}'", email)))
}

/// Create the demo account used by local clients. Returns false if it
/// already existed.
pub async fn ensure_demo_user(pool: &PgPool) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, name)
        VALUES ($1, 'Test User')
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(DEMO_USER_EMAIL)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        info!("Created demo user {}", DEMO_USER_EMAIL);
    } else {
        debug!("Demo user {} already present", DEMO_USER_EMAIL);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let id = Uuid::new_v4();
        let ids = HashMap::from([("angler@example.com".to_string(), id)]);
        assert_eq!(lookup(&ids, " Angler@Example.COM ").unwrap(), id);
    }

    #[test]
    fn test_lookup_unknown_email() {
        let ids = HashMap::new();
        assert!(matches!(
            lookup(&ids, "ghost@example.com"),
            Err(SeederError::LoadError(_))
        ));
    }
}
