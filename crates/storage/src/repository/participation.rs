use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::participation::{TeamMemberInfo, TeamParticipationDetail};
use crate::error::Result;
use crate::models::{FishingParticipant, TeamParticipation, User};
use crate::repository::team::fetch_member_infos;

#[derive(FromRow)]
struct TeamParticipationRow {
    participation_id: Uuid,
    team_id: Uuid,
    team_name: String,
    team_rating: i32,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

/// Read side of event registrations
pub struct ParticipationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Individual registrations in registration order
    pub async fn list_participants(&self, event_id: Uuid) -> Result<Vec<FishingParticipant>> {
        let participants = sqlx::query_as::<_, FishingParticipant>(
            r#"
            SELECT participant_id, event_id, user_id, name, contact, notes, created_at
            FROM fishing_participants
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    /// Registered teams in registration order, each with its roster
    pub async fn list_team_participations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<TeamParticipationDetail>> {
        let rows = sqlx::query_as::<_, TeamParticipationRow>(
            r#"
            SELECT tp.participation_id, tp.team_id, t.name AS team_name,
                   t.rating AS team_rating, tp.notes, tp.created_at
            FROM team_participations tp
            INNER JOIN teams t ON t.team_id = tp.team_id
            WHERE tp.event_id = $1
            ORDER BY tp.created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        let team_ids: Vec<Uuid> = rows.iter().map(|row| row.team_id).collect();
        let mut conn = self.pool.acquire().await?;
        let mut rosters: HashMap<Uuid, Vec<TeamMemberInfo>> = HashMap::new();
        for member in fetch_member_infos(&mut conn, &team_ids).await? {
            rosters.entry(member.team_id).or_default().push(member);
        }

        let details = rows
            .into_iter()
            .map(|row| TeamParticipationDetail {
                members: rosters.remove(&row.team_id).unwrap_or_default(),
                participation_id: row.participation_id,
                team_id: row.team_id,
                team_name: row.team_name,
                team_rating: row.team_rating,
                notes: row.notes,
                created_at: row.created_at,
            })
            .collect();

        Ok(details)
    }
}

pub(crate) async fn participant_exists(
    conn: &mut PgConnection,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM fishing_participants WHERE event_id = $1 AND user_id = $2)",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}

pub(crate) async fn count_participants(conn: &mut PgConnection, event_id: Uuid) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fishing_participants WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(conn)
            .await?;

    Ok(count)
}

pub(crate) async fn count_team_participations(
    conn: &mut PgConnection,
    event_id: Uuid,
) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM team_participations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(conn)
            .await?;

    Ok(count)
}

/// (individual, team) registration counts
pub(crate) async fn count_registrations(
    conn: &mut PgConnection,
    event_id: Uuid,
) -> Result<(i64, i64)> {
    let individuals = count_participants(&mut *conn, event_id).await?;
    let teams = count_team_participations(&mut *conn, event_id).await?;
    Ok((individuals, teams))
}

/// Insert a registration, snapshotting the user's name and email
pub(crate) async fn insert_participant(
    conn: &mut PgConnection,
    event_id: Uuid,
    user: &User,
    notes: Option<&str>,
) -> Result<FishingParticipant> {
    let participant = sqlx::query_as::<_, FishingParticipant>(
        r#"
        INSERT INTO fishing_participants (event_id, user_id, name, contact, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING participant_id, event_id, user_id, name, contact, notes, created_at
        "#,
    )
    .bind(event_id)
    .bind(user.user_id)
    .bind(user.display_name())
    .bind(&user.email)
    .bind(notes)
    .fetch_one(conn)
    .await?;

    Ok(participant)
}

pub(crate) async fn delete_participant(
    conn: &mut PgConnection,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM fishing_participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(conn)
            .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn team_participation_exists(
    conn: &mut PgConnection,
    event_id: Uuid,
    team_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM team_participations WHERE event_id = $1 AND team_id = $2)",
    )
    .bind(event_id)
    .bind(team_id)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}

pub(crate) async fn insert_team_participation(
    conn: &mut PgConnection,
    event_id: Uuid,
    team_id: Uuid,
    notes: Option<&str>,
) -> Result<TeamParticipation> {
    let participation = sqlx::query_as::<_, TeamParticipation>(
        r#"
        INSERT INTO team_participations (event_id, team_id, notes)
        VALUES ($1, $2, $3)
        RETURNING participation_id, event_id, team_id, notes, created_at
        "#,
    )
    .bind(event_id)
    .bind(team_id)
    .bind(notes)
    .fetch_one(conn)
    .await?;

    Ok(participation)
}

pub(crate) async fn delete_team_participation(
    conn: &mut PgConnection,
    event_id: Uuid,
    team_id: Uuid,
) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM team_participations WHERE event_id = $1 AND team_id = $2")
            .bind(event_id)
            .bind(team_id)
            .execute(conn)
            .await?;

    Ok(result.rows_affected())
}

/// Which of `user_ids` hold an individual registration for the event
pub(crate) async fn individually_registered_among(
    conn: &mut PgConnection,
    event_id: Uuid,
    user_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    let registered = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT user_id
        FROM fishing_participants
        WHERE event_id = $1 AND user_id = ANY($2)
        "#,
    )
    .bind(event_id)
    .bind(user_ids)
    .fetch_all(conn)
    .await?;

    Ok(registered)
}

/// Which of `user_ids` belong to a team other than `team_id` that is
/// registered for the event
pub(crate) async fn registered_in_other_teams(
    conn: &mut PgConnection,
    event_id: Uuid,
    team_id: Uuid,
    user_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    let registered = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT DISTINCT tm.user_id
        FROM team_participations tp
        INNER JOIN team_members tm ON tm.team_id = tp.team_id
        WHERE tp.event_id = $1
          AND tp.team_id <> $2
          AND tm.user_id = ANY($3)
        "#,
    )
    .bind(event_id)
    .bind(team_id)
    .bind(user_ids)
    .fetch_all(conn)
    .await?;

    Ok(registered)
}

/// Whether the user belongs to any team registered for the event
pub(crate) async fn in_registered_team(
    conn: &mut PgConnection,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM team_participations tp
            INNER JOIN team_members tm ON tm.team_id = tp.team_id
            WHERE tp.event_id = $1 AND tm.user_id = $2
        )
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(exists)
}
