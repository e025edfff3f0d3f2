use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::participation::TeamMemberInfo;
use crate::dto::team::{AddMemberRequest, CreateTeamRequest, TeamDetailResponse, UpdateTeamRequest};
use crate::error::{Result, StorageError};
use crate::models::{MAX_TEAM_SIZE, Team, TeamMember, TeamRole};
use crate::repository::user::missing_user_ids;

/// Repository for Team and TeamMember database operations
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Teams the user owns or belongs to, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TeamDetailResponse>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT DISTINCT t.team_id, t.name, t.description, t.owner_id, t.rating, t.created_at
            FROM teams t
            LEFT JOIN team_members tm ON tm.team_id = t.team_id
            WHERE t.owner_id = $1 OR tm.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let team_ids: Vec<Uuid> = teams.iter().map(|team| team.team_id).collect();
        let mut conn = self.pool.acquire().await?;
        let mut rosters: HashMap<Uuid, Vec<TeamMemberInfo>> = HashMap::new();
        for member in fetch_member_infos(&mut conn, &team_ids).await? {
            rosters.entry(member.team_id).or_default().push(member);
        }

        Ok(teams
            .into_iter()
            .map(|team| TeamDetailResponse {
                members: rosters.remove(&team.team_id).unwrap_or_default(),
                team,
            })
            .collect())
    }

    pub async fn find_by_id(&self, team_id: Uuid) -> Result<Team> {
        let mut conn = self.pool.acquire().await?;
        fetch_team(&mut conn, team_id)
            .await?
            .ok_or(StorageError::TeamNotFound)
    }

    /// Team with roster, visible to its members only
    pub async fn find_detailed_for_member(
        &self,
        team_id: Uuid,
        requester_id: Uuid,
    ) -> Result<TeamDetailResponse> {
        let team = self.find_by_id(team_id).await?;
        let members = self.members_for_member(team_id, requester_id).await?;

        Ok(TeamDetailResponse { team, members })
    }

    /// Roster, visible to team members only
    pub async fn members_for_member(
        &self,
        team_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<TeamMemberInfo>> {
        let mut conn = self.pool.acquire().await?;
        if fetch_team(&mut conn, team_id).await?.is_none() {
            return Err(StorageError::TeamNotFound);
        }

        let members = fetch_member_infos(&mut conn, &[team_id]).await?;
        if !members.iter().any(|m| m.user_id == requester_id) {
            return Err(StorageError::NotAuthorized(
                "You do not have access to this team".to_string(),
            ));
        }

        Ok(members)
    }

    /// Create a team; the owner membership and any extra members are written
    /// in the same transaction
    pub async fn create(&self, owner_id: Uuid, req: &CreateTeamRequest) -> Result<TeamDetailResponse> {
        let mut member_ids: Vec<Uuid> = Vec::with_capacity(req.member_ids.len());
        for id in &req.member_ids {
            if *id != owner_id && !member_ids.contains(id) {
                member_ids.push(*id);
            }
        }
        if member_ids.len() + 1 > MAX_TEAM_SIZE {
            return Err(StorageError::Validation(format!(
                "A team can have at most {} members",
                MAX_TEAM_SIZE
            )));
        }

        let mut tx = self.pool.begin().await?;

        if !missing_user_ids(&mut tx, &member_ids).await?.is_empty() {
            return Err(StorageError::UserNotFound);
        }

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING team_id, name, description, owner_id, rating, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_foreign_key_violation() {
                StorageError::NotAuthenticated
            } else {
                err
            }
        })?;

        insert_member(&mut tx, team.team_id, owner_id, TeamRole::Owner).await?;
        for user_id in &member_ids {
            insert_member(&mut tx, team.team_id, *user_id, TeamRole::Member).await?;
        }

        let members = fetch_member_infos(&mut tx, &[team.team_id]).await?;
        tx.commit().await?;

        Ok(TeamDetailResponse { team, members })
    }

    /// Rename / re-describe a team; only the owner may do it
    pub async fn update(
        &self,
        team_id: Uuid,
        requester_id: Uuid,
        req: &UpdateTeamRequest,
    ) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = $3, description = $4
            WHERE team_id = $1 AND owner_id = $2
            RETURNING team_id, name, description, owner_id, rating, created_at
            "#,
        )
        .bind(team_id)
        .bind(requester_id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    /// Delete a team that is not registered for any active event
    pub async fn delete(&self, team_id: Uuid, requester_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        lock_owned_team(&mut tx, team_id, requester_id).await?;
        ensure_not_in_active_events(&mut tx, team_id, "delete a team").await?;

        sqlx::query("DELETE FROM teams WHERE team_id = $1")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Add a user, looked up by email, to a team owned by `requester_id`
    pub async fn add_member(
        &self,
        team_id: Uuid,
        requester_id: Uuid,
        req: &AddMemberRequest,
    ) -> Result<TeamMemberInfo> {
        let role = req.role.unwrap_or(TeamRole::Member);
        if role == TeamRole::Owner {
            return Err(StorageError::Validation(
                "A team can only have one owner".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        lock_owned_team(&mut tx, team_id, requester_id).await?;

        let members = fetch_team_members(&mut tx, team_id).await?;
        if members.len() >= MAX_TEAM_SIZE {
            return Err(StorageError::TeamFull(MAX_TEAM_SIZE));
        }

        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM users WHERE email = $1")
            .bind(req.email.trim().to_lowercase())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::UserNotFound)?;

        if members.iter().any(|m| m.user_id == user_id) {
            return Err(StorageError::AlreadyMember);
        }

        lock_registered_events(&mut tx, team_id).await?;
        ensure_not_in_active_events(&mut tx, team_id, "add a member").await?;
        ensure_no_member_conflict(&mut tx, team_id, user_id).await?;

        let member = insert_member(&mut tx, team_id, user_id, role)
            .await
            .map_err(|e| e.on_unique_violation(StorageError::AlreadyMember))?;

        let info = fetch_member_infos(&mut tx, &[team_id])
            .await?
            .into_iter()
            .find(|m| m.member_id == member.member_id)
            .ok_or(StorageError::NotFound)?;

        tx.commit().await?;
        Ok(info)
    }

    /// Remove a non-owner member from a team owned by `requester_id`
    pub async fn remove_member(
        &self,
        team_id: Uuid,
        requester_id: Uuid,
        member_id: Uuid,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        lock_owned_team(&mut tx, team_id, requester_id).await?;

        let member = fetch_team_members(&mut tx, team_id)
            .await?
            .into_iter()
            .find(|m| m.member_id == member_id)
            .ok_or(StorageError::NotFound)?;

        if member.role == TeamRole::Owner {
            return Err(StorageError::Validation(
                "The team owner cannot be removed".to_string(),
            ));
        }

        ensure_not_in_active_events(&mut tx, team_id, "remove a member").await?;

        sqlx::query("DELETE FROM team_members WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

pub(crate) async fn fetch_team(conn: &mut PgConnection, team_id: Uuid) -> Result<Option<Team>> {
    let team = sqlx::query_as::<_, Team>(
        r#"
        SELECT team_id, name, description, owner_id, rating, created_at
        FROM teams
        WHERE team_id = $1
        "#,
    )
    .bind(team_id)
    .fetch_optional(conn)
    .await?;

    Ok(team)
}

pub(crate) async fn fetch_team_members(
    conn: &mut PgConnection,
    team_id: Uuid,
) -> Result<Vec<TeamMember>> {
    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT member_id, team_id, user_id, role, joined_at
        FROM team_members
        WHERE team_id = $1
        ORDER BY joined_at ASC
        "#,
    )
    .bind(team_id)
    .fetch_all(conn)
    .await?;

    Ok(members)
}

/// Rosters of several teams joined with user profiles
pub(crate) async fn fetch_member_infos(
    conn: &mut PgConnection,
    team_ids: &[Uuid],
) -> Result<Vec<TeamMemberInfo>> {
    if team_ids.is_empty() {
        return Ok(Vec::new());
    }

    let members = sqlx::query_as::<_, TeamMemberInfo>(
        r#"
        SELECT tm.member_id, tm.team_id, tm.user_id, tm.role, u.name, u.email, tm.joined_at
        FROM team_members tm
        INNER JOIN users u ON u.user_id = tm.user_id
        WHERE tm.team_id = ANY($1)
        ORDER BY tm.joined_at ASC
        "#,
    )
    .bind(team_ids)
    .fetch_all(conn)
    .await?;

    Ok(members)
}

async fn insert_member(
    conn: &mut PgConnection,
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
) -> Result<TeamMember> {
    let member = sqlx::query_as::<_, TeamMember>(
        r#"
        INSERT INTO team_members (team_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING member_id, team_id, user_id, role, joined_at
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .bind(role)
    .fetch_one(conn)
    .await?;

    Ok(member)
}

/// Lock a team the requester owns; anything else reads as `NotFound`
async fn lock_owned_team(conn: &mut PgConnection, team_id: Uuid, owner_id: Uuid) -> Result<Team> {
    sqlx::query_as::<_, Team>(
        r#"
        SELECT team_id, name, description, owner_id, rating, created_at
        FROM teams
        WHERE team_id = $1 AND owner_id = $2
        FOR UPDATE
        "#,
    )
    .bind(team_id)
    .bind(owner_id)
    .fetch_optional(conn)
    .await?
    .ok_or(StorageError::NotFound)
}

async fn ensure_not_in_active_events(
    conn: &mut PgConnection,
    team_id: Uuid,
    action: &str,
) -> Result<()> {
    let titles = sqlx::query_scalar::<_, String>(
        r#"
        SELECT e.title
        FROM team_participations tp
        INNER JOIN fishing_events e ON e.event_id = tp.event_id
        WHERE tp.team_id = $1
          AND COALESCE(e.end_date, e.start_date) > NOW()
        ORDER BY e.start_date
        "#,
    )
    .bind(team_id)
    .fetch_all(conn)
    .await?;

    if titles.is_empty() {
        Ok(())
    } else {
        Err(StorageError::TeamBusy(format!(
            "Cannot {} while the team takes part in active events: {}",
            action,
            titles.join(", ")
        )))
    }
}

/// Lock every event the team is registered for, in id order.
///
/// Registrations take the same event locks, so a roster change and a
/// registration for a shared event cannot interleave.
async fn lock_registered_events(conn: &mut PgConnection, team_id: Uuid) -> Result<()> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT e.event_id
        FROM fishing_events e
        INNER JOIN team_participations tp ON tp.event_id = e.event_id
        WHERE tp.team_id = $1
        ORDER BY e.event_id
        FOR UPDATE OF e
        "#,
    )
    .bind(team_id)
    .fetch_all(conn)
    .await?;

    Ok(())
}

/// A user joining a team must not already take part in any event the team
/// is registered for, individually or through another team
async fn ensure_no_member_conflict(
    conn: &mut PgConnection,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<()> {
    let title = sqlx::query_scalar::<_, String>(
        r#"
        SELECT e.title
        FROM team_participations tp
        INNER JOIN fishing_events e ON e.event_id = tp.event_id
        WHERE tp.team_id = $1
          AND (
            EXISTS (
                SELECT 1 FROM fishing_participants fp
                WHERE fp.event_id = tp.event_id AND fp.user_id = $2
            )
            OR EXISTS (
                SELECT 1
                FROM team_participations other
                INNER JOIN team_members tm ON tm.team_id = other.team_id
                WHERE other.event_id = tp.event_id
                  AND other.team_id <> $1
                  AND tm.user_id = $2
            )
          )
        ORDER BY e.start_date
        LIMIT 1
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    match title {
        Some(title) => Err(StorageError::MemberConflict(format!(
            "User already takes part in \"{}\" through another registration",
            title
        ))),
        None => Ok(()),
    }
}
