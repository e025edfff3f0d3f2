use sqlx::PgPool;
use storage::{
    dto::{
        participation::TeamMemberInfo,
        team::{AddMemberRequest, CreateTeamRequest, TeamDetailResponse, UpdateTeamRequest},
    },
    error::Result,
    models::Team,
    repository::team::TeamRepository,
};
use uuid::Uuid;

/// Teams the user owns or belongs to
pub async fn list_my_teams(pool: &PgPool, user_id: Uuid) -> Result<Vec<TeamDetailResponse>> {
    let repo = TeamRepository::new(pool);
    repo.list_for_user(user_id).await
}

pub async fn get_team(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<TeamDetailResponse> {
    let repo = TeamRepository::new(pool);
    repo.find_detailed_for_member(team_id, user_id).await
}

pub async fn create_team(
    pool: &PgPool,
    owner_id: Uuid,
    request: &CreateTeamRequest,
) -> Result<TeamDetailResponse> {
    let repo = TeamRepository::new(pool);
    let team = repo.create(owner_id, request).await?;

    tracing::info!("User {} created team {}", owner_id, team.team.team_id);
    Ok(team)
}

pub async fn update_team(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    request: &UpdateTeamRequest,
) -> Result<Team> {
    let repo = TeamRepository::new(pool);
    repo.update(team_id, user_id, request).await
}

pub async fn delete_team(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<()> {
    let repo = TeamRepository::new(pool);
    repo.delete(team_id, user_id).await?;

    tracing::info!("User {} deleted team {}", user_id, team_id);
    Ok(())
}

pub async fn list_members(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<TeamMemberInfo>> {
    let repo = TeamRepository::new(pool);
    repo.members_for_member(team_id, user_id).await
}

pub async fn add_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    request: &AddMemberRequest,
) -> Result<TeamMemberInfo> {
    let repo = TeamRepository::new(pool);
    let member = repo.add_member(team_id, user_id, request).await?;

    tracing::info!("User {} joined team {}", member.user_id, team_id);
    Ok(member)
}

pub async fn remove_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    member_id: Uuid,
) -> Result<()> {
    let repo = TeamRepository::new(pool);
    repo.remove_member(team_id, user_id, member_id).await?;

    tracing::info!("Member {} removed from team {}", member_id, team_id);
    Ok(())
}
