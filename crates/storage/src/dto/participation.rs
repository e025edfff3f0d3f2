use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::TeamRole;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterIndividualRequest {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterTeamRequest {
    pub team_id: Uuid,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnregisterTeamQuery {
    pub team_id: Uuid,
}

/// Team member joined with the user profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMemberInfo {
    pub member_id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: TeamRole,
    pub name: Option<String>,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

/// Registered team with its current roster
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamParticipationDetail {
    pub participation_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub team_rating: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub members: Vec<TeamMemberInfo>,
}
