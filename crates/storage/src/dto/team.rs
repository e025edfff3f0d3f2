use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::participation::TeamMemberInfo;
use crate::models::{Team, TeamRole};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 255, message = "Team name is required"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Users joining as plain members, besides the owner
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255, message = "Team name cannot be empty"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddMemberRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    /// `member` when omitted; `owner` is not accepted
    pub role: Option<TeamRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDetailResponse {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMemberInfo>,
}
