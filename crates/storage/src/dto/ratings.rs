use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::PaginationParams;

/// Ordering of rating lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RatingSort {
    /// Newest first
    #[default]
    Recent,
    /// Highest rating first, newest first among equal ratings
    Rating,
}

impl RatingSort {
    pub fn as_order_by(&self) -> &'static str {
        match self {
            Self::Recent => "created_at DESC",
            Self::Rating => "rating DESC, created_at DESC",
        }
    }
}

// Not flattened: serde_urlencoded cannot parse numbers inside flattened structs
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RatingListFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort: RatingSort,
}

fn default_page() -> u32 {
    PaginationParams::default().page
}

fn default_limit() -> u32 {
    PaginationParams::default().limit
}

impl RatingListFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserRatingEntry {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamRatingEntry {
    pub team_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub rating: i32,
    pub owner_id: Uuid,
    pub owner_name: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of replaying the rating ledgers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RatingRebuildSummary {
    pub users_updated: u64,
    pub teams_updated: u64,
}
