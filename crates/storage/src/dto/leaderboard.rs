use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Leaderboard, MetricType, NewLeaderboard, SortDirection};
use crate::services::slug::generate_slug;

/// Request payload for creating a new leaderboard. The slug is derived from the title.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLeaderboardRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_sluggable"))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 5000))]
    pub rules: Option<String>,

    #[validate(length(max = 32))]
    pub unit: Option<String>,

    pub metric_type: MetricType,

    #[serde(default)]
    pub sort_direction: SortDirection,

    #[serde(default)]
    pub smart_time_parsing: bool,

    #[serde(default = "default_requires_verification")]
    pub requires_verification: bool,

    #[serde(default)]
    pub auto_approve: bool,

    #[validate(range(min = 1, message = "Submission limit must be at least 1"))]
    pub submissions_per_user: Option<i32>,

    pub submission_deadline: Option<DateTime<Utc>>,

    pub end_date: Option<NaiveDate>,
}

fn default_requires_verification() -> bool {
    true
}

/// Slugs that would shadow a fixed segment of the management routes
const RESERVED_SLUGS: &[&str] = &["submissions"];

fn validate_sluggable(title: &str) -> Result<(), validator::ValidationError> {
    let slug = generate_slug(title);
    if slug.is_empty() {
        Err(validator::ValidationError::new("invalid_title")
            .with_message("Title must contain at least one letter or digit".into()))
    } else if RESERVED_SLUGS.contains(&slug.as_str()) {
        Err(validator::ValidationError::new("reserved_title")
            .with_message("This title is reserved, please choose another one".into()))
    } else {
        Ok(())
    }
}

impl CreateLeaderboardRequest {
    pub fn into_new_leaderboard(self, owner_id: impl Into<String>) -> NewLeaderboard {
        NewLeaderboard {
            owner_id: owner_id.into(),
            slug: generate_slug(&self.title),
            title: self.title.trim().to_string(),
            description: self.description,
            rules: self.rules,
            unit: self.unit,
            metric_type: self.metric_type,
            sort_direction: self.sort_direction,
            smart_time_parsing: self.smart_time_parsing,
            requires_verification: self.requires_verification,
            auto_approve: self.auto_approve,
            submissions_per_user: self.submissions_per_user,
            submission_deadline: self.submission_deadline,
            end_date: self.end_date,
        }
    }
}

/// Public view of a leaderboard; owner identity is left out
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub unit: String,
    pub metric_type: MetricType,
    pub sort_direction: SortDirection,
    pub smart_time_parsing: bool,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&Leaderboard> for LeaderboardResponse {
    fn from(leaderboard: &Leaderboard) -> Self {
        Self {
            title: leaderboard.title.clone(),
            slug: leaderboard.slug.clone(),
            description: leaderboard.description.clone(),
            rules: leaderboard.rules.clone(),
            unit: leaderboard.display_unit().to_string(),
            metric_type: leaderboard.metric_type,
            sort_direction: leaderboard.sort_direction,
            smart_time_parsing: leaderboard.smart_time_parsing,
            submission_deadline: leaderboard.submission_deadline,
            end_date: leaderboard.end_date,
            created_at: leaderboard.created_at,
        }
    }
}
