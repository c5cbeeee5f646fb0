use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::metric::{MetricType, SortDirection, TimeGrammar};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Leaderboard {
    pub leaderboard_id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub unit: Option<String>,
    pub metric_type: MetricType,
    pub sort_direction: SortDirection,
    pub smart_time_parsing: bool,
    pub requires_verification: bool,
    pub auto_approve: bool,
    pub submissions_per_user: Option<i32>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Leaderboard {
    pub fn time_grammar(&self) -> TimeGrammar {
        TimeGrammar::from(self.smart_time_parsing)
    }

    /// Unit label shown next to values: the owner's free-text unit, or the metric name
    pub fn display_unit(&self) -> &str {
        self.unit
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.metric_type.as_str())
    }

    pub fn is_closed_at(&self, now: DateTime<Utc>) -> bool {
        self.submission_deadline.is_some_and(|deadline| now > deadline)
    }
}

/// Everything needed to insert a leaderboard; ids and timestamps are assigned by the store
#[derive(Debug, Clone)]
pub struct NewLeaderboard {
    pub owner_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub unit: Option<String>,
    pub metric_type: MetricType,
    pub sort_direction: SortDirection,
    pub smart_time_parsing: bool,
    pub requires_verification: bool,
    pub auto_approve: bool,
    pub submissions_per_user: Option<i32>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub end_date: Option<NaiveDate>,
}
