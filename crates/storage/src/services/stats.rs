use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Leaderboard, Submission};
use crate::services::ranking::{rank_submissions, RankingMode};
use crate::services::value_parser::format_raw;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaderboardStats {
    pub total: usize,
    pub approved: usize,
    /// Share of approved submissions, 0-100
    pub approval_rate: u32,
    pub best_display: Option<String>,
    pub average_display: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Summary figures over every submission of a leaderboard.
/// Best, average and last update only consider approved entries.
pub fn compute_stats(leaderboard: &Leaderboard, submissions: &[Submission]) -> LeaderboardStats {
    let total = submissions.len();
    let approved: Vec<&Submission> = submissions.iter().filter(|s| s.is_approved()).collect();
    let approval_rate = rounded_div((approved.len() * 100) as i128, total.max(1) as i128) as u32;

    let best_display = rank_submissions(
        submissions,
        leaderboard.sort_direction,
        RankingMode::Automatic,
    )
    .into_iter()
    .next()
    .map(|ranked| ranked.submission.value_display);

    let average_display = (!approved.is_empty()).then(|| {
        let sum: i128 = approved.iter().map(|s| i128::from(s.value_raw)).sum();
        let average = rounded_div(sum, approved.len() as i128);
        format_raw(leaderboard.metric_type, average as i64)
    });

    let last_updated = approved
        .iter()
        .map(|s| s.approved_at.unwrap_or(s.submitted_at))
        .max();

    LeaderboardStats {
        total,
        approved: approved.len(),
        approval_rate,
        best_display,
        average_display,
        last_updated,
    }
}

/// Integer division rounding half away from zero; `divisor` must be positive
fn rounded_div(dividend: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if dividend >= 0 {
        (dividend + half) / divisor
    } else {
        (dividend - half) / divisor
    }
}
