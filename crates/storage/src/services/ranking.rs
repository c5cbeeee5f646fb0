//! Orders approved submissions and assigns ranks.
//!
//! Two modes exist and are never mixed in one view: automatic ordering for
//! public pages, manual-override ordering for the owner's management page.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{SortDirection, Submission};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Value order with competition ranking (`[10, 10, 12]` ranks `[1, 1, 3]`)
    #[default]
    Automatic,
    /// Owner-assigned `manual_rank` first, automatic order for the rest.
    /// Ranks are plain positions.
    ManualOverride,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedSubmission {
    pub rank: u32,
    #[serde(flatten)]
    pub submission: Submission,
}

/// Rank the approved entries of `submissions`. Non-approved entries are skipped
/// and the input is left untouched.
pub fn rank_submissions(
    submissions: &[Submission],
    sort_direction: SortDirection,
    mode: RankingMode,
) -> Vec<RankedSubmission> {
    let mut eligible: Vec<&Submission> = submissions.iter().filter(|s| s.is_approved()).collect();

    match mode {
        RankingMode::Automatic => {
            eligible.sort_by(|a, b| automatic_order(a, b, sort_direction));
            assign_competition_ranks(&eligible)
        }
        RankingMode::ManualOverride => {
            eligible.sort_by(|a, b| {
                manual_rank_order(a, b).then_with(|| automatic_order(a, b, sort_direction))
            });
            eligible
                .into_iter()
                .zip(1u32..)
                .map(|(submission, rank)| RankedSubmission {
                    rank,
                    submission: submission.clone(),
                })
                .collect()
        }
    }
}

/// Value in sort direction, then earliest approval (unapproved last), then
/// earliest submission, then id so the result never depends on fetch order.
pub fn automatic_order(a: &Submission, b: &Submission, sort_direction: SortDirection) -> Ordering {
    let by_value = match sort_direction {
        SortDirection::Asc => a.value_raw.cmp(&b.value_raw),
        SortDirection::Desc => b.value_raw.cmp(&a.value_raw),
    };

    by_value
        .then_with(|| match (a.approved_at, b.approved_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        .then_with(|| a.submission_id.cmp(&b.submission_id))
}

fn manual_rank_order(a: &Submission, b: &Submission) -> Ordering {
    match (a.manual_rank, b.manual_rank) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn assign_competition_ranks(sorted: &[&Submission]) -> Vec<RankedSubmission> {
    let mut ranked = Vec::with_capacity(sorted.len());
    let mut last_value = None;
    let mut current_rank = 0u32;

    for (position, submission) in (1u32..).zip(sorted) {
        if last_value != Some(submission.value_raw) {
            current_rank = position;
            last_value = Some(submission.value_raw);
        }
        ranked.push(RankedSubmission {
            rank: current_rank,
            submission: (*submission).clone(),
        });
    }

    ranked
}
