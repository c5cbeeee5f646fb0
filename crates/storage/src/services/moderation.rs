//! Submission intake and the owner's moderation actions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{CreateSubmissionRequest, ManualEntryRequest, SubmissionFilter};
use crate::error::StorageError;
use crate::models::{
    Gender, Leaderboard, LifecycleError, Moderation, NewSubmission, Submission, SubmissionStatus,
};
use crate::repository::{LeaderboardStore, SubmissionStore};
use crate::services::ranking::{rank_submissions, RankedSubmission, RankingMode};
use crate::services::value_parser::{parse_value, ParseError, ParsedValue};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Submissions for this leaderboard are closed")]
    DeadlinePassed,

    #[error("You have reached the limit of {0} submissions for this leaderboard")]
    LimitReached(i32),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Whether new public submissions skip the moderation queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPolicy {
    pub auto_approve: bool,
}

impl From<&Leaderboard> for SubmissionPolicy {
    fn from(leaderboard: &Leaderboard) -> Self {
        Self {
            auto_approve: !leaderboard.requires_verification || leaderboard.auto_approve,
        }
    }
}

impl SubmissionPolicy {
    pub fn initial_status(&self) -> SubmissionStatus {
        if self.auto_approve {
            SubmissionStatus::Approved
        } else {
            SubmissionStatus::Pending
        }
    }
}

/// Owner view: approved entries in manual-override order, the rest newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerListing {
    pub ranked: Vec<RankedSubmission>,
    pub unranked: Vec<Submission>,
}

/// Parse and validate a public submission against the leaderboard's rules.
/// Does not touch storage; the per-user limit is checked by [`submit`].
pub fn prepare_submission(
    leaderboard: &Leaderboard,
    request: &CreateSubmissionRequest,
    now: DateTime<Utc>,
) -> Result<NewSubmission> {
    if leaderboard.is_closed_at(now) {
        return Err(SubmissionError::DeadlinePassed);
    }

    let parsed = parse_for(leaderboard, &request.value)?;
    let status = SubmissionPolicy::from(leaderboard).initial_status();

    Ok(NewSubmission {
        leaderboard_id: leaderboard.leaderboard_id,
        full_name: request.full_name.trim().to_string(),
        email: request.email.trim().to_string(),
        gender: request.gender,
        value_raw: parsed.value_raw,
        value_display: parsed.value_display,
        status,
        proof_url: non_blank(request.proof_url.as_deref()),
        video_url: non_blank(request.video_url.as_deref()),
        is_manual_entry: false,
        original_input: Some(request.value.clone()),
        submitted_at: now,
        approved_at: (status == SubmissionStatus::Approved).then_some(now),
    })
}

pub async fn submit(
    store: &dyn SubmissionStore,
    leaderboard: &Leaderboard,
    request: &CreateSubmissionRequest,
    now: DateTime<Utc>,
) -> Result<Submission> {
    let record = prepare_submission(leaderboard, request, now)?;

    if let Some(limit) = leaderboard.submissions_per_user {
        let existing = store
            .count_submissions_by_email(leaderboard.leaderboard_id, &record.email)
            .await?;
        if existing >= i64::from(limit) {
            return Err(SubmissionError::LimitReached(limit));
        }
    }

    let submission = store.insert_submission(record).await?;
    tracing::info!(
        "Submission {} created on leaderboard {} as {:?}",
        submission.submission_id,
        leaderboard.slug,
        submission.status
    );
    Ok(submission)
}

pub async fn approve(
    store: &dyn SubmissionStore,
    submission_id: Uuid,
    moderated_by: Option<String>,
    now: DateTime<Utc>,
) -> Result<Submission> {
    let submission = store.find_submission(submission_id).await?;
    let moderation = submission.approve(moderated_by, now)?;
    let updated = set_pending_status(store, submission_id, &moderation).await?;

    tracing::info!("Submission {} approved", submission_id);
    Ok(updated)
}

pub async fn reject(
    store: &dyn SubmissionStore,
    submission_id: Uuid,
    reason: Option<String>,
    moderated_by: Option<String>,
) -> Result<Submission> {
    let submission = store.find_submission(submission_id).await?;
    let moderation = submission.reject(reason, moderated_by)?;
    let updated = set_pending_status(store, submission_id, &moderation).await?;

    tracing::info!("Submission {} rejected", submission_id);
    Ok(updated)
}

/// Owner-entered result. Skips the public checks and is approved immediately.
pub async fn add_manual_entry(
    store: &dyn SubmissionStore,
    leaderboard: &Leaderboard,
    request: &ManualEntryRequest,
    now: DateTime<Utc>,
) -> Result<Submission> {
    let parsed = parse_for(leaderboard, &request.value)?;

    let record = NewSubmission {
        leaderboard_id: leaderboard.leaderboard_id,
        full_name: request.full_name.trim().to_string(),
        email: request.email.trim().to_string(),
        gender: request.gender,
        value_raw: parsed.value_raw,
        value_display: parsed.value_display,
        status: SubmissionStatus::Approved,
        proof_url: None,
        video_url: None,
        is_manual_entry: true,
        original_input: Some(request.value.clone()),
        submitted_at: now,
        approved_at: Some(now),
    };

    let submission = store.insert_submission(record).await?;
    tracing::info!(
        "Manual entry {} added to leaderboard {}",
        submission.submission_id,
        leaderboard.slug
    );
    Ok(submission)
}

/// Re-parse an edited value with the owning leaderboard's metric and grammar
pub async fn update_value(
    submissions: &dyn SubmissionStore,
    leaderboards: &dyn LeaderboardStore,
    submission_id: Uuid,
    input: &str,
) -> Result<Submission> {
    let submission = submissions.find_submission(submission_id).await?;
    let leaderboard = leaderboards
        .find_leaderboard(submission.leaderboard_id)
        .await?;

    let parsed = parse_for(&leaderboard, input)?;
    let updated = submissions
        .update_value(submission_id, &parsed, input)
        .await?;

    tracing::info!(
        "Submission {} value changed to {}",
        submission_id,
        updated.value_display
    );
    Ok(updated)
}

/// Status filter plus case-insensitive search over name and email
pub fn filter_submissions(submissions: &[Submission], filter: &SubmissionFilter) -> Vec<Submission> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    submissions
        .iter()
        .filter(|s| filter.status.is_none_or(|status| s.status == status))
        .filter(|s| match &needle {
            Some(needle) => {
                s.full_name.to_lowercase().contains(needle.as_str())
                    || s.email.to_lowercase().contains(needle.as_str())
            }
            None => true,
        })
        .cloned()
        .collect()
}

pub fn owner_listing(leaderboard: &Leaderboard, submissions: &[Submission]) -> OwnerListing {
    let ranked = rank_submissions(
        submissions,
        leaderboard.sort_direction,
        RankingMode::ManualOverride,
    );

    let mut unranked: Vec<Submission> = submissions
        .iter()
        .filter(|s| !s.is_approved())
        .cloned()
        .collect();
    unranked.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    OwnerListing { ranked, unranked }
}

/// Approved entries in public order, optionally restricted to one gender
pub fn public_ranking(
    leaderboard: &Leaderboard,
    approved: &[Submission],
    gender: Option<Gender>,
) -> Vec<RankedSubmission> {
    let visible: Vec<Submission> = approved
        .iter()
        .filter(|s| gender.is_none_or(|g| s.gender == g))
        .cloned()
        .collect();

    rank_submissions(&visible, leaderboard.sort_direction, RankingMode::Automatic)
}

/// The status write only matches pending rows. A miss on a row that still
/// exists means another moderator got there first.
async fn set_pending_status(
    store: &dyn SubmissionStore,
    submission_id: Uuid,
    moderation: &Moderation,
) -> Result<Submission> {
    match store.set_status(submission_id, moderation).await {
        Ok(updated) => Ok(updated),
        Err(StorageError::NotFound) => {
            let current = store.find_submission(submission_id).await?;
            tracing::warn!(
                "Submission {} was moderated concurrently, now {:?}",
                submission_id,
                current.status
            );
            Err(LifecycleError::AlreadyModerated(current.status).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_for(leaderboard: &Leaderboard, input: &str) -> std::result::Result<ParsedValue, ParseError> {
    parse_value(leaderboard.metric_type, input, leaderboard.time_grammar())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
