use chrono::Utc;
use storage::{
    dto::{ManualEntryRequest, MoveRequest, SubmissionFilter},
    models::{Leaderboard, Submission},
    services::{
        moderation::{self, OwnerListing},
        reorder::{self, RankAssignment},
    },
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::Owner;
use crate::state::AppState;

/// A leaderboard the caller owns. Other owners' boards look absent.
pub async fn owned_leaderboard(state: &AppState, owner: &Owner, slug: &str) -> WebResult<Leaderboard> {
    let leaderboard = state.leaderboards.find_leaderboard_by_slug(slug).await?;
    ensure_owner(&leaderboard, owner)?;
    Ok(leaderboard)
}

async fn owned_submission(state: &AppState, owner: &Owner, submission_id: Uuid) -> WebResult<Submission> {
    let submission = state.submissions.find_submission(submission_id).await?;
    let leaderboard = state
        .leaderboards
        .find_leaderboard(submission.leaderboard_id)
        .await?;
    ensure_owner(&leaderboard, owner)?;
    Ok(submission)
}

fn ensure_owner(leaderboard: &Leaderboard, owner: &Owner) -> WebResult<()> {
    if leaderboard.owner_id == owner.0 {
        Ok(())
    } else {
        tracing::warn!(
            "Owner {} tried to manage leaderboard {}",
            owner.0,
            leaderboard.slug
        );
        Err(WebError::NotFound)
    }
}

pub async fn list_submissions(
    state: &AppState,
    owner: &Owner,
    slug: &str,
    filter: &SubmissionFilter,
) -> WebResult<OwnerListing> {
    let leaderboard = owned_leaderboard(state, owner, slug).await?;
    let submissions = state
        .submissions
        .fetch_submissions(leaderboard.leaderboard_id)
        .await?;

    let visible = moderation::filter_submissions(&submissions, filter);
    Ok(moderation::owner_listing(&leaderboard, &visible))
}

pub async fn add_entry(
    state: &AppState,
    owner: &Owner,
    slug: &str,
    req: &ManualEntryRequest,
) -> WebResult<Submission> {
    let leaderboard = owned_leaderboard(state, owner, slug).await?;
    let submission =
        moderation::add_manual_entry(state.submissions.as_ref(), &leaderboard, req, Utc::now())
            .await?;
    Ok(submission)
}

pub async fn approve(state: &AppState, owner: &Owner, submission_id: Uuid) -> WebResult<Submission> {
    owned_submission(state, owner, submission_id).await?;
    let submission = moderation::approve(
        state.submissions.as_ref(),
        submission_id,
        Some(owner.0.clone()),
        Utc::now(),
    )
    .await?;
    Ok(submission)
}

pub async fn reject(
    state: &AppState,
    owner: &Owner,
    submission_id: Uuid,
    reason: Option<String>,
) -> WebResult<Submission> {
    owned_submission(state, owner, submission_id).await?;
    let submission = moderation::reject(
        state.submissions.as_ref(),
        submission_id,
        reason,
        Some(owner.0.clone()),
    )
    .await?;
    Ok(submission)
}

pub async fn update_value(
    state: &AppState,
    owner: &Owner,
    submission_id: Uuid,
    value: &str,
) -> WebResult<Submission> {
    owned_submission(state, owner, submission_id).await?;
    let submission = moderation::update_value(
        state.submissions.as_ref(),
        state.leaderboards.as_ref(),
        submission_id,
        value,
    )
    .await?;
    Ok(submission)
}

pub async fn delete_submission(state: &AppState, owner: &Owner, submission_id: Uuid) -> WebResult<()> {
    owned_submission(state, owner, submission_id).await?;
    state.submissions.delete_submission(submission_id).await?;

    tracing::info!("Submission {} deleted by {}", submission_id, owner.0);
    Ok(())
}

pub async fn reorder(
    state: &AppState,
    owner: &Owner,
    slug: &str,
    ordered_ids: &[Uuid],
) -> WebResult<Vec<RankAssignment>> {
    let leaderboard = owned_leaderboard(state, owner, slug).await?;
    let assignments = reorder::apply_reorder(
        state.submissions.as_ref(),
        &state.reorder_locks,
        leaderboard.leaderboard_id,
        ordered_ids,
    )
    .await?;
    Ok(assignments)
}

pub async fn move_entry(
    state: &AppState,
    owner: &Owner,
    slug: &str,
    req: MoveRequest,
) -> WebResult<Vec<RankAssignment>> {
    let leaderboard = owned_leaderboard(state, owner, slug).await?;
    let assignments = reorder::apply_move(
        state.submissions.as_ref(),
        &state.reorder_locks,
        &leaderboard,
        req.search.as_deref(),
        req.from,
        req.to,
    )
    .await?;
    Ok(assignments)
}

pub async fn clear_order(state: &AppState, owner: &Owner, slug: &str) -> WebResult<usize> {
    let leaderboard = owned_leaderboard(state, owner, slug).await?;
    let cleared = reorder::clear_manual_ranks(
        state.submissions.as_ref(),
        &state.reorder_locks,
        leaderboard.leaderboard_id,
    )
    .await?;
    Ok(cleared)
}
