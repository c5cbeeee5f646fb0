use chrono::Utc;
use storage::{
    dto::{CreateLeaderboardRequest, CreateSubmissionRequest, PublicRankingEntry},
    models::{Gender, Leaderboard, Submission},
    services::{
        moderation::{self, SubmissionError},
        stats::{compute_stats, LeaderboardStats},
    },
};

use crate::error::WebResult;
use crate::state::AppState;

pub async fn create_leaderboard(
    state: &AppState,
    owner_id: &str,
    req: CreateLeaderboardRequest,
) -> WebResult<Leaderboard> {
    let leaderboard = state
        .leaderboards
        .create_leaderboard(req.into_new_leaderboard(owner_id))
        .await?;

    tracing::info!(
        "Leaderboard {} created by {}",
        leaderboard.slug,
        leaderboard.owner_id
    );
    Ok(leaderboard)
}

pub async fn get_leaderboard(state: &AppState, slug: &str) -> WebResult<Leaderboard> {
    Ok(state.leaderboards.find_leaderboard_by_slug(slug).await?)
}

/// Public ranking: automatic order, short names only
pub async fn get_rankings(
    state: &AppState,
    slug: &str,
    gender: Option<Gender>,
) -> WebResult<Vec<PublicRankingEntry>> {
    let leaderboard = get_leaderboard(state, slug).await?;
    let approved = state
        .submissions
        .fetch_approved_submissions(leaderboard.leaderboard_id)
        .await?;

    Ok(moderation::public_ranking(&leaderboard, &approved, gender)
        .into_iter()
        .map(PublicRankingEntry::from)
        .collect())
}

pub async fn get_stats(state: &AppState, slug: &str) -> WebResult<LeaderboardStats> {
    let leaderboard = get_leaderboard(state, slug).await?;
    let submissions = state
        .submissions
        .fetch_submissions(leaderboard.leaderboard_id)
        .await?;

    Ok(compute_stats(&leaderboard, &submissions))
}

pub async fn submit(
    state: &AppState,
    slug: &str,
    req: &CreateSubmissionRequest,
) -> Result<Submission, SubmissionError> {
    let leaderboard = state.leaderboards.find_leaderboard_by_slug(slug).await?;
    moderation::submit(state.submissions.as_ref(), &leaderboard, req, Utc::now()).await
}
