use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        CreateLeaderboardRequest, CreateSubmissionRequest, LeaderboardResponse,
        PublicRankingEntry, RankingFilter, SubmissionReceipt,
    },
    models::Leaderboard,
    services::stats::LeaderboardStats,
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Owner;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/leaderboards",
    request_body = CreateLeaderboardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Leaderboard created successfully", body = Leaderboard),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A leaderboard with this slug already exists")
    ),
    tag = "leaderboards"
)]
pub async fn create_leaderboard(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Json(req): Json<CreateLeaderboardRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let leaderboard = services::create_leaderboard(&state, &owner.0, req).await?;

    Ok((StatusCode::CREATED, Json(leaderboard)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leaderboards/{slug}",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    responses(
        (status = 200, description = "Leaderboard found", body = LeaderboardResponse),
        (status = 404, description = "Leaderboard not found")
    ),
    tag = "leaderboards"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LeaderboardResponse>, WebError> {
    let leaderboard = services::get_leaderboard(&state, &slug).await?;

    Ok(Json(LeaderboardResponse::from(&leaderboard)))
}

#[utoipa::path(
    get,
    path = "/api/leaderboards/{slug}/rankings",
    params(
        ("slug" = String, Path, description = "Leaderboard slug"),
        RankingFilter
    ),
    responses(
        (status = 200, description = "Approved entries in ranking order", body = Vec<PublicRankingEntry>),
        (status = 404, description = "Leaderboard not found")
    ),
    tag = "leaderboards"
)]
pub async fn get_rankings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(filter): Query<RankingFilter>,
) -> Result<Json<Vec<PublicRankingEntry>>, WebError> {
    let entries = services::get_rankings(&state, &slug, filter.gender).await?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/leaderboards/{slug}/stats",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    responses(
        (status = 200, description = "Leaderboard statistics", body = LeaderboardStats),
        (status = 404, description = "Leaderboard not found")
    ),
    tag = "leaderboards"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LeaderboardStats>, WebError> {
    let stats = services::get_stats(&state, &slug).await?;

    Ok(Json(stats))
}

#[utoipa::path(
    post,
    path = "/api/leaderboards/{slug}/submissions",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission received", body = SubmissionReceipt),
        (status = 400, description = "Validation error or unreadable value"),
        (status = 403, description = "Submissions are closed"),
        (status = 404, description = "Leaderboard not found"),
        (status = 409, description = "Submission limit reached")
    ),
    tag = "leaderboards"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let submission = services::submit(&state, &slug, &req).await?;

    let receipt = SubmissionReceipt {
        submission_id: submission.submission_id,
        status: submission.status,
        value_display: submission.value_display,
        submitted_at: submission.submitted_at,
    };

    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}
