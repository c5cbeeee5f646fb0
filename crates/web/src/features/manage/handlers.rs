use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use storage::{
    dto::{
        ManualEntryRequest, MoveRequest, RejectRequest, ReorderRequest, SubmissionFilter,
        UpdateValueRequest,
    },
    models::Submission,
    services::{moderation::OwnerListing, reorder::RankAssignment},
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Owner;
use crate::state::AppState;

use super::services;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedOrder {
    pub cleared: usize,
}

#[utoipa::path(
    get,
    path = "/api/manage/{slug}/submissions",
    params(
        ("slug" = String, Path, description = "Leaderboard slug"),
        SubmissionFilter
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Approved entries in owner order plus the moderation queue", body = OwnerListing),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leaderboard not found")
    ),
    tag = "manage"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(slug): Path<String>,
    Query(filter): Query<SubmissionFilter>,
) -> Result<Json<OwnerListing>, WebError> {
    let listing = services::list_submissions(&state, &owner, &slug, &filter).await?;

    Ok(Json(listing))
}

#[utoipa::path(
    post,
    path = "/api/manage/{slug}/entries",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    request_body = ManualEntryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Manual entry added", body = Submission),
        (status = 400, description = "Validation error or unreadable value"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leaderboard not found")
    ),
    tag = "manage"
)]
pub async fn add_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(slug): Path<String>,
    Json(req): Json<ManualEntryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let submission = services::add_entry(&state, &owner, &slug, &req).await?;

    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/manage/submissions/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Submission id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Submission approved", body = Submission),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found"),
        (status = 409, description = "Submission was already moderated")
    ),
    tag = "manage"
)]
pub async fn approve_submission(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, WebError> {
    let submission = services::approve(&state, &owner, id).await?;

    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/manage/submissions/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Submission id")
    ),
    request_body = RejectRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Submission rejected", body = Submission),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found"),
        (status = 409, description = "Submission was already moderated")
    ),
    tag = "manage"
)]
pub async fn reject_submission(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<Submission>, WebError> {
    req.validate()?;

    let submission = services::reject(&state, &owner, id, req.reason).await?;

    Ok(Json(submission))
}

#[utoipa::path(
    put,
    path = "/api/manage/submissions/{id}/value",
    params(
        ("id" = Uuid, Path, description = "Submission id")
    ),
    request_body = UpdateValueRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Value re-parsed and saved", body = Submission),
        (status = 400, description = "Unreadable value"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "manage"
)]
pub async fn update_value(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateValueRequest>,
) -> Result<Json<Submission>, WebError> {
    req.validate()?;

    let submission = services::update_value(&state, &owner, id, &req.value).await?;

    Ok(Json(submission))
}

#[utoipa::path(
    delete,
    path = "/api/manage/submissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Submission id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "manage"
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_submission(&state, &owner, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    put,
    path = "/api/manage/{slug}/order",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    request_body = ReorderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Manual order saved", body = Vec<RankAssignment>),
        (status = 400, description = "Order references unknown or unapproved entries"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leaderboard not found"),
        (status = 409, description = "Another reorder is running, or the save was interrupted")
    ),
    tag = "manage"
)]
pub async fn reorder(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(slug): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<RankAssignment>>, WebError> {
    req.validate()?;

    let assignments = services::reorder(&state, &owner, &slug, &req.ordered_ids).await?;

    Ok(Json(assignments))
}

#[utoipa::path(
    post,
    path = "/api/manage/{slug}/order/move",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    request_body = MoveRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entry moved and the new order saved", body = Vec<RankAssignment>),
        (status = 400, description = "Position out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leaderboard not found"),
        (status = 409, description = "Another reorder is running, or the save was interrupted")
    ),
    tag = "manage"
)]
pub async fn move_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(slug): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Vec<RankAssignment>>, WebError> {
    let assignments = services::move_entry(&state, &owner, &slug, req).await?;

    Ok(Json(assignments))
}

#[utoipa::path(
    delete,
    path = "/api/manage/{slug}/order",
    params(
        ("slug" = String, Path, description = "Leaderboard slug")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Manual ranks cleared", body = ClearedOrder),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leaderboard not found"),
        (status = 409, description = "Another reorder is running, or the save was interrupted")
    ),
    tag = "manage"
)]
pub async fn clear_order(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(slug): Path<String>,
) -> Result<Json<ClearedOrder>, WebError> {
    let cleared = services::clear_order(&state, &owner, &slug).await?;

    Ok(Json(ClearedOrder { cleared }))
}
