use axum::Json;
use storage::dto::ParsePreviewRequest;
use storage::services::{ParsedValue, parse_value};

use crate::error::WebError;

#[utoipa::path(
    post,
    path = "/api/parse",
    request_body = ParsePreviewRequest,
    responses(
        (status = 200, description = "Value parsed into its canonical form", body = ParsedValue),
        (status = 400, description = "Value cannot be read for this metric")
    ),
    tag = "parse"
)]
pub async fn preview_value(
    Json(req): Json<ParsePreviewRequest>,
) -> Result<Json<ParsedValue>, WebError> {
    let parsed = parse_value(req.metric_type, &req.value, req.grammar)?;

    Ok(Json(parsed))
}
