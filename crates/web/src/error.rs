use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use storage::models::LifecycleError;
use storage::services::moderation::SubmissionError;
use storage::services::reorder::ReorderError;
use storage::services::ParseError;
use validator::ValidationErrors;

const RELOAD_MESSAGE: &str = "The order could not be saved completely. Reload and try again.";

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    Parse(ParseError),
    BadRequest(String),
    Conflict(String),
    Forbidden(String),
    Unauthorized,
    NotFound,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Parse(e) => write!(f, "Invalid value: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::NotFound => write!(f, "Resource not found"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Parse(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
        };

        let body = match &self {
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::Parse(e) => {
                json!({
                    "error": e.message,
                    "kind": e.kind
                })
            }
            Self::BadRequest(msg) | Self::Conflict(msg) | Self::Forbidden(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<ParseError> for WebError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<LifecycleError> for WebError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::InvalidManualRank(_) => Self::BadRequest(error.to_string()),
            LifecycleError::AlreadyModerated(_) | LifecycleError::NotApproved => {
                Self::Conflict(error.to_string())
            }
        }
    }
}

impl From<SubmissionError> for WebError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Parse(e) => Self::Parse(e),
            SubmissionError::DeadlinePassed => Self::Forbidden(error.to_string()),
            SubmissionError::LimitReached(_) => Self::Conflict(error.to_string()),
            SubmissionError::Lifecycle(e) => e.into(),
            SubmissionError::Storage(e) => Self::Storage(e),
        }
    }
}

impl From<ReorderError> for WebError {
    fn from(error: ReorderError) -> Self {
        match error {
            ReorderError::Storage(e) => Self::Storage(e),
            ReorderError::InProgress => {
                tracing::warn!("Rejected concurrent reorder");
                Self::Conflict(error.to_string())
            }
            ReorderError::Persistence { .. } => Self::Conflict(RELOAD_MESSAGE.to_string()),
            ReorderError::IndexOutOfRange { .. }
            | ReorderError::UnknownSubmission(_)
            | ReorderError::NotApproved(_)
            | ReorderError::DuplicateSubmission(_) => Self::BadRequest(error.to_string()),
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (WebError::from(StorageError::NotFound), StatusCode::NOT_FOUND),
            (
                WebError::from(StorageError::ConstraintViolation("taken".into())),
                StatusCode::CONFLICT,
            ),
            (
                WebError::from(ParseError::invalid_value("Time must be greater than 0")),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::from(SubmissionError::DeadlinePassed),
                StatusCode::FORBIDDEN,
            ),
            (
                WebError::from(SubmissionError::LimitReached(1)),
                StatusCode::CONFLICT,
            ),
            (WebError::from(ReorderError::InProgress), StatusCode::CONFLICT),
            (
                WebError::from(ReorderError::Persistence {
                    submission_id: Uuid::nil(),
                    applied: 2,
                    source: StorageError::NotFound,
                }),
                StatusCode::CONFLICT,
            ),
            (
                WebError::from(ReorderError::IndexOutOfRange { index: 3, len: 2 }),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
