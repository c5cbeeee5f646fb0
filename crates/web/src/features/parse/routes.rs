use axum::{routing::post, Router};

use super::handlers::preview_value;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(preview_value))
}
