use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    add_entry, approve_submission, clear_order, delete_submission, list_submissions, move_entry,
    reject_submission, reorder, update_value,
};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

/// Every management route requires an API key
pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/submissions/:id", delete(delete_submission))
        .route("/submissions/:id/approve", post(approve_submission))
        .route("/submissions/:id/reject", post(reject_submission))
        .route("/submissions/:id/value", put(update_value))
        .route("/:slug/submissions", get(list_submissions))
        .route("/:slug/entries", post(add_entry))
        .route("/:slug/order", put(reorder).delete(clear_order))
        .route("/:slug/order/move", post(move_entry))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
