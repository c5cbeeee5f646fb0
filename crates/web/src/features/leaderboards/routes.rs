use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_leaderboard, create_submission, get_leaderboard, get_rankings, get_stats,
};
use crate::middleware::auth::{require_auth, ApiKeys};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_leaderboard))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:slug", get(get_leaderboard))
        .route("/:slug/rankings", get(get_rankings))
        .route("/:slug/stats", get(get_stats))
        .route("/:slug/submissions", post(create_submission))
        .merge(protected)
}
