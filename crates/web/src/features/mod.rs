use axum::Router;

use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

pub mod leaderboards;
pub mod manage;
pub mod parse;

pub fn api_router(state: AppState, api_keys: ApiKeys) -> Router {
    Router::new()
        .nest("/api/parse", parse::routes::routes())
        .nest(
            "/api/leaderboards",
            leaderboards::routes::routes(api_keys.clone()),
        )
        .nest("/api/manage", manage::routes::routes(api_keys))
        .with_state(state)
}
