use anyhow::Context;
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use features::{leaderboards, manage, parse};
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        parse::handlers::preview_value,
        leaderboards::handlers::create_leaderboard,
        leaderboards::handlers::get_leaderboard,
        leaderboards::handlers::get_rankings,
        leaderboards::handlers::get_stats,
        leaderboards::handlers::create_submission,
        manage::handlers::list_submissions,
        manage::handlers::add_entry,
        manage::handlers::approve_submission,
        manage::handlers::reject_submission,
        manage::handlers::update_value,
        manage::handlers::delete_submission,
        manage::handlers::reorder,
        manage::handlers::move_entry,
        manage::handlers::clear_order,
    ),
    components(
        schemas(
            storage::dto::CreateLeaderboardRequest,
            storage::dto::LeaderboardResponse,
            storage::dto::CreateSubmissionRequest,
            storage::dto::SubmissionReceipt,
            storage::dto::ManualEntryRequest,
            storage::dto::UpdateValueRequest,
            storage::dto::RejectRequest,
            storage::dto::ParsePreviewRequest,
            storage::dto::PublicRankingEntry,
            storage::dto::ReorderRequest,
            storage::dto::MoveRequest,
            storage::models::Leaderboard,
            storage::models::Submission,
            storage::models::SubmissionStatus,
            storage::models::Gender,
            storage::models::MetricType,
            storage::models::SortDirection,
            storage::models::TimeGrammar,
            storage::models::ShortName,
            storage::services::ParsedValue,
            storage::services::ParseErrorKind,
            storage::services::RankedSubmission,
            storage::services::moderation::OwnerListing,
            storage::services::reorder::RankAssignment,
            storage::services::stats::LeaderboardStats,
            manage::handlers::ClearedOrder,
        )
    ),
    tags(
        (name = "parse", description = "Value parsing preview"),
        (name = "leaderboards", description = "Public leaderboard endpoints"),
        (name = "manage", description = "Owner moderation and ordering endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Rankboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    let state = AppState::from_database(&db);

    let app = features::api_router(state, api_keys)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive());

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
