use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::LeaderboardStore;
use crate::error::{Result, StorageError};
use crate::models::{Leaderboard, NewLeaderboard};

const LEADERBOARD_COLUMNS: &str = r#"
    leaderboard_id, owner_id, title, slug, description, rules, unit, metric_type,
    sort_direction, smart_time_parsing, requires_verification, auto_approve,
    submissions_per_user, submission_deadline, end_date, created_at
"#;

/// Postgres-backed [`LeaderboardStore`]
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    pool: PgPool,
}

impl LeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaderboardStore for LeaderboardRepository {
    async fn find_leaderboard(&self, leaderboard_id: Uuid) -> Result<Leaderboard> {
        sqlx::query_as::<_, Leaderboard>(&format!(
            "SELECT {LEADERBOARD_COLUMNS} FROM leaderboards WHERE leaderboard_id = $1"
        ))
        .bind(leaderboard_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn find_leaderboard_by_slug(&self, slug: &str) -> Result<Leaderboard> {
        sqlx::query_as::<_, Leaderboard>(&format!(
            "SELECT {LEADERBOARD_COLUMNS} FROM leaderboards WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn create_leaderboard(&self, record: NewLeaderboard) -> Result<Leaderboard> {
        sqlx::query_as::<_, Leaderboard>(&format!(
            "INSERT INTO leaderboards (
                owner_id, title, slug, description, rules, unit, metric_type, sort_direction,
                smart_time_parsing, requires_verification, auto_approve, submissions_per_user,
                submission_deadline, end_date
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {LEADERBOARD_COLUMNS}"
        ))
        .bind(&record.owner_id)
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.description)
        .bind(&record.rules)
        .bind(&record.unit)
        .bind(record.metric_type)
        .bind(record.sort_direction)
        .bind(record.smart_time_parsing)
        .bind(record.requires_verification)
        .bind(record.auto_approve)
        .bind(record.submissions_per_user)
        .bind(record.submission_deadline)
        .bind(record.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "A leaderboard with this title already exists"))
    }
}
