pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::Result;
use crate::repository::{LeaderboardRepository, SubmissionRepository};

#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn leaderboards(&self) -> LeaderboardRepository {
        LeaderboardRepository::new(self.pool.clone())
    }

    pub fn submissions(&self) -> SubmissionRepository {
        SubmissionRepository::new(self.pool.clone())
    }
}
