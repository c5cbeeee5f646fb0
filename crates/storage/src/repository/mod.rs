//! Persistence contracts consumed by the services, plus their implementations.
//!
//! Services never reach for a global client: whatever composes parsing and
//! ranking with I/O receives a store explicitly.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Leaderboard, Moderation, NewLeaderboard, NewSubmission, Submission};
use crate::services::value_parser::ParsedValue;

pub mod leaderboard;
pub mod memory;
pub mod submission;

pub use leaderboard::LeaderboardRepository;
pub use memory::MemoryStore;
pub use submission::SubmissionRepository;

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Approved submissions of one leaderboard. Ordering is unspecified; callers re-rank.
    async fn fetch_approved_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>>;

    /// Every submission of one leaderboard regardless of status, newest first
    async fn fetch_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>>;

    async fn find_submission(&self, submission_id: Uuid) -> Result<Submission>;

    async fn insert_submission(&self, record: NewSubmission) -> Result<Submission>;

    async fn persist_manual_rank(&self, submission_id: Uuid, rank: Option<i32>) -> Result<()>;

    async fn set_status(&self, submission_id: Uuid, moderation: &Moderation) -> Result<Submission>;

    async fn update_value(
        &self,
        submission_id: Uuid,
        value: &ParsedValue,
        original_input: &str,
    ) -> Result<Submission>;

    async fn delete_submission(&self, submission_id: Uuid) -> Result<()>;

    async fn count_submissions_by_email(&self, leaderboard_id: Uuid, email: &str) -> Result<i64>;
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn find_leaderboard(&self, leaderboard_id: Uuid) -> Result<Leaderboard>;

    async fn find_leaderboard_by_slug(&self, slug: &str) -> Result<Leaderboard>;

    /// Fails with `ConstraintViolation` when the slug is taken
    async fn create_leaderboard(&self, record: NewLeaderboard) -> Result<Leaderboard>;
}
