use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::SubmissionStore;
use crate::error::{Result, StorageError};
use crate::models::{Moderation, NewSubmission, Submission, SubmissionStatus};
use crate::services::value_parser::ParsedValue;

const SUBMISSION_COLUMNS: &str = r#"
    submission_id, leaderboard_id, full_name, email, gender, value_raw, value_display,
    status, manual_rank, proof_url, video_url, is_manual_entry, rejection_reason,
    moderated_by, original_input, submitted_at, approved_at
"#;

/// Postgres-backed [`SubmissionStore`]
#[derive(Debug, Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    async fn fetch_approved_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE leaderboard_id = $1 AND status = $2"
        ))
        .bind(leaderboard_id)
        .bind(SubmissionStatus::Approved)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn fetch_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE leaderboard_id = $1
             ORDER BY submitted_at DESC"
        ))
        .bind(leaderboard_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn find_submission(&self, submission_id: Uuid) -> Result<Submission> {
        sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = $1"
        ))
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn insert_submission(&self, record: NewSubmission) -> Result<Submission> {
        sqlx::query_as::<_, Submission>(&format!(
            "INSERT INTO submissions (
                leaderboard_id, full_name, email, gender, value_raw, value_display, status,
                proof_url, video_url, is_manual_entry, original_input, submitted_at, approved_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(record.leaderboard_id)
        .bind(&record.full_name)
        .bind(&record.email)
        .bind(record.gender)
        .bind(record.value_raw)
        .bind(&record.value_display)
        .bind(record.status)
        .bind(&record.proof_url)
        .bind(&record.video_url)
        .bind(record.is_manual_entry)
        .bind(&record.original_input)
        .bind(record.submitted_at)
        .bind(record.approved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "Submission already exists"))
    }

    async fn persist_manual_rank(&self, submission_id: Uuid, rank: Option<i32>) -> Result<()> {
        let result = sqlx::query("UPDATE submissions SET manual_rank = $2 WHERE submission_id = $1")
            .bind(submission_id)
            .bind(rank)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn set_status(&self, submission_id: Uuid, moderation: &Moderation) -> Result<Submission> {
        // The status guard makes a second moderation of the same row a no-op
        let updated = match moderation {
            Moderation::Approved {
                approved_at,
                moderated_by,
            } => {
                sqlx::query_as::<_, Submission>(&format!(
                    "UPDATE submissions
                     SET status = $2, approved_at = $3, moderated_by = $4
                     WHERE submission_id = $1 AND status = 'PENDING'
                     RETURNING {SUBMISSION_COLUMNS}"
                ))
                .bind(submission_id)
                .bind(SubmissionStatus::Approved)
                .bind(*approved_at)
                .bind(moderated_by.as_deref())
                .fetch_optional(&self.pool)
                .await?
            }
            Moderation::Rejected {
                reason,
                moderated_by,
            } => {
                sqlx::query_as::<_, Submission>(&format!(
                    "UPDATE submissions
                     SET status = $2, rejection_reason = $3, moderated_by = $4
                     WHERE submission_id = $1 AND status = 'PENDING'
                     RETURNING {SUBMISSION_COLUMNS}"
                ))
                .bind(submission_id)
                .bind(SubmissionStatus::Rejected)
                .bind(reason.as_deref())
                .bind(moderated_by.as_deref())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        updated.ok_or(StorageError::NotFound)
    }

    async fn update_value(
        &self,
        submission_id: Uuid,
        value: &ParsedValue,
        original_input: &str,
    ) -> Result<Submission> {
        sqlx::query_as::<_, Submission>(&format!(
            "UPDATE submissions
             SET value_raw = $2, value_display = $3, original_input = $4
             WHERE submission_id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(submission_id)
        .bind(value.value_raw)
        .bind(&value.value_display)
        .bind(original_input)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn delete_submission(&self, submission_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM submissions WHERE submission_id = $1")
            .bind(submission_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn count_submissions_by_email(&self, leaderboard_id: Uuid, email: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM submissions
             WHERE leaderboard_id = $1 AND lower(email) = lower($2) AND status <> 'REJECTED'",
        )
        .bind(leaderboard_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
