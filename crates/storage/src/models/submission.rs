use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "submission_status", rename_all = "UPPERCASE")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    pub submission_id: Uuid,
    pub leaderboard_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub gender: Gender,
    /// Canonical value in the leaderboard metric's finest unit
    pub value_raw: i64,
    pub value_display: String,
    pub status: SubmissionStatus,
    pub manual_rank: Option<i32>,
    pub proof_url: Option<String>,
    pub video_url: Option<String>,
    pub is_manual_entry: bool,
    pub rejection_reason: Option<String>,
    pub moderated_by: Option<String>,
    pub original_input: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// A status transition decided by a moderator, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moderation {
    Approved {
        approved_at: DateTime<Utc>,
        moderated_by: Option<String>,
    },
    Rejected {
        reason: Option<String>,
        moderated_by: Option<String>,
    },
}

impl Moderation {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            Self::Approved { .. } => SubmissionStatus::Approved,
            Self::Rejected { .. } => SubmissionStatus::Rejected,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Submission has already been {0:?}")]
    AlreadyModerated(SubmissionStatus),

    #[error("Only approved submissions can carry a manual rank")]
    NotApproved,

    #[error("Manual rank must be a positive integer, got {0}")]
    InvalidManualRank(i32),
}

impl Submission {
    pub fn is_approved(&self) -> bool {
        self.status == SubmissionStatus::Approved
    }

    /// PENDING -> APPROVED. A submission is moderated exactly once.
    pub fn approve(
        &self,
        moderated_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Moderation, LifecycleError> {
        self.ensure_pending()?;
        Ok(Moderation::Approved {
            approved_at: now,
            moderated_by,
        })
    }

    /// PENDING -> REJECTED. A submission is moderated exactly once.
    pub fn reject(
        &self,
        reason: Option<String>,
        moderated_by: Option<String>,
    ) -> Result<Moderation, LifecycleError> {
        self.ensure_pending()?;
        Ok(Moderation::Rejected {
            reason: reason.filter(|r| !r.trim().is_empty()),
            moderated_by,
        })
    }

    pub fn check_manual_rank(&self, rank: Option<i32>) -> Result<(), LifecycleError> {
        if !self.is_approved() {
            return Err(LifecycleError::NotApproved);
        }
        match rank {
            Some(r) if r < 1 => Err(LifecycleError::InvalidManualRank(r)),
            _ => Ok(()),
        }
    }

    fn ensure_pending(&self) -> Result<(), LifecycleError> {
        if self.status == SubmissionStatus::Pending {
            Ok(())
        } else {
            Err(LifecycleError::AlreadyModerated(self.status))
        }
    }
}

/// A fully validated submission record that has not been stored yet.
/// `value_raw`/`value_display` always come from the value parser.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub leaderboard_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub gender: Gender,
    pub value_raw: i64,
    pub value_display: String,
    pub status: SubmissionStatus,
    pub proof_url: Option<String>,
    pub video_url: Option<String>,
    pub is_manual_entry: bool,
    pub original_input: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl NewSubmission {
    /// Materialise the record with a fresh id, the way a store assigns one on insert
    pub fn into_submission(self) -> Submission {
        Submission {
            submission_id: Uuid::new_v4(),
            leaderboard_id: self.leaderboard_id,
            full_name: self.full_name,
            email: self.email,
            gender: self.gender,
            value_raw: self.value_raw,
            value_display: self.value_display,
            status: self.status,
            manual_rank: None,
            proof_url: self.proof_url,
            video_url: self.video_url,
            is_manual_entry: self.is_manual_entry,
            rejection_reason: None,
            moderated_by: None,
            original_input: self.original_input,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
        }
    }
}
