use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{LeaderboardStore, SubmissionStore};
use crate::error::{Result, StorageError};
use crate::models::{
    Leaderboard, Moderation, NewLeaderboard, NewSubmission, Submission, SubmissionStatus,
};
use crate::services::value_parser::ParsedValue;

/// In-process store implementing both persistence contracts.
///
/// Used by tests and local runs without Postgres. Manual-rank writes can be
/// made to fail for chosen submissions to exercise partial reorders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    leaderboards: Mutex<HashMap<Uuid, Leaderboard>>,
    submissions: Mutex<HashMap<Uuid, Submission>>,
    failing_rank_writes: Mutex<HashSet<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a leaderboard as-is, keeping its id and slug
    pub fn put_leaderboard(&self, leaderboard: Leaderboard) {
        lock(&self.leaderboards).insert(leaderboard.leaderboard_id, leaderboard);
    }

    /// Store a submission as-is, keeping its id and status
    pub fn put_submission(&self, submission: Submission) {
        lock(&self.submissions).insert(submission.submission_id, submission);
    }

    /// Make every later `persist_manual_rank` for this submission fail
    pub fn fail_rank_writes_for(&self, submission_id: Uuid) {
        lock(&self.failing_rank_writes).insert(submission_id);
    }

    pub fn submission(&self, submission_id: Uuid) -> Option<Submission> {
        lock(&self.submissions).get(&submission_id).cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn fetch_approved_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>> {
        Ok(lock(&self.submissions)
            .values()
            .filter(|s| s.leaderboard_id == leaderboard_id && s.is_approved())
            .cloned()
            .collect())
    }

    async fn fetch_submissions(&self, leaderboard_id: Uuid) -> Result<Vec<Submission>> {
        let mut submissions: Vec<Submission> = lock(&self.submissions)
            .values()
            .filter(|s| s.leaderboard_id == leaderboard_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn find_submission(&self, submission_id: Uuid) -> Result<Submission> {
        self.submission(submission_id).ok_or(StorageError::NotFound)
    }

    async fn insert_submission(&self, record: NewSubmission) -> Result<Submission> {
        if !lock(&self.leaderboards).contains_key(&record.leaderboard_id) {
            return Err(StorageError::NotFound);
        }

        let submission = record.into_submission();
        self.put_submission(submission.clone());
        Ok(submission)
    }

    async fn persist_manual_rank(&self, submission_id: Uuid, rank: Option<i32>) -> Result<()> {
        if lock(&self.failing_rank_writes).contains(&submission_id) {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }

        let mut submissions = lock(&self.submissions);
        let submission = submissions
            .get_mut(&submission_id)
            .ok_or(StorageError::NotFound)?;
        submission.manual_rank = rank;
        Ok(())
    }

    async fn set_status(&self, submission_id: Uuid, moderation: &Moderation) -> Result<Submission> {
        let mut submissions = lock(&self.submissions);
        let submission = submissions
            .get_mut(&submission_id)
            .filter(|s| s.status == SubmissionStatus::Pending)
            .ok_or(StorageError::NotFound)?;

        match moderation {
            Moderation::Approved {
                approved_at,
                moderated_by,
            } => {
                submission.status = SubmissionStatus::Approved;
                submission.approved_at = Some(*approved_at);
                submission.moderated_by = moderated_by.clone();
            }
            Moderation::Rejected {
                reason,
                moderated_by,
            } => {
                submission.status = SubmissionStatus::Rejected;
                submission.rejection_reason = reason.clone();
                submission.moderated_by = moderated_by.clone();
            }
        }

        Ok(submission.clone())
    }

    async fn update_value(
        &self,
        submission_id: Uuid,
        value: &ParsedValue,
        original_input: &str,
    ) -> Result<Submission> {
        let mut submissions = lock(&self.submissions);
        let submission = submissions
            .get_mut(&submission_id)
            .ok_or(StorageError::NotFound)?;

        submission.value_raw = value.value_raw;
        submission.value_display = value.value_display.clone();
        submission.original_input = Some(original_input.to_string());
        Ok(submission.clone())
    }

    async fn delete_submission(&self, submission_id: Uuid) -> Result<()> {
        lock(&self.submissions)
            .remove(&submission_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn count_submissions_by_email(&self, leaderboard_id: Uuid, email: &str) -> Result<i64> {
        let count = lock(&self.submissions)
            .values()
            .filter(|s| {
                s.leaderboard_id == leaderboard_id
                    && s.status != SubmissionStatus::Rejected
                    && s.email.eq_ignore_ascii_case(email)
            })
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl LeaderboardStore for MemoryStore {
    async fn find_leaderboard(&self, leaderboard_id: Uuid) -> Result<Leaderboard> {
        lock(&self.leaderboards)
            .get(&leaderboard_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_leaderboard_by_slug(&self, slug: &str) -> Result<Leaderboard> {
        lock(&self.leaderboards)
            .values()
            .find(|l| l.slug == slug)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_leaderboard(&self, record: NewLeaderboard) -> Result<Leaderboard> {
        let mut leaderboards = lock(&self.leaderboards);
        if leaderboards.values().any(|l| l.slug == record.slug) {
            return Err(StorageError::ConstraintViolation(
                "A leaderboard with this title already exists".to_string(),
            ));
        }

        let leaderboard = Leaderboard {
            leaderboard_id: Uuid::new_v4(),
            owner_id: record.owner_id,
            title: record.title,
            slug: record.slug,
            description: record.description,
            rules: record.rules,
            unit: record.unit,
            metric_type: record.metric_type,
            sort_direction: record.sort_direction,
            smart_time_parsing: record.smart_time_parsing,
            requires_verification: record.requires_verification,
            auto_approve: record.auto_approve,
            submissions_per_user: record.submissions_per_user,
            submission_deadline: record.submission_deadline,
            end_date: record.end_date,
            created_at: Utc::now(),
        };
        leaderboards.insert(leaderboard.leaderboard_id, leaderboard.clone());
        Ok(leaderboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricType, SortDirection};
    use crate::services::ranking::tests::{approved, base_time};

    fn new_board(slug: &str) -> NewLeaderboard {
        NewLeaderboard {
            owner_id: "owner".to_string(),
            title: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            rules: None,
            unit: None,
            metric_type: MetricType::Reps,
            sort_direction: SortDirection::Desc,
            smart_time_parsing: false,
            requires_verification: true,
            auto_approve: false,
            submissions_per_user: None,
            submission_deadline: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_a_constraint_violation() {
        let store = MemoryStore::new();
        let created = store.create_leaderboard(new_board("plank")).await.unwrap();

        let found = store.find_leaderboard_by_slug("plank").await.unwrap();
        assert_eq!(found.leaderboard_id, created.leaderboard_id);

        let err = store.create_leaderboard(new_board("plank")).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert!(matches!(
            store.find_leaderboard_by_slug("missing").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_set_status_only_moves_pending_rows() {
        let store = MemoryStore::new();
        let done = approved("Already Done", 5, 0);
        store.put_submission(done.clone());

        let moderation = Moderation::Rejected {
            reason: None,
            moderated_by: None,
        };
        assert!(matches!(
            store.set_status(done.submission_id, &moderation).await,
            Err(StorageError::NotFound)
        ));
        assert!(store.submission(done.submission_id).unwrap().is_approved());
    }

    #[tokio::test]
    async fn test_injected_rank_write_failure() {
        let store = MemoryStore::new();
        let entry = approved("Flaky Row", 5, 0);
        store.put_submission(entry.clone());
        store.fail_rank_writes_for(entry.submission_id);

        let err = store
            .persist_manual_rank(entry.submission_id, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        assert_eq!(store.submission(entry.submission_id).unwrap().manual_rank, None);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_scoped() {
        let store = MemoryStore::new();
        let older = approved("Older", 5, 0);
        let newer = approved("Newer", 5, 30);
        let mut elsewhere = approved("Elsewhere", 5, 60);
        elsewhere.leaderboard_id = Uuid::from_u128(99);
        for s in [&older, &newer, &elsewhere] {
            store.put_submission(s.clone());
        }

        let listed = store.fetch_submissions(Uuid::nil()).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
        assert!(listed.iter().all(|s| s.submitted_at >= base_time()));
    }
}
