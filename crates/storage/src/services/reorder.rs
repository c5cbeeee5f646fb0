//! Owner-driven manual ordering.
//!
//! Ranks are written one submission at a time. A failed write stops the run and
//! reports how many assignments landed, so the caller can reload instead of
//! trusting a half-applied order.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::SubmissionFilter;
use crate::error::StorageError;
use crate::models::{Leaderboard, SubmissionStatus};
use crate::repository::SubmissionStore;
use crate::services::moderation::filter_submissions;
use crate::services::ranking::{rank_submissions, RankingMode};

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("Position {index} is outside the list of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Another reorder of this leaderboard is in progress")]
    InProgress,

    #[error("Submission {0} does not belong to this leaderboard")]
    UnknownSubmission(Uuid),

    #[error("Submission {0} is not approved")]
    NotApproved(Uuid),

    #[error("Submission {0} appears more than once")]
    DuplicateSubmission(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Saving the order failed at submission {submission_id} after {applied} updates")]
    Persistence {
        submission_id: Uuid,
        applied: usize,
        #[source]
        source: StorageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankAssignment {
    pub submission_id: Uuid,
    pub manual_rank: i32,
}

/// Move the entry at `from` to `to`, shifting everything in between
pub fn move_entry(ids: &[Uuid], from: usize, to: usize) -> Result<Vec<Uuid>, ReorderError> {
    let len = ids.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }

    let mut reordered = ids.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Ok(reordered)
}

/// Contiguous ranks `1..=N` in list order
pub fn assign_manual_ranks(ids: &[Uuid]) -> Vec<RankAssignment> {
    ids.iter()
        .zip(1i32..)
        .map(|(&submission_id, manual_rank)| RankAssignment {
            submission_id,
            manual_rank,
        })
        .collect()
}

/// Leaderboards with a reorder currently running
#[derive(Debug, Clone, Default)]
pub struct ReorderLocks {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl ReorderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ReorderError::InProgress`] instead of waiting
    pub fn try_acquire(&self, leaderboard_id: Uuid) -> Result<ReorderGuard, ReorderError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(leaderboard_id) {
            return Err(ReorderError::InProgress);
        }

        Ok(ReorderGuard {
            active: Arc::clone(&self.active),
            leaderboard_id,
        })
    }
}

/// Releases the leaderboard when dropped
#[derive(Debug)]
pub struct ReorderGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
    leaderboard_id: Uuid,
}

impl Drop for ReorderGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.leaderboard_id);
    }
}

/// Give `ordered_ids` the manual ranks `1..=N`.
///
/// Every id must be an approved submission of the leaderboard. Approved entries
/// left out of the list keep whatever manual rank they had.
pub async fn apply_reorder(
    store: &dyn SubmissionStore,
    locks: &ReorderLocks,
    leaderboard_id: Uuid,
    ordered_ids: &[Uuid],
) -> Result<Vec<RankAssignment>, ReorderError> {
    let _guard = locks.try_acquire(leaderboard_id)?;
    persist_order(store, leaderboard_id, ordered_ids).await
}

/// Move one entry of the owner's current order and save the new order of the
/// visible entries. `search` narrows the visible set the same way the owner
/// listing does; entries outside it keep their manual ranks.
pub async fn apply_move(
    store: &dyn SubmissionStore,
    locks: &ReorderLocks,
    leaderboard: &Leaderboard,
    search: Option<&str>,
    from: usize,
    to: usize,
) -> Result<Vec<RankAssignment>, ReorderError> {
    let _guard = locks.try_acquire(leaderboard.leaderboard_id)?;

    let filter = SubmissionFilter {
        status: None,
        search: search.map(str::to_string),
    };
    let approved = filter_submissions(
        &store
            .fetch_approved_submissions(leaderboard.leaderboard_id)
            .await?,
        &filter,
    );
    let current: Vec<Uuid> = rank_submissions(
        &approved,
        leaderboard.sort_direction,
        RankingMode::ManualOverride,
    )
    .into_iter()
    .map(|ranked| ranked.submission.submission_id)
    .collect();

    let reordered = move_entry(&current, from, to)?;
    if from == to {
        return Ok(Vec::new());
    }

    persist_order(store, leaderboard.leaderboard_id, &reordered).await
}

/// Drop every manual rank so the owner view falls back to automatic order.
/// Returns how many overrides were cleared.
pub async fn clear_manual_ranks(
    store: &dyn SubmissionStore,
    locks: &ReorderLocks,
    leaderboard_id: Uuid,
) -> Result<usize, ReorderError> {
    let _guard = locks.try_acquire(leaderboard_id)?;

    let ranked: Vec<Uuid> = store
        .fetch_approved_submissions(leaderboard_id)
        .await?
        .into_iter()
        .filter(|s| s.manual_rank.is_some())
        .map(|s| s.submission_id)
        .collect();

    for (applied, &submission_id) in ranked.iter().enumerate() {
        store
            .persist_manual_rank(submission_id, None)
            .await
            .map_err(|source| persistence_failed(leaderboard_id, submission_id, applied, source))?;
    }

    tracing::info!(
        "Cleared {} manual ranks on leaderboard {}",
        ranked.len(),
        leaderboard_id
    );
    Ok(ranked.len())
}

async fn persist_order(
    store: &dyn SubmissionStore,
    leaderboard_id: Uuid,
    ordered_ids: &[Uuid],
) -> Result<Vec<RankAssignment>, ReorderError> {
    let statuses: HashMap<Uuid, SubmissionStatus> = store
        .fetch_submissions(leaderboard_id)
        .await?
        .into_iter()
        .map(|s| (s.submission_id, s.status))
        .collect();

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for &id in ordered_ids {
        match statuses.get(&id) {
            None => return Err(ReorderError::UnknownSubmission(id)),
            Some(SubmissionStatus::Approved) => {}
            Some(_) => return Err(ReorderError::NotApproved(id)),
        }
        if !seen.insert(id) {
            return Err(ReorderError::DuplicateSubmission(id));
        }
    }

    let assignments = assign_manual_ranks(ordered_ids);
    for (applied, assignment) in assignments.iter().enumerate() {
        store
            .persist_manual_rank(assignment.submission_id, Some(assignment.manual_rank))
            .await
            .map_err(|source| {
                persistence_failed(leaderboard_id, assignment.submission_id, applied, source)
            })?;
    }

    tracing::info!(
        "Applied manual order of {} entries on leaderboard {}",
        assignments.len(),
        leaderboard_id
    );
    Ok(assignments)
}

fn persistence_failed(
    leaderboard_id: Uuid,
    submission_id: Uuid,
    applied: usize,
    source: StorageError,
) -> ReorderError {
    tracing::error!(
        "Manual rank write failed on leaderboard {} at submission {} after {} updates: {:?}",
        leaderboard_id,
        submission_id,
        applied,
        source
    );
    ReorderError::Persistence {
        submission_id,
        applied,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricType, SortDirection, Submission};
    use crate::repository::MemoryStore;
    use crate::services::ranking::tests::{approved, base_time};

    fn ids(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    fn board() -> Leaderboard {
        Leaderboard {
            leaderboard_id: Uuid::from_u128(42),
            owner_id: "owner".to_string(),
            title: "Push-ups".to_string(),
            slug: "push-ups".to_string(),
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
            created_at: base_time(),
        }
    }

    fn seeded_store(values: &[i64]) -> (MemoryStore, Vec<Submission>) {
        let store = MemoryStore::new();
        store.put_leaderboard(board());
        let submissions: Vec<Submission> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let mut s = approved(&format!("Athlete {i}"), value, i as i64);
                s.leaderboard_id = board().leaderboard_id;
                store.put_submission(s.clone());
                s
            })
            .collect();
        (store, submissions)
    }

    #[test]
    fn test_move_entry_forward_and_back() {
        let list = ids(4);
        assert_eq!(
            move_entry(&list, 0, 2).unwrap(),
            vec![list[1], list[2], list[0], list[3]]
        );
        assert_eq!(
            move_entry(&list, 3, 0).unwrap(),
            vec![list[3], list[0], list[1], list[2]]
        );
        assert_eq!(move_entry(&list, 1, 1).unwrap(), list);
    }

    #[test]
    fn test_move_entry_out_of_range() {
        let err = move_entry(&ids(2), 0, 2).unwrap_err();
        assert!(matches!(err, ReorderError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_assign_manual_ranks_is_contiguous() {
        let list = ids(3);
        let ranks: Vec<i32> = assign_manual_ranks(&list)
            .iter()
            .map(|a| a.manual_rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(assign_manual_ranks(&[]).is_empty());
    }

    #[test]
    fn test_lock_rejects_second_holder_until_dropped() {
        let locks = ReorderLocks::new();
        let id = Uuid::from_u128(7);

        let guard = locks.try_acquire(id).unwrap();
        assert!(matches!(locks.try_acquire(id), Err(ReorderError::InProgress)));
        assert!(locks.try_acquire(Uuid::from_u128(8)).is_ok());

        drop(guard);
        assert!(locks.try_acquire(id).is_ok());
    }

    #[tokio::test]
    async fn test_apply_reorder_persists_positions() {
        let (store, subs) = seeded_store(&[10, 20, 30]);
        let locks = ReorderLocks::new();
        let order = vec![subs[0].submission_id, subs[2].submission_id, subs[1].submission_id];

        let assignments = apply_reorder(&store, &locks, board().leaderboard_id, &order)
            .await
            .unwrap();

        assert_eq!(assignments.len(), 3);
        assert_eq!(store.submission(subs[0].submission_id).unwrap().manual_rank, Some(1));
        assert_eq!(store.submission(subs[2].submission_id).unwrap().manual_rank, Some(2));
        assert_eq!(store.submission(subs[1].submission_id).unwrap().manual_rank, Some(3));
        assert!(locks.try_acquire(board().leaderboard_id).is_ok());

        let approved = store
            .fetch_approved_submissions(board().leaderboard_id)
            .await
            .unwrap();
        let view: Vec<Uuid> = rank_submissions(&approved, SortDirection::Desc, RankingMode::ManualOverride)
            .into_iter()
            .map(|r| r.submission.submission_id)
            .collect();
        assert_eq!(view, order);
    }

    #[tokio::test]
    async fn test_apply_reorder_rejects_foreign_and_pending_ids() {
        let (store, subs) = seeded_store(&[10, 20]);
        let locks = ReorderLocks::new();

        let err = apply_reorder(&store, &locks, board().leaderboard_id, &[Uuid::from_u128(999)])
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::UnknownSubmission(_)));

        let mut pending = subs[1].clone();
        pending.status = SubmissionStatus::Pending;
        store.put_submission(pending.clone());
        let err = apply_reorder(&store, &locks, board().leaderboard_id, &[pending.submission_id])
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::NotApproved(id) if id == pending.submission_id));

        let twice = [subs[0].submission_id, subs[0].submission_id];
        let err = apply_reorder(&store, &locks, board().leaderboard_id, &twice)
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::DuplicateSubmission(_)));
        assert_eq!(store.submission(subs[0].submission_id).unwrap().manual_rank, None);
    }

    #[tokio::test]
    async fn test_failed_write_reports_partial_progress() {
        let (store, subs) = seeded_store(&[10, 20, 30]);
        let locks = ReorderLocks::new();
        store.fail_rank_writes_for(subs[1].submission_id);
        let order: Vec<Uuid> = subs.iter().map(|s| s.submission_id).collect();

        let err = apply_reorder(&store, &locks, board().leaderboard_id, &order)
            .await
            .unwrap_err();

        match err {
            ReorderError::Persistence {
                submission_id,
                applied,
                ..
            } => {
                assert_eq!(submission_id, subs[1].submission_id);
                assert_eq!(applied, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.submission(subs[0].submission_id).unwrap().manual_rank, Some(1));
        assert_eq!(store.submission(subs[2].submission_id).unwrap().manual_rank, None);
        assert!(locks.try_acquire(board().leaderboard_id).is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_reorder_is_rejected() {
        let (store, subs) = seeded_store(&[10]);
        let locks = ReorderLocks::new();
        let _held = locks.try_acquire(board().leaderboard_id).unwrap();

        let err = apply_reorder(&store, &locks, board().leaderboard_id, &[subs[0].submission_id])
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::InProgress));
    }

    #[tokio::test]
    async fn test_apply_move_uses_current_owner_order() {
        // Desc board: automatic order is 30, 20, 10
        let (store, subs) = seeded_store(&[10, 20, 30]);
        let locks = ReorderLocks::new();

        let assignments = apply_move(&store, &locks, &board(), None, 2, 0).await.unwrap();

        let order: Vec<Uuid> = assignments.iter().map(|a| a.submission_id).collect();
        assert_eq!(
            order,
            vec![subs[0].submission_id, subs[2].submission_id, subs[1].submission_id]
        );
    }

    #[tokio::test]
    async fn test_apply_move_within_search_results() {
        let (store, mut subs) = seeded_store(&[10, 20, 30, 40]);
        for (i, name) in [(0, "Kim Lee"), (2, "Kim Park")] {
            subs[i].full_name = name.to_string();
            store.put_submission(subs[i].clone());
        }
        let locks = ReorderLocks::new();

        // Visible order is Kim Park (30), Kim Lee (10)
        let assignments = apply_move(&store, &locks, &board(), Some("kim"), 1, 0)
            .await
            .unwrap();

        let order: Vec<Uuid> = assignments.iter().map(|a| a.submission_id).collect();
        assert_eq!(order, vec![subs[0].submission_id, subs[2].submission_id]);
        assert_eq!(store.submission(subs[0].submission_id).unwrap().manual_rank, Some(1));
        assert_eq!(store.submission(subs[2].submission_id).unwrap().manual_rank, Some(2));
        assert_eq!(store.submission(subs[1].submission_id).unwrap().manual_rank, None);
        assert_eq!(store.submission(subs[3].submission_id).unwrap().manual_rank, None);

        let err = apply_move(&store, &locks, &board(), Some("kim"), 2, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ReorderError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[tokio::test]
    async fn test_apply_move_same_position_is_noop() {
        let (store, subs) = seeded_store(&[10, 20]);
        let locks = ReorderLocks::new();

        let assignments = apply_move(&store, &locks, &board(), None, 1, 1).await.unwrap();
        assert!(assignments.is_empty());
        assert_eq!(store.submission(subs[0].submission_id).unwrap().manual_rank, None);

        let err = apply_move(&store, &locks, &board(), None, 0, 5).await.unwrap_err();
        assert!(matches!(err, ReorderError::IndexOutOfRange { index: 5, len: 2 }));
    }

    #[tokio::test]
    async fn test_clear_manual_ranks() {
        let (store, subs) = seeded_store(&[10, 20]);
        let locks = ReorderLocks::new();
        let order: Vec<Uuid> = subs.iter().map(|s| s.submission_id).collect();
        apply_reorder(&store, &locks, board().leaderboard_id, &order)
            .await
            .unwrap();

        let cleared = clear_manual_ranks(&store, &locks, board().leaderboard_id)
            .await
            .unwrap();

        assert_eq!(cleared, 2);
        assert!(subs
            .iter()
            .all(|s| store.submission(s.submission_id).unwrap().manual_rank.is_none()));
    }
}
