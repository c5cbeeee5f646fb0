use std::sync::Arc;

use storage::Database;
use storage::repository::{LeaderboardStore, SubmissionStore};
use storage::services::reorder::ReorderLocks;

/// Stores and in-process coordination shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub leaderboards: Arc<dyn LeaderboardStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub reorder_locks: ReorderLocks,
}

impl AppState {
    pub fn from_database(db: &Database) -> Self {
        Self {
            leaderboards: Arc::new(db.leaderboards()),
            submissions: Arc::new(db.submissions()),
            reorder_locks: ReorderLocks::new(),
        }
    }

    #[cfg(test)]
    pub fn in_memory(store: Arc<storage::repository::MemoryStore>) -> Self {
        Self {
            leaderboards: store.clone(),
            submissions: store,
            reorder_locks: ReorderLocks::new(),
        }
    }
}
