pub mod leaderboard;
pub mod ranking;
pub mod submission;

pub use leaderboard::{CreateLeaderboardRequest, LeaderboardResponse};
pub use ranking::{MoveRequest, PublicRankingEntry, RankingFilter, ReorderRequest};
pub use submission::{
    CreateSubmissionRequest, ManualEntryRequest, ParsePreviewRequest, RejectRequest,
    SubmissionFilter, SubmissionReceipt, UpdateValueRequest,
};
