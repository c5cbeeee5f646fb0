mod leaderboard;
mod metric;
mod short_name;
mod submission;

pub use leaderboard::{Leaderboard, NewLeaderboard};
pub use metric::{MetricType, SortDirection, TimeGrammar};
pub use short_name::ShortName;
pub use submission::{
    Gender, LifecycleError, Moderation, NewSubmission, Submission, SubmissionStatus,
};
