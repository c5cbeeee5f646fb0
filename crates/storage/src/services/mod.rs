pub mod moderation;
pub mod ranking;
pub mod reorder;
pub mod slug;
pub mod stats;
pub mod value_parser;

pub use ranking::{rank_submissions, RankedSubmission, RankingMode};
pub use value_parser::{parse_value, ParseError, ParseErrorKind, ParsedValue};
