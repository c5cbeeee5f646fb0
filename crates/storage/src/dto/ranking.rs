use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Gender, ShortName};
use crate::services::ranking::RankedSubmission;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RankingFilter {
    pub gender: Option<Gender>,
}

/// A ranked row as shown publicly: short name, no email
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicRankingEntry {
    pub rank: u32,
    pub name: ShortName,
    pub gender: Gender,
    pub value_display: String,
    pub submitted_at: DateTime<Utc>,
    pub proof_url: Option<String>,
    pub video_url: Option<String>,
}

impl From<RankedSubmission> for PublicRankingEntry {
    fn from(ranked: RankedSubmission) -> Self {
        let submission = ranked.submission;
        Self {
            rank: ranked.rank,
            name: ShortName::new(&submission.full_name),
            gender: submission.gender,
            value_display: submission.value_display,
            submitted_at: submission.submitted_at,
            proof_url: submission.proof_url,
            video_url: submission.video_url,
        }
    }
}

/// Full manual order of the visible entries, top first
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReorderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one entry"))]
    pub ordered_ids: Vec<Uuid>,
}

/// Zero-based positions within the owner's current order, narrowed by
/// `search` when the owner is looking at filtered results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ranking::tests::approved;

    #[test]
    fn test_public_entry_hides_surname_and_email() {
        let entry = PublicRankingEntry::from(RankedSubmission {
            rank: 2,
            submission: approved("Jane Mary Athlete", 42, 0),
        });

        assert_eq!(entry.rank, 2);
        assert_eq!(entry.name.as_str(), "Jane A.");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "Jane A.");
        assert!(json.get("email").is_none());
        assert!(json.get("full_name").is_none());
    }
}
