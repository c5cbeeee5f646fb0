use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a leaderboard measures. Fixed at creation; decides the parsing grammar
/// and the canonical unit of every `value_raw` stored under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "metric_type", rename_all = "lowercase")]
pub enum MetricType {
    Time,
    Reps,
    Distance,
    Weight,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Reps => "reps",
            Self::Distance => "distance",
            Self::Weight => "weight",
        }
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "reps" => Ok(Self::Reps),
            "distance" => Ok(Self::Distance),
            "weight" => Ok(Self::Weight),
            other => Err(format!(
                "Unknown metric type '{}'. Expected time, reps, distance or weight",
                other
            )),
        }
    }
}

/// `Asc`: lower value wins. `Desc`: higher value wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sort_direction", rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Which time grammar applies. Only meaningful for [`MetricType::Time`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrammar {
    /// `mm:ss` or `hh:mm:ss` only
    #[default]
    Strict,
    /// Unit words (`1h 30m`, `12mins 30sec`) with a colon fallback
    Smart,
}

impl From<bool> for TimeGrammar {
    fn from(smart_time_parsing: bool) -> Self {
        if smart_time_parsing {
            Self::Smart
        } else {
            Self::Strict
        }
    }
}
