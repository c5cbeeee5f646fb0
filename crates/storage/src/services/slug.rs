use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("invalid regex"));
static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));
static DASHES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("invalid regex"));

const MAX_SLUG_LEN: usize = 50;

/// URL-safe identifier derived from a leaderboard title
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = DISALLOWED_REGEX.replace_all(&lowered, "");
    let dashed = WHITESPACE_REGEX.replace_all(&cleaned, "-");
    let collapsed = DASHES_REGEX.replace_all(&dashed, "-");

    // Only ASCII survives the filter, so byte truncation is safe
    let mut slug = collapsed.trim_matches('-').to_string();
    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}
