use serde::Serialize;
use utoipa::ToSchema;

/// A newtype holding the public form of a participant's name: the first token
/// plus the initial of the last one ("Jane Athlete" becomes "Jane A.").
///
/// Public ranking payloads carry this type instead of the full name so a
/// surname can never leak through a view that forgot to shorten it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShortName(String);

impl ShortName {
    /// Shortens a full name.
    /// Single-token names pass through unchanged; whitespace runs are collapsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use storage::models::ShortName;
    ///
    /// assert_eq!(ShortName::new("Jane Mary Athlete").as_str(), "Jane A.");
    /// assert_eq!(ShortName::new("Cher").as_str(), "Cher");
    /// ```
    pub fn new(full_name: &str) -> Self {
        let parts: Vec<&str> = full_name.split_whitespace().collect();

        let short = match parts.as_slice() {
            [] => String::new(),
            [only] => (*only).to_string(),
            [first, .., last] => match last.chars().next() {
                Some(initial) => format!("{} {}.", first, initial),
                None => (*first).to_string(),
            },
        };

        Self(short)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token_unchanged() {
        assert_eq!(ShortName::new("Madonna").as_str(), "Madonna");
    }

    #[test]
    fn test_two_tokens() {
        assert_eq!(ShortName::new("Alice Smith").as_str(), "Alice S.");
    }

    #[test]
    fn test_keeps_first_and_last_only() {
        assert_eq!(ShortName::new("  Jean   Claude  Van Damme ").as_str(), "Jean D.");
    }

    #[test]
    fn test_unicode_initial() {
        assert_eq!(ShortName::new("Zoë Ångström").as_str(), "Zoë Å.");
    }

    #[test]
    fn test_blank_name() {
        assert_eq!(ShortName::new("   ").as_str(), "");
    }
}
