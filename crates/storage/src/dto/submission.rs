use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::models::{Gender, MetricType, SubmissionStatus, TimeGrammar};

static PROFANITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(fuck|shit|cunt|bitch|asshole|damn)").expect("invalid regex")
});

/// Public submission form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 2, message = "Please enter your full name"))]
    #[validate(custom(function = "validate_clean_name"))]
    pub full_name: String,

    #[validate(email(message = "Enter a valid email"))]
    pub email: String,

    pub gender: Gender,

    #[validate(length(min = 1, message = "Please enter your result"))]
    pub value: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub proof_url: Option<String>,

    pub video_url: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_accepted"))]
    pub accept_terms: bool,

    /// Hidden form field; bots fill it, people don't
    #[serde(default)]
    #[validate(custom(function = "validate_honeypot"))]
    pub website: Option<String>,
}

/// Owner-added entry, approved on creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ManualEntryRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub full_name: String,

    #[validate(email(message = "Enter a valid email"))]
    pub email: String,

    #[serde(default)]
    pub gender: Gender,

    #[validate(length(min = 1, message = "Please enter a result"))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateValueRequest {
    #[validate(length(min = 1, message = "Please enter a result"))]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Live parse preview for a submission form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParsePreviewRequest {
    pub metric_type: MetricType,
    pub value: String,
    #[serde(default)]
    pub grammar: TimeGrammar,
}

/// Filters for the owner's submission list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SubmissionFilter {
    /// One status, or all when absent
    pub status: Option<SubmissionStatus>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

/// Returned to the submitter after a successful submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub status: SubmissionStatus,
    pub value_display: String,
    pub submitted_at: DateTime<Utc>,
}

fn validate_clean_name(name: &str) -> Result<(), ValidationError> {
    if PROFANITY_REGEX.is_match(name) {
        return Err(ValidationError::new("profanity")
            .with_message("Inappropriate words are not allowed".into()));
    }
    Ok(())
}

fn validate_optional_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || url.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Enter a valid URL".into()))
    }
}

fn validate_accepted(accepted: &bool) -> Result<(), ValidationError> {
    if *accepted {
        Ok(())
    } else {
        Err(ValidationError::new("terms")
            .with_message("You must accept the rules & terms".into()))
    }
}

fn validate_honeypot(website: &str) -> Result<(), ValidationError> {
    if website.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new("honeypot").with_message("Invalid".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            full_name: "Jane Athlete".to_string(),
            email: "jane@example.com".to_string(),
            gender: Gender::Female,
            value: "12:30".to_string(),
            proof_url: None,
            video_url: None,
            accept_terms: true,
            website: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(valid().validate().is_ok());

        let mut with_empty_proof = valid();
        with_empty_proof.proof_url = Some(String::new());
        assert!(with_empty_proof.validate().is_ok());
    }

    #[test]
    fn test_name_rules() {
        let mut short = valid();
        short.full_name = "J".to_string();
        assert!(short.validate().is_err());

        let mut rude = valid();
        rude.full_name = "Damnit Person".to_string();
        let errors = rude.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));
    }

    #[test]
    fn test_terms_and_honeypot() {
        let mut no_terms = valid();
        no_terms.accept_terms = false;
        assert!(no_terms.validate().unwrap_err().field_errors().contains_key("accept_terms"));

        let mut bot = valid();
        bot.website = Some("http://spam.example".to_string());
        assert!(bot.validate().unwrap_err().field_errors().contains_key("website"));
    }

    #[test]
    fn test_bad_email_and_proof_url() {
        let mut bad = valid();
        bad.email = "not-an-email".to_string();
        bad.proof_url = Some("nope".to_string());
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("proof_url"));
    }

    #[test]
    fn test_missing_terms_defaults_to_false() {
        let req: CreateSubmissionRequest = serde_json::from_value(serde_json::json!({
            "full_name": "Jane Athlete",
            "email": "jane@example.com",
            "gender": "female",
            "value": "10",
        }))
        .unwrap();
        assert!(!req.accept_terms);
        assert!(req.validate().is_err());
    }
}
