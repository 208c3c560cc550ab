//! Error types for tender-scout.
//!
//! Email-level errors (`MailError`, `AnalysisError`) abort the analysis of one
//! email and surface to the caller. URL-level errors (`ScrapeError`,
//! `ClassificationError`) are caught per URL by the analyzer.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures reading the email itself or its CSV attachment.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Malformed email: {0}")]
    MalformedEmail(String),

    #[error("Failed to decode CSV attachment: {0}")]
    CsvDecode(String),
}

/// Email-level failures of a whole analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("No CSV attachment found in email")]
    NoAttachment,

    #[error("No URLs found in CSV attachment")]
    NoUrls,
}

/// Tender page retrieval and extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Unrecognized tender page at {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Relevance scoring errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("no score found in classifier reply")]
    NoScore,

    #[error("score out of range: {value} is not between 0 and 10")]
    OutOfRange { value: String },

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("classifier request failed: {0}")]
    Llm(#[from] LlmError),
}

/// Why a single tender URL was skipped.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mail_error_passes_through_analysis_error() {
        let err = AnalysisError::from(MailError::CsvDecode("bad utf-8".into()));
        assert_eq!(
            err.to_string(),
            "Failed to decode CSV attachment: bad utf-8"
        );
    }

    #[test]
    fn classification_messages_name_the_failure() {
        assert!(ClassificationError::NoScore.to_string().contains("no score found"));
        let err = ClassificationError::OutOfRange { value: "15".into() };
        assert!(err.to_string().contains("score out of range"));
        assert!(err.to_string().contains("15"));
    }

    #[test]
    fn url_error_keeps_offending_url() {
        let err = UrlError::from(ScrapeError::Fetch {
            url: "https://example.com/t/1".into(),
            reason: "HTTP 404".into(),
        });
        assert!(err.to_string().contains("https://example.com/t/1"));
    }
}
