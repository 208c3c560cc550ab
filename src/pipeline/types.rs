//! Shared types for the mail analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::UrlError;
use crate::tender::TenderDetails;

// ── Analysis result ─────────────────────────────────────────────────

/// A scraped and scored tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub tender: TenderDetails,
    /// Relevance score in `0..=10`.
    pub score: u8,
    /// The summary the score was given for.
    pub rationale: String,
}

impl AnalysisResult {
    /// Worth notifying about: strictly above `threshold`.
    pub fn is_notable(&self, threshold: u8) -> bool {
        self.score > threshold
    }
}

// ── Per-URL outcome ─────────────────────────────────────────────────

/// What happened to one tender URL.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlOutcome {
    Success(AnalysisResult),
    Failure {
        url: String,
        #[serde(serialize_with = "serialize_error")]
        error: UrlError,
    },
}

impl UrlOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Success(result) => &result.tender.url,
            Self::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

fn serialize_error<S: Serializer>(error: &UrlError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

// ── Mail report ─────────────────────────────────────────────────────

/// Every URL outcome of one analyzed email, in URL order.
#[derive(Debug, Serialize)]
pub struct MailReport {
    pub outcomes: Vec<UrlOutcome>,
    pub analyzed_at: DateTime<Utc>,
}

impl MailReport {
    pub fn new(outcomes: Vec<UrlOutcome>) -> Self {
        Self {
            outcomes,
            analyzed_at: Utc::now(),
        }
    }

    pub fn successes(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            UrlOutcome::Success(result) => Some(result),
            UrlOutcome::Failure { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &UrlError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            UrlOutcome::Failure { url, error } => Some((url.as_str(), error)),
            UrlOutcome::Success(_) => None,
        })
    }

    /// Results scoring strictly above `threshold`.
    pub fn notable(&self, threshold: u8) -> impl Iterator<Item = &AnalysisResult> {
        self.successes().filter(move |result| result.is_notable(threshold))
    }

    /// Drop failures, keeping successful results in URL order.
    pub fn into_results(self) -> Vec<AnalysisResult> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                UrlOutcome::Success(result) => Some(result),
                UrlOutcome::Failure { .. } => None,
            })
            .collect()
    }
}
