//! Relevance classifier. Scores a tender summary 0-10 against a rubric.

pub mod score;

pub use score::{MAX_SCORE, ScoreFormat, parse_reply, parse_score};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ClassificationError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

/// Default rubric: fit of a tender for a research software non-profit.
pub const DEFAULT_RUBRIC: &str = "We are a small non-profit company that specialises in \
     building software and data solutions for the research sector. We build web, desktop and \
     data engineering applications. Domains that we service include biomedical, \
     bioinformatics, statistics, eresearch, life sciences, agriculture, sensitive data and \
     geospatial. Please assess the grant below and respond with only a score from 0-10 where \
     0 indicates a poor fit, and 10 indicates a perfect fit for our company.";

/// Anything that can score a tender summary.
#[async_trait]
pub trait TenderClassifier: Send + Sync {
    async fn classify(&self, tender_summary: &str) -> Result<u8, ClassificationError>;
}

/// Classifier settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// System instruction sent ahead of every summary.
    pub rubric: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one classifier call.
    pub timeout: Duration,
    pub score_format: ScoreFormat,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rubric: DEFAULT_RUBRIC.to_string(),
            temperature: 0.7,
            max_tokens: 256,
            timeout: Duration::from_secs(60),
            score_format: ScoreFormat::FreeText,
        }
    }
}

/// Scores tenders through an `LlmProvider`.
pub struct RelevanceClassifier {
    llm: Arc<dyn LlmProvider>,
    config: ClassifierConfig,
}

impl RelevanceClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, config: ClassifierConfig) -> Self {
        Self { llm, config }
    }

    fn system_prompt(&self) -> String {
        match self.config.score_format.instruction() {
            Some(instruction) => format!("{}\n\n{}", self.config.rubric, instruction),
            None => self.config.rubric.clone(),
        }
    }
}

#[async_trait]
impl TenderClassifier for RelevanceClassifier {
    async fn classify(&self, tender_summary: &str) -> Result<u8, ClassificationError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(tender_summary),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout, self.llm.complete(request))
            .await
            .map_err(|_| ClassificationError::Timeout(self.config.timeout))??;

        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Classifier replied"
        );

        parse_reply(&response.content, self.config.score_format).inspect_err(|e| {
            warn!(raw_response = %response.content, error = %e, "Unusable classifier reply");
        })
    }
}
