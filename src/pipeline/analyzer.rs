//! Mail analyzer: turns one tender email into scored tenders.
//!
//! Flow:
//! 1. MIME extraction → first `text/csv` attachment as rows
//! 2. URL collection → every cell under a "url" column
//! 3. Per URL: scrape → summarize → classify
//!
//! A URL that fails to scrape or classify is logged and skipped. It never
//! aborts the rest of the email.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::classifier::TenderClassifier;
use crate::error::{AnalysisError, UrlError};
use crate::mail::{collect_urls, extract_csv};
use crate::pipeline::types::{AnalysisResult, MailReport, UrlOutcome};
use crate::tender::TenderSource;

/// Analyzer settings.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// URLs processed at once. Output order is URL order regardless.
    pub max_concurrent_urls: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_urls: 1,
        }
    }
}

/// Orchestrates extraction, scraping and classification for one email.
pub struct MailAnalyzer {
    source: Arc<dyn TenderSource>,
    classifier: Arc<dyn TenderClassifier>,
    config: AnalyzerConfig,
}

impl MailAnalyzer {
    pub fn new(
        source: Arc<dyn TenderSource>,
        classifier: Arc<dyn TenderClassifier>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            config,
        }
    }

    /// Analyze an email, returning successful results in URL order.
    pub async fn analyze_mail(&self, raw_email: &[u8]) -> Result<Vec<AnalysisResult>, AnalysisError> {
        Ok(self.analyze_mail_report(raw_email).await?.into_results())
    }

    /// Analyze an email, keeping every per-URL failure alongside the results.
    pub async fn analyze_mail_report(&self, raw_email: &[u8]) -> Result<MailReport, AnalysisError> {
        let urls = tender_urls(raw_email)?;
        let total = urls.len();
        info!(count = total, "Analyzing tender URLs");

        let concurrency = self.config.max_concurrent_urls.max(1);
        let outcomes: Vec<UrlOutcome> = stream::iter(urls)
            .map(|url| self.process_url(url))
            .buffered(concurrency)
            .collect()
            .await;

        let report = MailReport::new(outcomes);
        info!(
            analyzed = report.successes().count(),
            total,
            "Mail analysis complete"
        );
        Ok(report)
    }

    /// Scrape and score a single tender page.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, UrlError> {
        let tender = self.source.scrape(url).await?;
        let summary = tender.summary();
        let score = self.classifier.classify(&summary).await?;
        debug!(url, score, "Tender scored");

        Ok(AnalysisResult {
            tender,
            score,
            rationale: summary,
        })
    }

    async fn process_url(&self, url: String) -> UrlOutcome {
        match self.analyze_url(&url).await {
            Ok(result) => UrlOutcome::Success(result),
            Err(error) => {
                warn!(url = %url, error = %error, "Skipping tender URL");
                UrlOutcome::Failure { url, error }
            }
        }
    }
}

/// Tender URLs listed in the email's CSV attachment, in row order.
pub fn tender_urls(raw_email: &[u8]) -> Result<Vec<String>, AnalysisError> {
    let rows = extract_csv(raw_email)?.ok_or(AnalysisError::NoAttachment)?;
    let urls = collect_urls(&rows);
    if urls.is_empty() {
        return Err(AnalysisError::NoUrls);
    }
    debug!(rows = rows.len(), urls = urls.len(), "Collected tender URLs");
    Ok(urls)
}
