//! Tender mail analysis pipeline.
//!
//! One email flows through:
//! 1. `mail::extract_csv()`: first CSV attachment as rows
//! 2. `mail::collect_urls()`: tender links from "url" columns
//! 3. `TenderSource::scrape()`: tender page to `TenderDetails`
//! 4. `TenderClassifier::classify()`: relevance score 0-10

pub mod analyzer;
pub mod types;

pub use analyzer::{AnalyzerConfig, MailAnalyzer, tender_urls};
pub use types::{AnalysisResult, MailReport, UrlOutcome};
