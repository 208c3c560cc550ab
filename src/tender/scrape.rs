//! Tender detail page scraper.
//!
//! A tender page is recognised by its listing container; inside it, each
//! `list-desc` block pairs a `<label for="...">` with a `list-desc-inner`
//! value. Only the agency, category and description blocks are kept.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::{ConfigError, ScrapeError};
use crate::tender::types::TenderDetails;

/// Desktop Chrome UA; the tender portal rejects unidentified clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.box.boxW.listInner").expect("valid container selector"));
static DESC_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.list-desc").expect("valid block selector"));
static LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("label").expect("valid label selector"));
static DESC_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.list-desc-inner").expect("valid value selector"));

const AGENCY_LABEL: &str = "Agency";
const CATEGORY_LABEL: &str = "Category";
const DESCRIPTION_LABEL: &str = "Description";

/// Anything that can turn a tender URL into `TenderDetails`.
#[async_trait]
pub trait TenderSource: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<TenderDetails, ScrapeError>;
}

/// HTTP settings for the scraper.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub user_agent: String,
    /// Whole-request timeout; expiry is reported as a fetch failure.
    pub timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches tender pages over HTTP, one attempt per URL.
pub struct TenderScraper {
    client: Client,
}

impl TenderScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "scraper".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response.text().await.map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })
    }
}

#[async_trait]
impl TenderSource for TenderScraper {
    async fn scrape(&self, url: &str) -> Result<TenderDetails, ScrapeError> {
        debug!(url = %url, "Fetching tender page");
        let html = self.fetch(url).await?;
        let tender = extract_tender_details(&html, url)?;
        info!(url = %url, agency = %tender.agency, "Scraped tender");
        Ok(tender)
    }
}

/// Extract tender fields from a fetched page.
///
/// Fails only when the listing container is missing; absent labels yield
/// empty fields.
pub fn extract_tender_details(html: &str, url: &str) -> Result<TenderDetails, ScrapeError> {
    let document = Html::parse_document(html);
    let content = document
        .select(&CONTAINER)
        .next()
        .ok_or_else(|| ScrapeError::Parse {
            url: url.to_string(),
            reason: "tender listing container not found".into(),
        })?;

    let mut details: HashMap<String, String> = HashMap::new();
    for block in content.select(&DESC_BLOCK) {
        let Some(label) = block.select(&LABEL).next() else {
            continue;
        };
        let Some(value) = block.select(&DESC_VALUE).next() else {
            continue;
        };
        let key = label_key(label.value().attr("for").unwrap_or_default());
        details.insert(key, element_text(value));
    }

    let mut take = |label: &str| details.remove(label).unwrap_or_default();
    Ok(TenderDetails {
        description: take(DESCRIPTION_LABEL),
        category: take(CATEGORY_LABEL),
        agency: take(AGENCY_LABEL),
        url: url.to_string(),
    })
}

/// Turn a label's `for` attribute into a display key:
/// `contract_value` becomes `Contract Value`.
pub fn label_key(for_attr: &str) -> String {
    let mut key = String::with_capacity(for_attr.len());
    let mut word_start = true;
    for ch in for_attr.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if word_start {
            key.extend(ch.to_uppercase());
        } else {
            key.extend(ch.to_lowercase());
        }
        word_start = !ch.is_alphabetic();
    }
    key
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}
