//! Tender detail pages: record type and HTTP scraper.

pub mod scrape;
pub mod types;

pub use scrape::{ScraperConfig, TenderScraper, TenderSource, extract_tender_details};
pub use types::TenderDetails;
