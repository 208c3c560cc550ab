//! Tender Scout: scores the tenders listed in alert emails.

pub mod classifier;
pub mod config;
pub mod error;
pub mod llm;
pub mod mail;
pub mod pipeline;
pub mod tender;
