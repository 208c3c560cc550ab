//! Configuration types.
//!
//! Only the binary reads the environment. Library components take their
//! config structs by value.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::classifier::{ClassifierConfig, ScoreFormat};
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::pipeline::AnalyzerConfig;
use crate::tender::ScraperConfig;

/// Scores strictly above this are worth a notification.
pub const DEFAULT_MIN_SCORE: u8 = 6;

/// Everything the CLI needs to build an analyzer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub scraper: ScraperConfig,
    pub classifier: ClassifierConfig,
    pub analyzer: AnalyzerConfig,
    pub min_score: u8,
}

impl AppConfig {
    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values fall back
    /// to defaults; values that are set but unparseable are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("TENDER_LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>()?,
            None => LlmBackend::OpenAi,
        };
        let key_var = backend.api_key_var();
        let api_key = var(key_var).ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;
        let model = var("TENDER_LLM_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let min_score: u8 = parse_or("TENDER_MIN_SCORE", var("TENDER_MIN_SCORE"), DEFAULT_MIN_SCORE)?;
        if min_score > crate::classifier::MAX_SCORE {
            return Err(ConfigError::InvalidValue {
                key: "TENDER_MIN_SCORE".into(),
                message: format!("{min_score} is above the maximum score"),
            });
        }

        let mut scraper = ScraperConfig::default();
        if let Some(secs) = parse_opt::<u64>("TENDER_HTTP_TIMEOUT_SECS", var("TENDER_HTTP_TIMEOUT_SECS"))? {
            scraper.timeout = Duration::from_secs(secs);
        }

        let mut classifier = ClassifierConfig::default();
        if let Some(secs) =
            parse_opt::<u64>("TENDER_CLASSIFY_TIMEOUT_SECS", var("TENDER_CLASSIFY_TIMEOUT_SECS"))?
        {
            classifier.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = var("TENDER_SCORE_FORMAT") {
            classifier.score_format = parse_score_format(&raw)?;
        }

        let analyzer = AnalyzerConfig {
            max_concurrent_urls: parse_or(
                "TENDER_MAX_CONCURRENT_URLS",
                var("TENDER_MAX_CONCURRENT_URLS"),
                AnalyzerConfig::default().max_concurrent_urls,
            )?,
        };

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            scraper,
            classifier,
            analyzer,
            min_score,
        })
    }
}

fn parse_opt<T>(key: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|raw| {
        raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        })
    })
    .transpose()
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(key, raw)?.unwrap_or(default))
}

fn parse_score_format(raw: &str) -> Result<ScoreFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "text" | "free_text" | "freetext" => Ok(ScoreFormat::FreeText),
        "json" => Ok(ScoreFormat::Json),
        other => Err(ConfigError::InvalidValue {
            key: "TENDER_SCORE_FORMAT".into(),
            message: format!("unknown format '{other}' (expected text or json)"),
        }),
    }
}
