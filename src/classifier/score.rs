//! Score extraction from classifier replies.
//!
//! The reply is untrusted free text. The default parse takes the first run of
//! decimal digits anywhere in it, in any script, so "I'd rate this around 7
//! out of 10" scores 7 and so does "٧". A reply that opens with an unrelated
//! number ("2 points stand out...") is misread as that number.
//! `ScoreFormat::Json` asks the model for `{"score": N}` and reads that first,
//! keeping digit extraction as the fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ClassificationError;

/// Highest valid relevance score.
pub const MAX_SCORE: u8 = 10;

static SCORE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid score pattern"));
static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("valid digit pattern"));

/// How the classifier is asked to phrase its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreFormat {
    /// Bare number, read by digit extraction.
    #[default]
    FreeText,
    /// JSON object with a `score` field, digit extraction as fallback.
    Json,
}

impl ScoreFormat {
    /// Instruction appended to the rubric for this format.
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            Self::FreeText => None,
            Self::Json => Some(
                "Respond with ONLY a JSON object of the form {\"score\": N} \
                 where N is an integer from 0 to 10.",
            ),
        }
    }
}

#[derive(Deserialize)]
struct ScoreReply {
    score: serde_json::Number,
}

/// Parse a classifier reply according to `format`.
pub fn parse_reply(reply: &str, format: ScoreFormat) -> Result<u8, ClassificationError> {
    if format == ScoreFormat::Json
        && let Some(score) = parse_json_score(reply)
    {
        return score;
    }
    parse_score(reply)
}

/// Take the first run of decimal digits in `reply` as a score in [0, 10].
pub fn parse_score(reply: &str) -> Result<u8, ClassificationError> {
    let digits = SCORE_DIGITS
        .find(reply)
        .ok_or(ClassificationError::NoScore)?
        .as_str();
    let ascii: String = digits
        .chars()
        .filter_map(digit_value)
        .filter_map(|d| char::from_digit(d, 10))
        .collect();
    bounded(&ascii)
}

/// Value of a Unicode decimal digit. Every script's digits are encoded as
/// contiguous runs of 0 through 9, so the value is the offset from the start
/// of the run.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    let is_digit = |c: char| DECIMAL_DIGIT.is_match(c.encode_utf8(&mut [0; 4]));
    if !is_digit(c) {
        return None;
    }
    let mut start = u32::from(c);
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32)
        && is_digit(prev)
    {
        start -= 1;
    }
    Some((u32::from(c) - start) % 10)
}

/// Read `{"score": N}` from a reply, tolerating markdown fences and
/// surrounding prose. `None` when the reply holds no such object.
pub fn parse_json_score(reply: &str) -> Option<Result<u8, ClassificationError>> {
    let json = extract_json_object(reply)?;
    let parsed: ScoreReply = serde_json::from_str(json).ok()?;
    Some(bounded(&parsed.score.to_string()))
}

fn bounded(value: &str) -> Result<u8, ClassificationError> {
    match value.parse::<u8>() {
        Ok(score) if score <= MAX_SCORE => Ok(score),
        _ => Err(ClassificationError::OutOfRange {
            value: value.to_string(),
        }),
    }
}

/// Slice the outermost `{...}` out of `text`.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
