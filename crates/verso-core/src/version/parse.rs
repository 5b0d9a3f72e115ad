//! API version parsing
//!
//! Grammar: `[yyyy-MM-dd][(.|-)major[.minor]][-status]`, where the group
//! version and the numeric part may each be omitted but not both.

use super::ApiVersion;
use chrono::NaiveDate;
use std::fmt;

/// Error produced when text is not a valid API version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiVersionParseError {
    /// The text was empty or whitespace
    #[error("the API version text is empty")]
    Empty,
    /// The group version was shaped like a date but is not a calendar date
    #[error("'{0}' is not a valid group version; expected yyyy-MM-dd")]
    InvalidGroupVersion(String),
    /// A major or minor number was missing or out of range
    #[error("'{0}' is not a valid API version number")]
    InvalidNumber(String),
    /// The status did not match `letter (letter|digit|'.')*`
    #[error("'{0}' is not a valid API version status")]
    InvalidStatus(String),
    /// A status was given without a group or major version
    #[error("an API version status requires a group or major version")]
    StatusWithoutVersion,
    /// A minor version was given without a major version
    #[error("an API version minor number requires a major number")]
    MinorWithoutMajor,
    /// The text does not follow the grammar
    #[error("'{0}' is not a valid API version")]
    Malformed(String),
}

/// Converts raw request text into an [`ApiVersion`].
///
/// The parser is pluggable so hosts can accept extra spellings (for example a
/// `v` prefix) without changing the readers that feed it.
pub trait ApiVersionParser: Send + Sync + fmt::Debug {
    /// Parse `text` into a version.
    fn parse(&self, text: &str) -> Result<ApiVersion, ApiVersionParseError>;

    /// Parse `text`, returning `None` when it is not a valid version.
    fn try_parse(&self, text: &str) -> Option<ApiVersion> {
        self.parse(text).ok()
    }

    /// Parse text that may legitimately be absent.
    ///
    /// Empty or whitespace-only text means "no version requested" and yields
    /// `Ok(None)`; it never yields [`ApiVersion::NEUTRAL`].
    fn parse_optional(&self, text: &str) -> Result<Option<ApiVersion>, ApiVersionParseError> {
        if text.trim().is_empty() {
            Ok(None)
        } else {
            self.parse(text).map(Some)
        }
    }
}

/// The standard grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApiVersionParser;

impl ApiVersionParser for DefaultApiVersionParser {
    fn parse(&self, text: &str) -> Result<ApiVersion, ApiVersionParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiVersionParseError::Empty);
        }

        if !looks_like_date(text) {
            let (major, minor, status) = parse_numeric(text, text)?;
            return build(None, Some(major), minor, status, text);
        }

        let group = NaiveDate::parse_from_str(&text[..10], "%Y-%m-%d")
            .map_err(|_| ApiVersionParseError::InvalidGroupVersion(text[..10].to_string()))?;
        let rest = &text[10..];

        if rest.is_empty() {
            return Ok(ApiVersion::from_date(group));
        }

        let (separator, tail) = rest.split_at(1);
        if separator != "." && separator != "-" {
            return Err(ApiVersionParseError::Malformed(text.to_string()));
        }

        if tail.starts_with(|c: char| c.is_ascii_digit()) {
            let (major, minor, status) = parse_numeric(tail, text)?;
            build(Some(group), Some(major), minor, status, text)
        } else if separator == "-" {
            build(Some(group), None, None, Some(tail), text)
        } else {
            Err(ApiVersionParseError::Malformed(text.to_string()))
        }
    }
}

/// A date prefix is exactly `dddd-dd-dd` followed by the end of the text or a
/// separator. Anything else, such as `2016-beta`, is a major version.
fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 10 {
        return false;
    }

    let digits_at = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    digits_at(0..4)
        && bytes[4] == b'-'
        && digits_at(5..7)
        && bytes[7] == b'-'
        && digits_at(8..10)
        && bytes.get(10).map_or(true, |b| *b == b'.' || *b == b'-')
}

type Numeric<'a> = (u32, Option<u32>, Option<&'a str>);

/// Parse `major[.minor][-status]`.
fn parse_numeric<'a>(text: &'a str, whole: &str) -> Result<Numeric<'a>, ApiVersionParseError> {
    let (major, rest) = take_number(text, whole)?;

    let (minor, rest) = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let (minor, rest) = take_number(after_dot, whole)?;
            (Some(minor), rest)
        }
        None => (None, rest),
    };

    if rest.is_empty() {
        return Ok((major, minor, None));
    }

    match rest.strip_prefix('-') {
        Some(status) => Ok((major, minor, Some(status))),
        None => Err(ApiVersionParseError::Malformed(whole.to_string())),
    }
}

fn take_number<'a>(text: &'a str, whole: &str) -> Result<(u32, &'a str), ApiVersionParseError> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());

    if end == 0 {
        return Err(ApiVersionParseError::Malformed(whole.to_string()));
    }

    let number = text[..end]
        .parse()
        .map_err(|_| ApiVersionParseError::InvalidNumber(text[..end].to_string()))?;
    Ok((number, &text[end..]))
}

fn build(
    group: Option<NaiveDate>,
    major: Option<u32>,
    minor: Option<u32>,
    status: Option<&str>,
    whole: &str,
) -> Result<ApiVersion, ApiVersionParseError> {
    if let Some(status) = status {
        if !ApiVersion::is_valid_status(status) {
            return Err(ApiVersionParseError::InvalidStatus(status.to_string()));
        }
    }

    ApiVersion::from_parts(group, major, minor, status)
        .map_err(|_| ApiVersionParseError::Malformed(whole.to_string()))
}
