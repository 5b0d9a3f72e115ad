//! API version value type
//!
//! An [`ApiVersion`] combines an optional calendar *group version*, optional
//! major and minor numbers and an optional *status* qualifier such as `beta`.
//!
//! Supported textual forms:
//! - `1`, `1.0`, `2.1-beta` (major, optional minor, optional status)
//! - `2016-07-09` (group version only)
//! - `2016-07-09.3.0`, `2016-07-09-rc` (group version with numbers or status)

mod format;
mod parse;

pub use format::{FormatError, FormattedApiVersion};
pub use parse::{ApiVersionParseError, ApiVersionParser, DefaultApiVersionParser};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single API version.
///
/// Versions are totally ordered by group version, then major, then minor, then
/// status. An absent component sorts before any present one, so `1` < `1.0`,
/// and a version without a status sorts before the same version with one.
/// Status text is compared ASCII case-insensitively, both for ordering and for
/// equality.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    group_version: Option<NaiveDate>,
    major: Option<u32>,
    minor: Option<u32>,
    status: Option<String>,
}

impl ApiVersion {
    /// The version-neutral sentinel: no component is set.
    pub const NEUTRAL: ApiVersion = ApiVersion {
        group_version: None,
        major: None,
        minor: None,
        status: None,
    };

    /// The conventional default version, `1.0`.
    pub const DEFAULT: ApiVersion = ApiVersion {
        group_version: None,
        major: Some(1),
        minor: Some(0),
        status: None,
    };

    /// Create a `major.minor` version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            group_version: None,
            major: Some(major),
            minor: Some(minor),
            status: None,
        }
    }

    /// Create a version with only a major number. The minor version is
    /// absent, which is distinct from an explicit `0`.
    pub const fn from_major(major: u32) -> Self {
        Self {
            group_version: None,
            major: Some(major),
            minor: None,
            status: None,
        }
    }

    /// Create a version consisting only of a group version.
    pub const fn from_date(group_version: NaiveDate) -> Self {
        Self {
            group_version: Some(group_version),
            major: None,
            minor: None,
            status: None,
        }
    }

    /// Create a version from all of its components.
    ///
    /// An empty status is treated as no status. A minor version requires a
    /// major version, and a status requires a group or major version.
    pub fn from_parts(
        group_version: Option<NaiveDate>,
        major: Option<u32>,
        minor: Option<u32>,
        status: Option<&str>,
    ) -> Result<Self, ApiVersionParseError> {
        if minor.is_some() && major.is_none() {
            return Err(ApiVersionParseError::MinorWithoutMajor);
        }

        let status = match status.filter(|s| !s.is_empty()) {
            Some(status) => {
                if !Self::is_valid_status(status) {
                    return Err(ApiVersionParseError::InvalidStatus(status.to_string()));
                }
                if group_version.is_none() && major.is_none() {
                    return Err(ApiVersionParseError::StatusWithoutVersion);
                }
                Some(status.to_string())
            }
            None => None,
        };

        Ok(Self {
            group_version,
            major,
            minor,
            status,
        })
    }

    /// Return a copy of this version with the given status.
    pub fn with_status(self, status: &str) -> Result<Self, ApiVersionParseError> {
        Self::from_parts(self.group_version, self.major, self.minor, Some(status))
    }

    /// The group version, if any.
    pub fn group_version(&self) -> Option<NaiveDate> {
        self.group_version
    }

    /// The major version, if any.
    pub fn major_version(&self) -> Option<u32> {
        self.major
    }

    /// The minor version, if any.
    pub fn minor_version(&self) -> Option<u32> {
        self.minor
    }

    /// The status qualifier, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether this is the [`ApiVersion::NEUTRAL`] sentinel.
    pub fn is_neutral(&self) -> bool {
        self.group_version.is_none()
            && self.major.is_none()
            && self.minor.is_none()
            && self.status.is_none()
    }

    /// Check whether `status` is a valid status qualifier: an ASCII letter
    /// followed by any number of ASCII letters, digits or periods.
    pub fn is_valid_status(status: &str) -> bool {
        let mut chars = status.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '.')
            }
            _ => false,
        }
    }

    /// Parse a version with the default grammar.
    pub fn parse(text: &str) -> Result<Self, ApiVersionParseError> {
        DefaultApiVersionParser.parse(text)
    }

    /// Parse a version, returning `None` when the text is not a valid version.
    pub fn try_parse(text: &str) -> Option<Self> {
        DefaultApiVersionParser.try_parse(text)
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn compare_status(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => left
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(right.bytes().map(|b| b.to_ascii_lowercase())),
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group_version
            .cmp(&other.group_version)
            .then_with(|| self.major.cmp(&other.major))
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| compare_status(self.status(), other.status()))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_version.hash(state);
        self.major.hash(state);
        self.minor.hash(state);
        match &self.status {
            Some(status) => {
                state.write_u8(1);
                for b in status.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
            None => state.write_u8(0),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format::write_full(self, f, false)
    }
}

impl FromStr for ApiVersion {
    type Err = ApiVersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_validity() {
        assert!(ApiVersion::is_valid_status("beta"));
        assert!(ApiVersion::is_valid_status("rc.1"));
        assert!(ApiVersion::is_valid_status("Alpha2"));
        assert!(!ApiVersion::is_valid_status("1beta"));
        assert!(!ApiVersion::is_valid_status("be ta"));
        assert!(!ApiVersion::is_valid_status(".beta"));
        assert!(!ApiVersion::is_valid_status(""));
    }

    #[test]
    fn test_from_parts_rejects_orphans() {
        assert_eq!(
            ApiVersion::from_parts(None, None, Some(1), None),
            Err(ApiVersionParseError::MinorWithoutMajor)
        );
        assert_eq!(
            ApiVersion::from_parts(None, None, None, Some("beta")),
            Err(ApiVersionParseError::StatusWithoutVersion)
        );
        assert!(matches!(
            ApiVersion::from_parts(None, Some(1), None, Some("1x")),
            Err(ApiVersionParseError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_empty_status_is_no_status() {
        let version = ApiVersion::from_parts(None, Some(1), Some(0), Some("")).unwrap();
        assert_eq!(version.status(), None);
        assert_eq!(version, ApiVersion::new(1, 0));
    }

    #[test]
    fn test_neutral() {
        assert!(ApiVersion::NEUTRAL.is_neutral());
        assert!(!ApiVersion::DEFAULT.is_neutral());
        assert_eq!(ApiVersion::NEUTRAL.to_string(), "");
    }

    #[test]
    fn test_minor_absent_is_not_zero() {
        assert_ne!(ApiVersion::from_major(1), ApiVersion::new(1, 0));
        assert!(ApiVersion::from_major(1) < ApiVersion::new(1, 0));
    }

    #[test]
    fn test_ordering() {
        let mut versions = vec![
            ApiVersion::new(2, 0),
            ApiVersion::new(1, 0).with_status("beta").unwrap(),
            ApiVersion::from_date(date(2016, 7, 9)),
            ApiVersion::new(1, 0),
            ApiVersion::new(1, 1),
        ];
        versions.sort();

        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["1.0", "1.0-beta", "1.1", "2.0", "2016-07-09"]
        );
    }

    #[test]
    fn test_status_is_case_insensitive() {
        let lower = ApiVersion::new(1, 0).with_status("beta").unwrap();
        let upper = ApiVersion::new(1, 0).with_status("BETA").unwrap();
        assert_eq!(lower, upper);

        let mut set = HashSet::new();
        set.insert(lower);
        assert!(set.contains(&upper));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let version: ApiVersion = serde_json::from_str("\"2.1-beta\"").unwrap();
        assert_eq!(version, ApiVersion::new(2, 1).with_status("beta").unwrap());
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"2.1-beta\"");
        assert!(serde_json::from_str::<ApiVersion>("\"x\"").is_err());
    }

    fn version_strategy() -> impl Strategy<Value = ApiVersion> {
        let group = proptest::option::of((2000i32..2100, 1u32..=12, 1u32..=28));
        let numbers = proptest::option::of((0u32..1000, proptest::option::of(0u32..1000)));
        let status = proptest::option::of("[a-zA-Z][a-zA-Z0-9.]{0,6}");

        (group, numbers, status).prop_filter_map("orphan status", |(group, numbers, status)| {
            let group = group.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
            let (major, minor) = match numbers {
                Some((major, minor)) => (Some(major), minor),
                None => (None, None),
            };
            if group.is_none() && major.is_none() {
                return None;
            }
            ApiVersion::from_parts(group, major, minor, status.as_deref()).ok()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_display_round_trips(version in version_strategy()) {
            let text = version.to_string();
            let parsed = ApiVersion::parse(&text).unwrap();
            prop_assert_eq!(&parsed, &version);
            prop_assert_eq!(parsed.minor_version(), version.minor_version());
        }

        #[test]
        fn prop_ordering_is_total(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            let relations = [a < b, a == b, a > b];
            prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);

            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn prop_sorting_is_stable(mut versions in proptest::collection::vec(version_strategy(), 0..20)) {
            versions.sort();
            let once = versions.clone();
            versions.reverse();
            versions.sort();
            prop_assert_eq!(once, versions);
        }
    }
}
