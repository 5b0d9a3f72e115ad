//! Sunset policies
//!
//! A sunset policy tells clients when a version stops being served and where
//! to read about it. Policies are keyed by API group name, version, or both.

use crate::ApiVersion;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// A `Link` header value describing a related resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHeaderValue {
    uri: String,
    relation: String,
    title: Option<String>,
    media_type: Option<String>,
    languages: Vec<String>,
}

impl LinkHeaderValue {
    /// Create a link with the given relation type.
    pub fn new(uri: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            relation: relation.into(),
            title: None,
            media_type: None,
            languages: Vec::new(),
        }
    }

    /// A `rel="sunset"` link.
    pub fn sunset(uri: impl Into<String>) -> Self {
        Self::new(uri, "sunset")
    }

    /// Set the human-readable title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the media type of the linked resource.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Add a language the linked resource is available in.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }
}

impl fmt::Display for LinkHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>; rel=\"{}\"", self.uri, self.relation)?;
        if let Some(media_type) = &self.media_type {
            write!(f, "; type=\"{}\"", media_type)?;
        }
        if let Some(title) = &self.title {
            write!(f, "; title=\"{}\"", title)?;
        }
        for language in &self.languages {
            write!(f, "; hreflang=\"{}\"", language)?;
        }
        Ok(())
    }
}

/// When a version is retired and where to find out more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SunsetPolicy {
    date: Option<DateTime<Utc>>,
    links: Vec<LinkHeaderValue>,
}

impl SunsetPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retirement date.
    pub fn effective(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Add a link. Only `rel="sunset"` links are reported.
    pub fn link(mut self, link: LinkHeaderValue) -> Self {
        self.links.push(link);
        self
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn links(&self) -> &[LinkHeaderValue] {
        &self.links
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    /// The `Sunset` header value, an IMF-fixdate.
    pub fn header_value(&self) -> Option<String> {
        self.date
            .map(|date| date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    }

    /// `Link` header values for the sunset links of this policy.
    pub fn link_header_values(&self) -> impl Iterator<Item = String> + '_ {
        self.links
            .iter()
            .filter(|link| link.relation.eq_ignore_ascii_case("sunset"))
            .map(ToString::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PolicyKey {
    name: Option<String>,
    version: Option<ApiVersion>,
}

impl PolicyKey {
    fn new(name: Option<&str>, version: Option<&ApiVersion>) -> Self {
        Self {
            name: name.map(|n| n.to_ascii_lowercase()),
            version: version.cloned(),
        }
    }
}

/// Registry of sunset policies.
///
/// Lookup tries the name and version together, then the name alone, then the
/// version alone. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct SunsetPolicyManager {
    policies: HashMap<PolicyKey, SunsetPolicy>,
}

impl SunsetPolicyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy for an API group and version.
    pub fn add(mut self, name: &str, version: ApiVersion, policy: SunsetPolicy) -> Self {
        self.policies
            .insert(PolicyKey::new(Some(name), Some(&version)), policy);
        self
    }

    /// Register a policy for every version of an API group.
    pub fn add_for_name(mut self, name: &str, policy: SunsetPolicy) -> Self {
        self.policies.insert(PolicyKey::new(Some(name), None), policy);
        self
    }

    /// Register a policy for a version of any API group.
    pub fn add_for_version(mut self, version: ApiVersion, policy: SunsetPolicy) -> Self {
        self.policies.insert(PolicyKey::new(None, Some(&version)), policy);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Find the policy that applies to `name` and `version`.
    pub fn resolve(&self, name: Option<&str>, version: Option<&ApiVersion>) -> Option<&SunsetPolicy> {
        if name.is_some() {
            if version.is_some() {
                if let Some(policy) = self.policies.get(&PolicyKey::new(name, version)) {
                    return Some(policy);
                }
            }
            if let Some(policy) = self.policies.get(&PolicyKey::new(name, None)) {
                return Some(policy);
            }
        }

        version.and_then(|version| self.policies.get(&PolicyKey::new(None, Some(version))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sunset_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 6, 8, 49, 37).unwrap()
    }

    #[test]
    fn test_sunset_header_is_imf_fixdate() {
        let policy = SunsetPolicy::new().effective(sunset_date());
        assert_eq!(
            policy.header_value().as_deref(),
            Some("Thu, 06 Nov 2025 08:49:37 GMT")
        );
        assert_eq!(SunsetPolicy::new().header_value(), None);
    }

    #[test]
    fn test_link_header_values() {
        let policy = SunsetPolicy::new()
            .link(
                LinkHeaderValue::sunset("https://example.com/policy")
                    .title("Versioning Policy")
                    .media_type("text/html"),
            )
            .link(LinkHeaderValue::new("https://example.com/docs", "help"));

        let values: Vec<String> = policy.link_header_values().collect();
        assert_eq!(
            values,
            vec![
                "<https://example.com/policy>; rel=\"sunset\"; type=\"text/html\"; title=\"Versioning Policy\""
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_resolve_order() {
        let v1 = ApiVersion::new(1, 0);
        let exact = SunsetPolicy::new().effective(sunset_date());
        let by_name = SunsetPolicy::new().link(LinkHeaderValue::sunset("https://a"));
        let by_version = SunsetPolicy::new().link(LinkHeaderValue::sunset("https://b"));

        let manager = SunsetPolicyManager::new()
            .add("Orders", v1.clone(), exact.clone())
            .add_for_name("Orders", by_name.clone())
            .add_for_version(v1.clone(), by_version.clone());

        assert_eq!(manager.resolve(Some("orders"), Some(&v1)), Some(&exact));
        assert_eq!(
            manager.resolve(Some("ORDERS"), Some(&ApiVersion::new(2, 0))),
            Some(&by_name)
        );
        assert_eq!(manager.resolve(Some("Customers"), Some(&v1)), Some(&by_version));
        assert_eq!(manager.resolve(None, Some(&v1)), Some(&by_version));
        assert_eq!(manager.resolve(None, Some(&ApiVersion::new(3, 0))), None);
    }
}
