//! Version reporting headers
//!
//! Responses advertise the versions the matched API supports and deprecates,
//! along with any sunset policy for the version that served the request.

use http::header::{HeaderName, LINK};
use http::{HeaderMap, HeaderValue};
use std::fmt;
use std::sync::Arc;
use verso_core::{trace_debug, ApiVersion, ApiVersionModel, SunsetPolicyManager};

/// Header listing supported versions.
pub const API_SUPPORTED_VERSIONS: &str = "api-supported-versions";
/// Header listing deprecated versions.
pub const API_DEPRECATED_VERSIONS: &str = "api-deprecated-versions";
/// Header carrying the retirement date of the version (RFC 8594).
pub const SUNSET: &str = "sunset";

/// Writes version information onto response headers.
pub trait ApiVersionReporter: Send + Sync + fmt::Debug {
    /// Report `model` for the API `name`, served at `version`.
    fn report(
        &self,
        headers: &mut HeaderMap,
        model: &ApiVersionModel,
        name: Option<&str>,
        version: Option<&ApiVersion>,
    );
}

/// Join versions as `1.0, 2.0`.
pub fn format_versions(versions: &[ApiVersion]) -> String {
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The standard reporter.
///
/// Writes `api-supported-versions` and `api-deprecated-versions` (sorted,
/// comma separated, omitted when empty), then `Sunset` and `Link` headers
/// from the matching sunset policy. Version-neutral APIs report nothing.
#[derive(Debug, Clone)]
pub struct DefaultApiVersionReporter {
    supported_header: HeaderName,
    deprecated_header: HeaderName,
    sunset_policies: Arc<SunsetPolicyManager>,
}

impl Default for DefaultApiVersionReporter {
    fn default() -> Self {
        Self {
            supported_header: HeaderName::from_static(API_SUPPORTED_VERSIONS),
            deprecated_header: HeaderName::from_static(API_DEPRECATED_VERSIONS),
            sunset_policies: Arc::new(SunsetPolicyManager::new()),
        }
    }
}

impl DefaultApiVersionReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom header names.
    pub fn headers(mut self, supported: HeaderName, deprecated: HeaderName) -> Self {
        self.supported_header = supported;
        self.deprecated_header = deprecated;
        self
    }

    pub fn sunset_policies(mut self, policies: SunsetPolicyManager) -> Self {
        self.sunset_policies = Arc::new(policies);
        self
    }

    pub fn supported_header(&self) -> &HeaderName {
        &self.supported_header
    }

    pub fn deprecated_header(&self) -> &HeaderName {
        &self.deprecated_header
    }
}

fn insert_versions(headers: &mut HeaderMap, name: &HeaderName, versions: &[ApiVersion]) {
    if versions.is_empty() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&format_versions(versions)) {
        headers.insert(name.clone(), value);
    }
}

impl ApiVersionReporter for DefaultApiVersionReporter {
    fn report(
        &self,
        headers: &mut HeaderMap,
        model: &ApiVersionModel,
        name: Option<&str>,
        version: Option<&ApiVersion>,
    ) {
        if model.is_api_version_neutral() {
            return;
        }

        insert_versions(headers, &self.supported_header, model.supported_api_versions());
        insert_versions(headers, &self.deprecated_header, model.deprecated_api_versions());

        let Some(policy) = self.sunset_policies.resolve(name, version) else {
            return;
        };
        trace_debug!(api = ?name, version = ?version, "Reporting sunset policy");

        if let Some(value) = policy.header_value() {
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(HeaderName::from_static(SUNSET), value);
            }
        }
        for link in policy.link_header_values() {
            if let Ok(value) = HeaderValue::from_str(&link) {
                headers.append(LINK, value);
            }
        }
    }
}
