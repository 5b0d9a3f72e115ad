//! Request-scoped versioning state
//!
//! The feature is stored in the request's [`http::Extensions`]. It is a cheap
//! handle; clones share the same state, so values cached while routing are
//! visible during dispatch.

use crate::reader::{ApiVersionReader, ApiVersionSource, RawApiVersions};
use http::request::Parts;
use http::Extensions;
use std::sync::{Arc, OnceLock};
use verso_core::{trace_debug, ApiVersion, ApiVersionParseError, ApiVersionParser};

/// What the client asked for, after reading and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedApiVersion {
    /// The request carried no version
    Unspecified,
    /// The request carried exactly one valid version
    Specified {
        version: ApiVersion,
        source: ApiVersionSource,
    },
    /// The request carried several different versions
    Ambiguous(Vec<String>),
    /// The request carried one version that does not parse
    Invalid {
        raw: String,
        source: ApiVersionSource,
        error: ApiVersionParseError,
    },
}

impl RequestedApiVersion {
    /// The parsed version, when there is exactly one valid one.
    pub fn version(&self) -> Option<&ApiVersion> {
        match self {
            Self::Specified { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<ApiVersionSource> {
        match self {
            Self::Specified { source, .. } | Self::Invalid { source, .. } => Some(*source),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct FeatureState {
    route_parameter: OnceLock<String>,
    raw: OnceLock<RawApiVersions>,
    requested: OnceLock<RequestedApiVersion>,
    selected: OnceLock<ApiVersion>,
}

/// Versioning state of one request.
#[derive(Debug, Clone, Default)]
pub struct ApiVersioningFeature {
    state: Arc<FeatureState>,
}

impl ApiVersioningFeature {
    pub fn new() -> Self {
        Self::default()
    }

    /// The feature of a request, if one was installed.
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        extensions.get::<Self>().cloned()
    }

    /// The feature of a request, installing a fresh one when missing.
    pub fn get_or_insert(extensions: &mut Extensions) -> Self {
        if let Some(feature) = extensions.get::<Self>() {
            return feature.clone();
        }
        let feature = Self::new();
        extensions.insert(feature.clone());
        feature
    }

    /// Name of the route parameter holding the version, recorded by the
    /// route constraint.
    pub fn route_parameter(&self) -> Option<&str> {
        self.state.route_parameter.get().map(String::as_str)
    }

    /// Record the route parameter. The first recorded name is kept.
    pub fn set_route_parameter(&self, name: impl Into<String>) {
        let _ = self.state.route_parameter.set(name.into());
    }

    /// The raw versions of the request, read once.
    pub fn raw_api_versions<R>(&self, request: &Parts, reader: &R) -> &RawApiVersions
    where
        R: ApiVersionReader + ?Sized,
    {
        self.state.raw.get_or_init(|| reader.read(request))
    }

    /// The requested version, read and parsed once.
    ///
    /// Several distinct raw values make the request ambiguous; they are never
    /// resolved by picking one.
    pub fn requested_api_version<R, P>(
        &self,
        request: &Parts,
        reader: &R,
        parser: &P,
    ) -> &RequestedApiVersion
    where
        R: ApiVersionReader + ?Sized,
        P: ApiVersionParser + ?Sized,
    {
        self.state.requested.get_or_init(|| {
            let raw = self.raw_api_versions(request, reader);
            match raw.len() {
                0 => RequestedApiVersion::Unspecified,
                1 => {
                    let Some(first) = raw.first() else {
                        return RequestedApiVersion::Unspecified;
                    };
                    match parser.parse(&first.value) {
                        Ok(version) => RequestedApiVersion::Specified {
                            version,
                            source: first.source,
                        },
                        Err(error) => {
                            trace_debug!(raw = %first.value, %error, "Invalid API version requested");
                            RequestedApiVersion::Invalid {
                                raw: first.value.clone(),
                                source: first.source,
                                error,
                            }
                        }
                    }
                }
                _ => {
                    let mut values = raw.values();
                    values.sort_by_cached_key(|value| value.to_ascii_lowercase());
                    trace_debug!(versions = ?values, "Ambiguous API versions requested");
                    RequestedApiVersion::Ambiguous(values)
                }
            }
        })
    }

    /// The version chosen for the request, once dispatch has decided.
    pub fn selected_api_version(&self) -> Option<&ApiVersion> {
        self.state.selected.get()
    }

    /// Record the chosen version. The first recorded version is kept.
    pub fn set_selected_api_version(&self, version: ApiVersion) {
        let _ = self.state.selected.set(version);
    }
}
