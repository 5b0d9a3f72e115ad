//! Environment configuration
//!
//! Plain-data versioning settings read from `API_VERSIONING_*` environment
//! variables, optionally seeded from a `.env` file.
//!
//! # Example
//!
//! ```ignore
//! use verso_http::config::{load_dotenv, ApiVersioningConfig};
//!
//! load_dotenv();
//! let options = ApiVersioningConfig::from_env()?.into_options()?;
//! ```

use crate::options::ApiVersioningOptions;
use crate::reader::{
    ApiVersionSource, CompositeApiVersionReader, HeaderApiVersionReader, MediaTypeApiVersionReader,
    QueryStringApiVersionReader, UrlSegmentApiVersionReader,
};
use http::header::HeaderName;
use http::StatusCode;
use serde::Deserialize;
use std::fmt;
use verso_core::{
    ApiVersion, ApiVersionParseError, ConstantApiVersionSelector,
    CurrentImplementationApiVersionSelector, DefaultApiVersionSelector,
    LowestImplementedApiVersionSelector,
};

/// Prefix of every configuration variable.
pub const ENV_PREFIX: &str = "API_VERSIONING_";

/// Status codes accepted for unsupported versions.
const UNSUPPORTED_STATUS_CODES: [u16; 5] = [400, 404, 406, 415, 501];

/// Error type for configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    EnvyError(envy::Error),
    /// A version setting does not parse.
    InvalidVersion {
        setting: &'static str,
        error: ApiVersionParseError,
    },
    /// The unsupported status code is not one of 400, 404, 406, 415 or 501.
    InvalidStatusCode(u16),
    /// The selector name is not known.
    UnknownSelector(String),
    /// The constant selector was chosen without a version.
    MissingVar(String),
    /// A header name is not a valid HTTP header name.
    InvalidHeaderName(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvyError(e) => write!(f, "Configuration error: {}", e),
            ConfigError::InvalidVersion { setting, error } => {
                write!(f, "Invalid API version in {}{}: {}", ENV_PREFIX, setting, error)
            }
            ConfigError::InvalidStatusCode(code) => {
                write!(f, "Unsupported API version status code {} is not allowed", code)
            }
            ConfigError::UnknownSelector(name) => write!(f, "Unknown API version selector: {}", name),
            ConfigError::MissingVar(var) => {
                write!(f, "Missing required environment variable: {}", var)
            }
            ConfigError::InvalidHeaderName(name) => write!(f, "Invalid header name: {}", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::EnvyError(e) => Some(e),
            ConfigError::InvalidVersion { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<envy::Error> for ConfigError {
    fn from(err: envy::Error) -> Self {
        ConfigError::EnvyError(err)
    }
}

/// Load a `.env` file from the current directory or its parents, if any.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn default_true() -> bool {
    true
}

/// Versioning settings.
///
/// | variable | meaning |
/// |---|---|
/// | `API_VERSIONING_DEFAULT_VERSION` | default version, `1.0` if unset |
/// | `API_VERSIONING_ASSUME_DEFAULT_VERSION` | assume a version for unversioned requests |
/// | `API_VERSIONING_REPORT_API_VERSIONS` | write version headers, on by default |
/// | `API_VERSIONING_UNSUPPORTED_STATUS_CODE` | status for unsupported versions |
/// | `API_VERSIONING_URL_SEGMENT_STATUS_CODE` | status for unsupported versions in the path, 404 by default |
/// | `API_VERSIONING_ACCEPT_STATUS_CODE` | status for unsupported versions in `Accept`, 406 by default |
/// | `API_VERSIONING_CONTENT_TYPE_STATUS_CODE` | status for unsupported versions in `Content-Type`, 415 by default |
/// | `API_VERSIONING_SELECTOR` | `default`, `constant`, `current` or `lowest` |
/// | `API_VERSIONING_CONSTANT_VERSION` | version for the `constant` selector |
/// | `API_VERSIONING_QUERY_PARAMETERS` | comma-separated query parameter names |
/// | `API_VERSIONING_HEADERS` | comma-separated header names |
/// | `API_VERSIONING_MEDIA_TYPE_PARAMETER` | media type parameter name |
/// | `API_VERSIONING_URL_SEGMENT` | read the version from the URL path |
/// | `API_VERSIONING_ROUTE_CONSTRAINT` | route constraint name |
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVersioningConfig {
    pub default_version: Option<String>,
    #[serde(default)]
    pub assume_default_version: bool,
    #[serde(default = "default_true")]
    pub report_api_versions: bool,
    pub unsupported_status_code: Option<u16>,
    pub url_segment_status_code: Option<u16>,
    pub accept_status_code: Option<u16>,
    pub content_type_status_code: Option<u16>,
    pub selector: Option<String>,
    pub constant_version: Option<String>,
    pub query_parameters: Option<Vec<String>>,
    pub headers: Option<Vec<String>>,
    pub media_type_parameter: Option<String>,
    #[serde(default)]
    pub url_segment: bool,
    pub route_constraint: Option<String>,
}

impl ApiVersioningConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Read the configuration from explicit variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Validate the settings and build runtime options.
    pub fn into_options(self) -> Result<ApiVersioningOptions, ConfigError> {
        let default_version = match &self.default_version {
            Some(text) => parse_setting("DEFAULT_VERSION", text)?,
            None => ApiVersion::DEFAULT,
        };

        let mut options = ApiVersioningOptions::new()
            .default_api_version(default_version)
            .assume_default_version_when_unspecified(self.assume_default_version)
            .report_api_versions(self.report_api_versions);

        if let Some(code) = self.unsupported_status_code {
            options = options.unsupported_api_version_status_code(parse_status(code)?);
        }
        let by_source = [
            (ApiVersionSource::UrlSegment, self.url_segment_status_code),
            (ApiVersionSource::Accept, self.accept_status_code),
            (ApiVersionSource::ContentType, self.content_type_status_code),
        ];
        for (source, code) in by_source {
            if let Some(code) = code {
                options = options.unsupported_api_version_status_code_for(source, parse_status(code)?);
            }
        }

        if let Some(name) = &self.route_constraint {
            options = options.route_constraint_name(name.clone());
        }

        options = match self.selector.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("default") => options.selector(DefaultApiVersionSelector),
            Some("constant") => {
                let text = self
                    .constant_version
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingVar(format!("{}CONSTANT_VERSION", ENV_PREFIX)))?;
                options.selector(ConstantApiVersionSelector::new(parse_setting(
                    "CONSTANT_VERSION",
                    text,
                )?))
            }
            Some("current") => options.selector(CurrentImplementationApiVersionSelector),
            Some("lowest") => options.selector(LowestImplementedApiVersionSelector),
            Some(other) => return Err(ConfigError::UnknownSelector(other.to_string())),
        };

        if let Some(reader) = self.reader()? {
            options = options.reader(reader);
        }

        Ok(options)
    }

    /// The reader described by the settings, or `None` to keep the default.
    fn reader(&self) -> Result<Option<CompositeApiVersionReader>, ConfigError> {
        let mut reader = CompositeApiVersionReader::new();

        if let Some(names) = &self.query_parameters {
            reader = reader.with(QueryStringApiVersionReader::new(names.iter().map(|n| n.trim())));
        }
        if let Some(names) = &self.headers {
            let names = names
                .iter()
                .map(|name| {
                    HeaderName::from_bytes(name.trim().as_bytes())
                        .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            reader = reader.with(HeaderApiVersionReader::new(names));
        }
        if let Some(parameter) = &self.media_type_parameter {
            reader = reader.with(MediaTypeApiVersionReader::with_parameter(parameter.clone()));
        }
        if self.url_segment {
            reader = reader.with(UrlSegmentApiVersionReader);
        }

        Ok(if reader.is_empty() { None } else { Some(reader) })
    }
}

fn parse_status(code: u16) -> Result<StatusCode, ConfigError> {
    StatusCode::from_u16(code)
        .ok()
        .filter(|_| UNSUPPORTED_STATUS_CODES.contains(&code))
        .ok_or(ConfigError::InvalidStatusCode(code))
}

fn parse_setting(setting: &'static str, text: &str) -> Result<ApiVersion, ConfigError> {
    ApiVersion::parse(text).map_err(|error| ConfigError::InvalidVersion { setting, error })
}
