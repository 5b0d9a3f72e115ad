//! Request-level versioning errors
//!
//! Every failure of dispatch is one [`ApiVersionError`]. Errors map to a
//! status code and a problem details body; they are returned to the client,
//! never retried.

use crate::problem::{
    ProblemDetails, AMBIGUOUS_TYPE, INVALID_TYPE, UNSPECIFIED_TYPE, UNSUPPORTED_TYPE,
};
use crate::reader::ApiVersionSource;
use crate::selection::AmbiguousMatchError;
use bytes::Bytes;
use http::{header, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;
use verso_core::{ApiVersion, ApiVersionModel, ApiVersionParseError};

/// Result type alias for dispatch operations
pub type Result<T, E = ApiVersionError> = std::result::Result<T, E>;

/// Why a request could not be dispatched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiVersionError {
    /// No candidate matches the request path
    #[error("no candidate matches the request")]
    NotFound,

    /// Candidates exist, but none allows the request method
    #[error("the request method is not allowed; allowed methods: {}", join_methods(.allowed))]
    MethodNotAllowed { allowed: Vec<Method> },

    /// Several candidates match the request equally well
    #[error(transparent)]
    AmbiguousMatch(#[from] AmbiguousMatchError),

    /// The request carried several different versions
    #[error("the request carried multiple API versions: {}", .raw.join(", "))]
    AmbiguousApiVersion {
        raw: Vec<String>,
        model: ApiVersionModel,
    },

    /// The requested version does not parse
    #[error("'{raw}' is not a valid API version: {error}")]
    InvalidApiVersion {
        raw: String,
        error: ApiVersionParseError,
        model: ApiVersionModel,
    },

    /// The request has no version and none can be assumed
    #[error("an API version is required, but was not specified")]
    UnspecifiedApiVersion { model: ApiVersionModel },

    /// No candidate implements the requested version
    #[error("the resource does not support API version '{}'", display_requested(.requested))]
    UnsupportedApiVersion {
        requested: Option<ApiVersion>,
        version_source: Option<ApiVersionSource>,
        status: StatusCode,
        model: ApiVersionModel,
    },
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_requested(requested: &Option<ApiVersion>) -> String {
    requested
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl ApiVersionError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::AmbiguousMatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AmbiguousApiVersion { .. }
            | Self::InvalidApiVersion { .. }
            | Self::UnspecifiedApiVersion { .. } => StatusCode::BAD_REQUEST,
            Self::UnsupportedApiVersion { status, .. } => *status,
        }
    }

    /// The versions of the matched API, for reporting alongside the error.
    pub fn model(&self) -> Option<&ApiVersionModel> {
        match self {
            Self::AmbiguousApiVersion { model, .. }
            | Self::InvalidApiVersion { model, .. }
            | Self::UnspecifiedApiVersion { model }
            | Self::UnsupportedApiVersion { model, .. } => Some(model),
            _ => None,
        }
    }

    /// The error code extension member.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::AmbiguousApiVersion { .. } => Some("AmbiguousApiVersion"),
            Self::InvalidApiVersion { .. } => Some("InvalidApiVersion"),
            Self::UnspecifiedApiVersion { .. } => Some("ApiVersionUnspecified"),
            Self::UnsupportedApiVersion { .. } => Some("UnsupportedApiVersion"),
            _ => None,
        }
    }

    pub fn problem_details(&self) -> ProblemDetails {
        let status = self.status();
        let problem = match self {
            Self::NotFound | Self::MethodNotAllowed { .. } => ProblemDetails::from_status(status),
            Self::AmbiguousMatch(error) => ProblemDetails::from_status(status)
                .detail(self.to_string())
                .extension("candidates", error.candidates.clone()),
            Self::AmbiguousApiVersion { raw, .. } => {
                ProblemDetails::new(AMBIGUOUS_TYPE, "Ambiguous API version", status)
                    .detail(self.to_string())
                    .extension("apiVersions", raw.clone())
            }
            Self::InvalidApiVersion { .. } => {
                ProblemDetails::new(INVALID_TYPE, "Invalid API version", status).detail(self.to_string())
            }
            Self::UnspecifiedApiVersion { .. } => {
                ProblemDetails::new(UNSPECIFIED_TYPE, "Unspecified API version", status)
                    .detail(self.to_string())
            }
            Self::UnsupportedApiVersion { .. } => {
                ProblemDetails::new(UNSUPPORTED_TYPE, "Unsupported API version", status)
                    .detail(self.to_string())
            }
        };

        match self.code() {
            Some(code) => problem.code(code),
            None => problem,
        }
    }

    /// Render the error as a response. A 405 carries an `Allow` header.
    pub fn into_response(&self) -> Response<Full<Bytes>> {
        let mut response = self.problem_details().into_response();

        if let Self::MethodNotAllowed { allowed } = self {
            if let Ok(value) = HeaderValue::from_str(&join_methods(allowed)) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}
