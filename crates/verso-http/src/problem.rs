//! Problem details responses (RFC 9457)

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use serde_json::{Map, Value};

/// Problem type of an unsupported API version.
pub const UNSUPPORTED_TYPE: &str = "https://docs.api-versioning.org/problems#unsupported";
/// Problem type of a request that needs a version but has none.
pub const UNSPECIFIED_TYPE: &str = "https://docs.api-versioning.org/problems#unspecified";
/// Problem type of a version that does not parse.
pub const INVALID_TYPE: &str = "https://docs.api-versioning.org/problems#invalid";
/// Problem type of a request carrying several versions.
pub const AMBIGUOUS_TYPE: &str = "https://docs.api-versioning.org/problems#ambiguous";

/// Media type of problem details bodies.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// A machine-readable error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Error code extension member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Further extension members
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            code: None,
            extensions: Map::new(),
        }
    }

    /// A problem with no specific type, titled after the status code.
    pub fn from_status(status: StatusCode) -> Self {
        let title = status.canonical_reason().unwrap_or("Error");
        Self::new("about:blank", title, status)
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render as an `application/problem+json` response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        match serde_json::to_vec(&self) {
            Ok(json) => {
                let mut response = Response::new(Full::new(Bytes::from(json)));
                *response.status_mut() = status;
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
                response
            }
            Err(_) => {
                let mut response = Response::new(Full::new(Bytes::from_static(
                    b"Failed to serialize problem details",
                )));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}
