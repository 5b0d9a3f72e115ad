//! Request version readers
//!
//! A reader extracts the raw, unparsed API version strings a client sent.
//! Readers never parse; the dispatcher decides what zero, one or several
//! values mean.

mod composite;
mod header;
mod media_type;
mod query;
mod url_segment;

pub use composite::{combine, CompositeApiVersionReader};
pub use header::HeaderApiVersionReader;
pub use media_type::{
    MediaTypeApiVersionReader, MediaTypeApiVersionReaderBuilder, MediaTypeSelection,
};
pub use query::QueryStringApiVersionReader;
pub use url_segment::UrlSegmentApiVersionReader;

use http::request::Parts;
use smallvec::SmallVec;
use std::fmt;

/// Where a raw version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersionSource {
    /// A request header
    Header,
    /// A query string parameter
    QueryString,
    /// A parameter of the `Accept` media type
    Accept,
    /// A parameter of the `Content-Type` media type
    ContentType,
    /// A route value captured from the URL path
    UrlSegment,
    /// A host-provided reader
    Custom,
}

impl fmt::Display for ApiVersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::QueryString => "query string",
            Self::Accept => "Accept media type",
            Self::ContentType => "Content-Type media type",
            Self::UrlSegment => "URL segment",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// One raw version value and its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawApiVersion {
    pub value: String,
    pub source: ApiVersionSource,
}

/// Ordered set of raw version values.
///
/// Values are unique ignoring ASCII case; the first occurrence wins and keeps
/// its source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawApiVersions {
    inner: SmallVec<[RawApiVersion; 2]>,
}

impl RawApiVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value unless an equal one (ignoring case) is already present.
    /// Blank values are ignored.
    pub fn insert(&mut self, value: &str, source: ApiVersionSource) {
        let value = value.trim();
        if value.is_empty() || self.contains(value) {
            return;
        }
        self.inner.push(RawApiVersion {
            value: value.to_string(),
            source,
        });
    }

    /// Add every value of `other`.
    pub fn extend(&mut self, other: RawApiVersions) {
        for raw in other.inner {
            self.insert(&raw.value, raw.source);
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.inner.iter().any(|raw| raw.value.eq_ignore_ascii_case(value))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn first(&self) -> Option<&RawApiVersion> {
        self.inner.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawApiVersion> {
        self.inner.iter()
    }

    /// The raw text of every value, in order.
    pub fn values(&self) -> Vec<String> {
        self.inner.iter().map(|raw| raw.value.clone()).collect()
    }
}

/// Reads raw API versions from a request.
pub trait ApiVersionReader: Send + Sync + fmt::Debug {
    /// Read every raw version the request carries through this reader's
    /// channel.
    fn read(&self, request: &Parts) -> RawApiVersions;
}

impl<R: ApiVersionReader + ?Sized> ApiVersionReader for Box<R> {
    fn read(&self, request: &Parts) -> RawApiVersions {
        (**self).read(request)
    }
}

impl<R: ApiVersionReader + ?Sized> ApiVersionReader for std::sync::Arc<R> {
    fn read(&self, request: &Parts) -> RawApiVersions {
        (**self).read(request)
    }
}

#[cfg(test)]
pub(crate) fn request_parts(builder: http::request::Builder) -> Parts {
    builder.body(()).unwrap().into_parts().0
}
