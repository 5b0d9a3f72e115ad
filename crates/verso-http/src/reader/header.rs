use super::{ApiVersionReader, ApiVersionSource, RawApiVersions};
use http::header::HeaderName;
use http::request::Parts;

/// Reads versions from one or more request headers.
///
/// Every occurrence of each header is read, and comma-separated lists are
/// split, so `api-version: 1.0, 2.0` yields two values.
#[derive(Debug, Clone)]
pub struct HeaderApiVersionReader {
    names: Vec<HeaderName>,
}

impl HeaderApiVersionReader {
    /// Read from the given headers.
    pub fn new(names: impl IntoIterator<Item = HeaderName>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    /// Read from a single header.
    pub fn with_name(name: HeaderName) -> Self {
        Self::new([name])
    }

    pub fn names(&self) -> &[HeaderName] {
        &self.names
    }
}

impl Default for HeaderApiVersionReader {
    fn default() -> Self {
        Self::with_name(HeaderName::from_static("api-version"))
    }
}

impl ApiVersionReader for HeaderApiVersionReader {
    fn read(&self, request: &Parts) -> RawApiVersions {
        let mut versions = RawApiVersions::new();

        for name in &self.names {
            for value in request.headers.get_all(name) {
                let Ok(value) = value.to_str() else {
                    continue;
                };
                for item in value.split(',') {
                    versions.insert(item, ApiVersionSource::Header);
                }
            }
        }

        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::request_parts;
    use http::Request;

    #[test]
    fn test_reads_default_header() {
        let parts = request_parts(Request::builder().header("api-version", "2.0"));
        let raw = HeaderApiVersionReader::default().read(&parts);
        assert_eq!(raw.values(), vec!["2.0"]);
        assert_eq!(raw.first().map(|r| r.source), Some(ApiVersionSource::Header));
    }

    #[test]
    fn test_reads_lists_and_repeated_headers() {
        let parts = request_parts(
            Request::builder()
                .header("x-ms-version", "1.0, 2.0")
                .header("x-ms-version", "2.0")
                .header("api-version", "3.0"),
        );
        let reader = HeaderApiVersionReader::new([
            HeaderName::from_static("x-ms-version"),
            HeaderName::from_static("api-version"),
        ]);

        assert_eq!(reader.read(&parts).values(), vec!["1.0", "2.0", "3.0"]);
    }

    #[test]
    fn test_missing_header_reads_nothing() {
        let parts = request_parts(Request::builder());
        assert!(HeaderApiVersionReader::default().read(&parts).is_empty());
    }
}
