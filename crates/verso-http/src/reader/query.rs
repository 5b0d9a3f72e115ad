use super::{ApiVersionReader, ApiVersionSource, RawApiVersions};
use http::request::Parts;
use verso_core::trace_debug;

/// Reads versions from query string parameters.
///
/// Parameter names are matched ignoring ASCII case. Repeated parameters
/// produce one value each.
#[derive(Debug, Clone)]
pub struct QueryStringApiVersionReader {
    names: Vec<String>,
}

impl QueryStringApiVersionReader {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self::new([name])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for QueryStringApiVersionReader {
    fn default() -> Self {
        Self::with_name("api-version")
    }
}

impl ApiVersionReader for QueryStringApiVersionReader {
    fn read(&self, request: &Parts) -> RawApiVersions {
        let mut versions = RawApiVersions::new();
        let Some(query) = request.uri.query() else {
            return versions;
        };

        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(pairs) => pairs,
            Err(error) => {
                trace_debug!(%error, "Query string could not be decoded");
                return versions;
            }
        };

        for (key, value) in &pairs {
            if self.names.iter().any(|name| name.eq_ignore_ascii_case(key)) {
                versions.insert(value, ApiVersionSource::QueryString);
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
    fn test_reads_query_parameter() {
        let parts = request_parts(Request::builder().uri("/orders?api-version=2.0&page=1"));
        let raw = QueryStringApiVersionReader::default().read(&parts);
        assert_eq!(raw.values(), vec!["2.0"]);
        assert_eq!(
            raw.first().map(|r| r.source),
            Some(ApiVersionSource::QueryString)
        );
    }

    #[test]
    fn test_names_are_case_insensitive_and_repeats_kept() {
        let parts = request_parts(
            Request::builder().uri("/orders?API-Version=1.0&api-version=2.0&api-version=1.0"),
        );
        let raw = QueryStringApiVersionReader::default().read(&parts);
        assert_eq!(raw.values(), vec!["1.0", "2.0"]);
    }

    #[test]
    fn test_percent_encoded_values() {
        let parts = request_parts(Request::builder().uri("/orders?v=2016-07-09%2D3.0"));
        let raw = QueryStringApiVersionReader::with_name("v").read(&parts);
        assert_eq!(raw.values(), vec!["2016-07-09-3.0"]);
    }

    #[test]
    fn test_no_query() {
        let parts = request_parts(Request::builder().uri("/orders"));
        assert!(QueryStringApiVersionReader::default().read(&parts).is_empty());
    }
}
