use super::{ApiVersionReader, ApiVersionSource, RawApiVersions};
use crate::feature::ApiVersioningFeature;
use crate::route::RouteValues;
use http::request::Parts;
use std::cell::Cell;

thread_local! {
    static READING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a URL segment read until dropped.
struct ReadGuard;

impl ReadGuard {
    fn enter() -> Option<Self> {
        READING.with(|reading| {
            if reading.replace(true) {
                None
            } else {
                Some(ReadGuard)
            }
        })
    }
}

impl Drop for ReadGuard {
    fn drop(&mut self) {
        READING.with(|reading| reading.set(false));
    }
}

/// Reads the version captured from the URL path.
///
/// The value comes from the route parameter recorded on the request's
/// [`ApiVersioningFeature`] by the route constraint, looked up in the
/// [`RouteValues`] the host stored in the request extensions. Reads are not
/// reentrant: a read started while another is in progress on the same thread
/// returns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSegmentApiVersionReader;

impl UrlSegmentApiVersionReader {
    pub fn new() -> Self {
        Self
    }
}

impl ApiVersionReader for UrlSegmentApiVersionReader {
    fn read(&self, request: &Parts) -> RawApiVersions {
        let mut versions = RawApiVersions::new();
        let Some(_guard) = ReadGuard::enter() else {
            return versions;
        };

        let feature = ApiVersioningFeature::from_extensions(&request.extensions);
        let parameter = feature.as_ref().and_then(|f| f.route_parameter());
        let values = request.extensions.get::<RouteValues>();

        if let (Some(parameter), Some(values)) = (parameter, values) {
            if let Some(value) = values.get(parameter) {
                versions.insert(value, ApiVersionSource::UrlSegment);
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

    fn routed_parts(version: &str) -> Parts {
        let mut parts = request_parts(Request::builder().uri(format!("/v{}/orders", version)));
        let values: RouteValues = [("version", version)].into_iter().collect();
        parts.extensions.insert(values);
        ApiVersioningFeature::get_or_insert(&mut parts.extensions).set_route_parameter("version");
        parts
    }

    #[test]
    fn test_reads_recorded_route_value() {
        let raw = UrlSegmentApiVersionReader.read(&routed_parts("2.0"));
        assert_eq!(raw.values(), vec!["2.0"]);
        assert_eq!(
            raw.first().map(|r| r.source),
            Some(ApiVersionSource::UrlSegment)
        );
    }

    #[test]
    fn test_without_route_parameter_reads_nothing() {
        let mut parts = request_parts(Request::builder().uri("/v2.0/orders"));
        parts
            .extensions
            .insert::<RouteValues>([("version", "2.0")].into_iter().collect());
        assert!(UrlSegmentApiVersionReader.read(&parts).is_empty());
    }

    #[test]
    fn test_nested_read_returns_nothing() {
        let parts = routed_parts("3.0");
        let _outer = ReadGuard::enter();
        assert!(UrlSegmentApiVersionReader.read(&parts).is_empty());
    }

    #[test]
    fn test_guard_is_released() {
        let parts = routed_parts("1.0");
        {
            let _outer = ReadGuard::enter();
        }
        assert_eq!(UrlSegmentApiVersionReader.read(&parts).values(), vec!["1.0"]);
    }
}
