//! Versioning options

use crate::reader::{
    combine, ApiVersionReader, ApiVersionSource, HeaderApiVersionReader,
    QueryStringApiVersionReader,
};
use crate::reporting::{ApiVersionReporter, DefaultApiVersionReporter};
use crate::route::ApiVersionRouteConstraint;
use http::StatusCode;
use std::sync::Arc;
use verso_core::{
    ApiVersion, ApiVersionModel, ApiVersionParser, ApiVersionSelector, DefaultApiVersionParser,
    DefaultApiVersionSelector,
};

/// Runtime options for versioned dispatch.
///
/// # Example
///
/// ```
/// use verso_core::{ApiVersion, CurrentImplementationApiVersionSelector};
/// use verso_http::ApiVersioningOptions;
///
/// let options = ApiVersioningOptions::new()
///     .default_api_version(ApiVersion::new(2, 0))
///     .assume_default_version_when_unspecified(true)
///     .selector(CurrentImplementationApiVersionSelector);
///
/// assert!(options.assumes_default_version_when_unspecified());
/// ```
#[derive(Debug, Clone)]
pub struct ApiVersioningOptions {
    default_api_version: ApiVersion,
    assume_default_version_when_unspecified: bool,
    report_api_versions: bool,
    unsupported_api_version_status_code: StatusCode,
    unsupported_status_by_source: Vec<(ApiVersionSource, StatusCode)>,
    route_constraint_name: String,
    reader: Arc<dyn ApiVersionReader>,
    parser: Arc<dyn ApiVersionParser>,
    selector: Arc<dyn ApiVersionSelector>,
    reporter: Arc<dyn ApiVersionReporter>,
}

impl Default for ApiVersioningOptions {
    fn default() -> Self {
        let reader = combine([
            Box::new(QueryStringApiVersionReader::default()) as Box<dyn ApiVersionReader>,
            Box::new(HeaderApiVersionReader::default()),
        ]);

        Self {
            default_api_version: ApiVersion::DEFAULT,
            assume_default_version_when_unspecified: false,
            report_api_versions: true,
            unsupported_api_version_status_code: StatusCode::BAD_REQUEST,
            unsupported_status_by_source: vec![
                (ApiVersionSource::UrlSegment, StatusCode::NOT_FOUND),
                (ApiVersionSource::Accept, StatusCode::NOT_ACCEPTABLE),
                (ApiVersionSource::ContentType, StatusCode::UNSUPPORTED_MEDIA_TYPE),
            ],
            route_constraint_name: ApiVersionRouteConstraint::DEFAULT_NAME.to_string(),
            reader: Arc::new(reader),
            parser: Arc::new(DefaultApiVersionParser),
            selector: Arc::new(DefaultApiVersionSelector),
            reporter: Arc::new(DefaultApiVersionReporter::default()),
        }
    }
}

impl ApiVersioningOptions {
    /// Defaults: version 1.0, not assumed; versions read from the
    /// `api-version` query parameter and header; versions reported; for
    /// unsupported versions 404 from the URL path, 406 from `Accept`, 415 from
    /// `Content-Type` and 400 otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default version. Selectors receive it at selection time.
    pub fn default_api_version(mut self, version: ApiVersion) -> Self {
        self.default_api_version = version;
        self
    }

    /// Dispatch unversioned requests to the version picked by the selector.
    pub fn assume_default_version_when_unspecified(mut self, enabled: bool) -> Self {
        self.assume_default_version_when_unspecified = enabled;
        self
    }

    /// Write supported and deprecated versions onto responses.
    pub fn report_api_versions(mut self, enabled: bool) -> Self {
        self.report_api_versions = enabled;
        self
    }

    /// Status for unsupported versions read from channels without a
    /// per-source status. Defaults to 400; 501 is a common alternative.
    pub fn unsupported_api_version_status_code(mut self, status: StatusCode) -> Self {
        self.unsupported_api_version_status_code = status;
        self
    }

    /// Status for unsupported versions read from `source`.
    pub fn unsupported_api_version_status_code_for(
        mut self,
        source: ApiVersionSource,
        status: StatusCode,
    ) -> Self {
        match self
            .unsupported_status_by_source
            .iter_mut()
            .find(|(s, _)| *s == source)
        {
            Some(entry) => entry.1 = status,
            None => self.unsupported_status_by_source.push((source, status)),
        }
        self
    }

    /// Drop the per-source status for `source`, so that the general status
    /// applies.
    pub fn clear_unsupported_api_version_status_code_for(mut self, source: ApiVersionSource) -> Self {
        self.unsupported_status_by_source.retain(|(s, _)| *s != source);
        self
    }

    pub fn route_constraint_name(mut self, name: impl Into<String>) -> Self {
        self.route_constraint_name = name.into();
        self
    }

    pub fn reader<R: ApiVersionReader + 'static>(mut self, reader: R) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    pub fn parser<P: ApiVersionParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn selector<S: ApiVersionSelector + 'static>(mut self, selector: S) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    pub fn reporter<R: ApiVersionReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn get_default_api_version(&self) -> &ApiVersion {
        &self.default_api_version
    }

    pub fn assumes_default_version_when_unspecified(&self) -> bool {
        self.assume_default_version_when_unspecified
    }

    pub fn reports_api_versions(&self) -> bool {
        self.report_api_versions
    }

    pub fn get_unsupported_api_version_status_code(&self) -> StatusCode {
        self.unsupported_api_version_status_code
    }

    /// The status for an unsupported version read from `source`; `None` is an
    /// assumed version.
    pub fn unsupported_status_for(&self, source: Option<ApiVersionSource>) -> StatusCode {
        source
            .and_then(|source| {
                self.unsupported_status_by_source
                    .iter()
                    .find(|(s, _)| *s == source)
                    .map(|(_, status)| *status)
            })
            .unwrap_or(self.unsupported_api_version_status_code)
    }

    pub fn get_route_constraint_name(&self) -> &str {
        &self.route_constraint_name
    }

    pub fn get_reader(&self) -> &dyn ApiVersionReader {
        self.reader.as_ref()
    }

    pub fn get_parser(&self) -> &dyn ApiVersionParser {
        self.parser.as_ref()
    }

    pub fn get_selector(&self) -> &dyn ApiVersionSelector {
        self.selector.as_ref()
    }

    pub fn get_reporter(&self) -> &dyn ApiVersionReporter {
        self.reporter.as_ref()
    }

    /// The version the configured selector assumes for `model`.
    pub fn select_version(&self, model: &ApiVersionModel) -> ApiVersion {
        self.selector.select_version(model, &self.default_api_version)
    }

    /// A route constraint using this configuration's name and parser.
    pub fn route_constraint(&self) -> ApiVersionRouteConstraint {
        ApiVersionRouteConstraint::new(self.route_constraint_name.clone(), Arc::clone(&self.parser))
    }
}
