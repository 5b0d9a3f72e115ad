//! # Verso HTTP
//!
//! Request-facing API versioning over the [`http`] crate types.
//!
//! - [`reader`]: extract raw version strings from headers, query strings,
//!   media types and URL segments
//! - [`ApiVersioningFeature`]: per-request version state kept in request
//!   extensions
//! - [`select_best_candidate`] and [`select_controller`]: choose between
//!   candidate endpoints by version mapping
//! - [`ApiVersionDispatcher`]: the full pipeline, turning failures into RFC
//!   7807 problem responses and reporting supported versions
//!
//! This crate is not meant to be used directly. Use `verso` instead.

mod cache;
mod candidate;
#[cfg(feature = "config")]
pub mod config;
mod dispatch;
mod error;
mod feature;
mod options;
pub mod problem;
pub mod reader;
pub mod reporting;
mod route;
mod selection;

// Public API
pub use cache::{CollationCache, MetadataCache};
pub use candidate::{ActionCandidate, ActionDescriptor};
#[cfg(feature = "config")]
pub use config::{ApiVersioningConfig, ConfigError};
pub use dispatch::{ApiVersionDispatcher, Dispatch};
pub use error::{ApiVersionError, Result};
pub use feature::{ApiVersioningFeature, RequestedApiVersion};
pub use options::ApiVersioningOptions;
pub use problem::ProblemDetails;
pub use reader::{
    combine, ApiVersionReader, ApiVersionSource, CompositeApiVersionReader,
    HeaderApiVersionReader, MediaTypeApiVersionReader, MediaTypeApiVersionReaderBuilder,
    MediaTypeSelection, QueryStringApiVersionReader, RawApiVersion, RawApiVersions,
    UrlSegmentApiVersionReader,
};
pub use reporting::{ApiVersionReporter, DefaultApiVersionReporter};
pub use route::{ApiVersionRouteConstraint, RouteValues, STACK_ROUTE_VALUES_CAPACITY};
pub use selection::{
    filter_by_precedence, request_parameter_names, select_best_candidate, select_controller,
    AmbiguousMatchError, SelectedAction, SelectedController,
};
