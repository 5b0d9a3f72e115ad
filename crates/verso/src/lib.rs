//! # Verso
//!
//! API versioning for Rust HTTP services.
//!
//! Verso parses and formats API versions, collates the versions each
//! controller and action declares, negotiates the version a request asks for,
//! picks the endpoint that serves it and reports supported, deprecated and
//! sunset versions back to clients. It works on the [`http`] crate types, so
//! any server built on them can host it.
//!
//! ## Quick Start
//!
//! ```rust
//! use verso::prelude::*;
//!
//! let collated = collate(&[
//!     ControllerDeclaration::new("Orders", ApiVersionModel::from_version(ApiVersion::new(1, 0)))
//!         .action(ActionDeclaration::new("Get", ApiVersionModel::empty())),
//!     ControllerDeclaration::new("Orders", ApiVersionModel::from_version(ApiVersion::new(2, 0)))
//!         .action(ActionDeclaration::new("Get", ApiVersionModel::empty())),
//! ]);
//! let candidates = vec![
//!     ActionDescriptor::new("OrdersV1", "Get", collated[0].actions[0].clone(), "v1")
//!         .method(Method::GET),
//!     ActionDescriptor::new("OrdersV2", "Get", collated[1].actions[0].clone(), "v2")
//!         .method(Method::GET),
//! ];
//!
//! let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
//! let (mut parts, _) = Request::builder()
//!     .uri("/orders?api-version=2.0")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//!
//! let dispatch = dispatcher.select(&mut parts, &candidates).unwrap();
//! assert_eq!(*dispatch.candidate.handler(), "v2");
//! ```
//!
//! ## Optional Features
//!
//! - `tracing` (default) - debug logging of negotiation decisions
//! - `config` - build [`ApiVersioningOptions`] from `API_VERSIONING_*`
//!   environment variables with `.env` file support

// Re-export the building blocks
pub use verso_core::*;
pub use verso_http::*;

pub use http;

/// Prelude module - import everything you need with `use verso::prelude::*`
pub mod prelude {
    // Versions and models
    pub use verso_core::{
        collate, ActionDeclaration, ApiVersion, ApiVersionMapping, ApiVersionMetadata,
        ApiVersionModel, ApiVersionModelBuilder, ApiVersionParser, ApiVersionSelector,
        CollatedController, ConstantApiVersionSelector, ControllerDeclaration,
        CurrentImplementationApiVersionSelector, DefaultApiVersionParser,
        DefaultApiVersionSelector, LinkHeaderValue, LowestImplementedApiVersionSelector,
        SunsetPolicy, SunsetPolicyManager,
    };

    // Request handling
    pub use verso_http::{
        combine, ActionCandidate, ActionDescriptor, ApiVersionDispatcher, ApiVersionError,
        ApiVersionReader, ApiVersionReporter, ApiVersionSource, ApiVersioningFeature,
        ApiVersioningOptions, CompositeApiVersionReader, DefaultApiVersionReporter,
        HeaderApiVersionReader, MediaTypeApiVersionReader, ProblemDetails,
        QueryStringApiVersionReader, RequestedApiVersion, Result, UrlSegmentApiVersionReader,
    };

    // Configuration types (feature-gated)
    #[cfg(feature = "config")]
    pub use verso_http::config::load_dotenv;
    #[cfg(feature = "config")]
    pub use verso_http::{ApiVersioningConfig, ConfigError};

    // Re-export commonly used external types
    pub use http::{HeaderMap, Method, Request, StatusCode};
    pub use tracing::{debug, error, info, trace, warn};
}
