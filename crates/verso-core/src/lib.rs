//! # Verso Core
//!
//! Transport-independent building blocks for API versioning: the
//! [`ApiVersion`] value type with its grammar and format language, version
//! models and their collation, per-action metadata, version selectors and
//! sunset policies.
//!
//! The request-facing half lives in `verso-http`. Most users should depend on
//! the `verso` facade instead.

mod metadata;
mod model;
mod policy;
mod selector;
mod tracing_macros;
mod version;

pub use metadata::{ApiVersionMapping, ApiVersionMetadata};
pub use model::{
    collate, ActionDeclaration, ApiVersionModel, ApiVersionModelBuilder, CollatedController,
    ControllerDeclaration,
};
pub use policy::{LinkHeaderValue, SunsetPolicy, SunsetPolicyManager};
pub use selector::{
    ApiVersionSelector, ConstantApiVersionSelector, CurrentImplementationApiVersionSelector,
    DefaultApiVersionSelector, LowestImplementedApiVersionSelector,
};
pub use version::{
    ApiVersion, ApiVersionParseError, ApiVersionParser, DefaultApiVersionParser, FormatError,
    FormattedApiVersion,
};

#[doc(hidden)]
pub use tracing as __tracing;
