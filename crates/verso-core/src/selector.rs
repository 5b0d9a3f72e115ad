//! Version selectors
//!
//! When a request does not specify a version and the host allows assuming
//! one, a selector picks the version from the model of the matched API.
//! Selectors are pure and may be consulted several times per request. The
//! configured default version is passed at selection time, so changing the
//! default never requires rebuilding the selector.

use crate::{ApiVersion, ApiVersionModel};
use std::fmt;

/// Chooses the version to assume for an unversioned request.
pub trait ApiVersionSelector: Send + Sync + fmt::Debug {
    /// Pick a version for `model`, given the configured default version.
    fn select_version(&self, model: &ApiVersionModel, default_version: &ApiVersion) -> ApiVersion;
}

/// Always selects the configured default version.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApiVersionSelector;

impl ApiVersionSelector for DefaultApiVersionSelector {
    fn select_version(&self, _model: &ApiVersionModel, default_version: &ApiVersion) -> ApiVersion {
        default_version.clone()
    }
}

/// Always selects one fixed version, independent of the configured default.
#[derive(Debug, Clone)]
pub struct ConstantApiVersionSelector {
    version: ApiVersion,
}

impl ConstantApiVersionSelector {
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }
}

impl ApiVersionSelector for ConstantApiVersionSelector {
    fn select_version(&self, _model: &ApiVersionModel, _default_version: &ApiVersion) -> ApiVersion {
        self.version.clone()
    }
}

/// Selects the highest implemented (supported or deprecated) version, status
/// versions included. Falls back to the default version when nothing is
/// implemented.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentImplementationApiVersionSelector;

impl ApiVersionSelector for CurrentImplementationApiVersionSelector {
    fn select_version(&self, model: &ApiVersionModel, default_version: &ApiVersion) -> ApiVersion {
        model
            .implemented_api_versions()
            .last()
            .cloned()
            .unwrap_or_else(|| default_version.clone())
    }
}

/// Selects the lowest implemented version, or the default version when
/// nothing is implemented.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestImplementedApiVersionSelector;

impl ApiVersionSelector for LowestImplementedApiVersionSelector {
    fn select_version(&self, model: &ApiVersionModel, default_version: &ApiVersion) -> ApiVersion {
        model
            .implemented_api_versions()
            .first()
            .cloned()
            .unwrap_or_else(|| default_version.clone())
    }
}
