//! Convention builder for version models
//!
//! Hosts describe each controller and action with a builder once at startup,
//! then freeze it into an [`ApiVersionModel`].

use super::ApiVersionModel;
use crate::ApiVersion;

/// Declarative description of the versions one controller or action handles.
///
/// # Example
///
/// ```
/// use verso_core::{ApiVersion, ApiVersionModelBuilder};
///
/// let model = ApiVersionModelBuilder::new()
///     .has_api_version(ApiVersion::new(2, 0))
///     .has_deprecated_api_version(ApiVersion::new(1, 0))
///     .advertises_api_version(ApiVersion::new(3, 0))
///     .build();
///
/// assert_eq!(model.declared_api_versions().len(), 2);
/// assert_eq!(model.supported_api_versions().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiVersionModelBuilder {
    neutral: bool,
    mapped: Vec<ApiVersion>,
    supported: Vec<ApiVersion>,
    deprecated: Vec<ApiVersion>,
    advertised: Vec<ApiVersion>,
    deprecated_advertised: Vec<ApiVersion>,
}

impl ApiVersionModelBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare and support a version.
    pub fn has_api_version(mut self, version: ApiVersion) -> Self {
        self.supported.push(version);
        self
    }

    /// Declare a version as deprecated.
    pub fn has_deprecated_api_version(mut self, version: ApiVersion) -> Self {
        self.deprecated.push(version);
        self
    }

    /// Advertise a supported version implemented elsewhere.
    pub fn advertises_api_version(mut self, version: ApiVersion) -> Self {
        self.advertised.push(version);
        self
    }

    /// Advertise a deprecated version implemented elsewhere.
    pub fn advertises_deprecated_api_version(mut self, version: ApiVersion) -> Self {
        self.deprecated_advertised.push(version);
        self
    }

    /// Map an action explicitly to a version its controller supports.
    ///
    /// A mapped version is declared on the action but contributes nothing to
    /// the supported or deprecated sets; those come from the controller.
    pub fn maps_to_api_version(mut self, version: ApiVersion) -> Self {
        self.mapped.push(version);
        self
    }

    /// Accept every version.
    pub fn is_api_version_neutral(mut self) -> Self {
        self.neutral = true;
        self
    }

    /// Freeze the builder into a model.
    pub fn build(self) -> ApiVersionModel {
        if self.neutral {
            return ApiVersionModel::neutral();
        }

        let declared = self
            .mapped
            .iter()
            .chain(&self.supported)
            .chain(&self.deprecated)
            .cloned()
            .collect();

        ApiVersionModel::new(
            declared,
            self.supported,
            self.deprecated,
            self.advertised,
            self.deprecated_advertised,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_versions_are_declared_only() {
        let model = ApiVersionModelBuilder::new()
            .maps_to_api_version(ApiVersion::new(2, 0))
            .build();

        assert_eq!(model.declared_api_versions(), &[ApiVersion::new(2, 0)]);
        assert!(model.supported_api_versions().is_empty());
    }

    #[test]
    fn test_neutral_wins() {
        let model = ApiVersionModelBuilder::new()
            .has_api_version(ApiVersion::new(1, 0))
            .is_api_version_neutral()
            .build();

        assert!(model.is_api_version_neutral());
        assert!(model.declared_api_versions().is_empty());
    }

    #[test]
    fn test_advertised_versions_are_not_declared() {
        let model = ApiVersionModelBuilder::new()
            .has_api_version(ApiVersion::new(1, 0))
            .advertises_deprecated_api_version(ApiVersion::new(0, 9))
            .build();

        assert_eq!(model.declared_api_versions(), &[ApiVersion::new(1, 0)]);
        assert_eq!(model.deprecated_api_versions(), &[ApiVersion::new(0, 9)]);
        assert_eq!(
            model.implemented_api_versions(),
            &[ApiVersion::new(0, 9), ApiVersion::new(1, 0)]
        );
    }
}
