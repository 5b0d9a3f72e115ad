//! Version metadata attached to an action
//!
//! [`ApiVersionMetadata`] pairs the collated controller model (the "API
//! model") with the collated action model (the "endpoint model"). It answers
//! the one question asked at request time: how does this action map to the
//! requested version?

use crate::{ApiVersion, ApiVersionModel};

/// How strongly a candidate matches a requested version.
///
/// Variants are ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersionMapping {
    /// The candidate does not accept the version
    None,
    /// The candidate accepts the version through its controller, or is
    /// version-neutral
    Implicit,
    /// The candidate declares the version itself
    Explicit,
}

/// Metadata describing the versions of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionMetadata {
    api_model: ApiVersionModel,
    endpoint_model: ApiVersionModel,
    name: Option<String>,
}

impl ApiVersionMetadata {
    /// Create metadata from the controller and action models.
    pub fn new(api_model: ApiVersionModel, endpoint_model: ApiVersionModel) -> Self {
        Self {
            api_model,
            endpoint_model,
            name: None,
        }
    }

    /// Attach the API group name used to look up sunset policies.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Metadata for a version-neutral action.
    pub fn neutral() -> Self {
        Self::new(ApiVersionModel::neutral(), ApiVersionModel::neutral())
    }

    /// Metadata for an action with no version information.
    pub fn empty() -> Self {
        Self::new(ApiVersionModel::empty(), ApiVersionModel::empty())
    }

    /// The API group name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The collated controller model.
    pub fn api_model(&self) -> &ApiVersionModel {
        &self.api_model
    }

    /// The collated action model.
    pub fn endpoint_model(&self) -> &ApiVersionModel {
        &self.endpoint_model
    }

    /// A neutral action is neutral even inside a versioned controller.
    pub fn is_api_version_neutral(&self) -> bool {
        self.api_model.is_api_version_neutral() || self.endpoint_model.is_api_version_neutral()
    }

    /// Classify the requested version for this action.
    ///
    /// `None` means the request carried no version. Only version-neutral
    /// actions accept such a request; they map implicitly to every version.
    pub fn mapping_to(&self, version: Option<&ApiVersion>) -> ApiVersionMapping {
        if self.is_api_version_neutral() {
            return ApiVersionMapping::Implicit;
        }

        let Some(version) = version else {
            return ApiVersionMapping::None;
        };

        let mapped = self.endpoint_model.declared_api_versions();
        if mapped.binary_search(version).is_ok() {
            return ApiVersionMapping::Explicit;
        }
        if !mapped.is_empty() {
            return ApiVersionMapping::None;
        }

        if self
            .api_model
            .declared_api_versions()
            .binary_search(version)
            .is_ok()
        {
            ApiVersionMapping::Implicit
        } else {
            ApiVersionMapping::None
        }
    }

    /// Whether the action accepts the version at all.
    pub fn is_mapped_to(&self, version: Option<&ApiVersion>) -> bool {
        self.mapping_to(version) != ApiVersionMapping::None
    }

    /// The model behind a mapping: the endpoint model for explicit matches,
    /// the API model for implicit ones.
    pub fn map(&self, mapping: ApiVersionMapping) -> Option<&ApiVersionModel> {
        match mapping {
            ApiVersionMapping::Explicit => Some(&self.endpoint_model),
            ApiVersionMapping::Implicit => Some(&self.api_model),
            ApiVersionMapping::None => None,
        }
    }

    /// The full version picture for reporting: both models merged.
    pub fn merged_model(&self) -> ApiVersionModel {
        if self.is_api_version_neutral() {
            return ApiVersionModel::neutral();
        }
        ApiVersionModel::aggregate_all([&self.api_model, &self.endpoint_model])
    }
}

impl Default for ApiVersionMetadata {
    fn default() -> Self {
        Self::empty()
    }
}
