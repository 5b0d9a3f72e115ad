//! API version models
//!
//! An [`ApiVersionModel`] is the frozen description of which versions one
//! controller or one action declares, supports, deprecates and advertises.

mod builder;
mod collate;

pub use builder::ApiVersionModelBuilder;
pub use collate::{collate, ActionDeclaration, CollatedController, ControllerDeclaration};

use crate::ApiVersion;

/// Sort and deduplicate a list of versions in place.
pub(crate) fn normalize(versions: &mut Vec<ApiVersion>) {
    versions.sort();
    versions.dedup();
}

fn union<'a>(sets: impl IntoIterator<Item = &'a [ApiVersion]>) -> Vec<ApiVersion> {
    let mut versions: Vec<ApiVersion> = sets.into_iter().flatten().cloned().collect();
    normalize(&mut versions);
    versions
}

/// Immutable version sets for one controller or action.
///
/// Every set is sorted ascending and free of duplicates. Advertised versions
/// (implemented elsewhere, such as by another service) are included in the
/// supported and deprecated sets; a version that is both supported and
/// deprecated is only reported as supported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiVersionModel {
    neutral: bool,
    declared: Vec<ApiVersion>,
    supported: Vec<ApiVersion>,
    deprecated: Vec<ApiVersion>,
    advertised: Vec<ApiVersion>,
    deprecated_advertised: Vec<ApiVersion>,
    implemented: Vec<ApiVersion>,
}

impl ApiVersionModel {
    /// Create a model from its version sets.
    pub fn new(
        declared: Vec<ApiVersion>,
        supported: Vec<ApiVersion>,
        deprecated: Vec<ApiVersion>,
        advertised: Vec<ApiVersion>,
        deprecated_advertised: Vec<ApiVersion>,
    ) -> Self {
        let mut declared = declared;
        normalize(&mut declared);

        let mut advertised = advertised;
        normalize(&mut advertised);
        let mut deprecated_advertised = deprecated_advertised;
        normalize(&mut deprecated_advertised);

        let supported = union([supported.as_slice(), advertised.as_slice()]);
        let mut deprecated = union([deprecated.as_slice(), deprecated_advertised.as_slice()]);
        deprecated.retain(|v| supported.binary_search(v).is_err());
        let implemented = union([supported.as_slice(), deprecated.as_slice()]);

        Self {
            neutral: false,
            declared,
            supported,
            deprecated,
            advertised,
            deprecated_advertised,
            implemented,
        }
    }

    /// A model declaring and supporting exactly one version.
    pub fn from_version(version: ApiVersion) -> Self {
        Self::new(
            vec![version.clone()],
            vec![version],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    /// The version-neutral model. Its sets are empty and stand for "every
    /// version".
    pub fn neutral() -> Self {
        Self {
            neutral: true,
            ..Self::default()
        }
    }

    /// A model with no versions at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this model accepts every version.
    pub fn is_api_version_neutral(&self) -> bool {
        self.neutral
    }

    /// Versions declared directly on the element.
    pub fn declared_api_versions(&self) -> &[ApiVersion] {
        &self.declared
    }

    /// Supported versions, including advertised ones.
    pub fn supported_api_versions(&self) -> &[ApiVersion] {
        &self.supported
    }

    /// Deprecated versions, including deprecated advertised ones.
    pub fn deprecated_api_versions(&self) -> &[ApiVersion] {
        &self.deprecated
    }

    /// Versions advertised as supported but implemented elsewhere.
    pub fn advertised_api_versions(&self) -> &[ApiVersion] {
        &self.advertised
    }

    /// Versions advertised as deprecated but implemented elsewhere.
    pub fn deprecated_advertised_api_versions(&self) -> &[ApiVersion] {
        &self.deprecated_advertised
    }

    /// Supported ∪ deprecated.
    pub fn implemented_api_versions(&self) -> &[ApiVersion] {
        &self.implemented
    }

    /// Whether the model has no versions in any set.
    pub fn is_empty(&self) -> bool {
        !self.neutral && self.declared.is_empty() && self.implemented.is_empty()
    }

    /// Merge `other` into this model.
    ///
    /// This model's declared versions are kept as-is; the supported,
    /// deprecated and advertised sets become the union of both models. A
    /// version-neutral model absorbs nothing, and merging a neutral model into
    /// a versioned one changes nothing.
    pub fn aggregate(&self, other: &ApiVersionModel) -> ApiVersionModel {
        if self.neutral || other.neutral {
            return self.clone();
        }

        Self::new(
            self.declared.clone(),
            union([self.supported.as_slice(), other.supported.as_slice()]),
            union([self.deprecated.as_slice(), other.deprecated.as_slice()]),
            union([self.advertised.as_slice(), other.advertised.as_slice()]),
            union([
                self.deprecated_advertised.as_slice(),
                other.deprecated_advertised.as_slice(),
            ]),
        )
    }

    /// Union many models into one, declared versions included.
    ///
    /// Version-neutral models are skipped. The result is never neutral.
    pub fn aggregate_all<'a>(models: impl IntoIterator<Item = &'a ApiVersionModel>) -> ApiVersionModel {
        let mut declared = Vec::new();
        let mut supported = Vec::new();
        let mut deprecated = Vec::new();
        let mut advertised = Vec::new();
        let mut deprecated_advertised = Vec::new();

        for model in models.into_iter().filter(|m| !m.neutral) {
            declared.extend_from_slice(&model.declared);
            supported.extend_from_slice(&model.supported);
            deprecated.extend_from_slice(&model.deprecated);
            advertised.extend_from_slice(&model.advertised);
            deprecated_advertised.extend_from_slice(&model.deprecated_advertised);
        }

        Self::new(declared, supported, deprecated, advertised, deprecated_advertised)
    }
}
