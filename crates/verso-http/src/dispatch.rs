//! Versioned dispatch pipeline
//!
//! Given the candidates the host router matched for a request path, the
//! dispatcher runs the full decision:
//!
//! 1. no candidates: not found
//! 2. no candidate allows the method: 405 with `Allow`
//! 3. read the requested version: ambiguous or invalid versions fail
//! 4. no version: assume one through the selector, fall back to neutral
//!    candidates, or fail as unspecified
//! 5. narrow conventionally routed candidates by order and precedence
//! 6. select the best candidate, or fail as unsupported

use crate::cache::MetadataCache;
use crate::candidate::ActionCandidate;
use crate::error::{ApiVersionError, Result};
use crate::feature::{ApiVersioningFeature, RequestedApiVersion};
use crate::options::ApiVersioningOptions;
use crate::selection::{filter_by_precedence, request_parameter_names, select_best_candidate};
use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Response};
use http_body_util::Full;
use std::sync::Arc;
use verso_core::{trace_debug, ApiVersion, ApiVersionMapping, ApiVersionModel};

/// The outcome of a successful dispatch.
#[derive(Debug)]
pub struct Dispatch<'a, C> {
    /// The chosen candidate
    pub candidate: &'a C,
    /// How the candidate matched the version
    pub mapping: ApiVersionMapping,
    /// The requested or assumed version; `None` for an unversioned request
    /// served by a version-neutral candidate
    pub version: Option<ApiVersion>,
}

/// Selects the candidate that serves a request.
#[derive(Debug)]
pub struct ApiVersionDispatcher {
    options: Arc<ApiVersioningOptions>,
    models: MetadataCache<String, ApiVersionModel>,
}

impl ApiVersionDispatcher {
    pub fn new(options: ApiVersioningOptions) -> Self {
        Self {
            options: Arc::new(options),
            models: MetadataCache::new(),
        }
    }

    pub fn options(&self) -> &ApiVersioningOptions {
        &self.options
    }

    /// Choose the candidate for `request`.
    ///
    /// The chosen version is recorded on the request's
    /// [`ApiVersioningFeature`].
    pub fn select<'a, C: ActionCandidate>(
        &self,
        request: &mut Parts,
        candidates: &'a [C],
    ) -> Result<Dispatch<'a, C>> {
        if candidates.is_empty() {
            return Err(ApiVersionError::NotFound);
        }

        let allowed: Vec<&'a C> = candidates
            .iter()
            .filter(|c| c.allows_method(&request.method))
            .collect();
        if allowed.is_empty() {
            return Err(ApiVersionError::MethodNotAllowed {
                allowed: allowed_methods(candidates),
            });
        }

        let feature = ApiVersioningFeature::get_or_insert(&mut request.extensions);
        let request: &Parts = request;
        let model = self.api_model(&allowed);
        let options = &self.options;

        let requested =
            feature.requested_api_version(request, options.get_reader(), options.get_parser());
        let (version, source) = match requested {
            RequestedApiVersion::Ambiguous(raw) => {
                return Err(ApiVersionError::AmbiguousApiVersion {
                    raw: raw.clone(),
                    model: (*model).clone(),
                });
            }
            RequestedApiVersion::Invalid { raw, error, .. } => {
                return Err(ApiVersionError::InvalidApiVersion {
                    raw: raw.clone(),
                    error: error.clone(),
                    model: (*model).clone(),
                });
            }
            RequestedApiVersion::Specified { version, source } => (Some(version.clone()), Some(*source)),
            RequestedApiVersion::Unspecified => {
                if options.assumes_default_version_when_unspecified() {
                    let assumed = options.select_version(&model);
                    trace_debug!(version = %assumed, "Assuming API version for unversioned request");
                    (Some(assumed), None)
                } else if allowed.iter().any(|c| c.metadata().is_api_version_neutral()) {
                    (None, None)
                } else {
                    trace_debug!("API version required but not specified");
                    return Err(ApiVersionError::UnspecifiedApiVersion {
                        model: (*model).clone(),
                    });
                }
            }
        };

        let parameters = request_parameter_names(request);
        let narrowed = filter_by_precedence(allowed, &parameters);

        let Some(selected) = select_best_candidate(&narrowed, version.as_ref())? else {
            let status = options.unsupported_status_for(source);
            trace_debug!(version = ?version, status = status.as_u16(), "Unsupported API version");
            return Err(ApiVersionError::UnsupportedApiVersion {
                requested: version,
                version_source: source,
                status,
                model: (*model).clone(),
            });
        };

        if let Some(version) = &version {
            feature.set_selected_api_version(version.clone());
        }

        Ok(Dispatch {
            candidate: selected.candidate,
            mapping: selected.mapping,
            version,
        })
    }

    /// Write version headers for a successful dispatch.
    pub fn report<C: ActionCandidate>(&self, headers: &mut HeaderMap, dispatch: &Dispatch<'_, C>) {
        if !self.options.reports_api_versions() {
            return;
        }
        let metadata = dispatch.candidate.metadata();
        self.options.get_reporter().report(
            headers,
            &metadata.merged_model(),
            metadata.name(),
            dispatch.version.as_ref(),
        );
    }

    /// Render a dispatch error, with version headers when reporting is on.
    pub fn error_response(&self, error: &ApiVersionError) -> Response<Full<Bytes>> {
        let mut response = error.into_response();

        if self.options.reports_api_versions() {
            if let Some(model) = error.model() {
                self.options
                    .get_reporter()
                    .report(response.headers_mut(), model, None, None);
            }
        }

        response
    }

    /// The merged model of a candidate set, cached by candidate identity.
    fn api_model<C: ActionCandidate>(&self, candidates: &[&C]) -> Arc<ApiVersionModel> {
        let key = candidates
            .iter()
            .map(|c| c.display_name())
            .collect::<Vec<_>>()
            .join("\n");

        self.models.get_or_compute(key, || {
            let merged: Vec<ApiVersionModel> = candidates
                .iter()
                .map(|c| c.metadata().merged_model())
                .collect();
            ApiVersionModel::aggregate_all(&merged)
        })
    }
}

fn allowed_methods<C: ActionCandidate>(candidates: &[C]) -> Vec<Method> {
    let mut methods: Vec<Method> = Vec::new();
    for method in candidates.iter().flat_map(|c| c.methods()) {
        if !methods.contains(method) {
            methods.push(method.clone());
        }
    }
    methods
}
