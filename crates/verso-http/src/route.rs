//! Route values and the API version route constraint
//!
//! Hosts that carry the version in the URL path (`/v{version:apiVersion}/…`)
//! store the captured route values in the request extensions and run the
//! constraint while matching routes.

use crate::feature::ApiVersioningFeature;
use http::Extensions;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};
use verso_core::{ApiVersionParser, DefaultApiVersionParser};

/// Most routes capture only a few values.
pub const STACK_ROUTE_VALUES_CAPACITY: usize = 4;

/// Values captured by the host router. Keys are matched ignoring ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    inner: SmallVec<[(String, String); STACK_ROUTE_VALUES_CAPACITY]>,
}

impl RouteValues {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any value with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => entry.1 = value,
            None => self.inner.push((key, value)),
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

static CONSTRAINED_PARAMETER_REGEX: OnceLock<Regex> = OnceLock::new();

fn constrained_parameter_regex() -> &'static Regex {
    CONSTRAINED_PARAMETER_REGEX
        .get_or_init(|| Regex::new(r"\{([^{}:]+):([^{}]+)\}").unwrap())
}

/// Route constraint accepting only valid API versions.
#[derive(Debug, Clone)]
pub struct ApiVersionRouteConstraint {
    name: String,
    parser: Arc<dyn ApiVersionParser>,
}

impl ApiVersionRouteConstraint {
    /// The conventional constraint name, as in `{version:apiVersion}`.
    pub const DEFAULT_NAME: &'static str = "apiVersion";

    pub fn new(name: impl Into<String>, parser: Arc<dyn ApiVersionParser>) -> Self {
        Self {
            name: name.into(),
            parser,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find the parameter of `template` that uses this constraint.
    ///
    /// `/v{version:apiVersion}/orders` yields `version`.
    pub fn parameter_in(&self, template: &str) -> Option<String> {
        constrained_parameter_regex()
            .captures_iter(template)
            .find(|c| c.get(2).map_or(false, |m| m.as_str() == self.name))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Check the captured value of `parameter`.
    ///
    /// The parameter name is recorded on the request's versioning feature so
    /// the URL segment reader can find the value later. Returns whether the
    /// value is a valid API version.
    pub fn matches(&self, parameter: &str, values: &RouteValues, extensions: &mut Extensions) -> bool {
        let Some(value) = values.get(parameter) else {
            return false;
        };

        ApiVersioningFeature::get_or_insert(extensions).set_route_parameter(parameter);
        self.parser.try_parse(value).is_some()
    }
}

impl Default for ApiVersionRouteConstraint {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, Arc::new(DefaultApiVersionParser))
    }
}
