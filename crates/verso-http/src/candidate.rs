//! Dispatch candidates
//!
//! The host's routing produces candidates: actions that match the request
//! path. Selection only needs a narrow view of each one, described by
//! [`ActionCandidate`]; [`ActionDescriptor`] is a ready-made implementation
//! that carries an opaque host handler.

use http::Method;
use verso_core::ApiVersionMetadata;

/// What selection needs to know about a candidate action.
pub trait ActionCandidate {
    /// Fully qualified name, used in ambiguity errors
    fn display_name(&self) -> &str;

    /// Name of the controller the action belongs to
    fn controller_name(&self) -> &str;

    /// Allowed methods; empty means any method
    fn methods(&self) -> &[Method];

    /// Collated version metadata
    fn metadata(&self) -> &ApiVersionMetadata;

    /// Route order; lower values are preferred
    fn order(&self) -> i32 {
        0
    }

    /// Route precedence; lower values are preferred
    fn precedence(&self) -> f64 {
        0.0
    }

    /// Route and query parameters the action binds
    fn parameter_names(&self) -> &[String] {
        &[]
    }

    fn allows_method(&self, method: &Method) -> bool {
        let methods = self.methods();
        methods.is_empty() || methods.contains(method)
    }
}

/// A candidate action wrapping a host handler.
#[derive(Debug, Clone)]
pub struct ActionDescriptor<H> {
    display_name: String,
    controller_name: String,
    methods: Vec<Method>,
    metadata: ApiVersionMetadata,
    order: i32,
    precedence: f64,
    parameters: Vec<String>,
    handler: H,
}

impl<H> ActionDescriptor<H> {
    /// Create a descriptor for `controller.action`.
    pub fn new(controller: &str, action: &str, metadata: ApiVersionMetadata, handler: H) -> Self {
        Self {
            display_name: format!("{}.{}", controller, action),
            controller_name: controller.to_string(),
            methods: Vec::new(),
            metadata,
            order: 0,
            precedence: 0.0,
            parameters: Vec::new(),
            handler,
        }
    }

    /// Restrict the action to a method.
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn precedence(mut self, precedence: f64) -> Self {
        self.precedence = precedence;
        self
    }

    /// Declare a route or query parameter the action binds.
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

impl<H> ActionCandidate for ActionDescriptor<H> {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn controller_name(&self) -> &str {
        &self.controller_name
    }

    fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn metadata(&self) -> &ApiVersionMetadata {
        &self.metadata
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn precedence(&self) -> f64 {
        self.precedence
    }

    fn parameter_names(&self) -> &[String] {
        &self.parameters
    }
}

impl<C: ActionCandidate + ?Sized> ActionCandidate for &C {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn controller_name(&self) -> &str {
        (**self).controller_name()
    }

    fn methods(&self) -> &[Method] {
        (**self).methods()
    }

    fn metadata(&self) -> &ApiVersionMetadata {
        (**self).metadata()
    }

    fn order(&self) -> i32 {
        (**self).order()
    }

    fn precedence(&self) -> f64 {
        (**self).precedence()
    }

    fn parameter_names(&self) -> &[String] {
        (**self).parameter_names()
    }
}
