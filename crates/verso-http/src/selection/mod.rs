//! Version-aware candidate selection
//!
//! Every candidate maps to the requested version explicitly, implicitly or
//! not at all. Explicit matches win over implicit ones; several matches of
//! the same strength are ambiguous unless a per-controller pass leaves
//! exactly one.

mod action;
mod controller;
mod precedence;

pub use action::{select_best_candidate, SelectedAction};
pub use controller::{select_controller, SelectedController};
pub use precedence::{filter_by_precedence, request_parameter_names};

/// More than one candidate matched the request equally well.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the request matched multiple candidates: {}", .candidates.join(", "))]
pub struct AmbiguousMatchError {
    /// Names of the matching candidates
    pub candidates: Vec<String>,
}

impl AmbiguousMatchError {
    pub(crate) fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut candidates: Vec<String> = Vec::new();
        for name in names {
            if !candidates.iter().any(|c| c == name) {
                candidates.push(name.to_string());
            }
        }
        Self { candidates }
    }
}
