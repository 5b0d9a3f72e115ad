use crate::candidate::ActionCandidate;
use crate::route::RouteValues;
use http::request::Parts;
use std::cmp::Ordering;

/// Names of the route values and query parameters present on a request.
pub fn request_parameter_names(request: &Parts) -> Vec<String> {
    let mut names: Vec<String> = request
        .extensions
        .get::<RouteValues>()
        .map(|values| values.keys().map(str::to_string).collect())
        .unwrap_or_default();

    if let Some(query) = request.uri.query() {
        if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            names.extend(pairs.into_iter().map(|(key, _)| key));
        }
    }

    names
}

/// Narrow conventionally routed candidates before version selection.
///
/// Keeps the candidates with the lowest order, then among those the lowest
/// precedence, then the ones binding the most of the request's parameters.
pub fn filter_by_precedence<'a, C: ActionCandidate>(
    candidates: Vec<&'a C>,
    parameters: &[String],
) -> Vec<&'a C> {
    let Some(order) = candidates.iter().map(|c| c.order()).min() else {
        return candidates;
    };
    let candidates: Vec<&'a C> = candidates.into_iter().filter(|c| c.order() == order).collect();

    let precedence = candidates
        .iter()
        .map(|c| c.precedence())
        .min_by(f64::total_cmp)
        .unwrap_or_default();
    let candidates: Vec<&'a C> = candidates
        .into_iter()
        .filter(|c| c.precedence().total_cmp(&precedence) == Ordering::Equal)
        .collect();

    let matched = |candidate: &C| {
        candidate
            .parameter_names()
            .iter()
            .filter(|name| parameters.iter().any(|p| p.eq_ignore_ascii_case(name)))
            .count()
    };
    let most = candidates.iter().map(|c| matched(*c)).max().unwrap_or_default();

    candidates.into_iter().filter(|c| matched(*c) == most).collect()
}
