use super::AmbiguousMatchError;
use crate::candidate::ActionCandidate;
use verso_core::{trace_debug, trace_warn, ApiVersion, ApiVersionMapping};

/// The action chosen for a request.
#[derive(Debug)]
pub struct SelectedAction<'a, C> {
    pub candidate: &'a C,
    pub mapping: ApiVersionMapping,
}

impl<C> Clone for SelectedAction<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for SelectedAction<'_, C> {}

/// Pick the single best candidate for `version`.
///
/// Exactly one explicit match wins. Without explicit matches, exactly one
/// implicit match wins. Several explicit matches get one disambiguation pass:
/// candidates are grouped by controller, selection runs inside each
/// controller, and the match succeeds only if exactly one controller yields a
/// result. Returns `Ok(None)` when nothing maps to the version.
pub fn select_best_candidate<'a, C: ActionCandidate>(
    candidates: &[&'a C],
    version: Option<&ApiVersion>,
) -> Result<Option<SelectedAction<'a, C>>, AmbiguousMatchError> {
    select(candidates, version, true)
}

fn select<'a, C: ActionCandidate>(
    candidates: &[&'a C],
    version: Option<&ApiVersion>,
    disambiguate: bool,
) -> Result<Option<SelectedAction<'a, C>>, AmbiguousMatchError> {
    let mut best: Vec<&'a C> = Vec::new();
    let mut implicit: Vec<&'a C> = Vec::new();

    for &candidate in candidates {
        match candidate.metadata().mapping_to(version) {
            ApiVersionMapping::Explicit => best.push(candidate),
            ApiVersionMapping::Implicit => implicit.push(candidate),
            ApiVersionMapping::None => {}
        }
    }

    match (best.as_slice(), implicit.as_slice()) {
        ([only], _) => Ok(Some(SelectedAction {
            candidate: *only,
            mapping: ApiVersionMapping::Explicit,
        })),
        ([], []) => Ok(None),
        ([], [only]) => Ok(Some(SelectedAction {
            candidate: *only,
            mapping: ApiVersionMapping::Implicit,
        })),
        ([], several) => Err(ambiguous(several)),
        (several, _) if disambiguate => disambiguate_by_controller(candidates, several, version),
        (several, _) => Err(ambiguous(several)),
    }
}

fn disambiguate_by_controller<'a, C: ActionCandidate>(
    candidates: &[&'a C],
    best: &[&'a C],
    version: Option<&ApiVersion>,
) -> Result<Option<SelectedAction<'a, C>>, AmbiguousMatchError> {
    let mut controllers: Vec<&str> = Vec::new();
    for candidate in best {
        let name = candidate.controller_name();
        if !controllers.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            controllers.push(name);
        }
    }

    let mut survivors = Vec::new();
    for controller in &controllers {
        let group: Vec<&'a C> = candidates
            .iter()
            .copied()
            .filter(|c| c.controller_name().eq_ignore_ascii_case(controller))
            .collect();
        if let Ok(Some(selected)) = select(&group, version, false) {
            survivors.push(selected);
        }
    }

    if let [only] = survivors.as_slice() {
        trace_debug!(
            candidate = only.candidate.display_name(),
            "Ambiguous match resolved by controller"
        );
        return Ok(Some(*only));
    }

    Err(ambiguous(best))
}

fn ambiguous<C: ActionCandidate>(matches: &[&C]) -> AmbiguousMatchError {
    let error = AmbiguousMatchError::new(matches.iter().map(|c| c.display_name()));
    trace_warn!(candidates = ?error.candidates, "Ambiguous candidate match");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::ActionDescriptor;
    use verso_core::{ApiVersionMetadata, ApiVersionModel, ApiVersionModelBuilder};

    fn v(major: u32) -> ApiVersion {
        ApiVersion::new(major, 0)
    }

    fn controller_model(versions: &[u32]) -> ApiVersionModel {
        versions
            .iter()
            .fold(ApiVersionModelBuilder::new(), |b, m| b.has_api_version(v(*m)))
            .build()
    }

    fn implicit(controller: &str, action: &str, versions: &[u32]) -> ActionDescriptor<()> {
        let metadata = ApiVersionMetadata::new(controller_model(versions), ApiVersionModel::empty());
        ActionDescriptor::new(controller, action, metadata, ())
    }

    fn explicit(controller: &str, action: &str, api: &[u32], mapped: u32) -> ActionDescriptor<()> {
        let endpoint = ApiVersionModelBuilder::new().maps_to_api_version(v(mapped)).build();
        let metadata = ApiVersionMetadata::new(controller_model(api), endpoint);
        ActionDescriptor::new(controller, action, metadata, ())
    }

    #[test]
    fn test_explicit_beats_implicit() {
        let get = implicit("Values", "Get", &[1, 2]);
        let get_v2 = explicit("Values", "GetV2", &[1, 2], 2);
        let candidates = [&get, &get_v2];

        let selected = select_best_candidate(&candidates, Some(&v(2))).unwrap().unwrap();
        assert_eq!(selected.candidate.display_name(), "Values.GetV2");
        assert_eq!(selected.mapping, ApiVersionMapping::Explicit);

        let selected = select_best_candidate(&candidates, Some(&v(1))).unwrap().unwrap();
        assert_eq!(selected.candidate.display_name(), "Values.Get");
        assert_eq!(selected.mapping, ApiVersionMapping::Implicit);
    }

    #[test]
    fn test_no_match() {
        let get = implicit("Values", "Get", &[1]);
        assert!(select_best_candidate(&[&get], Some(&v(3))).unwrap().is_none());
        assert!(select_best_candidate(&[&get], None).unwrap().is_none());
    }

    #[test]
    fn test_two_implicit_matches_are_ambiguous() {
        let a = implicit("Values", "Get", &[1]);
        let b = implicit("Values", "List", &[1]);

        let error = select_best_candidate(&[&a, &b], Some(&v(1))).unwrap_err();
        assert_eq!(error.candidates, vec!["Values.Get", "Values.List"]);
    }

    #[test]
    fn test_disambiguation_by_controller() {
        let a1 = explicit("Orders", "Get", &[2], 2);
        let a2 = explicit("Orders", "Find", &[2], 2);
        let b = explicit("Customers", "Get", &[2], 2);

        let selected = select_best_candidate(&[&a1, &a2, &b], Some(&v(2)))
            .unwrap()
            .unwrap();
        assert_eq!(selected.candidate.display_name(), "Customers.Get");
    }

    #[test]
    fn test_disambiguation_fails_with_several_survivors() {
        let a = explicit("Orders", "Get", &[2], 2);
        let b = explicit("Customers", "Get", &[2], 2);

        let error = select_best_candidate(&[&a, &b], Some(&v(2))).unwrap_err();
        assert_eq!(error.candidates, vec!["Orders.Get", "Customers.Get"]);
    }

    #[test]
    fn test_neutral_candidate_matches_any_version() {
        let neutral = ActionDescriptor::new("Health", "Ping", ApiVersionMetadata::neutral(), ());

        for version in [Some(v(1)), Some(v(42)), None] {
            let selected = select_best_candidate(&[&neutral], version.as_ref())
                .unwrap()
                .unwrap();
            assert_eq!(selected.mapping, ApiVersionMapping::Implicit);
        }
    }
}
