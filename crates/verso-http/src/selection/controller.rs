use super::AmbiguousMatchError;
use crate::candidate::ActionCandidate;
use verso_core::{trace_debug, trace_warn, ApiVersion, ApiVersionMapping};

/// The controller chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedController<'a> {
    pub name: &'a str,
    pub mapping: ApiVersionMapping,
}

struct ControllerGroup<'a, C> {
    name: &'a str,
    actions: Vec<&'a C>,
    mapping: ApiVersionMapping,
}

/// Pick the controller that serves `version` among the controllers of the
/// candidate actions.
///
/// A controller maps to a version as strongly as its best action does. The
/// rules then follow action selection: one explicit controller wins, else one
/// implicit controller wins; several explicit controllers are disambiguated
/// by running action selection inside each and keeping the controllers that
/// yield exactly one action.
pub fn select_controller<'a, C: ActionCandidate>(
    candidates: &[&'a C],
    version: Option<&ApiVersion>,
) -> Result<Option<SelectedController<'a>>, AmbiguousMatchError> {
    let mut groups: Vec<ControllerGroup<'a, C>> = Vec::new();

    for &candidate in candidates {
        let name = candidate.controller_name();
        let mapping = candidate.metadata().mapping_to(version);
        match groups.iter_mut().find(|g| g.name.eq_ignore_ascii_case(name)) {
            Some(group) => {
                group.actions.push(candidate);
                group.mapping = group.mapping.max(mapping);
            }
            None => groups.push(ControllerGroup {
                name,
                actions: vec![candidate],
                mapping,
            }),
        }
    }

    let best: Vec<&ControllerGroup<'a, C>> = groups
        .iter()
        .filter(|g| g.mapping == ApiVersionMapping::Explicit)
        .collect();
    let implicit: Vec<&ControllerGroup<'a, C>> = groups
        .iter()
        .filter(|g| g.mapping == ApiVersionMapping::Implicit)
        .collect();

    match (best.as_slice(), implicit.as_slice()) {
        ([only], _) | ([], [only]) => Ok(Some(SelectedController {
            name: only.name,
            mapping: only.mapping,
        })),
        ([], []) => Ok(None),
        ([], several) => Err(ambiguous(several)),
        (several, _) => {
            let survivors: Vec<&&ControllerGroup<'a, C>> = several
                .iter()
                .filter(|g| matches!(super::select_best_candidate(&g.actions, version), Ok(Some(_))))
                .collect();

            if let [only] = survivors.as_slice() {
                trace_debug!(controller = only.name, "Ambiguous controller match resolved");
                return Ok(Some(SelectedController {
                    name: only.name,
                    mapping: only.mapping,
                }));
            }
            Err(ambiguous(several))
        }
    }
}

fn ambiguous<C>(groups: &[&ControllerGroup<'_, C>]) -> AmbiguousMatchError {
    let error = AmbiguousMatchError::new(groups.iter().map(|g| g.name));
    trace_warn!(controllers = ?error.candidates, "Ambiguous controller match");
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

    fn action(controller: &str, name: &str, supported: u32, mapped: Option<u32>) -> ActionDescriptor<()> {
        let api = ApiVersionModelBuilder::new().has_api_version(v(supported)).build();
        let endpoint = match mapped {
            Some(m) => ApiVersionModelBuilder::new().maps_to_api_version(v(m)).build(),
            None => ApiVersionModel::empty(),
        };
        ActionDescriptor::new(controller, name, ApiVersionMetadata::new(api, endpoint), ())
    }

    #[test]
    fn test_selects_controller_by_version() {
        let v1 = action("OrdersV1", "Get", 1, None);
        let v2 = action("OrdersV2", "Get", 2, None);
        let candidates = [&v1, &v2];

        let selected = select_controller(&candidates, Some(&v(2))).unwrap().unwrap();
        assert_eq!(selected.name, "OrdersV2");
        assert_eq!(selected.mapping, ApiVersionMapping::Implicit);

        assert!(select_controller(&candidates, Some(&v(3))).unwrap().is_none());
    }

    #[test]
    fn test_explicit_controller_wins() {
        let implicit = action("Orders", "Get", 2, None);
        let explicit = action("Preview", "Get", 2, Some(2));

        let selected = select_controller(&[&implicit, &explicit], Some(&v(2)))
            .unwrap()
            .unwrap();
        assert_eq!(selected.name, "Preview");
        assert_eq!(selected.mapping, ApiVersionMapping::Explicit);
    }

    #[test]
    fn test_controller_disambiguation() {
        let a1 = action("Orders", "Get", 2, Some(2));
        let a2 = action("Orders", "Find", 2, Some(2));
        let b = action("Customers", "Get", 2, Some(2));

        let selected = select_controller(&[&a1, &a2, &b], Some(&v(2))).unwrap().unwrap();
        assert_eq!(selected.name, "Customers");

        let c = action("Products", "Get", 2, Some(2));
        let error = select_controller(&[&b, &c], Some(&v(2))).unwrap_err();
        assert_eq!(error.candidates, vec!["Customers", "Products"]);
    }
}
