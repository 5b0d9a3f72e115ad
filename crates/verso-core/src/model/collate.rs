//! Model collation
//!
//! Controllers that share a name form one logical API. Collation merges their
//! models, and the models of all their actions, so every element reports the
//! complete set of versions for the API while keeping its own declarations.

use super::ApiVersionModel;
use crate::{trace_debug, ApiVersionMetadata};

/// One action as declared by the host.
#[derive(Debug, Clone)]
pub struct ActionDeclaration {
    /// Action name, used for diagnostics
    pub name: String,
    /// Versions declared on the action itself
    pub model: ApiVersionModel,
}

impl ActionDeclaration {
    pub fn new(name: impl Into<String>, model: ApiVersionModel) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }
}

/// One controller and its actions as declared by the host.
#[derive(Debug, Clone)]
pub struct ControllerDeclaration {
    /// Controller name; controllers with the same name (ignoring case) are
    /// collated together
    pub name: String,
    /// Versions declared on the controller
    pub model: ApiVersionModel,
    /// Actions of this controller
    pub actions: Vec<ActionDeclaration>,
}

impl ControllerDeclaration {
    pub fn new(name: impl Into<String>, model: ApiVersionModel) -> Self {
        Self {
            name: name.into(),
            model,
            actions: Vec::new(),
        }
    }

    /// Add an action.
    pub fn action(mut self, action: ActionDeclaration) -> Self {
        self.actions.push(action);
        self
    }
}

/// A controller after collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatedController {
    /// Controller name as declared
    pub name: String,
    /// Final controller model
    pub model: ApiVersionModel,
    /// Final metadata of each action, in declaration order
    pub actions: Vec<ApiVersionMetadata>,
}

/// Collate controller declarations.
///
/// Output order follows input order. For every group of same-named
/// controllers:
///
/// 1. `M_A` is the union of all non-neutral action models.
/// 2. `M_C` is the union of all non-neutral controller models and `M_A`.
/// 3. Each controller and each action is its own model aggregated with `M_C`.
///
/// Neutral controllers and actions keep the neutral model, and every action of
/// a neutral controller is neutral.
pub fn collate(controllers: &[ControllerDeclaration]) -> Vec<CollatedController> {
    let mut groups: Vec<Vec<&ControllerDeclaration>> = Vec::new();

    for controller in controllers {
        let existing = groups
            .iter_mut()
            .find(|group| group[0].name.eq_ignore_ascii_case(&controller.name));
        match existing {
            Some(group) => group.push(controller),
            None => groups.push(vec![controller]),
        }
    }

    let mut collated = Vec::with_capacity(controllers.len());
    for group in groups {
        let action_models = ApiVersionModel::aggregate_all(
            group
                .iter()
                .filter(|c| !c.model.is_api_version_neutral())
                .flat_map(|c| c.actions.iter().map(|a| &a.model)),
        );
        let api_model = ApiVersionModel::aggregate_all(
            group
                .iter()
                .map(|c| &c.model)
                .chain(std::iter::once(&action_models)),
        );

        trace_debug!(
            controller = %group[0].name,
            declarations = group.len(),
            supported = ?api_model.supported_api_versions(),
            deprecated = ?api_model.deprecated_api_versions(),
            "Collated API versions"
        );

        for controller in group {
            collated.push(collate_controller(controller, &api_model));
        }
    }

    collated
}

fn collate_controller(
    controller: &ControllerDeclaration,
    api_model: &ApiVersionModel,
) -> CollatedController {
    if controller.model.is_api_version_neutral() {
        let actions = controller
            .actions
            .iter()
            .map(|_| ApiVersionMetadata::neutral().with_name(controller.name.clone()))
            .collect();
        return CollatedController {
            name: controller.name.clone(),
            model: ApiVersionModel::neutral(),
            actions,
        };
    }

    let model = controller.model.aggregate(api_model);
    let actions = controller
        .actions
        .iter()
        .map(|action| {
            let endpoint = action.model.aggregate(api_model);
            ApiVersionMetadata::new(model.clone(), endpoint).with_name(controller.name.clone())
        })
        .collect();

    CollatedController {
        name: controller.name.clone(),
        model,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiVersion, ApiVersionMapping, ApiVersionModelBuilder};

    fn v(major: u32) -> ApiVersion {
        ApiVersion::new(major, 0)
    }

    #[test]
    fn test_same_named_controllers_share_versions() {
        let v1 = ControllerDeclaration::new(
            "Orders",
            ApiVersionModelBuilder::new()
                .has_deprecated_api_version(v(1))
                .build(),
        )
        .action(ActionDeclaration::new("Get", ApiVersionModel::empty()));
        let v2 = ControllerDeclaration::new(
            "orders",
            ApiVersionModelBuilder::new().has_api_version(v(2)).build(),
        )
        .action(ActionDeclaration::new("Get", ApiVersionModel::empty()));

        let collated = collate(&[v1, v2]);
        assert_eq!(collated.len(), 2);

        for controller in &collated {
            assert_eq!(controller.model.supported_api_versions(), &[v(2)]);
            assert_eq!(controller.model.deprecated_api_versions(), &[v(1)]);
        }
        assert_eq!(collated[0].model.declared_api_versions(), &[v(1)]);
        assert_eq!(collated[1].model.declared_api_versions(), &[v(2)]);

        let metadata = &collated[0].actions[0];
        assert_eq!(metadata.name(), Some("Orders"));
        assert_eq!(metadata.mapping_to(Some(&v(1))), ApiVersionMapping::Implicit);
        assert_eq!(metadata.mapping_to(Some(&v(2))), ApiVersionMapping::None);
    }

    #[test]
    fn test_action_versions_flow_into_controller() {
        let controller = ControllerDeclaration::new(
            "Values",
            ApiVersionModelBuilder::new().has_api_version(v(1)).build(),
        )
        .action(ActionDeclaration::new(
            "GetV3",
            ApiVersionModelBuilder::new().has_api_version(v(3)).build(),
        ))
        .action(ActionDeclaration::new("Get", ApiVersionModel::empty()));

        let collated = collate(&[controller]);
        let values = &collated[0];

        assert_eq!(values.model.supported_api_versions(), &[v(1), v(3)]);
        assert_eq!(values.model.declared_api_versions(), &[v(1)]);

        let v3 = &values.actions[0];
        assert_eq!(v3.endpoint_model().declared_api_versions(), &[v(3)]);
        assert_eq!(v3.endpoint_model().supported_api_versions(), &[v(1), v(3)]);
        assert_eq!(v3.mapping_to(Some(&v(3))), ApiVersionMapping::Explicit);
        assert_eq!(v3.mapping_to(Some(&v(1))), ApiVersionMapping::None);

        let get = &values.actions[1];
        assert_eq!(get.mapping_to(Some(&v(1))), ApiVersionMapping::Implicit);
    }

    #[test]
    fn test_neutral_elements_stay_neutral() {
        let versioned = ControllerDeclaration::new(
            "Health",
            ApiVersionModelBuilder::new().has_api_version(v(1)).build(),
        )
        .action(ActionDeclaration::new("Ping", ApiVersionModel::neutral()));
        let neutral = ControllerDeclaration::new("Meta", ApiVersionModel::neutral())
            .action(ActionDeclaration::new(
                "Info",
                ApiVersionModelBuilder::new().has_api_version(v(5)).build(),
            ));

        let collated = collate(&[versioned, neutral]);

        assert!(collated[0].actions[0].is_api_version_neutral());
        assert_eq!(collated[0].model.supported_api_versions(), &[v(1)]);
        assert!(collated[1].model.is_api_version_neutral());
        assert!(collated[1].actions[0].is_api_version_neutral());
    }

    #[test]
    fn test_collation_is_idempotent_for_single_controller() {
        let model = ApiVersionModelBuilder::new()
            .has_api_version(v(1))
            .has_api_version(v(2))
            .build();
        let controller = ControllerDeclaration::new("Items", model.clone())
            .action(ActionDeclaration::new("List", ApiVersionModel::empty()));

        let collated = collate(&[controller]);
        assert_eq!(collated[0].model, model);
    }
}
