//! Apply-time value resolution
//!
//! Replaces `Ref` and `Import` properties with the concrete strings the
//! provisioner and the export store work with.

use std::collections::BTreeMap;

use crate::domain::entities::{Property, PublishedExports, Resource, StackId, StackPlan};
use crate::domain::ports::{ExportError, ExportLookup, ProvisionedResource};
use crate::error::{StackplanError, StackplanResult};

/// Resources already created in the stack being applied
pub type Created = BTreeMap<String, ProvisionedResource>;

/// Resolve every reference and import in `value`
pub fn resolve_property(
    stack: &StackId,
    value: &Property,
    created: &Created,
    imports: &dyn ExportLookup,
) -> StackplanResult<Property> {
    Ok(match value {
        Property::Ref { resource, attr } => {
            let found = created
                .get(resource)
                .and_then(|r| r.attribute(attr))
                .ok_or_else(|| StackplanError::InvalidGraph {
                    message: format!(
                        "{}: attribute '{}' of '{}' is not available",
                        stack, attr, resource
                    ),
                })?;
            Property::Str(found.to_string())
        }
        Property::Import { stack: source, output } => {
            Property::Str(imports.get(source, output)?)
        }
        Property::List(items) => Property::List(
            items
                .iter()
                .map(|p| resolve_property(stack, p, created, imports))
                .collect::<StackplanResult<_>>()?,
        ),
        Property::Map(map) => Property::Map(
            map.iter()
                .map(|(k, p)| Ok((k.clone(), resolve_property(stack, p, created, imports)?)))
                .collect::<StackplanResult<_>>()?,
        ),
        other => other.clone(),
    })
}

/// Copy of `resource` with every property resolved
pub fn resolve_resource(
    stack: &StackId,
    resource: &Resource,
    created: &Created,
    imports: &dyn ExportLookup,
) -> StackplanResult<Resource> {
    let mut resolved = resource.clone();
    for value in resolved.properties.values_mut() {
        *value = resolve_property(stack, value, created, imports)?;
    }
    Ok(resolved)
}

/// Flatten a resolved property into its published string form
///
/// Lists are joined with `,`; maps are JSON-encoded.
pub fn export_string(value: &Property) -> String {
    match value {
        Property::Str(s) => s.clone(),
        Property::Int(i) => i.to_string(),
        Property::Bool(b) => b.to_string(),
        Property::List(items) => items
            .iter()
            .map(export_string)
            .collect::<Vec<_>>()
            .join(","),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Resolve and flatten the exports of an applied stack
pub fn publishable_exports(
    plan: &StackPlan,
    created: &Created,
    imports: &dyn ExportLookup,
) -> StackplanResult<PublishedExports> {
    let mut published = PublishedExports::default();
    for (name, value) in &plan.exports {
        let resolved = resolve_property(&plan.id, value, created, imports)?;
        published.insert(name.clone(), export_string(&resolved));
    }
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ResourceKind;

    struct NoImports;

    impl ExportLookup for NoImports {
        fn get(&self, stack: &StackId, output: &str) -> Result<String, ExportError> {
            Err(ExportError::not_found(stack, output))
        }
    }

    fn created() -> Created {
        let mut created = Created::new();
        let mut cluster = ProvisionedResource {
            physical_id: "cluster-1".to_string(),
            ..Default::default()
        };
        cluster
            .attributes
            .insert("name".to_string(), "webapp-dev".to_string());
        created.insert("cluster".to_string(), cluster);
        created
    }

    #[test]
    fn references_resolve_inside_nested_values() {
        let stack = StackId::from("s");
        let value = Property::map([(
            "targets",
            Property::List(vec![Property::id_of("cluster"), Property::from("x")]),
        )]);
        let resolved = resolve_property(&stack, &value, &created(), &NoImports).unwrap();
        let targets = resolved.get("targets").and_then(Property::as_list).unwrap();
        assert_eq!(targets[0], Property::from("cluster-1"));
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let stack = StackId::from("s");
        let resource = Resource::new("svc", ResourceKind::Service)
            .with("cluster", Property::reference("missing", "name"));
        let err = resolve_resource(&stack, &resource, &created(), &NoImports).unwrap_err();
        assert!(matches!(err, StackplanError::InvalidGraph { .. }));
    }

    #[test]
    fn missing_import_surfaces_as_export_not_found() {
        let stack = StackId::from("s");
        let value = Property::import(&StackId::from("webapp-dev-network"), "network-id");
        let err = resolve_property(&stack, &value, &created(), &NoImports).unwrap_err();
        assert!(matches!(err, StackplanError::ExportNotFound { .. }));
    }

    #[test]
    fn lists_publish_comma_joined() {
        let value = Property::from(vec!["subnet-a", "subnet-b"]);
        assert_eq!(export_string(&value), "subnet-a,subnet-b");
        assert_eq!(export_string(&Property::Int(3)), "3");
    }
}
