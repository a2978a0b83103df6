//! The compiled catalog.
//!
//! Holds one node's validated resources, their resolved dependency
//! edges, the subset exported for other nodes, and non-fatal warnings.
//! Edges point from a resource to the resources it depends on.

use granite_core::{
    CompileError, CompileResult, Resource, ResourceRef, Value, is_relationship,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Compiled desired state for one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Node the catalog was compiled for
    pub node: String,
    /// Local resources keyed by identity, in declaration order
    pub resources: IndexMap<ResourceRef, Resource>,
    /// Dependency edges: key depends on every member of its set
    pub edges: IndexMap<ResourceRef, IndexSet<ResourceRef>>,
    /// Resources this node exports for others
    pub exported: IndexMap<ResourceRef, Resource>,
    /// Non-fatal findings collected during compilation
    pub warnings: Vec<String>,
}

impl Catalog {
    /// Create an empty catalog for a node
    #[must_use]
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            ..Self::default()
        }
    }

    /// Number of local resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check whether the catalog has no local resources
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up a local resource by identity
    #[must_use]
    pub fn get(&self, reference: &ResourceRef) -> Option<&Resource> {
        self.resources.get(reference)
    }

    /// Add a local resource
    ///
    /// # Errors
    ///
    /// Returns `DuplicateResource` when the identity is already taken.
    pub fn add_resource(&mut self, resource: Resource) -> CompileResult<()> {
        let reference = resource.reference();
        if self.resources.contains_key(&reference) {
            return Err(CompileError::DuplicateResource {
                resource: reference.to_string(),
            });
        }
        self.resources.insert(reference, resource);
        Ok(())
    }

    /// Add a resource exported for other nodes
    ///
    /// # Errors
    ///
    /// Returns `DuplicateResource` when the identity is already exported.
    pub fn add_exported(&mut self, resource: Resource) -> CompileResult<()> {
        let reference = resource.reference();
        if self.exported.contains_key(&reference) {
            return Err(CompileError::DuplicateResource {
                resource: reference.to_string(),
            });
        }
        self.exported.insert(reference, resource);
        Ok(())
    }

    /// Resolve relationship metaparameters into dependency edges
    ///
    /// `after` and `subscribe` make the declaring resource depend on the
    /// target; `before` and `notify` make the target depend on the
    /// declaring resource.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` for a target not in the catalog,
    /// `TypeMismatch` for a relationship value that is not a reference
    /// string or an array of them.
    pub fn resolve_edges(&mut self) -> CompileResult<()> {
        let mut pairs: Vec<(ResourceRef, ResourceRef)> = Vec::new();

        for resource in self.resources.values() {
            let declarer = resource.reference();
            for (param, value) in &resource.attributes {
                if !is_relationship(param) {
                    continue;
                }
                for target in relationship_targets(param, value)? {
                    if !self.resources.contains_key(&target) {
                        return Err(CompileError::UnresolvedReference {
                            from: declarer.to_string(),
                            to: target.to_string(),
                        });
                    }
                    match param.as_str() {
                        "after" | "subscribe" => pairs.push((declarer.clone(), target)),
                        _ => pairs.push((target, declarer.clone())),
                    }
                }
            }
        }

        for (dependent, dependency) in pairs {
            self.edges.entry(dependent).or_default().insert(dependency);
        }
        Ok(())
    }
}

fn relationship_targets(param: &str, value: &Value) -> CompileResult<Vec<ResourceRef>> {
    match value {
        Value::String(text) => Ok(vec![ResourceRef::parse(text)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => ResourceRef::parse(text),
                other => Err(mismatch(param, other)),
            })
            .collect(),
        other => Err(mismatch(param, other)),
    }
}

fn mismatch(param: &str, value: &Value) -> CompileError {
    CompileError::TypeMismatch {
        param: param.to_string(),
        expected: "a resource reference or an array of them",
        actual: value.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> Resource {
        Resource::new("file", path).with("ensure", Value::string("present"))
    }

    #[test]
    fn test_add_resource_rejects_duplicate_identity() {
        let mut catalog = Catalog::new("web1");
        catalog.add_resource(file("/etc/motd")).unwrap();

        let err = catalog.add_resource(file("/etc/motd")).unwrap_err();
        assert_eq!(err.kind(), "duplicate_resource");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_resolve_edges_directions() {
        let mut catalog = Catalog::new("web1");
        catalog.add_resource(file("/etc/nginx.conf")).unwrap();
        catalog
            .add_resource(
                Resource::new("service", "nginx")
                    .with("subscribe", Value::string("File[/etc/nginx.conf]")),
            )
            .unwrap();
        catalog
            .add_resource(
                Resource::new("package", "nginx").with("before", Value::string("Service[nginx]")),
            )
            .unwrap();
        catalog.resolve_edges().unwrap();

        let service = ResourceRef::new("service", "nginx");
        let deps = &catalog.edges[&service];
        assert!(deps.contains(&ResourceRef::new("file", "/etc/nginx.conf")));
        assert!(deps.contains(&ResourceRef::new("package", "nginx")));
        assert_eq!(catalog.edges.len(), 1);
    }

    #[test]
    fn test_resolve_edges_array_targets() {
        let mut catalog = Catalog::new("web1");
        catalog.add_resource(file("/a")).unwrap();
        catalog.add_resource(file("/b")).unwrap();
        catalog
            .add_resource(Resource::new("exec", "sync").with(
                "after",
                Value::Array(vec![Value::string("File[/a]"), Value::string("File[/b]")]),
            ))
            .unwrap();
        catalog.resolve_edges().unwrap();

        let deps = &catalog.edges[&ResourceRef::new("exec", "sync")];
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_resolve_edges_unresolved_target() {
        let mut catalog = Catalog::new("web1");
        catalog
            .add_resource(
                Resource::new("service", "nginx")
                    .with("after", Value::string("Package[nginx]")),
            )
            .unwrap();

        let err = catalog.resolve_edges().unwrap_err();
        match err {
            CompileError::UnresolvedReference { from, to } => {
                assert_eq!(from, "Service[nginx]");
                assert_eq!(to, "Package[nginx]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_edges_rejects_non_reference_value() {
        let mut catalog = Catalog::new("web1");
        catalog
            .add_resource(Resource::new("service", "nginx").with("after", Value::Boolean(true)))
            .unwrap();
        assert_eq!(catalog.resolve_edges().unwrap_err().kind(), "type_mismatch");
    }

    #[test]
    fn test_exported_resources_kept_apart() {
        let mut catalog = Catalog::new("db1");
        catalog
            .add_exported(Resource::new("host", "db1").with("ip", Value::string("10.0.0.5")))
            .unwrap();

        assert!(catalog.is_empty());
        assert_eq!(catalog.exported.len(), 1);
    }

    #[test]
    fn test_catalog_serializes_with_string_keys() {
        let mut catalog = Catalog::new("web1");
        catalog.add_resource(file("/etc/motd")).unwrap();
        catalog.resolve_edges().unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json["resources"]["File[/etc/motd]"].is_object());
    }
}
