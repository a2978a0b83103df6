//! The resource-type registry.
//!
//! Routes each resource to the pipeline registered for its type. Types
//! without a registered pipeline validate with an accept-anything default
//! so site-specific types do not require registration.

use crate::pipeline::ValidatorPipeline;
use granite_core::{CompileResult, Resource};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while populating a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A pipeline is already registered under the name
    #[error("resource type already registered: {0}")]
    AlreadyRegistered(String),
}

/// Registry mapping type names to their validation pipelines
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, ValidatorPipeline>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pipeline under a type name
    ///
    /// Type names are case-insensitive and stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pipeline: ValidatorPipeline,
    ) -> Result<(), RegistryError> {
        let name = name.into().to_lowercase();
        if self.types.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        debug!(type_name = %name, validators = pipeline.len(), "registered resource type");
        self.types.insert(name, pipeline);
        Ok(())
    }

    /// Look up the pipeline for a type name
    #[must_use]
    pub fn pipeline(&self, name: &str) -> Option<&ValidatorPipeline> {
        self.types.get(&name.to_lowercase())
    }

    /// Check whether a type is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&name.to_lowercase())
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check whether no types are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over registered type names in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Validate a resource through its type's pipeline
    ///
    /// Unregistered types pass through unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's first validation error.
    pub fn validate(&self, resource: Resource) -> CompileResult<Resource> {
        match self.types.get(&resource.type_name) {
            Some(pipeline) => pipeline.apply(resource),
            None => Ok(resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator;
    use granite_core::Value;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry
            .register("File", ValidatorPipeline::new())
            .unwrap();

        assert!(registry.contains("file"));
        assert!(registry.contains("File"));
        assert!(registry.pipeline("FILE").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register("file", ValidatorPipeline::new()).unwrap();

        let err = registry
            .register("File", ValidatorPipeline::new())
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("file".to_string()));
    }

    #[test]
    fn test_unregistered_type_passes_through() {
        let registry = TypeRegistry::new();
        let r = Resource::new("mycorp_widget", "w1").with("anything", Value::integer(7));

        let out = registry.validate(r.clone()).unwrap();
        assert_eq!(out, r);
    }

    #[test]
    fn test_validate_routes_to_pipeline() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                "service",
                ValidatorPipeline::new().with_validator(combinator::mandatory("ensure")),
            )
            .unwrap();

        let bad = Resource::new("service", "nginx");
        assert_eq!(registry.validate(bad).unwrap_err().kind(), "missing_required");

        let unrelated = Resource::new("package", "nginx");
        assert!(registry.validate(unrelated).is_ok());
    }
}
