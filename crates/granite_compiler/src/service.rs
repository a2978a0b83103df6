//! Collaborator contracts.
//!
//! Fact retrieval, exported-resource exchange, and extra catalog checks
//! are trait seams so hosts can wire real backends. The defaults here
//! are inert and safe for tests and standalone use.

use crate::catalog::Catalog;
use async_trait::async_trait;
use granite_core::{CompileResult, Facts, Resource};
use indexmap::IndexMap;

/// Supplies facts for nodes
#[async_trait]
pub trait FactProvider: Send + Sync {
    /// Facts for a node; an empty set means the provider knows nothing
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the backend fails.
    async fn facts(&self, node: &str) -> CompileResult<Facts>;
}

/// In-memory fact provider
#[derive(Debug, Clone, Default)]
pub struct MemoryFactProvider {
    nodes: IndexMap<String, Facts>,
}

impl MemoryFactProvider {
    /// Create an empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the fact set for a node (builder form)
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>, facts: Facts) -> Self {
        self.nodes.insert(node.into(), facts);
        self
    }
}

#[async_trait]
impl FactProvider for MemoryFactProvider {
    async fn facts(&self, node: &str) -> CompileResult<Facts> {
        Ok(self.nodes.get(node).cloned().unwrap_or_default())
    }
}

/// Exchange point for resources exported between nodes
///
/// Returned resources are treated as already validated.
#[async_trait]
pub trait ExportedResourceStore: Send + Sync {
    /// Resources other nodes exported for `node` to apply
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the backend fails.
    async fn exported_for(&self, node: &str) -> CompileResult<Vec<Resource>>;

    /// Fact fallback for nodes the fact provider does not know
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the backend fails.
    async fn facts_for(&self, node: &str) -> CompileResult<Facts>;
}

/// Store that exports nothing and knows no facts
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExportStore;

#[async_trait]
impl ExportedResourceStore for NullExportStore {
    async fn exported_for(&self, _node: &str) -> CompileResult<Vec<Resource>> {
        Ok(Vec::new())
    }

    async fn facts_for(&self, _node: &str) -> CompileResult<Facts> {
        Ok(Facts::new())
    }
}

/// Extra consistency test run on an assembled catalog
///
/// A check may turn a successful compilation into a failure, never the
/// reverse.
pub trait CatalogCheck: Send + Sync {
    /// Inspect the catalog
    ///
    /// # Errors
    ///
    /// Returns a diagnostic to fail the compilation.
    fn check(&self, catalog: &Catalog) -> CompileResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_lookup() {
        let provider = MemoryFactProvider::new().with_node(
            "web1",
            [("osfamily", "Debian")].into_iter().collect::<Facts>(),
        );

        let known = provider.facts("web1").await.unwrap();
        assert_eq!(known.get("osfamily"), Some("Debian"));

        let unknown = provider.facts("db9").await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_null_export_store() {
        let store = NullExportStore;
        assert!(store.exported_for("web1").await.unwrap().is_empty());
        assert!(store.facts_for("web1").await.unwrap().is_empty());
    }
}
