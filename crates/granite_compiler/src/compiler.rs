//! Catalog compilation orchestrator.
//!
//! Drives one node's compilation end to end: unit-path resolution,
//! manifest loading through the single-flight parse cache,
//! interpretation, per-type validation, catalog assembly with edge
//! resolution, and the extra checks. The first failure aborts the
//! node's compilation with exactly one diagnostic; no partial catalog
//! escapes.

use crate::cache::ComputeCache;
use crate::catalog::Catalog;
use crate::config::CompilerConfig;
use crate::metrics::CompilerMetrics;
use crate::service::{
    CatalogCheck, ExportedResourceStore, FactProvider, MemoryFactProvider, NullExportStore,
};
use granite_core::{CompileError, CompileResult, Facts};
use granite_lang::{
    AuxServices, BasicInterpreter, Interpreter, Lookup, Statement, TemplateEvaluator,
    parse_manifest,
};
use granite_types::TypeRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Compiles catalogs for nodes
///
/// Cheap to share behind an `Arc`; many nodes may compile concurrently.
/// The parse cache is the only cross-request synchronization point.
pub struct CatalogCompiler {
    config: CompilerConfig,
    registry: Arc<TypeRegistry>,
    interpreter: Arc<dyn Interpreter>,
    aux: AuxServices,
    facts: Arc<dyn FactProvider>,
    exports: Arc<dyn ExportedResourceStore>,
    checks: Vec<Arc<dyn CatalogCheck>>,
    parse_cache: ComputeCache<PathBuf, Arc<Vec<Statement>>>,
    metrics: Arc<CompilerMetrics>,
}

impl CatalogCompiler {
    /// Create a compiler with inert collaborators
    #[must_use]
    pub fn new(config: CompilerConfig, registry: Arc<TypeRegistry>) -> Self {
        let metrics = Arc::new(CompilerMetrics::new());
        let mut aux = AuxServices::literal();
        aux.render_timings = Arc::clone(&metrics.rendering);

        Self {
            config,
            registry,
            interpreter: Arc::new(BasicInterpreter),
            aux,
            facts: Arc::new(MemoryFactProvider::new()),
            exports: Arc::new(NullExportStore),
            checks: Vec::new(),
            parse_cache: ComputeCache::new(),
            metrics,
        }
    }

    /// Replace the interpreter (builder form)
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Arc<dyn Interpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Replace the template engine (builder form)
    #[must_use]
    pub fn with_template(mut self, template: Arc<dyn TemplateEvaluator>) -> Self {
        self.aux.template = template;
        self
    }

    /// Replace the key-value lookup (builder form)
    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn Lookup>) -> Self {
        self.aux.lookup = lookup;
        self
    }

    /// Replace the fact provider (builder form)
    #[must_use]
    pub fn with_fact_provider(mut self, facts: Arc<dyn FactProvider>) -> Self {
        self.facts = facts;
        self
    }

    /// Replace the exported-resource store (builder form)
    #[must_use]
    pub fn with_export_store(mut self, exports: Arc<dyn ExportedResourceStore>) -> Self {
        self.exports = exports;
        self
    }

    /// Append an extra catalog check (builder form)
    #[must_use]
    pub fn with_check(mut self, check: Arc<dyn CatalogCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Timing surface for monitoring
    #[must_use]
    pub fn metrics(&self) -> Arc<CompilerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Compile a catalog for `node` with the given facts
    ///
    /// # Errors
    ///
    /// Returns the first diagnostic hit anywhere in the run.
    pub async fn compile(&self, node: &str, facts: &Facts) -> CompileResult<Catalog> {
        let outcome = self
            .metrics
            .compilation
            .time_async(node.to_string(), self.compile_inner(node, facts))
            .await;
        match &outcome {
            Ok(catalog) => info!(
                node,
                resources = catalog.len(),
                warnings = catalog.warnings.len(),
                "compiled catalog"
            ),
            Err(error) => warn!(node, %error, "catalog compilation failed"),
        }
        outcome
    }

    /// Compile a catalog for `node`, retrieving its facts first
    ///
    /// Falls back to the export store's facts when the provider knows
    /// nothing about the node.
    ///
    /// # Errors
    ///
    /// Returns the first diagnostic from fact retrieval or compilation.
    pub async fn compile_node(&self, node: &str) -> CompileResult<Catalog> {
        let mut facts = self.facts.facts(node).await?;
        if facts.is_empty() {
            facts = self.exports.facts_for(node).await?;
        }
        self.compile(node, &facts).await
    }

    /// Compile catalogs for many nodes concurrently
    pub async fn compile_nodes(&self, nodes: &[String]) -> Vec<(String, CompileResult<Catalog>)> {
        let runs = nodes.iter().map(|node| async move {
            let outcome = self.compile_node(node).await;
            (node.clone(), outcome)
        });
        futures::future::join_all(runs).await
    }

    async fn compile_inner(&self, node: &str, facts: &Facts) -> CompileResult<Catalog> {
        let mut statements: Vec<Statement> = Vec::new();
        for unit in &self.config.units {
            let path = self.config.unit_path(unit)?;
            debug!(node, unit = %unit, path = %path.display(), "loading unit");
            let parsed = self.load(path).await?;
            statements.extend_from_slice(&parsed);
        }

        let evaluation = self
            .interpreter
            .evaluate(&statements, facts, node, &self.aux)?;

        let mut catalog = Catalog::new(node);
        catalog.warnings = evaluation.warnings;

        for resource in evaluation.resources {
            let validated = self.registry.validate(resource)?;
            if validated.exported {
                catalog.add_exported(validated)?;
            } else {
                catalog.add_resource(validated)?;
            }
        }

        // Imported resources were validated by their declaring node
        for mut imported in self.exports.exported_for(node).await? {
            imported.exported = false;
            catalog.add_resource(imported)?;
        }

        catalog.resolve_edges()?;

        for check in &self.checks {
            check.check(&catalog)?;
        }
        Ok(catalog)
    }

    /// Load one manifest through the parse cache
    async fn load(&self, path: PathBuf) -> CompileResult<Arc<Vec<Statement>>> {
        let metrics = Arc::clone(&self.metrics);
        self.parse_cache
            .get_or_compute(path.clone(), || async move {
                let display = path.display().to_string();
                let text = tokio::fs::read_to_string(&path).await.map_err(|error| {
                    CompileError::Parse {
                        message: format!("cannot read {display}: {error}"),
                        location: None,
                    }
                })?;
                metrics
                    .parsing
                    .time(display.clone(), || parse_manifest(&text, Some(&display)))
                    .map(Arc::new)
            })
            .await
    }
}

impl std::fmt::Debug for CatalogCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCompiler")
            .field("config", &self.config)
            .field("registered_types", &self.registry.len())
            .field("checks", &self.checks.len())
            .field("parse_cache", &self.parse_cache)
            .finish_non_exhaustive()
    }
}
