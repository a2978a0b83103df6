//! GRANITE Catalog Compiler
//!
//! Orchestrates catalog compilation for a node: manifest loading through
//! the single-flight parse cache, interpretation, type validation,
//! catalog assembly with dependency-edge resolution, and the extra
//! consistency checks. Many nodes compile concurrently; the parse cache
//! is the only cross-request synchronization point.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod metrics;
pub mod service;

// Re-exports
pub use cache::ComputeCache;
pub use catalog::Catalog;
pub use compiler::CatalogCompiler;
pub use config::CompilerConfig;
pub use metrics::CompilerMetrics;
pub use service::{
    CatalogCheck, ExportedResourceStore, FactProvider, MemoryFactProvider, NullExportStore,
};
