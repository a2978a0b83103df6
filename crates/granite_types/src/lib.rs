//! GRANITE Resource-Type Validation
//!
//! Composable validator combinators over resource attribute maps, the
//! ordered per-type validation pipeline, and the process-wide type
//! registry routing resources to their pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtin;
pub mod combinator;
pub mod pipeline;
pub mod registry;

// Re-exports
pub use builtin::builtin_registry;
pub use combinator::Validator;
pub use pipeline::ValidatorPipeline;
pub use registry::{RegistryError, TypeRegistry};
