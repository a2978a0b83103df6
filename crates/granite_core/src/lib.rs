//! GRANITE Core Types
//!
//! This crate contains pure types and logic with no I/O: configuration
//! values, declared resources, node facts, and the diagnostic taxonomy
//! shared by every other crate in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod facts;
pub mod measure;
pub mod resource;
pub mod value;

// Re-exports
pub use error::{CompileError, CompileResult, SourceLocation};
pub use facts::Facts;
pub use measure::{Sample, TimingStore};
pub use resource::{Resource, ResourceRef, is_metaparameter, is_relationship};
pub use value::Value;
