//! GRANITE Manifest Language
//!
//! The declarative manifest grammar, its nom parser, and the interpreter
//! contract turning parsed statements plus node facts into declared
//! resources.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod interp;
pub mod parser;

// Re-exports
pub use ast::{Expr, NodeBlock, ResourceDecl, Statement};
pub use interp::{
    AuxServices, BasicInterpreter, Evaluation, Interpreter, LiteralTemplate, Lookup, NoopLookup,
    Scope, TemplateEvaluator,
};
pub use parser::parse_manifest;
