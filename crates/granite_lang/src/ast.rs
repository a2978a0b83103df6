//! Parsed manifest statements.
//!
//! The abstract syntax the parser produces and the interpreter consumes.
//! Expressions stay unevaluated here; fact interpolation and template
//! rendering happen at interpretation time.

use granite_core::SourceLocation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An unevaluated manifest expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Quoted string, possibly containing `${fact}` interpolation
    Str(String),
    /// Boolean literal
    Bool(bool),
    /// Decimal number literal
    Number(Decimal),
    /// Array of expressions
    Array(Vec<Expr>),
    /// Fact variable, `$osfamily`
    Var(String),
    /// Resource reference, `File["/etc/motd"]`
    Ref {
        /// Referenced type name
        type_name: String,
        /// Referenced title
        title: String,
    },
    /// Template call, `template("motd/motd.erb")`
    Template(String),
}

/// One declared resource, before evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDecl {
    /// Resource type name, lowercased
    pub type_name: String,
    /// Title expression
    pub title: Expr,
    /// Attribute pairs in declaration order
    pub attributes: Vec<(String, Expr)>,
    /// Whether the declaration was exported with `@@`
    pub exported: bool,
    /// Where the declaration starts
    pub location: SourceLocation,
}

/// A `node` block guarding declarations by node name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBlock {
    /// Node names the block matches
    pub names: Vec<String>,
    /// Whether this is the `node default` block
    pub default: bool,
    /// Declarations inside the block
    pub body: Vec<ResourceDecl>,
}

impl NodeBlock {
    /// Check whether the block applies to a node name
    #[must_use]
    pub fn matches(&self, node: &str) -> bool {
        self.names.iter().any(|n| n == node)
    }
}

/// A top-level manifest statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Unconditional resource declaration
    Resource(ResourceDecl),
    /// Node-scoped declarations
    Node(NodeBlock),
}
