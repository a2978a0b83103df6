//! Diagnostic taxonomy for catalog compilation.
//!
//! Every failure in the system surfaces as exactly one `CompileError`.
//! Errors are `Clone` because cached computations replay their failure to
//! every later caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used throughout the workspace
pub type CompileResult<T> = Result<T, CompileError>;

/// Position in a manifest source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file, when known
    pub file: Option<String>,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

impl SourceLocation {
    /// Create a new location
    #[must_use]
    pub fn new(file: Option<String>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "line {}, column {}", self.line, self.column),
        }
    }
}

/// Structured compilation diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Manifest could not be parsed
    #[error("parse error: {message}")]
    Parse {
        /// What went wrong
        message: String,
        /// Where it went wrong, when known
        location: Option<SourceLocation>,
    },

    /// Attribute keys outside the type's legal-parameter set
    #[error("invalid parameter(s) {} for {resource}", params.join(", "))]
    UnknownParameter {
        /// Resource identity (`Type[title]`)
        resource: String,
        /// The offending keys
        params: Vec<String>,
    },

    /// Value has the wrong kind for a parameter
    #[error("parameter {param} expects a {expected}, got {actual}")]
    TypeMismatch {
        /// Parameter name
        param: String,
        /// Expected value kind
        expected: &'static str,
        /// Observed value, rendered
        actual: String,
    },

    /// Required parameter is absent
    #[error("missing required parameter {param}")]
    MissingRequired {
        /// Parameter name
        param: String,
    },

    /// Value is not one of the allowed words
    #[error("parameter {param} must be one of [{}], got {value}", allowed.join(", "))]
    InvalidEnum {
        /// Parameter name
        param: String,
        /// Observed value
        value: String,
        /// Allowed values
        allowed: Vec<String>,
    },

    /// Number falls outside the permitted range
    #[error("parameter {param} must be between {lo} and {hi}, got {value}")]
    OutOfRange {
        /// Parameter name
        param: String,
        /// Observed value
        value: String,
        /// Inclusive lower bound
        lo: String,
        /// Inclusive upper bound
        hi: String,
    },

    /// Value does not match the required format
    #[error("parameter {param} is not {expected}: {value}")]
    InvalidFormat {
        /// Parameter name
        param: String,
        /// Observed value
        value: String,
        /// Description of the expected format
        expected: &'static str,
    },

    /// Value is empty where content is required
    #[error("parameter {param} must not be empty")]
    EmptyValue {
        /// Parameter name
        param: String,
    },

    /// Path is not absolute
    #[error("parameter {param} must be a fully qualified path, got {value}")]
    NotAbsolute {
        /// Parameter name
        param: String,
        /// Observed value
        value: String,
    },

    /// Two mutually exclusive attributes are both set
    #[error("cannot set both {first} and {second}")]
    ConflictingAttributes {
        /// First attribute
        first: String,
        /// Second attribute
        second: String,
    },

    /// Relationship points at an identity absent from the catalog
    #[error("{from} requires {to}, which is not in the catalog")]
    UnresolvedReference {
        /// Declaring resource identity
        from: String,
        /// Missing target identity
        to: String,
    },

    /// Same identity declared twice
    #[error("duplicate declaration of {resource}")]
    DuplicateResource {
        /// Conflicting identity
        resource: String,
    },

    /// The interpreter collaborator failed
    #[error("interpreter error: {message}")]
    Interpreter {
        /// What went wrong
        message: String,
        /// Where it went wrong, when known
        location: Option<SourceLocation>,
    },

    /// A cached computation failed
    #[error("cached computation failed: {message}")]
    CacheComputation {
        /// Underlying failure, rendered
        message: String,
    },

    /// Unexpected internal failure
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

impl CompileError {
    /// Short machine-readable name of the error kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::UnknownParameter { .. } => "unknown_parameter",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MissingRequired { .. } => "missing_required",
            Self::InvalidEnum { .. } => "invalid_enum",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::EmptyValue { .. } => "empty_value",
            Self::NotAbsolute { .. } => "not_absolute",
            Self::ConflictingAttributes { .. } => "conflicting_attributes",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::DuplicateResource { .. } => "duplicate_resource",
            Self::Interpreter { .. } => "interpreter",
            Self::CacheComputation { .. } => "cache_computation",
            Self::Internal { .. } => "internal",
        }
    }

    /// Source location attached to the diagnostic, when any
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } | Self::Interpreter { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompileError::MissingRequired {
            param: "command".to_string(),
        };
        assert_eq!(err.to_string(), "missing required parameter command");
    }

    #[test]
    fn test_unknown_parameter_names_keys() {
        let err = CompileError::UnknownParameter {
            resource: "File[/etc/motd]".to_string(),
            params: vec!["colour".to_string(), "size".to_string()],
        };
        let s = err.to_string();
        assert!(s.contains("colour"));
        assert!(s.contains("size"));
        assert!(s.contains("File[/etc/motd]"));
    }

    #[test]
    fn test_error_kind() {
        let err = CompileError::EmptyValue {
            param: "path".to_string(),
        };
        assert_eq!(err.kind(), "empty_value");
    }

    #[test]
    fn test_error_location() {
        let loc = SourceLocation::new(Some("site.gr".to_string()), 3, 1);
        let err = CompileError::Parse {
            message: "unexpected token".to_string(),
            location: Some(loc.clone()),
        };
        assert_eq!(err.location(), Some(&loc));

        let err = CompileError::EmptyValue {
            param: "path".to_string(),
        };
        assert_eq!(err.location(), None);
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(Some("site.gr".to_string()), 3, 7);
        assert_eq!(loc.to_string(), "site.gr:3:7");

        let loc = SourceLocation::new(None, 3, 7);
        assert_eq!(loc.to_string(), "line 3, column 7");
    }

    #[test]
    fn test_error_equality() {
        let a = CompileError::EmptyValue {
            param: "path".to_string(),
        };
        let b = CompileError::EmptyValue {
            param: "path".to_string(),
        };
        assert_eq!(a, b);
    }
}
