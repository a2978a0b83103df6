//! Per-type validation pipelines.
//!
//! A pipeline carries the legal-parameter set, default attribute values,
//! an optional name parameter, and an ordered list of validators. Applying
//! a pipeline runs a fixed prologue (unknown-parameter check, default
//! union, name-parameter identity rewrite) before folding the resource
//! through its validators.

use crate::combinator::Validator;
use granite_core::{is_metaparameter, CompileError, CompileResult, Resource, Value};
use indexmap::{IndexMap, IndexSet};

/// Ordered validation pipeline for one resource type
#[derive(Clone, Default)]
pub struct ValidatorPipeline {
    legal: IndexSet<String>,
    defaults: IndexMap<String, Value>,
    name_param: Option<String>,
    validators: Vec<Validator>,
}

impl ValidatorPipeline {
    /// Create an empty pipeline accepting any parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the legal parameter names for the type
    ///
    /// An empty legal set disables the unknown-parameter check.
    #[must_use]
    pub fn with_legal_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legal = params.into_iter().map(Into::into).collect();
        self
    }

    /// Supply a default value for an absent parameter
    #[must_use]
    pub fn with_default(mut self, param: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(param.into(), value);
        self
    }

    /// Declare the parameter that carries the resource's identity
    #[must_use]
    pub fn with_name_param(mut self, param: impl Into<String>) -> Self {
        self.name_param = Some(param.into());
        self
    }

    /// Append a validator to the pipeline
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Number of validators in the pipeline
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check whether the pipeline has no validators
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the pipeline over a resource
    ///
    /// The prologue rejects unknown parameters, fills in defaults for
    /// absent parameters, and reconciles the name parameter with the
    /// title. Validators then run in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParameter` for attributes outside the legal set,
    /// or the first error produced by a validator.
    pub fn apply(&self, mut resource: Resource) -> CompileResult<Resource> {
        if !self.legal.is_empty() {
            let unknown: Vec<String> = resource
                .attributes
                .keys()
                .filter(|name| !self.legal.contains(name.as_str()) && !is_metaparameter(name))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(CompileError::UnknownParameter {
                    resource: resource.reference().to_string(),
                    params: unknown,
                });
            }
        }

        for (param, value) in &self.defaults {
            if value.is_undefined() {
                continue;
            }
            if !resource.attributes.contains_key(param) {
                resource.set(param.clone(), value.clone());
            }
        }

        if let Some(param) = &self.name_param {
            resource = reconcile_name(resource, param)?;
        }

        self.validators
            .iter()
            .try_fold(resource, |resource, validator| validator(resource))
    }
}

impl std::fmt::Debug for ValidatorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorPipeline")
            .field("legal", &self.legal)
            .field("defaults", &self.defaults)
            .field("name_param", &self.name_param)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Reconcile the name parameter with the resource title.
///
/// When the parameter is absent the title is copied in as a string.
/// When present its string coercion overwrites the title.
fn reconcile_name(mut resource: Resource, param: &str) -> CompileResult<Resource> {
    match resource.get(param) {
        None => {
            let title = resource.title.clone();
            resource.set(param, Value::String(title));
        }
        Some(value) => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Boolean(b) => b.to_string(),
                Value::Number(n) => n.normalize().to_string(),
                other => {
                    return Err(CompileError::TypeMismatch {
                        param: param.to_string(),
                        expected: "a string",
                        actual: other.kind().to_string(),
                    });
                }
            };
            resource.set(param, Value::String(text.clone()));
            resource.set_title(text);
        }
    }
    Ok(resource)
}
