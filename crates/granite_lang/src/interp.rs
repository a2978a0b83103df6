//! Statement interpretation.
//!
//! Turns parsed statements plus node facts into declared resources.
//! Template rendering and key-value lookup are collaborator traits so
//! hosts can plug in real engines; the defaults here are pure.

use crate::ast::{Expr, ResourceDecl, Statement};
use granite_core::{
    CompileError, CompileResult, Facts, Resource, ResourceRef, TimingStore, Value,
};
use std::sync::Arc;
use tracing::debug;

/// Evaluation context for one node
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Node being compiled
    pub node: &'a str,
    /// The node's facts
    pub facts: &'a Facts,
}

/// Renders a template source into text
pub trait TemplateEvaluator: Send + Sync {
    /// Render `source` for the scope
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the template cannot be rendered.
    fn render(&self, source: &str, scope: &Scope<'_>) -> CompileResult<String>;
}

/// Default evaluator treating the source as literal text with `${fact}`
/// interpolation
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralTemplate;

impl TemplateEvaluator for LiteralTemplate {
    fn render(&self, source: &str, scope: &Scope<'_>) -> CompileResult<String> {
        let (text, _) = interpolate(source, scope);
        Ok(text)
    }
}

/// Resolves keys not present in the node's facts
pub trait Lookup: Send + Sync {
    /// Look up `key` for the scope
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the backend fails; an unknown key is
    /// `Undefined`, not an error.
    fn lookup(&self, key: &str, scope: &Scope<'_>) -> CompileResult<Value>;
}

/// Default lookup resolving every key to `Undefined`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLookup;

impl Lookup for NoopLookup {
    fn lookup(&self, _key: &str, _scope: &Scope<'_>) -> CompileResult<Value> {
        Ok(Value::Undefined)
    }
}

/// Collaborators handed to the interpreter
#[derive(Clone)]
pub struct AuxServices {
    /// Template engine
    pub template: Arc<dyn TemplateEvaluator>,
    /// Key-value fallback for variables outside the fact set
    pub lookup: Arc<dyn Lookup>,
    /// Render timings, recorded per template source
    pub render_timings: Arc<TimingStore>,
}

impl AuxServices {
    /// Assemble from explicit collaborators
    #[must_use]
    pub fn new(
        template: Arc<dyn TemplateEvaluator>,
        lookup: Arc<dyn Lookup>,
        render_timings: Arc<TimingStore>,
    ) -> Self {
        Self {
            template,
            lookup,
            render_timings,
        }
    }

    /// Pure defaults: literal templates, no-op lookup, fresh timing store
    #[must_use]
    pub fn literal() -> Self {
        Self::new(
            Arc::new(LiteralTemplate),
            Arc::new(NoopLookup),
            Arc::new(TimingStore::new()),
        )
    }
}

impl std::fmt::Debug for AuxServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxServices").finish_non_exhaustive()
    }
}

/// What interpreting a statement sequence produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Declared resources, in declaration order
    pub resources: Vec<Resource>,
    /// Non-fatal findings (unknown variables and the like)
    pub warnings: Vec<String>,
}

/// Evaluates statements for one node
pub trait Interpreter: Send + Sync {
    /// Produce the node's resources and warnings
    ///
    /// # Errors
    ///
    /// Returns the first evaluation diagnostic.
    fn evaluate(
        &self,
        statements: &[Statement],
        facts: &Facts,
        node: &str,
        aux: &AuxServices,
    ) -> CompileResult<Evaluation>;
}

/// The built-in interpreter
///
/// Selects top-level declarations plus the node block matching the node
/// name exactly, falling back to `node default` when no block matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicInterpreter;

impl Interpreter for BasicInterpreter {
    fn evaluate(
        &self,
        statements: &[Statement],
        facts: &Facts,
        node: &str,
        aux: &AuxServices,
    ) -> CompileResult<Evaluation> {
        let scope = Scope { node, facts };
        let mut evaluation = Evaluation::default();

        for decl in select_declarations(statements, node) {
            let resource = evaluate_declaration(decl, &scope, aux, &mut evaluation.warnings)?;
            evaluation.resources.push(resource);
        }

        debug!(
            node,
            resources = evaluation.resources.len(),
            warnings = evaluation.warnings.len(),
            "interpreted statements"
        );
        Ok(evaluation)
    }
}

/// Top-level declarations plus the matching node block's body.
///
/// Exact-name matches win; the `default` block applies only when no
/// named block matched.
fn select_declarations<'a>(statements: &'a [Statement], node: &str) -> Vec<&'a ResourceDecl> {
    let mut selected: Vec<&ResourceDecl> = Vec::new();
    let mut matched = false;

    for statement in statements {
        match statement {
            Statement::Resource(decl) => selected.push(decl),
            Statement::Node(block) if block.matches(node) => {
                matched = true;
                selected.extend(block.body.iter());
            }
            Statement::Node(_) => {}
        }
    }

    if !matched {
        for statement in statements {
            if let Statement::Node(block) = statement {
                if block.default {
                    selected.extend(block.body.iter());
                }
            }
        }
    }
    selected
}

fn evaluate_declaration(
    decl: &ResourceDecl,
    scope: &Scope<'_>,
    aux: &AuxServices,
    warnings: &mut Vec<String>,
) -> CompileResult<Resource> {
    let title = match evaluate_expr(&decl.title, scope, aux, warnings)? {
        Value::String(s) => s,
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.normalize().to_string(),
        other => {
            return Err(CompileError::Interpreter {
                message: format!(
                    "title of a {} resource must be a string, got {}",
                    decl.type_name,
                    other.kind()
                ),
                location: Some(decl.location.clone()),
            });
        }
    };

    let mut resource = Resource::new(decl.type_name.clone(), title)
        .with_exported(decl.exported)
        .with_location(decl.location.clone());

    for (name, expr) in &decl.attributes {
        let value = evaluate_expr(expr, scope, aux, warnings)?;
        resource.set(name.clone(), value);
    }
    Ok(resource)
}

fn evaluate_expr(
    expr: &Expr,
    scope: &Scope<'_>,
    aux: &AuxServices,
    warnings: &mut Vec<String>,
) -> CompileResult<Value> {
    match expr {
        Expr::Str(text) => {
            let (interpolated, unknown) = interpolate(text, scope);
            warnings.extend(unknown);
            Ok(Value::String(interpolated))
        }
        Expr::Bool(b) => Ok(Value::Boolean(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate_expr(item, scope, aux, warnings))
            .collect::<CompileResult<Vec<Value>>>()
            .map(Value::Array),
        Expr::Var(name) => match scope.facts.get(name) {
            Some(value) => Ok(Value::string(value)),
            None => {
                let value = aux.lookup.lookup(name, scope)?;
                if value.is_undefined() {
                    warnings.push(format!("unknown variable ${name} on node {}", scope.node));
                }
                Ok(value)
            }
        },
        Expr::Ref { type_name, title } => {
            Ok(Value::String(ResourceRef::new(type_name, title).to_string()))
        }
        Expr::Template(source) => {
            let rendered = aux
                .render_timings
                .time(source.clone(), || aux.template.render(source, scope))?;
            Ok(Value::String(rendered))
        }
    }
}

/// Substitute `${fact}` references in a string.
///
/// Returns the interpolated text and a warning per unknown fact, whose
/// reference is substituted with empty text.
fn interpolate(text: &str, scope: &Scope<'_>) -> (String, Vec<String>) {
    let mut out = String::with_capacity(text.len());
    let mut warnings = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match scope.facts.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        warnings.push(format!("unknown fact ${{{name}}} on node {}", scope.node));
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference, keep the text as written
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    (out, warnings)
}
