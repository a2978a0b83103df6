//! Validator combinators.
//!
//! Each combinator enforces one constraint on one parameter. Combinators
//! are pure and total: the only effect is rewriting the attribute map, and
//! every input produces either a rewritten resource or a diagnostic.
//! Absent parameters pass; constraints on presence use [`mandatory`].

use granite_core::{CompileError, CompileResult, Resource, Value};
use rust_decimal::Decimal;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

/// Path separator recognized by the path combinators
pub const SEPARATOR: char = '/';

/// A single validation step over a resource
pub type Validator = Arc<dyn Fn(Resource) -> CompileResult<Resource> + Send + Sync>;

/// Coerce a scalar to its canonical string form
fn coerce_string(param: &str, value: &Value) -> CompileResult<Value> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Boolean(b) => Ok(Value::String(b.to_string())),
        Value::Number(n) => Ok(Value::String(n.normalize().to_string())),
        other => Err(CompileError::TypeMismatch {
            param: param.to_string(),
            expected: "string",
            actual: other.kind().to_string(),
        }),
    }
}

/// Coerce a string-coerced value to a canonical integer number
fn coerce_integer(param: &str, value: &Value) -> CompileResult<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.normalize().to_string(),
        other => {
            return Err(CompileError::TypeMismatch {
                param: param.to_string(),
                expected: "integer",
                actual: other.kind().to_string(),
            });
        }
    };

    let number = Decimal::from_str(&text).map_err(|_| CompileError::TypeMismatch {
        param: param.to_string(),
        expected: "integer",
        actual: text.clone(),
    })?;

    if !number.fract().is_zero() {
        return Err(CompileError::TypeMismatch {
            param: param.to_string(),
            expected: "integer",
            actual: text,
        });
    }

    Ok(Value::Number(number.normalize()))
}

/// Apply a scalar coercion to every element of an array attribute
fn elementwise(
    param: String,
    coerce: impl Fn(&str, &Value) -> CompileResult<Value> + Send + Sync + 'static,
) -> Validator {
    Arc::new(move |mut resource| {
        let Some(value) = resource.get(&param) else {
            return Ok(resource);
        };
        let Value::Array(items) = value else {
            return Err(CompileError::TypeMismatch {
                param: param.clone(),
                expected: "array",
                actual: value.kind().to_string(),
            });
        };
        let coerced = items
            .iter()
            .map(|item| coerce(&param, item))
            .collect::<CompileResult<Vec<_>>>()?;
        resource.set(param.clone(), Value::Array(coerced));
        Ok(resource)
    })
}

/// Coerce a parameter to its canonical string form
#[must_use]
pub fn string(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |mut resource| {
        if let Some(value) = resource.get(&param) {
            let coerced = coerce_string(&param, value)?;
            resource.set(param.clone(), coerced);
        }
        Ok(resource)
    })
}

/// Elementwise [`string`] over an array parameter
#[must_use]
pub fn strings(param: &str) -> Validator {
    elementwise(param.to_string(), coerce_string)
}

/// Require exact integer representability, rewriting to a canonical number
#[must_use]
pub fn integer(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |mut resource| {
        if let Some(value) = resource.get(&param) {
            let coerced = coerce_integer(&param, value)?;
            resource.set(param.clone(), coerced);
        }
        Ok(resource)
    })
}

/// Elementwise [`integer`] over an array parameter
#[must_use]
pub fn integers(param: &str) -> Validator {
    elementwise(param.to_string(), coerce_integer)
}

/// Require a present string to be one of the allowed words
#[must_use]
pub fn values(param: &str, allowed: &[&str]) -> Validator {
    let param = param.to_string();
    let allowed: Vec<String> = allowed.iter().map(|s| (*s).to_string()).collect();
    Arc::new(move |resource| {
        match resource.get(&param) {
            None => Ok(resource),
            Some(Value::String(s)) if allowed.iter().any(|a| a == s) => Ok(resource),
            Some(Value::String(s)) => Err(CompileError::InvalidEnum {
                param: param.clone(),
                value: s.clone(),
                allowed: allowed.clone(),
            }),
            Some(other) => Err(CompileError::TypeMismatch {
                param: param.clone(),
                expected: "string",
                actual: other.kind().to_string(),
            }),
        }
    })
}

/// Synthesize a default when the parameter is absent; never overwrites
#[must_use]
pub fn default_value(param: &str, default: &str) -> Validator {
    let param = param.to_string();
    let default = default.to_string();
    Arc::new(move |mut resource| {
        if resource.get(&param).is_none() {
            resource.set(param.clone(), Value::String(default.clone()));
        }
        Ok(resource)
    })
}

/// Require the parameter to be present
#[must_use]
pub fn mandatory(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |resource| {
        if resource.get(&param).is_none() {
            return Err(CompileError::MissingRequired {
                param: param.clone(),
            });
        }
        Ok(resource)
    })
}

/// Like [`mandatory`], exempt when `ensure` is the literal `absent`
#[must_use]
pub fn mandatory_unless_absent(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |resource| {
        let ensured_absent = matches!(resource.get("ensure"), Some(Value::String(s)) if s == "absent");
        if !ensured_absent && resource.get(&param).is_none() {
            return Err(CompileError::MissingRequired {
                param: param.clone(),
            });
        }
        Ok(resource)
    })
}

fn check_fully_qualified(param: &str, value: &Value) -> CompileResult<Value> {
    match value {
        Value::String(s) if s.is_empty() => Err(CompileError::EmptyValue {
            param: param.to_string(),
        }),
        Value::String(s) if !s.starts_with(SEPARATOR) => Err(CompileError::NotAbsolute {
            param: param.to_string(),
            value: s.clone(),
        }),
        Value::String(_) => Ok(value.clone()),
        other => Err(CompileError::TypeMismatch {
            param: param.to_string(),
            expected: "string",
            actual: other.kind().to_string(),
        }),
    }
}

/// Require a non-empty, absolute path
#[must_use]
pub fn fully_qualified(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |resource| {
        if let Some(value) = resource.get(&param) {
            check_fully_qualified(&param, value)?;
        }
        Ok(resource)
    })
}

/// Elementwise [`fully_qualified`] over an array parameter
#[must_use]
pub fn fully_qualifieds(param: &str) -> Validator {
    elementwise(param.to_string(), check_fully_qualified)
}

/// Reject a string ending with the path separator
#[must_use]
pub fn no_trailing_slash(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |resource| {
        match resource.get(&param) {
            Some(Value::String(s)) if s.ends_with(SEPARATOR) => {
                Err(CompileError::InvalidFormat {
                    param: param.clone(),
                    value: s.clone(),
                    expected: "a path without a trailing slash",
                })
            }
            Some(Value::String(_)) | None => Ok(resource),
            Some(other) => Err(CompileError::TypeMismatch {
                param: param.clone(),
                expected: "string",
                actual: other.kind().to_string(),
            }),
        }
    })
}

/// Require a dotted-quad IPv4 address
#[must_use]
pub fn ipaddr(param: &str) -> Validator {
    let param = param.to_string();
    Arc::new(move |resource| {
        match resource.get(&param) {
            None => Ok(resource),
            Some(Value::String(s)) => {
                Ipv4Addr::from_str(s).map_err(|_| CompileError::InvalidFormat {
                    param: param.clone(),
                    value: s.clone(),
                    expected: "an IPv4 address",
                })?;
                Ok(resource)
            }
            Some(other) => Err(CompileError::TypeMismatch {
                param: param.clone(),
                expected: "string",
                actual: other.kind().to_string(),
            }),
        }
    })
}

/// Require a number within an inclusive range
#[must_use]
pub fn in_range(param: &str, lo: i64, hi: i64) -> Validator {
    let param = param.to_string();
    let lo = Decimal::from(lo);
    let hi = Decimal::from(hi);
    Arc::new(move |resource| {
        match resource.get(&param) {
            None => Ok(resource),
            Some(Value::Number(n)) if *n >= lo && *n <= hi => Ok(resource),
            Some(Value::Number(n)) => Err(CompileError::OutOfRange {
                param: param.clone(),
                value: n.normalize().to_string(),
                lo: lo.to_string(),
                hi: hi.to_string(),
            }),
            Some(other) => Err(CompileError::TypeMismatch {
                param: param.clone(),
                expected: "number",
                actual: other.kind().to_string(),
            }),
        }
    })
}

/// Reject resources that set both `source` and `content`
#[must_use]
pub fn source_or_content() -> Validator {
    Arc::new(|resource| {
        if resource.get("source").is_some() && resource.get("content").is_some() {
            return Err(CompileError::ConflictingAttributes {
                first: "source".to_string(),
                second: "content".to_string(),
            });
        }
        Ok(resource)
    })
}
