//! Built-in resource types.
//!
//! Pipelines for the core managed-host types. Site-specific types stay
//! unregistered and validate accept-anything.

use crate::combinator;
use crate::pipeline::ValidatorPipeline;
use crate::registry::{RegistryError, TypeRegistry};
use granite_core::Value;

/// Build the registry of built-in resource types
///
/// # Errors
///
/// Returns `AlreadyRegistered` if a built-in name collides, which only
/// happens when the table below is edited inconsistently.
pub fn builtin_registry() -> Result<TypeRegistry, RegistryError> {
    let mut registry = TypeRegistry::new();
    registry.register("file", file())?;
    registry.register("package", package())?;
    registry.register("service", service())?;
    registry.register("exec", exec())?;
    registry.register("host", host())?;
    registry.register("user", user())?;
    Ok(registry)
}

fn file() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params([
            "path", "ensure", "source", "content", "mode", "owner", "group", "backup",
        ])
        .with_name_param("path")
        .with_default("backup", Value::string(".bak"))
        .with_validator(combinator::fully_qualified("path"))
        .with_validator(combinator::no_trailing_slash("path"))
        .with_validator(combinator::source_or_content())
        .with_validator(combinator::values(
            "ensure",
            &["present", "absent", "file", "directory", "link"],
        ))
        .with_validator(combinator::string("mode"))
        .with_validator(combinator::string("owner"))
        .with_validator(combinator::string("group"))
        .with_validator(combinator::string("backup"))
}

fn package() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params(["name", "ensure", "source", "provider"])
        .with_name_param("name")
        .with_validator(combinator::values(
            "ensure",
            &["present", "absent", "installed", "latest", "purged"],
        ))
        .with_validator(combinator::fully_qualified("source"))
        .with_validator(combinator::string("provider"))
}

fn service() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params(["name", "ensure", "enable", "provider"])
        .with_name_param("name")
        .with_validator(combinator::values("ensure", &["running", "stopped"]))
        .with_validator(combinator::string("enable"))
        .with_validator(combinator::string("provider"))
}

fn exec() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params(["command", "user", "cwd", "timeout", "returns", "creates"])
        .with_default("timeout", Value::string("300"))
        .with_validator(combinator::mandatory("command"))
        .with_validator(combinator::fully_qualified("command"))
        .with_validator(combinator::string("user"))
        .with_validator(combinator::fully_qualified("cwd"))
        .with_validator(combinator::integer("timeout"))
        .with_validator(combinator::in_range("timeout", 0, 86_400))
        .with_validator(combinator::integers("returns"))
        .with_validator(combinator::fully_qualified("creates"))
}

fn host() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params(["name", "ensure", "ip", "host_aliases"])
        .with_name_param("name")
        .with_validator(combinator::values("ensure", &["present", "absent"]))
        .with_validator(combinator::mandatory_unless_absent("ip"))
        .with_validator(combinator::ipaddr("ip"))
        .with_validator(combinator::strings("host_aliases"))
}

fn user() -> ValidatorPipeline {
    ValidatorPipeline::new()
        .with_legal_params(["name", "ensure", "uid", "gid", "groups", "home", "shell"])
        .with_name_param("name")
        .with_validator(combinator::values("ensure", &["present", "absent"]))
        .with_validator(combinator::integer("uid"))
        .with_validator(combinator::in_range("uid", 0, 65_535))
        .with_validator(combinator::integer("gid"))
        .with_validator(combinator::in_range("gid", 0, 65_535))
        .with_validator(combinator::strings("groups"))
        .with_validator(combinator::fully_qualified("home"))
        .with_validator(combinator::fully_qualified("shell"))
}
