//! Declared resources.
//!
//! A resource is one unit of managed state, identified by `(type, title)`,
//! carrying a loosely-typed attribute map. Relationship metaparameters are
//! recognized on every type regardless of its legal-parameter set.

use crate::error::{CompileError, CompileResult, SourceLocation};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metaparameters accepted on every resource type
pub const METAPARAMETERS: [&str; 5] = ["before", "after", "notify", "subscribe", "tag"];

/// The subset of metaparameters that form dependency edges
pub const RELATIONSHIP_METAPARAMETERS: [&str; 4] = ["before", "after", "notify", "subscribe"];

/// Check whether an attribute name is a metaparameter
#[must_use]
pub fn is_metaparameter(name: &str) -> bool {
    METAPARAMETERS.contains(&name)
}

/// Check whether an attribute name forms a dependency edge
#[must_use]
pub fn is_relationship(name: &str) -> bool {
    RELATIONSHIP_METAPARAMETERS.contains(&name)
}

/// Resource identity: `(type name, title)`
///
/// Serializes as the canonical `Type[title]` string so it can key maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    /// Resource type name
    pub type_name: String,
    /// Resource title
    pub title: String,
}

impl ResourceRef {
    /// Create a new reference
    ///
    /// Type names compare case-insensitively, so they are stored lowercased.
    #[must_use]
    pub fn new(type_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into().to_lowercase(),
            title: title.into(),
        }
    }

    /// Parse the canonical `Type[title]` form
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the text is not of that shape
    pub fn parse(text: &str) -> CompileResult<Self> {
        let invalid = || CompileError::InvalidFormat {
            param: "reference".to_string(),
            value: text.to_string(),
            expected: "a Type[title] reference",
        };

        let open = text.find('[').ok_or_else(invalid)?;
        if !text.ends_with(']') || open == 0 {
            return Err(invalid());
        }
        let type_name = &text[..open];
        let title = &text[open + 1..text.len() - 1];
        if title.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(type_name, title))
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", capitalize(&self.type_name), self.title)
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A declared resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type name
    pub type_name: String,
    /// Resource title (identity; mutable only before catalog insertion)
    pub title: String,
    /// Attribute map, insertion-ordered, keys unique
    pub attributes: IndexMap<String, Value>,
    /// Whether the resource is exported for other nodes
    pub exported: bool,
    /// Where the resource was declared, when known
    pub location: Option<SourceLocation>,
}

impl Resource {
    /// Create a resource with an empty attribute map
    #[must_use]
    pub fn new(type_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into().to_lowercase(),
            title: title.into(),
            attributes: IndexMap::new(),
            exported: false,
            location: None,
        }
    }

    /// Set an attribute (builder form)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Mark as exported (builder form)
    #[must_use]
    pub fn with_exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    /// Attach a declaration location (builder form)
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// The resource's identity
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(self.type_name.clone(), self.title.clone())
    }

    /// Look up an attribute
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Remove an attribute, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(name)
    }

    /// Overwrite the resource title
    ///
    /// Identity mutation is only legal before the resource enters any
    /// identity-keyed structure.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_display() {
        let r = ResourceRef::new("file", "/etc/motd");
        assert_eq!(r.to_string(), "File[/etc/motd]");
    }

    #[test]
    fn test_ref_parse_roundtrip() {
        let r = ResourceRef::parse("File[/etc/motd]").unwrap();
        assert_eq!(r.type_name, "file");
        assert_eq!(r.title, "/etc/motd");
        assert_eq!(r, ResourceRef::new("file", "/etc/motd"));
    }

    #[test]
    fn test_ref_parse_rejects_malformed() {
        assert!(ResourceRef::parse("File").is_err());
        assert!(ResourceRef::parse("[title]").is_err());
        assert!(ResourceRef::parse("File[]").is_err());
        assert!(ResourceRef::parse("File[/etc").is_err());
    }

    #[test]
    fn test_ref_serializes_as_canonical_string() {
        let r = ResourceRef::new("file", "/etc/motd");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"File[/etc/motd]\"");

        let back: ResourceRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_metaparameters() {
        assert!(is_metaparameter("before"));
        assert!(is_metaparameter("tag"));
        assert!(!is_metaparameter("ensure"));

        assert!(is_relationship("notify"));
        assert!(!is_relationship("tag"));
    }

    #[test]
    fn test_resource_builder() {
        let r = Resource::new("File", "/etc/motd")
            .with("ensure", Value::string("present"))
            .with_exported(true);

        assert_eq!(r.type_name, "file");
        assert!(r.exported);
        assert_eq!(r.get("ensure"), Some(&Value::string("present")));
    }

    #[test]
    fn test_resource_set_title() {
        let mut r = Resource::new("file", "motd");
        r.set_title("/etc/motd");
        assert_eq!(r.reference().title, "/etc/motd");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_ref_display_parse_roundtrip(
                type_name in "[a-z][a-z_]{0,10}",
                title in "[A-Za-z0-9/._-]{1,20}",
            ) {
                let r = ResourceRef::new(type_name, title);
                let parsed = ResourceRef::parse(&r.to_string()).unwrap();
                prop_assert_eq!(parsed, r);
            }
        }
    }

    #[test]
    fn test_resource_attribute_order_preserved() {
        let r = Resource::new("exec", "apt-update")
            .with("command", Value::string("/usr/bin/apt update"))
            .with("user", Value::string("root"))
            .with("timeout", Value::integer(300));

        let keys: Vec<_> = r.attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["command", "user", "timeout"]);
    }
}
