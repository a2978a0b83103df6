//! Node facts.
//!
//! Facts are the observed properties of a managed host (OS family,
//! hostname, addresses). Absence of a fact is legitimate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fact set for one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts(IndexMap<String, String>);

impl Facts {
    /// Create an empty fact set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fact by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set a fact, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Number of facts
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (name, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_new() {
        let facts = Facts::new();
        assert!(facts.is_empty());
        assert_eq!(facts.get("osfamily"), None);
    }

    #[test]
    fn test_facts_insert_get() {
        let mut facts = Facts::new();
        facts.insert("osfamily", "Debian");
        assert_eq!(facts.get("osfamily"), Some("Debian"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_facts_from_iterator() {
        let facts: Facts = [("osfamily", "Debian"), ("hostname", "web1")]
            .into_iter()
            .collect();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts.get("hostname"), Some("web1"));
    }
}
