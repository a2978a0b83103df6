//! Compiler configuration.
//!
//! Directory layout, the manifest extension, and the top-level units to
//! load for every node, with the deterministic unit-name to path
//! mapping.

use granite_core::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The distinguished unit resolved from the manifests directory
pub const SITE_UNIT: &str = "site";

/// Where manifests live and which units to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Root of the module tree
    pub modules_dir: PathBuf,
    /// Directory holding the site manifest
    pub manifests_dir: PathBuf,
    /// Manifest file extension, without the dot
    pub manifest_ext: String,
    /// Top-level units loaded for every node, in order
    pub units: Vec<String>,
}

impl CompilerConfig {
    /// Configuration rooted at a modules and a manifests directory,
    /// loading only the site unit
    #[must_use]
    pub fn new(modules_dir: impl Into<PathBuf>, manifests_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
            manifests_dir: manifests_dir.into(),
            manifest_ext: "gr".to_string(),
            units: vec![SITE_UNIT.to_string()],
        }
    }

    /// Replace the unit list (builder form)
    #[must_use]
    pub fn with_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.units = units.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the manifest extension (builder form)
    #[must_use]
    pub fn with_manifest_ext(mut self, ext: impl Into<String>) -> Self {
        self.manifest_ext = ext.into();
        self
    }

    /// Resolve a dotted unit name to its manifest path
    ///
    /// `site` maps to `<manifests>/site.<ext>`; a single-segment name to
    /// `<modules>/<name>/init.<ext>`; a multi-segment name to
    /// `<modules>/<first>/<rest joined by '/'>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` for an empty unit name.
    pub fn unit_path(&self, unit: &str) -> CompileResult<PathBuf> {
        if unit == SITE_UNIT {
            return Ok(self
                .manifests_dir
                .join(format!("{SITE_UNIT}.{}", self.manifest_ext)));
        }

        let segments: Vec<&str> = unit.split('.').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Err(CompileError::Internal {
                message: format!("cannot resolve empty unit name {unit:?}"),
            }),
            [name] => Ok(self
                .modules_dir
                .join(name)
                .join(format!("init.{}", self.manifest_ext))),
            [first, rest @ ..] => Ok(self
                .modules_dir
                .join(first)
                .join(format!("{}.{}", rest.join("/"), self.manifest_ext))),
        }
    }
}
