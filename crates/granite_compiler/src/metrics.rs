//! Compiler timing surface.

use granite_core::TimingStore;
use std::sync::Arc;

/// Per-category timing stores exposed to monitoring
///
/// The rendering store is shared with the interpreter's auxiliary
/// services so template timings land here.
#[derive(Debug, Clone, Default)]
pub struct CompilerMetrics {
    /// Per-file manifest parse timings
    pub parsing: Arc<TimingStore>,
    /// Per-node whole-compilation timings
    pub compilation: Arc<TimingStore>,
    /// Per-template render timings
    pub rendering: Arc<TimingStore>,
}

impl CompilerMetrics {
    /// Create empty stores
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
