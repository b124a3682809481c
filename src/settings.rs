//! Parse session settings

use std::path::PathBuf;

use crate::limits::Limits;

/// Configuration for a schema parse session
#[derive(Debug, Clone)]
pub struct Settings {
    /// Extra directories searched for relative schema locations
    pub search_roots: Vec<PathBuf>,
    /// Resource limits
    pub limits: Limits,
    /// Let components declared inside `xs:redefine` replace the originals
    pub resolve_redefines: bool,
    /// Let included no-namespace documents adopt the includer's namespace
    pub chameleon_includes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            limits: Limits::default(),
            resolve_redefines: true,
            chameleon_includes: true,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search root
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// Replace the search roots
    pub fn with_search_roots(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.search_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether redefinitions replace redefined components
    pub fn with_resolve_redefines(mut self, resolve: bool) -> Self {
        self.resolve_redefines = resolve;
        self
    }

    /// Set whether chameleon includes adopt the includer's namespace
    pub fn with_chameleon_includes(mut self, chameleon: bool) -> Self {
        self.chameleon_includes = chameleon;
        self
    }
}
