//! Import chain tracking
//!
//! Loading is depth-first. The tracker holds the chain of files currently
//! being loaded and the set of files already finished, so that a file is
//! loaded at most once per session and any reference back into the open
//! chain is reported as a cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CircularImportError, Result};
use crate::limits::Limits;

/// Per-session record of files in progress and files loaded
#[derive(Debug, Clone)]
pub struct ImportChainTracker {
    /// Files being loaded, outermost first
    in_progress: Vec<PathBuf>,
    /// Files finished
    loaded: HashSet<PathBuf>,
    /// Bounds on the chain length
    limits: Limits,
}

impl Default for ImportChainTracker {
    fn default() -> Self {
        Self::new(&Limits::default())
    }
}

impl ImportChainTracker {
    /// Create a tracker bounded by `limits.max_schema_depth`
    pub fn new(limits: &Limits) -> Self {
        Self {
            in_progress: Vec::new(),
            loaded: HashSet::new(),
            limits: limits.clone(),
        }
    }

    /// Start loading `path`.
    ///
    /// Returns `Ok(false)` when the file is already loaded and must be
    /// skipped. Fails with [`Error::CircularImport`](crate::Error::CircularImport) when the file is already
    /// in the chain, and with [`Error::LimitExceeded`](crate::Error::LimitExceeded) when the chain would
    /// grow past the configured depth.
    pub fn enter(&mut self, path: &Path) -> Result<bool> {
        if let Some(start) = self.in_progress.iter().position(|p| p == path) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(path.to_path_buf());
            return Err(CircularImportError::new(chain).into());
        }
        if self.loaded.contains(path) {
            return Ok(false);
        }
        self.limits.check_schema_depth(self.in_progress.len() + 1)?;

        self.in_progress.push(path.to_path_buf());
        Ok(true)
    }

    /// Finish loading `path`; it is recorded as loaded even if it failed
    pub fn exit(&mut self, path: &Path) {
        if let Some(index) = self.in_progress.iter().rposition(|p| p == path) {
            self.in_progress.remove(index);
        }
        self.loaded.insert(path.to_path_buf());
    }

    /// Whether `path` has been loaded
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.contains(path)
    }

    /// Whether `path` is somewhere in the open chain
    pub fn is_in_progress(&self, path: &Path) -> bool {
        self.in_progress.iter().any(|p| p == path)
    }

    /// The open chain, outermost first
    pub fn chain(&self) -> &[PathBuf] {
        &self.in_progress
    }

    /// Number of loaded files
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}
