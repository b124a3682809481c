//! Schema loading
//!
//! A [`SchemaLoader`] turns a resolved file path into a parsed
//! [`SchemaDocument`]. Remote locations never reach a loader; they are
//! filtered out while references are extracted.

use std::fs;
use std::path::Path;

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::parsing::document::SchemaDocument;

/// Loads one schema document
pub trait SchemaLoader {
    /// Read and parse the schema at `path`.
    ///
    /// Fails with [`Error::Resource`] when the file cannot be read and with
    /// [`Error::Parse`] when it is not well-formed XML with an `xs:schema`
    /// root.
    fn load(&self, path: &Path) -> Result<SchemaDocument>;
}

/// Loader reading schema files from the local file system
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    /// Resource limits
    limits: Limits,
}

impl FileLoader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Configured limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl SchemaLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<SchemaDocument> {
        let content = fs::read(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits
            .check_xml_size(content.len())
            .map_err(|e| Error::Parse(ParseError::new(e.to_string()).with_path(path)))?;

        log::debug!("loading {} ({} bytes)", path.display(), content.len());
        SchemaDocument::from_bytes(path, &content, &self.limits)
    }
}

impl<L: SchemaLoader + ?Sized> SchemaLoader for &L {
    fn load(&self, path: &Path) -> Result<SchemaDocument> {
        (**self).load(path)
    }
}
