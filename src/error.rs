//! Error types for xsdgraph
//!
//! Fatal conditions are carried by [`Error`]. Conditions that a parse session
//! survives (unresolvable schema locations, namespace mismatches, duplicate
//! components) are reported as [`Warning`] values, and per-file load failures
//! as [`FileError`] records, so that partial results can still be rendered.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using xsdgraph Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdgraph operations
#[derive(Error, Debug)]
pub enum Error {
    /// A schema document could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The schema reference graph contains a cycle
    #[error("{0}")]
    CircularImport(#[from] CircularImportError),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema document parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// File the error was raised for
    pub path: Option<PathBuf>,
    /// Location inside the file (byte offset or element path)
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            location: None,
        }
    }

    /// Set the offending file
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: ", path.display())?;
        }

        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// A cycle in the import/include/redefine graph.
///
/// The chain starts at the first file of the cycle and ends with that same
/// file again, e.g. `a.xsd -> b.xsd -> a.xsd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularImportError {
    /// Files forming the cycle, first file repeated at the end
    pub chain: Vec<PathBuf>,
}

impl CircularImportError {
    /// Create a new circular import error from the full chain
    pub fn new(chain: Vec<PathBuf>) -> Self {
        Self { chain }
    }

    /// Whether `path` takes part in the cycle
    pub fn contains(&self, path: &Path) -> bool {
        self.chain.iter().any(|p| p == path)
    }
}

impl fmt::Display for CircularImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<String> = self.chain.iter().map(|p| p.display().to_string()).collect();
        write!(f, "circular schema import: {}", chain.join(" -> "))
    }
}

impl std::error::Error for CircularImportError {}

/// A file that failed to load during a parse session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    /// File that failed
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

impl FileError {
    /// Create a file error from any displayable error
    pub fn new(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Non-fatal conditions recorded while loading and resolving a schema set
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A local schemaLocation did not resolve to an existing file
    #[error("{file}: {reference} schemaLocation '{schema_location}' could not be resolved")]
    UnresolvedLocation {
        /// Referencing file
        file: PathBuf,
        /// Reference kind (import, include, redefine)
        reference: String,
        /// Raw schemaLocation value
        schema_location: String,
    },

    /// A remote schemaLocation was recorded but not fetched
    #[error("{file}: skipping remote schema location '{schema_location}'")]
    RemoteLocation {
        /// Referencing file
        file: PathBuf,
        /// Raw schemaLocation value
        schema_location: String,
    },

    /// An include or redefine without a schemaLocation attribute
    #[error("{file}: {reference} is missing its schemaLocation attribute")]
    MissingSchemaLocation {
        /// Referencing file
        file: PathBuf,
        /// Reference kind
        reference: String,
    },

    /// A referenced document's namespace does not match the reference
    #[error("{file}: {reference} expected namespace {expected:?}, found {found:?}")]
    NamespaceMismatch {
        /// Referenced file
        file: PathBuf,
        /// Reference kind
        reference: String,
        /// Namespace required by the reference
        expected: Option<String>,
        /// Namespace declared by the referenced document
        found: Option<String>,
    },

    /// Two files define a component with the same qualified name
    #[error("duplicate {component} '{name}': kept definition from {kept}, ignored {ignored}")]
    DuplicateComponent {
        /// Component kind
        component: String,
        /// Qualified name
        name: String,
        /// File whose definition won
        kept: PathBuf,
        /// File whose definition was dropped
        ignored: PathBuf,
    },

    /// A reference uses a prefix that is not declared anywhere
    #[error("{file}: unknown namespace prefix '{prefix}' in reference '{reference}'")]
    UnknownPrefix {
        /// File containing the reference
        file: PathBuf,
        /// Undeclared prefix
        prefix: String,
        /// Raw reference
        reference: String,
    },

    /// A component name is not a valid NCName
    #[error("{file}: invalid component name '{name}'")]
    InvalidName {
        /// File containing the component
        file: PathBuf,
        /// Offending name
        name: String,
    },
}
