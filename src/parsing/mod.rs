//! Multi-file schema parsing
//!
//! The pipeline of one parse session:
//!
//! 1. [`session`] loads the root schema and, depth-first, every schema it
//!    imports, includes or redefines ([`references`], [`tracker`]).
//! 2. [`extract`] builds the components of each loaded document.
//! 3. [`resolve`] merges them into one table keyed by qualified name and
//!    resolves every type, base and element reference across files.
//! 4. [`assemble`] produces the [`SchemaStructure`](crate::structure::SchemaStructure).

pub mod assemble;
pub mod document;
pub mod extract;
pub mod references;
pub mod resolve;
pub mod session;
pub mod tracker;

use std::path::Path;

pub use document::SchemaDocument;
pub use extract::{extract, Extracted};
pub use references::{extract_references, ReferenceKind, SchemaReference};
pub use resolve::{ComponentTable, DanglingReference, DependencyEdge, Resolution};
pub use session::SchemaParser;
pub use tracker::ImportChainTracker;

/// A schema document loaded by a session, with everything derived from it
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// The parsed document
    pub document: SchemaDocument,
    /// Namespace its components live in
    pub effective_namespace: Option<String>,
    /// Whether the namespace was adopted from an includer
    pub chameleon: bool,
    /// References made by the document
    pub references: Vec<SchemaReference>,
    /// Components found in the document
    pub extracted: Extracted,
}

impl LoadedSchema {
    /// Wrap a document that owns its declared namespace
    pub fn new(document: SchemaDocument) -> Self {
        let effective_namespace = document.target_namespace.clone();
        Self {
            document,
            effective_namespace,
            chameleon: false,
            references: Vec::new(),
            extracted: Extracted::default(),
        }
    }

    /// Canonical path of the document
    pub fn path(&self) -> &Path {
        &self.document.path
    }

    /// Resolved paths of the files this document references
    pub fn dependencies(&self) -> impl Iterator<Item = &Path> {
        self.references
            .iter()
            .filter_map(|r| r.resolved_path.as_deref())
    }
}
