//! # xsdgraph
//!
//! Structure extraction and cross-file dependency resolution for XML Schema
//! (XSD) sets spread over many files.
//!
//! A root schema is loaded together with everything it imports, includes or
//! redefines. The components of all files are merged into tables keyed by
//! qualified name, every type, base and element reference is resolved
//! across files, and the result is returned as a [`SchemaStructure`]:
//! component tables, a dependency graph, per-file summaries, statistics,
//! and the errors and warnings met along the way.
//!
//! ## Features
//!
//! - Depth-first loading with cycle detection over import/include/redefine
//! - Schema locations resolved relative to the referencing file and extra
//!   search roots; remote locations recorded, never fetched
//! - Chameleon includes and `xs:redefine`
//! - Prefixes resolved through the bindings of the document a reference was
//!   written in
//! - Deterministic output independent of file visiting order
//! - Selective extraction with dependency closure
//! - JSON output
//!
//! ## Example
//!
//! ```rust,no_run
//! use xsdgraph::{SchemaParser, Settings};
//!
//! let parser = SchemaParser::new(Settings::new().with_search_root("schemas/common"));
//! let structure = parser.parse("schemas/library.xsd")?;
//!
//! for (source, targets) in &structure.dependencies {
//!     println!("{} -> {}", source, targets.join(", "));
//! }
//! # Ok::<(), xsdgraph::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod settings;

// Names, namespaces and locations
pub mod locations;
pub mod names;
pub mod namespaces;

// Documents and loading
pub mod documents;
pub mod loaders;

// Component model and parsing pipeline
pub mod model;
pub mod parsing;
pub mod structure;

use std::path::Path;

// Re-exports for convenience
pub use error::{CircularImportError, Error, FileError, ParseError, Result, Warning};
pub use limits::Limits;
pub use loaders::{FileLoader, SchemaLoader};
pub use model::{Component, ComponentKind, DependencyKind, SymbolSpace};
pub use namespaces::{
    QName, XMLNS_NAMESPACE, XML_NAMESPACE, XSD_1_0_NAMESPACE, XSD_1_1_NAMESPACE,
};
pub use parsing::SchemaParser;
pub use settings::Settings;
pub use structure::{SchemaStructure, Selection, Statistics};

/// Version of the xsdgraph library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse the schema set rooted at `path` with default settings
pub fn parse_schema(path: impl AsRef<Path>) -> Result<SchemaStructure> {
    SchemaParser::default().parse(path)
}
