//! The assembled structure of a schema set
//!
//! [`SchemaStructure`] is the complete result of a parse session: the merged
//! component tables, the dependency graph between components, how the
//! files of the set reference one another, and everything that went wrong
//! along the way. It serializes to JSON with `snake_case` field names.

pub mod selection;

use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FileError, Result, Warning};
use crate::model::{ComplexType, Element, SimpleType, SymbolSpace};
use crate::namespaces::NamespaceContext;
use crate::parsing::{DanglingReference, DependencyEdge, SchemaReference};

pub use selection::Selection;

/// Aggregate counts over a schema set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Global elements plus every nested local element declaration
    pub total_elements: usize,
    /// Named complex types
    pub total_complex_types: usize,
    /// Named simple types
    pub total_simple_types: usize,
    /// Deepest element nesting; global elements are at depth 0, children
    /// of named complex types at depth 1
    pub max_depth: usize,
    /// Attribute declarations on elements and complex types
    pub total_attributes: usize,
    /// Files loaded
    pub total_files: usize,
    /// References naming no loaded component
    pub unresolved_references: usize,
}

impl Statistics {
    /// Compute statistics over component tables
    pub fn compute<'a>(
        elements: &[Element],
        complex_types: impl IntoIterator<Item = &'a ComplexType>,
        total_simple_types: usize,
        total_files: usize,
        unresolved_references: usize,
    ) -> Self {
        let mut stats = Statistics {
            total_simple_types,
            total_files,
            unresolved_references,
            ..Statistics::default()
        };

        for element in elements {
            stats.total_elements += element.count_elements();
            stats.total_attributes += element.count_attributes();
            stats.max_depth = stats.max_depth.max(element.max_depth(0));
        }

        for complex in complex_types {
            stats.total_complex_types += 1;
            stats.total_attributes += complex.attributes.len();
            for child in &complex.elements {
                stats.total_elements += child.count_elements();
                stats.total_attributes += child.count_attributes();
                stats.max_depth = stats.max_depth.max(child.max_depth(1));
            }
        }

        stats
    }
}

/// What one file of the set contributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Canonical path
    pub path: PathBuf,
    /// Declared target namespace
    pub target_namespace: Option<String>,
    /// Namespace its components were placed in
    pub effective_namespace: Option<String>,
    /// Global elements declared in the file
    pub global_elements: usize,
    /// Named complex types declared in the file
    pub complex_types: usize,
    /// Named simple types declared in the file
    pub simple_types: usize,
    /// Files it references that were found on disk
    pub dependencies: Vec<PathBuf>,
}

/// Where a namespace is defined and declared across the set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceUsage {
    /// Files whose components live in the namespace
    pub defining_files: Vec<PathBuf>,
    /// Files binding a prefix (or the default namespace) to it
    pub declaring_files: Vec<PathBuf>,
    /// Prefixes bound to it
    pub prefixes: Vec<String>,
}

/// Structure of a parsed schema set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaStructure {
    /// Root schema file
    pub root_file: PathBuf,
    /// Target namespace of the root schema
    pub target_namespace: Option<String>,
    /// Merged prefix bindings (root first, never overridden)
    pub namespaces: NamespaceContext,
    /// Global elements in first-discovered order
    pub elements: Vec<Element>,
    /// Named complex types by qualified name
    pub complex_types: IndexMap<String, ComplexType>,
    /// Named simple types by qualified name
    pub simple_types: IndexMap<String, SimpleType>,
    /// Component key → keys of the components it references.
    ///
    /// Keys carry the symbol space, as in `element:{ns}name` or
    /// `type:{ns}name`.
    pub dependencies: BTreeMap<String, Vec<String>>,
    /// Every resolved reference with its kind and files
    pub dependency_edges: Vec<DependencyEdge>,
    /// References naming no loaded component
    pub unresolved_references: Vec<DanglingReference>,
    /// Aggregate counts
    pub statistics: Statistics,
    /// Per-file summaries in load order
    pub files: Vec<FileSummary>,
    /// Every import, include and redefine in load order
    pub file_relationships: Vec<SchemaReference>,
    /// File → files it references
    pub file_dependencies: BTreeMap<String, Vec<String>>,
    /// Imported namespace → file providing it
    pub imported_namespaces: BTreeMap<String, PathBuf>,
    /// Namespace → where it is used
    pub namespace_usage: BTreeMap<String, NamespaceUsage>,
    /// Files that failed to load
    pub errors: Vec<FileError>,
    /// Non-fatal problems
    pub warnings: Vec<Warning>,
}

impl SchemaStructure {
    /// Whether every file loaded
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Complex type by Clark-notation key or by local name
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types
            .get(name)
            .or_else(|| self.complex_types.values().find(|t| t.name == name))
    }

    /// Simple type by Clark-notation key or by local name
    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_types
            .get(name)
            .or_else(|| self.simple_types.values().find(|t| t.name == name))
    }

    /// Global element by local name
    pub fn global_element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Find an element declaration by name.
    ///
    /// Global elements are searched first, then nested declarations
    /// depth-first: inside global elements, then inside complex types.
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.global_element(name)
            .or_else(|| self.elements.iter().find_map(|e| e.find(name)))
            .or_else(|| {
                self.complex_types
                    .values()
                    .flat_map(|t| t.elements.iter())
                    .find_map(|e| e.find(name))
            })
    }

    /// Names leading to the first element named `name`.
    ///
    /// Paths inside a complex type start with the type name.
    pub fn element_path(&self, name: &str) -> Option<Vec<String>> {
        self.elements
            .iter()
            .find_map(|e| e.path_to(name))
            .or_else(|| {
                self.complex_types.values().find_map(|t| {
                    t.elements.iter().find_map(|e| {
                        e.path_to(name).map(|mut path| {
                            path.insert(0, t.name.clone());
                            path
                        })
                    })
                })
            })
    }

    /// Dependency key of a component given by key, Clark name or local name.
    ///
    /// Elements are searched before types.
    pub fn component_key(&self, name: &str) -> Option<String> {
        if SymbolSpace::split_key(name).is_some() {
            return Some(name.to_string());
        }
        self.elements
            .iter()
            .find(|e| e.name == name || e.qname().to_string() == name)
            .map(|e| SymbolSpace::Element.key(e.qname()))
            .or_else(|| {
                self.complex_types
                    .iter()
                    .find(|(key, t)| key.as_str() == name || t.name == name)
                    .map(|(key, _)| SymbolSpace::Type.key(key))
            })
            .or_else(|| {
                self.simple_types
                    .iter()
                    .find(|(key, t)| key.as_str() == name || t.name == name)
                    .map(|(key, _)| SymbolSpace::Type.key(key))
            })
    }

    /// Components the component keyed `name` references directly
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Components referencing the component keyed `name` directly, sorted
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|(_, targets)| targets.iter().any(|t| t == name))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    /// Reduce the structure to a selection of components
    pub fn select(&self, selection: &Selection) -> SchemaStructure {
        selection.apply(self)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
