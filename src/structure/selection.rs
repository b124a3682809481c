//! Selective extraction
//!
//! A [`Selection`] picks components out of a [`SchemaStructure`] by name or
//! by namespace, optionally pulling in everything they depend on, and
//! produces a reduced structure with recomputed statistics.

use std::collections::{BTreeSet, VecDeque};

use super::{SchemaStructure, Statistics};
use crate::model::SymbolSpace;

/// Components to keep from a schema structure.
///
/// Names match the dependency key (`type:{urn:x}BookType`), the
/// Clark-notation name (`{urn:x}BookType`) or the local name (`BookType`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Global elements to keep
    pub elements: Vec<String>,
    /// Complex types to keep
    pub complex_types: Vec<String>,
    /// Simple types to keep
    pub simple_types: Vec<String>,
    /// Keep every component of these namespaces
    pub namespaces: Vec<String>,
    /// Follow dependencies transitively
    pub include_dependencies: bool,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global element
    pub fn with_element(mut self, name: impl Into<String>) -> Self {
        self.elements.push(name.into());
        self
    }

    /// Add a complex type
    pub fn with_complex_type(mut self, name: impl Into<String>) -> Self {
        self.complex_types.push(name.into());
        self
    }

    /// Add a simple type
    pub fn with_simple_type(mut self, name: impl Into<String>) -> Self {
        self.simple_types.push(name.into());
        self
    }

    /// Add a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// Set whether dependencies are followed
    pub fn with_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }

    fn in_namespaces(&self, namespace: Option<&str>) -> bool {
        namespace
            .map(|ns| self.namespaces.iter().any(|n| n == ns))
            .unwrap_or(false)
    }

    /// Dependency keys of the selected components, closure included
    pub fn resolve_keys(&self, structure: &SchemaStructure) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();

        for element in &structure.elements {
            let qname = element.qname();
            let key = SymbolSpace::Element.key(&qname);
            if matches_any(&self.elements, &key, &qname.to_string(), &element.name)
                || self.in_namespaces(element.namespace.as_deref())
            {
                keys.insert(key);
            }
        }
        for (name, complex) in &structure.complex_types {
            let key = SymbolSpace::Type.key(name);
            if matches_any(&self.complex_types, &key, name, &complex.name)
                || self.in_namespaces(complex.namespace.as_deref())
            {
                keys.insert(key);
            }
        }
        for (name, simple) in &structure.simple_types {
            let key = SymbolSpace::Type.key(name);
            if matches_any(&self.simple_types, &key, name, &simple.name)
                || self.in_namespaces(simple.namespace.as_deref())
            {
                keys.insert(key);
            }
        }

        if self.include_dependencies {
            let mut queue: VecDeque<String> = keys.iter().cloned().collect();
            while let Some(key) = queue.pop_front() {
                for target in structure.dependencies_of(&key) {
                    if keys.insert(target.clone()) {
                        queue.push_back(target.clone());
                    }
                }
            }
        }

        keys
    }

    /// Build the reduced structure
    pub fn apply(&self, structure: &SchemaStructure) -> SchemaStructure {
        let keys = self.resolve_keys(structure);
        log::debug!("selection kept {} components", keys.len());

        let elements: Vec<_> = structure
            .elements
            .iter()
            .filter(|e| keys.contains(&SymbolSpace::Element.key(e.qname())))
            .cloned()
            .collect();
        let complex_types = structure
            .complex_types
            .iter()
            .filter(|(name, _)| keys.contains(&SymbolSpace::Type.key(name)))
            .map(|(name, t)| (name.clone(), t.clone()))
            .collect();
        let simple_types: indexmap::IndexMap<_, _> = structure
            .simple_types
            .iter()
            .filter(|(name, _)| keys.contains(&SymbolSpace::Type.key(name)))
            .map(|(name, t)| (name.clone(), t.clone()))
            .collect();
        let unresolved_references: Vec<_> = structure
            .unresolved_references
            .iter()
            .filter(|r| keys.contains(&r.source))
            .cloned()
            .collect();

        let mut reduced = SchemaStructure {
            elements,
            complex_types,
            simple_types,
            dependencies: structure
                .dependencies
                .iter()
                .filter(|(source, _)| keys.contains(*source))
                .map(|(source, targets)| (source.clone(), targets.clone()))
                .collect(),
            dependency_edges: structure
                .dependency_edges
                .iter()
                .filter(|e| keys.contains(&e.source))
                .cloned()
                .collect(),
            unresolved_references,
            ..structure.clone()
        };

        reduced.statistics = Statistics::compute(
            &reduced.elements,
            reduced.complex_types.values(),
            reduced.simple_types.len(),
            structure.statistics.total_files,
            reduced.unresolved_references.len(),
        );
        reduced
    }
}

fn matches_any(wanted: &[String], key: &str, clark: &str, local_name: &str) -> bool {
    wanted.iter().any(|w| w == key || w == clark || w == local_name)
}
