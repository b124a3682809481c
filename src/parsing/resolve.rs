//! Cross-file dependency resolution
//!
//! All components of a session are merged into a [`ComponentTable`] keyed by
//! qualified name, one table per symbol space (elements, types). Each
//! reference a component makes is then resolved through the prefix bindings
//! in scope where it was written, producing dependency edges and the list of
//! references that name nothing loaded.
//!
//! Published names are symbol-space keys (`element:{ns}name`,
//! `type:{ns}name`) so an element and a type sharing a name stay apart.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extract::LocalBindings;
use super::LoadedSchema;
use crate::error::Warning;
use crate::model::{Component, ComponentKind, DependencyKind};
use crate::names::split_qname;
use crate::namespaces::{is_builtin_type, NamespaceContext, QName};

/// How strongly a definition claims its qualified name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Defined in a no-namespace document that adopted the includer's namespace
    Chameleon,
    /// Defined in a document whose declared namespace owns the name
    Declared,
    /// Declared inside `xs:redefine`
    Redefinition,
}

/// A definition in the merged table
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// The component
    pub component: Component,
    /// Index of the defining schema in load order
    pub schema: usize,
    /// Defining file
    pub file: PathBuf,
    /// Claim strength
    pub precedence: Precedence,
    /// Reference prefixes bound below the schema root
    pub bindings: LocalBindings,
}

impl TableEntry {
    /// Ordering key of a claim; the greater key wins
    fn rank(&self) -> (Precedence, Reverse<&PathBuf>) {
        (self.precedence, Reverse(&self.file))
    }
}

/// Components of a session keyed by qualified name
#[derive(Debug, Clone, Default)]
pub struct ComponentTable {
    /// Global elements in first-discovered order
    elements: IndexMap<QName, TableEntry>,
    /// Complex and simple types (one symbol space)
    types: IndexMap<QName, TableEntry>,
    /// Types replaced by a redefinition
    originals: IndexMap<QName, TableEntry>,
}

impl ComponentTable {
    /// Merge the components of `schemas`.
    ///
    /// Collisions on the same qualified name are settled by precedence,
    /// then by the lexicographically smallest file path, so the winner does
    /// not depend on load order. Every collision except a redefinition
    /// replacing its original is reported as a warning.
    pub fn build(schemas: &[LoadedSchema], resolve_redefines: bool) -> (Self, Vec<Warning>) {
        let mut table = Self::default();
        let mut warnings = Vec::new();

        for (index, schema) in schemas.iter().enumerate() {
            let precedence = if schema.chameleon {
                Precedence::Chameleon
            } else {
                Precedence::Declared
            };
            for component in &schema.extracted.components {
                table.insert(
                    TableEntry {
                        component: component.clone(),
                        schema: index,
                        file: schema.document.path.clone(),
                        precedence,
                        bindings: schema.extracted.bindings_of(component),
                    },
                    &mut warnings,
                );
            }
        }

        if resolve_redefines {
            for (index, schema) in schemas.iter().enumerate() {
                for component in &schema.extracted.redefinitions {
                    table.insert(
                        TableEntry {
                            component: component.clone(),
                            schema: index,
                            file: schema.document.path.clone(),
                            precedence: Precedence::Redefinition,
                            bindings: schema.extracted.bindings_of(component),
                        },
                        &mut warnings,
                    );
                }
            }
        }

        (table, warnings)
    }

    fn insert(&mut self, entry: TableEntry, warnings: &mut Vec<Warning>) {
        let qname = entry.component.qname();
        let space = if entry.component.kind().is_type() {
            &mut self.types
        } else {
            &mut self.elements
        };

        if !space.contains_key(&qname) {
            space.insert(qname, entry);
            return;
        }
        let existing = match space.get_mut(&qname) {
            Some(existing) => existing,
            None => return,
        };

        let replace = entry.rank() > existing.rank();
        let (kept, ignored) = if replace {
            (&entry, &*existing)
        } else {
            (&*existing, &entry)
        };

        if kept.precedence == Precedence::Redefinition && ignored.precedence != Precedence::Redefinition {
            log::debug!(
                "{} {} redefined in {}",
                ignored.component.kind(),
                qname,
                kept.file.display()
            );
            let better = self
                .originals
                .get(&qname)
                .map(|original| ignored.rank() > original.rank())
                .unwrap_or(true);
            if better {
                self.originals.insert(qname.clone(), ignored.clone());
            }
        } else {
            let warning = Warning::DuplicateComponent {
                component: kept.component.kind().to_string(),
                name: qname.to_string(),
                kept: kept.file.clone(),
                ignored: ignored.file.clone(),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        if replace {
            *existing = entry;
        }
    }

    /// Global element by qualified name
    pub fn element(&self, qname: &QName) -> Option<&TableEntry> {
        self.elements.get(qname)
    }

    /// Complex or simple type by qualified name
    pub fn type_definition(&self, qname: &QName) -> Option<&TableEntry> {
        self.types.get(qname)
    }

    /// Type definition a redefinition of `qname` replaced
    pub fn original(&self, qname: &QName) -> Option<&TableEntry> {
        self.originals.get(qname)
    }

    /// Look up the target of a dependency of `kind`
    pub fn lookup(&self, qname: &QName, kind: DependencyKind) -> Option<&TableEntry> {
        if kind.targets_element() {
            self.element(qname)
        } else {
            self.type_definition(qname)
        }
    }

    /// Global elements in first-discovered order
    pub fn elements(&self) -> impl Iterator<Item = &TableEntry> {
        self.elements.values()
    }

    /// Types in first-discovered order
    pub fn types(&self) -> impl Iterator<Item = &TableEntry> {
        self.types.values()
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.elements.len() + self.types.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resolved reference from one component to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Referencing component key
    pub source: String,
    /// Referencing component kind
    pub source_kind: ComponentKind,
    /// Referenced component key
    pub target: String,
    /// Referenced component kind
    pub target_kind: ComponentKind,
    /// Dependency kind
    pub kind: DependencyKind,
    /// File defining the source
    pub source_file: PathBuf,
    /// File defining the target
    pub target_file: PathBuf,
    /// Whether source and target live in different files
    pub cross_file: bool,
}

/// A reference that names no loaded component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    /// Referencing component key
    pub source: String,
    /// Referencing component kind
    pub source_kind: ComponentKind,
    /// Reference as written
    pub reference: String,
    /// Key the reference was expected to resolve to, or the raw reference
    /// when its prefix is unbound
    pub expected: String,
    /// Dependency kind
    pub kind: DependencyKind,
    /// File containing the reference
    pub file: PathBuf,
}

/// Result of resolving every reference of a component table
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Source key → distinct target keys, in reference order
    pub dependencies: BTreeMap<String, Vec<String>>,
    /// Every resolved reference
    pub edges: Vec<DependencyEdge>,
    /// References naming nothing loaded
    pub dangling: Vec<DanglingReference>,
    /// Unknown prefixes
    pub warnings: Vec<Warning>,
}

/// Namespace bindings of the session as a whole
#[derive(Debug, Clone, Copy)]
pub struct PrimaryScope<'a> {
    /// Merged prefix bindings
    pub namespaces: &'a NamespaceContext,
    /// Target namespace of the root schema
    pub target_namespace: Option<&'a str>,
}

/// Outcome of looking up one raw reference
enum Lookup<'a> {
    /// Built-in XML Schema datatype
    Builtin,
    Found(QName, &'a TableEntry),
    /// Definition replaced by the redefinition making the reference
    Original(&'a TableEntry),
    Missing(QName),
    UnknownPrefix(String),
}

/// Resolve every reference made by the components of `table`.
///
/// Components are visited in qualified-name order and references in
/// document order, so the result does not depend on the order files were
/// loaded in. The base of a redefinition that names itself resolves to the
/// definition it replaces; that edge is kept in `edges` but left out of
/// `dependencies`, where both share one key.
pub fn resolve(table: &ComponentTable, schemas: &[LoadedSchema], primary: PrimaryScope<'_>) -> Resolution {
    let mut resolution = Resolution::default();

    let mut sources: Vec<(QName, ComponentKind, &TableEntry)> = table
        .elements()
        .chain(table.types())
        .map(|entry| (entry.component.qname(), entry.component.kind(), entry))
        .collect();
    sources.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));

    for (qname, source_kind, entry) in sources {
        let schema = match schemas.get(entry.schema) {
            Some(schema) => schema,
            None => continue,
        };
        let source = entry.component.key();

        for reference in entry.component.references() {
            let found = match lookup(table, schema, primary, &entry.bindings, &reference.raw, reference.kind) {
                Lookup::Found(target, _)
                    if entry.precedence == Precedence::Redefinition
                        && reference.kind == DependencyKind::BaseType
                        && target == qname =>
                {
                    match table.original(&qname) {
                        Some(original) => Lookup::Original(original),
                        None => Lookup::Missing(target),
                    }
                }
                other => other,
            };

            match found {
                Lookup::Builtin => {}
                Lookup::Found(_, target_entry) => {
                    let target = target_entry.component.key();
                    let targets = resolution.dependencies.entry(source.clone()).or_default();
                    if !targets.contains(&target) {
                        targets.push(target.clone());
                    }
                    resolution.edges.push(edge(&source, entry, target, target_entry, reference.kind));
                }
                Lookup::Original(original) => {
                    let target = original.component.key();
                    resolution.edges.push(edge(&source, entry, target, original, reference.kind));
                }
                Lookup::Missing(expected) => {
                    let expected = reference.kind.target_space().key(&expected);
                    log::debug!("{} references unknown {}", source, expected);
                    resolution.dangling.push(DanglingReference {
                        source: source.clone(),
                        source_kind,
                        reference: reference.raw.clone(),
                        expected,
                        kind: reference.kind,
                        file: entry.file.clone(),
                    });
                }
                Lookup::UnknownPrefix(prefix) => {
                    let warning = Warning::UnknownPrefix {
                        file: entry.file.clone(),
                        prefix,
                        reference: reference.raw.clone(),
                    };
                    log::warn!("{}", warning);
                    resolution.warnings.push(warning);
                    resolution.dangling.push(DanglingReference {
                        source: source.clone(),
                        source_kind,
                        reference: reference.raw.clone(),
                        expected: reference.raw.clone(),
                        kind: reference.kind,
                        file: entry.file.clone(),
                    });
                }
            }
        }
    }

    resolution
}

fn edge(
    source: &str,
    entry: &TableEntry,
    target: String,
    target_entry: &TableEntry,
    kind: DependencyKind,
) -> DependencyEdge {
    DependencyEdge {
        source: source.to_string(),
        source_kind: entry.component.kind(),
        target,
        target_kind: target_entry.component.kind(),
        kind,
        source_file: entry.file.clone(),
        target_file: target_entry.file.clone(),
        cross_file: entry.file != target_entry.file,
    }
}

fn lookup<'a>(
    table: &'a ComponentTable,
    schema: &LoadedSchema,
    primary: PrimaryScope<'_>,
    bindings: &LocalBindings,
    raw: &str,
    kind: DependencyKind,
) -> Lookup<'a> {
    let (prefix, local) = split_qname(raw);

    let candidates: Vec<Option<String>> = if let Some(bound) = bindings.get(raw) {
        vec![bound.clone()]
    } else {
        match prefix {
            Some(prefix) => {
                let namespace = schema
                    .document
                    .namespaces
                    .get_namespace(prefix)
                    .or_else(|| primary.namespaces.get_namespace(prefix));
                match namespace {
                    Some(namespace) => vec![Some(namespace.to_string())],
                    None => return Lookup::UnknownPrefix(prefix.to_string()),
                }
            }
            None => {
                // A chameleon document's unqualified names belong to its adopted namespace
                let default = schema
                    .document
                    .namespaces
                    .get_default_namespace()
                    .filter(|ns| !ns.is_empty())
                    .map(str::to_string)
                    .or_else(|| {
                        if schema.chameleon {
                            schema.effective_namespace.clone()
                        } else {
                            None
                        }
                    });
                let mut candidates = Vec::with_capacity(3);
                for candidate in [
                    default,
                    schema.effective_namespace.clone(),
                    primary.target_namespace.map(str::to_string),
                ] {
                    if !candidates.contains(&candidate) {
                        candidates.push(candidate);
                    }
                }
                candidates
            }
        }
    };

    for namespace in &candidates {
        let qname = QName::new(namespace.clone(), local);
        if !kind.targets_element() && is_builtin_type(&qname) {
            return Lookup::Builtin;
        }
        if let Some(entry) = table.lookup(&qname, kind) {
            return Lookup::Found(qname, entry);
        }
    }

    let first = candidates.into_iter().next().flatten();
    Lookup::Missing(QName::new(first, local))
}
