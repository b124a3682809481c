//! Structural model of schema components
//!
//! The extractor produces [`Component`] values, an explicit sum type over
//! global elements, complex types and simple types. Consumers match on it
//! exhaustively.

pub mod attributes;
pub mod complex_types;
pub mod elements;
pub mod simple_types;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use attributes::{Attribute, AttributeUse};
pub use complex_types::{ComplexType, Compositor, Derivation, DerivationKind};
pub use elements::{AnonymousType, Element, UNBOUNDED};
pub use simple_types::{SimpleType, SimpleVariety, FACETS};

use crate::namespaces::QName;

/// Kind of a global schema component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Global element declaration
    Element,
    /// Named complex type
    ComplexType,
    /// Named simple type
    SimpleType,
}

impl ComponentKind {
    /// Whether components of this kind live in the type symbol space
    pub fn is_type(self) -> bool {
        !matches!(self, ComponentKind::Element)
    }

    /// Symbol space holding components of this kind
    pub fn symbol_space(self) -> SymbolSpace {
        if self.is_type() {
            SymbolSpace::Type
        } else {
            SymbolSpace::Element
        }
    }
}

/// Symbol space of a global name.
///
/// An element and a type may share a qualified name, so dependency maps
/// key components by space and name, such as `type:{urn:x}Address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSpace {
    /// Global elements
    Element,
    /// Complex and simple types
    Type,
}

impl SymbolSpace {
    /// Key of `name` in this space
    pub fn key(self, name: impl fmt::Display) -> String {
        format!("{}:{}", self, name)
    }

    /// Split a key into its space and Clark-notation name
    pub fn split_key(key: &str) -> Option<(SymbolSpace, &str)> {
        if let Some(name) = key.strip_prefix("element:") {
            Some((SymbolSpace::Element, name))
        } else {
            key.strip_prefix("type:").map(|name| (SymbolSpace::Type, name))
        }
    }
}

impl fmt::Display for SymbolSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSpace::Element => write!(f, "element"),
            SymbolSpace::Type => write!(f, "type"),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Element => write!(f, "element"),
            ComponentKind::ComplexType => write!(f, "complexType"),
            ComponentKind::SimpleType => write!(f, "simpleType"),
        }
    }
}

/// Why one component depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// `type=`, list `itemType=` or union `memberTypes=`
    TypeReference,
    /// Element particle `ref=`
    ElementReference,
    /// `base=` of a restriction or extension
    BaseType,
}

impl DependencyKind {
    /// Whether the target is looked up among elements rather than types
    pub fn targets_element(self) -> bool {
        matches!(self, DependencyKind::ElementReference)
    }

    /// Symbol space the target is looked up in
    pub fn target_space(self) -> SymbolSpace {
        if self.targets_element() {
            SymbolSpace::Element
        } else {
            SymbolSpace::Type
        }
    }
}

/// A raw reference made by a component, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReference {
    /// Reference as written, possibly prefixed
    pub raw: String,
    /// Dependency kind
    pub kind: DependencyKind,
}

/// A global schema component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum Component {
    /// Global element declaration
    Element(Element),
    /// Named complex type
    ComplexType(ComplexType),
    /// Named simple type
    SimpleType(SimpleType),
}

impl Component {
    /// Component kind
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Element(_) => ComponentKind::Element,
            Component::ComplexType(_) => ComponentKind::ComplexType,
            Component::SimpleType(_) => ComponentKind::SimpleType,
        }
    }

    /// Local name
    pub fn name(&self) -> &str {
        match self {
            Component::Element(e) => &e.name,
            Component::ComplexType(t) => &t.name,
            Component::SimpleType(t) => &t.name,
        }
    }

    /// Owning namespace
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Component::Element(e) => e.namespace.as_deref(),
            Component::ComplexType(t) => t.namespace.as_deref(),
            Component::SimpleType(t) => t.namespace.as_deref(),
        }
    }

    /// Qualified name
    pub fn qname(&self) -> QName {
        QName::new(self.namespace(), self.name())
    }

    /// Qualified name keyed by symbol space
    pub fn key(&self) -> String {
        self.kind().symbol_space().key(self.qname())
    }

    /// Every reference the component makes, in document order, without duplicates
    pub fn references(&self) -> Vec<ComponentReference> {
        let mut refs = Vec::new();
        match self {
            Component::Element(e) => collect_element_refs(e, &mut refs),
            Component::ComplexType(t) => {
                if let Some(ref derivation) = t.derivation {
                    push_ref(&mut refs, &derivation.base, DependencyKind::BaseType);
                }
                for element in &t.elements {
                    collect_element_refs(element, &mut refs);
                }
                collect_attribute_refs(&t.attributes, &mut refs);
            }
            Component::SimpleType(t) => collect_simple_refs(t, &mut refs),
        }
        refs
    }
}

fn push_ref(refs: &mut Vec<ComponentReference>, raw: &str, kind: DependencyKind) {
    let raw = raw.trim();
    if raw.is_empty() || refs.iter().any(|r| r.raw == raw && r.kind == kind) {
        return;
    }
    refs.push(ComponentReference {
        raw: raw.to_string(),
        kind,
    });
}

fn collect_element_refs(element: &Element, refs: &mut Vec<ComponentReference>) {
    if let Some(ref type_ref) = element.type_ref {
        push_ref(refs, type_ref, DependencyKind::TypeReference);
    }
    if let Some(ref ref_name) = element.ref_name {
        push_ref(refs, ref_name, DependencyKind::ElementReference);
    }
    match element.anonymous_type {
        Some(AnonymousType::Complex {
            derivation: Some(ref derivation),
            ..
        }) => push_ref(refs, &derivation.base, DependencyKind::BaseType),
        Some(AnonymousType::Simple(ref simple)) => collect_simple_refs(simple, refs),
        _ => {}
    }
    collect_attribute_refs(&element.attributes, refs);
    for child in &element.children {
        collect_element_refs(child, refs);
    }
}

fn collect_attribute_refs(attributes: &[Attribute], refs: &mut Vec<ComponentReference>) {
    for attribute in attributes {
        if let Some(ref type_ref) = attribute.type_ref {
            push_ref(refs, type_ref, DependencyKind::TypeReference);
        }
    }
}

fn collect_simple_refs(simple: &SimpleType, refs: &mut Vec<ComponentReference>) {
    if let Some(ref base) = simple.base_type {
        push_ref(refs, base, DependencyKind::BaseType);
    }
    match simple.variety {
        SimpleVariety::List {
            item_type: Some(ref item),
        } => push_ref(refs, item, DependencyKind::TypeReference),
        SimpleVariety::Union { ref member_types } => {
            for member in member_types {
                push_ref(refs, member, DependencyKind::TypeReference);
            }
        }
        _ => {}
    }
}
