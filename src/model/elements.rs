//! Element declarations

use serde::{Deserialize, Serialize};

use super::attributes::Attribute;
use super::complex_types::{Compositor, Derivation};
use super::simple_types::SimpleType;
use crate::namespaces::QName;

/// Occurrence value meaning "no upper bound"
pub const UNBOUNDED: &str = "unbounded";

/// An anonymous type declared inline on an element
///
/// The name is synthesized from the element's position in its parent
/// (`<scope>/<element>[<index>]`). Content of an anonymous complex type
/// lives on the element itself (`children` and `attributes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnonymousType {
    /// Inline complexType
    Complex {
        /// Synthesized name
        name: String,
        /// Base type of complexContent / simpleContent derivation
        derivation: Option<Derivation>,
        /// Outermost model group
        compositor: Option<Compositor>,
        /// Mixed content
        mixed: bool,
    },
    /// Inline simpleType (its `name` field holds the synthesized name)
    Simple(SimpleType),
}

impl AnonymousType {
    /// Synthesized name of the anonymous type
    pub fn name(&self) -> &str {
        match self {
            AnonymousType::Complex { name, .. } => name,
            AnonymousType::Simple(simple) => &simple.name,
        }
    }
}

/// An element declaration, global or local
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element name (local part of the reference for `ref=` particles)
    pub name: String,
    /// Type reference as written, possibly prefixed
    #[serde(rename = "type")]
    pub type_ref: Option<String>,
    /// Referenced global element, as written
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    /// Minimum occurrences, as written (default "1")
    pub min_occurs: String,
    /// Maximum occurrences, as written (default "1", may be "unbounded")
    pub max_occurs: String,
    /// Documentation text
    pub documentation: Option<String>,
    /// Attributes of the inline complex type
    pub attributes: Vec<Attribute>,
    /// Child elements of the inline complex type
    pub children: Vec<Element>,
    /// Owning namespace
    pub namespace: Option<String>,
    /// Inline anonymous type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_type: Option<AnonymousType>,
}

impl Element {
    /// Create an element with default occurrence
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            ref_name: None,
            min_occurs: "1".to_string(),
            max_occurs: "1".to_string(),
            documentation: None,
            attributes: Vec::new(),
            children: Vec::new(),
            namespace,
            anonymous_type: None,
        }
    }

    /// Qualified name of the element
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.name.as_str())
    }

    /// Whether the element has an inline complex type
    pub fn is_complex(&self) -> bool {
        matches!(self.anonymous_type, Some(AnonymousType::Complex { .. }))
    }

    /// Whether maxOccurs is unbounded
    pub fn is_unbounded(&self) -> bool {
        self.max_occurs == UNBOUNDED
    }

    /// Number of element declarations in this subtree, including self
    pub fn count_elements(&self) -> usize {
        1 + self.children.iter().map(Element::count_elements).sum::<usize>()
    }

    /// Number of attribute declarations in this subtree
    pub fn count_attributes(&self) -> usize {
        self.attributes.len()
            + self
                .children
                .iter()
                .map(Element::count_attributes)
                .sum::<usize>()
    }

    /// Deepest nesting level in this subtree, given this element's depth
    pub fn max_depth(&self, depth: usize) -> usize {
        self.children
            .iter()
            .map(|child| child.max_depth(depth + 1))
            .max()
            .unwrap_or(depth)
    }

    /// Depth-first search for an element named `name` in this subtree
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Names from this element down to the first element named `name`
    pub fn path_to(&self, name: &str) -> Option<Vec<String>> {
        if self.name == name {
            return Some(vec![self.name.clone()]);
        }
        self.children.iter().find_map(|child| {
            child.path_to(name).map(|mut path| {
                path.insert(0, self.name.clone());
                path
            })
        })
    }
}
