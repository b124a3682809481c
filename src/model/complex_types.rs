//! Complex type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::attributes::Attribute;
use super::elements::Element;
use crate::namespaces::QName;

/// Derivation method of a complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationKind {
    /// Derived by extension
    Extension,
    /// Derived by restriction
    Restriction,
}

impl fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationKind::Extension => write!(f, "extension"),
            DerivationKind::Restriction => write!(f, "restriction"),
        }
    }
}

/// Base type reference with its derivation method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// Base type reference, as written
    pub base: String,
    /// Extension or restriction
    pub kind: DerivationKind,
}

/// Model group used for the content of a complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compositor {
    /// Ordered children
    Sequence,
    /// Exactly one of the children
    Choice,
    /// All children in any order
    All,
}

impl Compositor {
    /// Map an XSD element local name to a compositor
    pub fn from_local_name(local_name: &str) -> Option<Self> {
        match local_name {
            "sequence" => Some(Compositor::Sequence),
            "choice" => Some(Compositor::Choice),
            "all" => Some(Compositor::All),
            _ => None,
        }
    }
}

/// A named complex type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexType {
    /// Type name
    pub name: String,
    /// Owning namespace
    pub namespace: Option<String>,
    /// Child element declarations in content order
    pub elements: Vec<Element>,
    /// Attribute declarations
    pub attributes: Vec<Attribute>,
    /// Base type and derivation method
    pub derivation: Option<Derivation>,
    /// Outermost model group
    pub compositor: Option<Compositor>,
    /// Mixed content
    pub mixed: bool,
    /// Declared abstract
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Documentation text
    pub documentation: Option<String>,
}

impl ComplexType {
    /// Create an empty complex type
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            elements: Vec::new(),
            attributes: Vec::new(),
            derivation: None,
            compositor: None,
            mixed: false,
            is_abstract: false,
            documentation: None,
        }
    }

    /// Qualified name of the type
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.name.as_str())
    }

    /// Base type reference, if derived
    pub fn base_type(&self) -> Option<&str> {
        self.derivation.as_ref().map(|d| d.base.as_str())
    }

    /// Whether the type is derived by extension
    pub fn is_extension(&self) -> bool {
        matches!(self.derivation, Some(Derivation { kind: DerivationKind::Extension, .. }))
    }

    /// Whether the type is derived by restriction
    pub fn is_restriction(&self) -> bool {
        matches!(self.derivation, Some(Derivation { kind: DerivationKind::Restriction, .. }))
    }
}
