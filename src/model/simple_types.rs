//! Simple type definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::namespaces::QName;

/// Restriction facets captured verbatim, in this order
pub const FACETS: &[&str] = &[
    "length",
    "minLength",
    "maxLength",
    "pattern",
    "minInclusive",
    "maxInclusive",
    "minExclusive",
    "maxExclusive",
    "totalDigits",
    "fractionDigits",
    "whiteSpace",
];

/// How a simple type is built from other types
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimpleVariety {
    /// Restriction of a base type (the `base_type` field)
    #[default]
    Restriction,
    /// Whitespace-separated list of an item type
    List {
        /// Item type reference, absent for an inline item type
        item_type: Option<String>,
    },
    /// Union of member types
    Union {
        /// Member type references
        member_types: Vec<String>,
    },
}

/// A named (or synthesized) simple type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleType {
    /// Type name
    pub name: String,
    /// Owning namespace
    pub namespace: Option<String>,
    /// Base type reference of a restriction, as written
    pub base_type: Option<String>,
    /// Restriction, list or union
    pub variety: SimpleVariety,
    /// Facet name to value; values are never coerced
    pub restrictions: IndexMap<String, String>,
    /// Enumeration values in document order
    pub enumerations: Vec<String>,
    /// Documentation text
    pub documentation: Option<String>,
}

impl SimpleType {
    /// Create an empty restriction type
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            base_type: None,
            variety: SimpleVariety::Restriction,
            restrictions: IndexMap::new(),
            enumerations: Vec::new(),
            documentation: None,
        }
    }

    /// Qualified name of the type
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.name.as_str())
    }

    /// Whether the type restricts its base to a fixed set of values
    pub fn is_enumeration(&self) -> bool {
        !self.enumerations.is_empty()
    }

    /// Look up a facet value
    pub fn facet(&self, name: &str) -> Option<&str> {
        self.restrictions.get(name).map(|s| s.as_str())
    }
}
