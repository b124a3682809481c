//! Attribute declarations

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an attribute must appear on instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeUse {
    /// Must be present
    Required,
    /// May be present
    #[default]
    Optional,
    /// Must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse the `use` attribute value; unknown values fall back to optional
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "required" => AttributeUse::Required,
            "prohibited" => AttributeUse::Prohibited,
            _ => AttributeUse::Optional,
        }
    }
}

impl fmt::Display for AttributeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeUse::Required => write!(f, "required"),
            AttributeUse::Optional => write!(f, "optional"),
            AttributeUse::Prohibited => write!(f, "prohibited"),
        }
    }
}

/// An attribute declaration (or reference) on a type or element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (local part of the reference for `ref=` attributes)
    pub name: String,
    /// Type reference as written, possibly prefixed
    #[serde(rename = "type")]
    pub type_ref: Option<String>,
    /// Referenced global attribute, as written
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    /// Use constraint
    #[serde(rename = "use")]
    pub use_: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
}

impl Attribute {
    /// Create an optional attribute without a type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            ref_name: None,
            use_: AttributeUse::Optional,
            default: None,
            fixed: None,
        }
    }

    /// Whether the attribute is required
    pub fn is_required(&self) -> bool {
        self.use_ == AttributeUse::Required
    }
}
