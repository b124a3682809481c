//! XML namespace handling
//!
//! This module provides utilities for working with XML namespaces,
//! qualified names (QNames), and namespace prefix mappings.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// XSD 1.0 namespace
pub const XSD_1_0_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Whether `namespace` is one of the XML Schema namespaces
pub fn is_xsd_namespace(namespace: &str) -> bool {
    namespace == XSD_1_0_NAMESPACE || namespace == XSD_1_1_NAMESPACE
}

/// Local names of the built-in datatypes
pub const BUILTIN_TYPES: &[&str] = &[
    // Special
    "anyType",
    "anySimpleType",
    "anyAtomicType",
    "error",
    // String derived
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    // Numeric
    "boolean",
    "decimal",
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "nonPositiveInteger",
    "negativeInteger",
    "float",
    "double",
    // Date and time
    "duration",
    "dayTimeDuration",
    "yearMonthDuration",
    "dateTime",
    "dateTimeStamp",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    // Other
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

/// Whether `qname` names a built-in datatype
pub fn is_builtin_type(qname: &QName) -> bool {
    qname.is_xsd() && BUILTIN_TYPES.contains(&qname.local_name.as_str())
}

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
///
/// Ordering is by namespace first (no namespace sorts first), then local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Parse Clark notation (`{namespace}local` or plain `local`)
    pub fn from_clark(text: &str) -> Result<Self> {
        match text.strip_prefix('{') {
            Some(rest) => {
                let (namespace, local) = rest
                    .split_once('}')
                    .ok_or_else(|| Error::Namespace(format!("Unterminated namespace in '{}'", text)))?;
                Ok(QName::namespaced(namespace, local))
            }
            None => Ok(QName::local(text)),
        }
    }

    /// Whether the name lives in one of the XML Schema namespaces
    pub fn is_xsd(&self) -> bool {
        self.namespace.as_deref().map(is_xsd_namespace).unwrap_or(false)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI, in declaration order
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_NAMESPACE),
            _ => self.prefixes.get(prefix).map(|s| s.as_str()),
        }
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Iterate over the declared prefixes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of declared prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefix and no default namespace is declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Prefixes bound to `namespace`
    pub fn prefixes_for<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.prefixes
            .iter()
            .filter(move |(_, ns)| ns.as_str() == namespace)
            .map(|(p, _)| p.as_str())
    }

    /// Merge another context without overriding anything already bound.
    ///
    /// New prefixes are added; a prefix already present keeps its binding.
    /// The default namespace is left as it is. Returns the number of
    /// prefixes added.
    pub fn merge_additive(&mut self, other: &NamespaceContext) -> usize {
        let mut added = 0;
        for (prefix, namespace) in other.iter() {
            if !self.prefixes.contains_key(prefix) {
                self.prefixes.insert(prefix.to_string(), namespace.to_string());
                added += 1;
            }
        }
        added
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}
