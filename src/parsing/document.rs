//! Parsed schema documents

use std::path::{Path, PathBuf};

use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::namespaces::NamespaceContext;

/// One parsed schema file.
///
/// Created once per distinct canonical path and never mutated afterwards.
/// The element tree is owned by the document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    /// Canonical file path
    pub path: PathBuf,
    /// Declared `targetNamespace`
    pub target_namespace: Option<String>,
    /// Prefix bindings and default namespace declared on the schema root
    pub namespaces: NamespaceContext,
    /// The `xs:schema` element
    pub root: Element,
}

impl SchemaDocument {
    /// Parse schema text read from `path`
    pub fn from_bytes(path: impl Into<PathBuf>, xml: &[u8], limits: &Limits) -> Result<Self> {
        let path = path.into();
        let document = Document::parse_with_limits(xml, limits)
            .map_err(|e| Error::Parse(ParseError::new(e.to_string()).with_path(&path)))?;
        let root = document
            .into_root()
            .ok_or_else(|| Error::Parse(ParseError::new("Empty document").with_path(&path)))?;
        Self::from_root(path, root)
    }

    /// Parse schema text that has no file of its own
    pub fn from_string(path: impl Into<PathBuf>, xml: &str) -> Result<Self> {
        Self::from_bytes(path, xml.as_bytes(), &Limits::default())
    }

    /// Wrap an already parsed `xs:schema` element
    pub fn from_root(path: PathBuf, root: Element) -> Result<Self> {
        if !root.is_xsd("schema") {
            return Err(Error::Parse(
                ParseError::new(format!(
                    "Expected xs:schema root element, got {}",
                    root.qname
                ))
                .with_path(&path)
                .with_location(format!("byte {}", root.position)),
            ));
        }

        let target_namespace = root
            .get_attribute("targetNamespace")
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        let namespaces = root.namespaces.clone();

        Ok(Self {
            path,
            target_namespace,
            namespaces,
            root,
        })
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Namespace bound to `prefix` on the schema root
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get_namespace(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::XSD_1_0_NAMESPACE;

    #[test]
    fn test_schema_document_reads_namespaces() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                              xmlns:lib="urn:library"
                              targetNamespace="urn:library">
            <xs:element name="library" type="lib:LibraryType"/>
        </xs:schema>"#;

        let doc = SchemaDocument::from_string("/schemas/library.xsd", xsd).unwrap();
        assert_eq!(doc.target_namespace.as_deref(), Some("urn:library"));
        assert_eq!(doc.namespace_for_prefix("xs"), Some(XSD_1_0_NAMESPACE));
        assert_eq!(doc.namespace_for_prefix("lib"), Some("urn:library"));
        assert_eq!(doc.file_name(), "library.xsd");
    }

    #[test]
    fn test_non_schema_root_fails() {
        let err = SchemaDocument::from_string("/x.xsd", "<root/>").unwrap_err();
        assert!(err.to_string().contains("xs:schema"));
        match err {
            Error::Parse(parse) => assert_eq!(parse.location.as_deref(), Some("byte 0")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml_carries_path() {
        let err = SchemaDocument::from_string(
            "/schemas/broken.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="a">"#,
        )
        .unwrap_err();

        match err {
            Error::Parse(parse) => {
                assert_eq!(parse.path.as_deref(), Some(Path::new("/schemas/broken.xsd")));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
