//! import / include / redefine references

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::document::SchemaDocument;
use crate::error::Warning;
use crate::locations::{Location, SchemaLocationResolver};

/// How one schema document pulls in another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `xs:import`, another namespace
    Import,
    /// `xs:include`, same (or no) namespace
    Include,
    /// `xs:redefine`, include with replacements
    Redefine,
}

impl ReferenceKind {
    /// Map an XSD element local name to a reference kind
    pub fn from_local_name(local_name: &str) -> Option<Self> {
        match local_name {
            "import" => Some(ReferenceKind::Import),
            "include" => Some(ReferenceKind::Include),
            "redefine" => Some(ReferenceKind::Redefine),
            _ => None,
        }
    }

    /// Whether the referenced document shares the includer's namespace
    pub fn is_same_namespace(self) -> bool {
        !matches!(self, ReferenceKind::Import)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Import => write!(f, "import"),
            ReferenceKind::Include => write!(f, "include"),
            ReferenceKind::Redefine => write!(f, "redefine"),
        }
    }
}

/// A reference from one schema file to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// Reference kind
    pub kind: ReferenceKind,
    /// `namespace` attribute (imports only)
    pub namespace: Option<String>,
    /// `schemaLocation` attribute as written
    pub schema_location: Option<String>,
    /// Canonical path of the referenced file, when it exists locally
    pub resolved_path: Option<PathBuf>,
    /// File containing the reference
    pub source_file: PathBuf,
}

impl SchemaReference {
    /// Whether the reference points at a loadable local file
    pub fn is_resolved(&self) -> bool {
        self.resolved_path.is_some()
    }
}

/// Collect the references made by the top level of `doc`.
///
/// Only direct children of the schema root are considered. References whose
/// location is absent, remote or missing on disk are still returned (with
/// no resolved path) alongside a warning, except for an import without
/// `schemaLocation`, which is ordinary and warned about by nobody.
pub fn extract_references(
    doc: &SchemaDocument,
    resolver: &SchemaLocationResolver,
) -> (Vec<SchemaReference>, Vec<Warning>) {
    let mut references = Vec::new();
    let mut warnings = Vec::new();

    for child in doc.root.xsd_children() {
        let kind = match ReferenceKind::from_local_name(child.local_name()) {
            Some(kind) => kind,
            None => continue,
        };

        let namespace = match kind {
            ReferenceKind::Import => child
                .get_attribute("namespace")
                .map(str::trim)
                .filter(|ns| !ns.is_empty())
                .map(str::to_string),
            _ => None,
        };
        let schema_location = child
            .get_attribute("schemaLocation")
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
            .map(str::to_string);

        let resolved_path = match schema_location {
            None => {
                if kind != ReferenceKind::Import {
                    warnings.push(Warning::MissingSchemaLocation {
                        file: doc.path.clone(),
                        reference: kind.to_string(),
                    });
                }
                None
            }
            Some(ref location) => {
                let parsed = Location::parse(location);
                if parsed.is_network() {
                    warnings.push(Warning::RemoteLocation {
                        file: doc.path.clone(),
                        schema_location: location.clone(),
                    });
                    None
                } else {
                    let resolved = resolver.resolve(location, &doc.path);
                    if resolved.is_none() {
                        warnings.push(Warning::UnresolvedLocation {
                            file: doc.path.clone(),
                            reference: kind.to_string(),
                            schema_location: location.clone(),
                        });
                    }
                    resolved
                }
            }
        };

        references.push(SchemaReference {
            kind,
            namespace,
            schema_location,
            resolved_path,
            source_file: doc.path.clone(),
        });
    }

    (references, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn schema(body: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:main">{}</xs:schema>"#,
            body
        )
    }

    #[test]
    fn test_extracts_all_reference_kinds() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("types.xsd"), "<x/>").unwrap();
        fs::write(dir.path().join("parts.xsd"), "<x/>").unwrap();
        fs::write(dir.path().join("base.xsd"), "<x/>").unwrap();

        let main = dir.path().join("main.xsd");
        let xsd = schema(
            r#"<xs:import namespace="urn:types" schemaLocation="types.xsd"/>
               <xs:include schemaLocation="parts.xsd"/>
               <xs:redefine schemaLocation="base.xsd"/>
               <xs:element name="root"/>"#,
        );
        let doc = SchemaDocument::from_string(&main, &xsd).unwrap();

        let (refs, warnings) = extract_references(&doc, &SchemaLocationResolver::default());

        assert!(warnings.is_empty());
        let kinds: Vec<_> = refs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ReferenceKind::Import, ReferenceKind::Include, ReferenceKind::Redefine]
        );
        assert_eq!(refs[0].namespace.as_deref(), Some("urn:types"));
        assert!(refs[1].namespace.is_none());
        assert!(refs.iter().all(SchemaReference::is_resolved));
        assert!(refs.iter().all(|r| r.source_file == main));
    }

    #[test]
    fn test_import_without_location_is_silent() {
        let xsd = schema(r#"<xs:import namespace="http://www.w3.org/XML/1998/namespace"/>"#);
        let doc = SchemaDocument::from_string("/schemas/main.xsd", &xsd).unwrap();

        let (refs, warnings) = extract_references(&doc, &SchemaLocationResolver::default());

        assert_eq!(refs.len(), 1);
        assert!(refs[0].schema_location.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_include_without_location_warns() {
        let doc = SchemaDocument::from_string("/schemas/main.xsd", &schema("<xs:include/>")).unwrap();

        let (refs, warnings) = extract_references(&doc, &SchemaLocationResolver::default());

        assert_eq!(refs.len(), 1);
        assert!(matches!(warnings[0], Warning::MissingSchemaLocation { .. }));
    }

    #[test]
    fn test_remote_and_missing_locations_warn() {
        let dir = tempdir().unwrap();
        let xsd = schema(
            r#"<xs:import namespace="urn:r" schemaLocation="https://example.com/remote.xsd"/>
               <xs:include schemaLocation="nowhere.xsd"/>"#,
        );
        let doc = SchemaDocument::from_string(dir.path().join("main.xsd"), &xsd).unwrap();

        let (refs, warnings) = extract_references(&doc, &SchemaLocationResolver::default());

        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| !r.is_resolved()));
        assert!(matches!(warnings[0], Warning::RemoteLocation { .. }));
        assert!(matches!(warnings[1], Warning::UnresolvedLocation { .. }));
    }

    #[test]
    fn test_nested_references_are_ignored() {
        let xsd = schema(
            r#"<xs:annotation><xs:appinfo><xs:include schemaLocation="x.xsd"/></xs:appinfo></xs:annotation>"#,
        );
        let doc = SchemaDocument::from_string("/schemas/main.xsd", &xsd).unwrap();

        let (refs, _) = extract_references(&doc, &SchemaLocationResolver::default());
        assert!(refs.is_empty());
    }
}
