//! Structure assembly

use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;

use super::resolve::{ComponentTable, Resolution};
use super::{LoadedSchema, ReferenceKind};
use crate::error::{FileError, Warning};
use crate::model::{Component, ComponentKind};
use crate::namespaces::NamespaceContext;
use crate::structure::{FileSummary, NamespaceUsage, SchemaStructure, Statistics};

/// Everything a finished session hands to the assembler
#[derive(Debug, Clone, Default)]
pub struct SessionOutput {
    /// Root schema file
    pub root_file: PathBuf,
    /// Target namespace of the root schema
    pub target_namespace: Option<String>,
    /// Merged prefix bindings
    pub namespaces: NamespaceContext,
    /// Loaded schemas in load order
    pub schemas: Vec<LoadedSchema>,
    /// Merged components
    pub table: ComponentTable,
    /// Resolved references
    pub resolution: Resolution,
    /// Files that failed to load
    pub errors: Vec<FileError>,
    /// Non-fatal problems from every stage
    pub warnings: Vec<Warning>,
}

/// Build the final structure
pub fn assemble(output: SessionOutput) -> SchemaStructure {
    let elements: Vec<_> = output
        .table
        .elements()
        .filter_map(|entry| match entry.component {
            Component::Element(ref element) => Some(element.clone()),
            _ => None,
        })
        .collect();

    let mut complex_types: Vec<_> = output
        .table
        .types()
        .filter_map(|entry| match entry.component {
            Component::ComplexType(ref complex) => Some((complex.qname(), complex.clone())),
            _ => None,
        })
        .collect();
    complex_types.sort_by(|a, b| a.0.cmp(&b.0));
    let complex_types: IndexMap<_, _> = complex_types
        .into_iter()
        .map(|(qname, complex)| (qname.to_string(), complex))
        .collect();

    let mut simple_types: Vec<_> = output
        .table
        .types()
        .filter_map(|entry| match entry.component {
            Component::SimpleType(ref simple) => Some((simple.qname(), simple.clone())),
            _ => None,
        })
        .collect();
    simple_types.sort_by(|a, b| a.0.cmp(&b.0));
    let simple_types: IndexMap<_, _> = simple_types
        .into_iter()
        .map(|(qname, simple)| (qname.to_string(), simple))
        .collect();

    let statistics = Statistics::compute(
        &elements,
        complex_types.values(),
        simple_types.len(),
        output.schemas.len(),
        output.resolution.dangling.len(),
    );

    let files = output.schemas.iter().map(file_summary).collect();
    let file_relationships = output
        .schemas
        .iter()
        .flat_map(|schema| schema.references.iter().cloned())
        .collect();

    let file_dependencies = output
        .schemas
        .iter()
        .map(|schema| {
            let dependencies: Vec<String> = schema
                .dependencies()
                .map(|path| path.display().to_string())
                .collect();
            (schema.path().display().to_string(), dependencies)
        })
        .collect();

    let mut imported_namespaces = BTreeMap::new();
    for reference in output.schemas.iter().flat_map(|s| s.references.iter()) {
        if reference.kind != ReferenceKind::Import {
            continue;
        }
        if let (Some(namespace), Some(path)) = (&reference.namespace, &reference.resolved_path) {
            imported_namespaces
                .entry(namespace.clone())
                .or_insert_with(|| path.clone());
        }
    }

    let namespace_usage = namespace_usage(&output.schemas);

    log::info!(
        "assembled {} elements, {} complex types, {} simple types from {} files",
        elements.len(),
        complex_types.len(),
        simple_types.len(),
        output.schemas.len()
    );

    SchemaStructure {
        root_file: output.root_file,
        target_namespace: output.target_namespace,
        namespaces: output.namespaces,
        elements,
        complex_types,
        simple_types,
        dependencies: output.resolution.dependencies,
        dependency_edges: output.resolution.edges,
        unresolved_references: output.resolution.dangling,
        statistics,
        files,
        file_relationships,
        file_dependencies,
        imported_namespaces,
        namespace_usage,
        errors: output.errors,
        warnings: output.warnings,
    }
}

fn file_summary(schema: &LoadedSchema) -> FileSummary {
    FileSummary {
        path: schema.path().to_path_buf(),
        target_namespace: schema.document.target_namespace.clone(),
        effective_namespace: schema.effective_namespace.clone(),
        global_elements: schema.extracted.count(ComponentKind::Element),
        complex_types: schema.extracted.count(ComponentKind::ComplexType),
        simple_types: schema.extracted.count(ComponentKind::SimpleType),
        dependencies: schema.dependencies().map(|p| p.to_path_buf()).collect(),
    }
}

fn namespace_usage(schemas: &[LoadedSchema]) -> BTreeMap<String, NamespaceUsage> {
    let mut usage: BTreeMap<String, NamespaceUsage> = BTreeMap::new();

    for schema in schemas {
        let path = schema.path().to_path_buf();

        if let Some(ref namespace) = schema.effective_namespace {
            let entry = usage.entry(namespace.clone()).or_default();
            if !entry.defining_files.contains(&path) {
                entry.defining_files.push(path.clone());
            }
        }

        let declared = schema
            .document
            .namespaces
            .iter()
            .map(|(prefix, namespace)| (Some(prefix), namespace))
            .chain(
                schema
                    .document
                    .namespaces
                    .get_default_namespace()
                    .filter(|ns| !ns.is_empty())
                    .map(|ns| (None, ns)),
            );
        for (prefix, namespace) in declared {
            let entry = usage.entry(namespace.to_string()).or_default();
            if !entry.declaring_files.contains(&path) {
                entry.declaring_files.push(path.clone());
            }
            if let Some(prefix) = prefix {
                if !entry.prefixes.iter().any(|p| p == prefix) {
                    entry.prefixes.push(prefix.to_string());
                }
            }
        }
    }

    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::resolve::{resolve, PrimaryScope};
    use crate::parsing::{extract, SchemaDocument, SchemaReference};
    use pretty_assertions::assert_eq;

    fn output() -> SessionOutput {
        let main_xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                xmlns:c="urn:common" xmlns="urn:main" targetNamespace="urn:main">
            <xs:element name="order" type="OrderType"/>
            <xs:complexType name="OrderType">
              <xs:sequence><xs:element name="price" type="c:PriceType"/></xs:sequence>
              <xs:attribute name="id" type="xs:ID"/>
            </xs:complexType>
          </xs:schema>"#;
        let common_xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                xmlns:c="urn:common" targetNamespace="urn:common">
            <xs:complexType name="PriceType"><xs:sequence><xs:element name="amount" type="c:Amount"/></xs:sequence></xs:complexType>
            <xs:simpleType name="Amount"><xs:restriction base="xs:decimal"/></xs:simpleType>
          </xs:schema>"#;

        let mut schemas = Vec::new();
        for (path, xsd) in [("/s/main.xsd", main_xsd), ("/s/common.xsd", common_xsd)] {
            let document = SchemaDocument::from_string(path, xsd).unwrap();
            let mut schema = LoadedSchema::new(document);
            schema.extracted = extract(&schema.document, schema.effective_namespace.as_deref());
            schemas.push(schema);
        }
        schemas[0].references.push(SchemaReference {
            kind: ReferenceKind::Import,
            namespace: Some("urn:common".to_string()),
            schema_location: Some("common.xsd".to_string()),
            resolved_path: Some(PathBuf::from("/s/common.xsd")),
            source_file: PathBuf::from("/s/main.xsd"),
        });

        let (table, warnings) = ComponentTable::build(&schemas, true);
        let namespaces = schemas[0].document.namespaces.clone();
        let resolution = resolve(
            &table,
            &schemas,
            PrimaryScope {
                namespaces: &namespaces,
                target_namespace: Some("urn:main"),
            },
        );

        SessionOutput {
            root_file: PathBuf::from("/s/main.xsd"),
            target_namespace: Some("urn:main".to_string()),
            namespaces,
            schemas,
            table,
            resolution,
            errors: Vec::new(),
            warnings,
        }
    }

    #[test]
    fn test_assemble_tables_and_statistics() {
        let structure = assemble(output());

        assert_eq!(structure.elements.len(), 1);
        let keys: Vec<_> = structure.complex_types.keys().cloned().collect();
        assert_eq!(keys, vec!["{urn:common}PriceType", "{urn:main}OrderType"]);
        assert!(structure.simple_types.contains_key("{urn:common}Amount"));

        assert_eq!(
            structure.statistics,
            Statistics {
                total_elements: 3,
                total_complex_types: 2,
                total_simple_types: 1,
                max_depth: 1,
                total_attributes: 1,
                total_files: 2,
                unresolved_references: 0,
            }
        );
    }

    #[test]
    fn test_assemble_file_views() {
        let structure = assemble(output());

        assert_eq!(structure.files.len(), 2);
        assert_eq!(structure.files[0].global_elements, 1);
        assert_eq!(structure.files[0].dependencies, vec![PathBuf::from("/s/common.xsd")]);
        assert_eq!(structure.file_relationships.len(), 1);
        assert_eq!(
            structure.file_dependencies["/s/main.xsd"],
            vec!["/s/common.xsd".to_string()]
        );
        assert_eq!(
            structure.imported_namespaces["urn:common"],
            PathBuf::from("/s/common.xsd")
        );
    }

    #[test]
    fn test_namespace_usage() {
        let structure = assemble(output());

        let common = &structure.namespace_usage["urn:common"];
        assert_eq!(common.defining_files, vec![PathBuf::from("/s/common.xsd")]);
        assert_eq!(common.declaring_files.len(), 2);
        assert_eq!(common.prefixes, vec!["c"]);

        let main = &structure.namespace_usage["urn:main"];
        assert!(main.prefixes.is_empty());
        assert_eq!(main.declaring_files, vec![PathBuf::from("/s/main.xsd")]);
    }
}
