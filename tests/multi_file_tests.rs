//! Multi-file schema set integration tests
//!
//! Fixture schemas live under `tests/fixtures/`; sets that need cycles,
//! broken files or generated layouts are written to a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use xsdgraph::model::{ComponentKind, DependencyKind};
use xsdgraph::parsing::ReferenceKind;
use xsdgraph::{parse_schema, Error, SchemaParser, Selection, Settings, Warning};

const BS: &str = "http://example.com/bookstore";
const LIB: &str = "http://example.com/library";
const PUB: &str = "http://example.com/publisher";

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn clark(namespace: &str, local: &str) -> String {
    format!("{{{}}}{}", namespace, local)
}

fn element_key(namespace: &str, local: &str) -> String {
    format!("element:{}", clark(namespace, local))
}

fn type_key(namespace: &str, local: &str) -> String {
    format!("type:{}", clark(namespace, local))
}

fn write_schema(dir: &Path, name: &str, attributes: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" {}>{}</xs:schema>"#,
            attributes, body
        ),
    )
    .unwrap();
    path
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
            body
        ),
    )
    .unwrap();
    path
}

// ============================================================================
// Single-file schemas
// ============================================================================

#[test]
fn test_bookstore_structure() {
    let structure = parse_schema(fixtures_dir().join("bookstore.xsd")).unwrap();

    assert!(structure.is_complete());
    assert!(structure.warnings.is_empty());
    assert_eq!(structure.target_namespace.as_deref(), Some(BS));
    assert_eq!(structure.complex_types.len(), 3);
    assert_eq!(structure.simple_types.len(), 2);
    assert_eq!(structure.elements.len(), 1);

    assert_eq!(
        structure.dependencies[&element_key(BS, "bookstore")],
        vec![type_key(BS, "BookstoreType")]
    );
    assert_eq!(
        structure.dependencies[&type_key(BS, "BookstoreType")],
        vec![type_key(BS, "BookType")]
    );
    assert_eq!(
        structure.dependencies[&type_key(BS, "BookType")],
        vec![
            type_key(BS, "AuthorType"),
            type_key(BS, "ISBNType"),
            type_key(BS, "CategoryType")
        ]
    );
    assert!(!structure.dependencies.contains_key(&type_key(BS, "AuthorType")));
    assert!(structure.unresolved_references.is_empty());
}

#[test]
fn test_bookstore_details() {
    let structure = parse_schema(fixtures_dir().join("bookstore.xsd")).unwrap();

    let isbn = structure.simple_type("ISBNType").unwrap();
    assert_eq!(isbn.facet("pattern"), Some(r"\d{3}-\d{10}"));
    assert_eq!(
        isbn.documentation.as_deref(),
        Some("ISBN-13 with a dash after the prefix")
    );

    let category = structure.simple_type(&clark(BS, "CategoryType")).unwrap();
    assert_eq!(
        category.enumerations,
        vec!["Fiction", "Non-Fiction", "Science", "Technology", "History", "Biography"]
    );

    let book = structure.complex_type("BookType").unwrap();
    assert_eq!(book.elements.len(), 6);
    assert!(book.elements[1].is_unbounded());
    assert_eq!(book.elements[5].min_occurs, "0");
    assert_eq!(book.attributes[1].default.as_deref(), Some("true"));

    let bookstore = structure.global_element("bookstore").unwrap();
    assert_eq!(
        bookstore.documentation.as_deref(),
        Some("Root element of a bookstore inventory")
    );

    let stats = &structure.statistics;
    assert_eq!(stats.total_elements, 13);
    assert_eq!(stats.total_complex_types, 3);
    assert_eq!(stats.total_simple_types, 2);
    assert_eq!(stats.total_attributes, 5);
    assert_eq!(stats.max_depth, 1);
    assert_eq!(stats.total_files, 1);
}

#[test]
fn test_single_file_without_references_has_no_dependencies() {
    let dir = tempdir().unwrap();
    let main = write(
        dir.path(),
        "plain.xsd",
        r#"<xs:element name="note" type="xs:string"/>
           <xs:simpleType name="Code"><xs:restriction base="xs:token"/></xs:simpleType>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert!(structure.dependencies.is_empty());
    assert!(structure.dependency_edges.is_empty());
    assert_eq!(structure.files.len(), 1);
}

// ============================================================================
// Library scenario: import + include
// ============================================================================

#[test]
fn test_library_file_relationships() {
    let structure = parse_schema(fixtures_dir().join("library/library.xsd")).unwrap();

    assert!(structure.is_complete());
    assert!(structure.warnings.is_empty());
    assert_eq!(structure.files.len(), 3);

    let relationships = &structure.file_relationships;
    assert_eq!(relationships.len(), 2);

    let import = relationships
        .iter()
        .find(|r| r.kind == ReferenceKind::Import)
        .unwrap();
    assert_eq!(import.namespace.as_deref(), Some(PUB));
    assert!(import.resolved_path.as_ref().unwrap().ends_with("publisher.xsd"));

    let include = relationships
        .iter()
        .find(|r| r.kind == ReferenceKind::Include)
        .unwrap();
    assert!(include.namespace.is_none());
    assert!(include.resolved_path.as_ref().unwrap().ends_with("common-types.xsd"));

    assert_eq!(structure.imported_namespaces.len(), 1);
    assert!(structure.imported_namespaces[PUB].ends_with("publisher.xsd"));
}

#[test]
fn test_library_included_types_are_usable_as_bases() {
    let structure = parse_schema(fixtures_dir().join("library/library.xsd")).unwrap();

    let book = structure.complex_type(&clark(LIB, "BookType")).unwrap();
    assert!(book.is_extension());
    assert_eq!(book.base_type(), Some("lib:PriceType"));

    assert_eq!(
        structure.dependencies[&type_key(LIB, "BookType")],
        vec![
            type_key(LIB, "PriceType"),
            type_key(PUB, "PublisherType"),
            type_key(LIB, "AddressType")
        ]
    );

    let base = structure
        .dependency_edges
        .iter()
        .find(|e| e.source == type_key(LIB, "BookType") && e.kind == DependencyKind::BaseType)
        .unwrap();
    assert_eq!(base.target, type_key(LIB, "PriceType"));
    assert!(base.cross_file);
    assert!(base.target_file.ends_with("common-types.xsd"));

    assert_eq!(
        structure.dependencies[&type_key(LIB, "LibraryType")],
        vec![
            type_key(LIB, "AddressType"),
            type_key(LIB, "BookType"),
            element_key(PUB, "publisher")
        ]
    );
    let element_ref = structure
        .dependency_edges
        .iter()
        .find(|e| e.kind == DependencyKind::ElementReference)
        .unwrap();
    assert_eq!(element_ref.target_kind, ComponentKind::Element);
}

#[test]
fn test_library_tables_and_namespaces() {
    let structure = parse_schema(fixtures_dir().join("library/library.xsd")).unwrap();

    let keys: Vec<_> = structure.complex_types.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            clark(LIB, "AddressType"),
            clark(LIB, "BookType"),
            clark(LIB, "LibraryType"),
            clark(LIB, "PriceType"),
            clark(PUB, "PublisherType"),
        ]
    );
    let names: Vec<_> = structure.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["library", "publisher"]);

    assert_eq!(structure.namespaces.get_namespace("lib"), Some(LIB));
    assert_eq!(structure.namespaces.get_namespace("pub"), Some(PUB));

    let usage = &structure.namespace_usage[LIB];
    assert_eq!(usage.defining_files.len(), 2);
    assert_eq!(usage.prefixes, vec!["lib"]);

    let library_file = &structure.files[0];
    assert_eq!(library_file.global_elements, 1);
    assert_eq!(library_file.complex_types, 2);
    assert_eq!(library_file.dependencies.len(), 2);
}

#[test]
fn test_library_selection_with_dependencies() {
    let structure = parse_schema(fixtures_dir().join("library/library.xsd")).unwrap();

    let reduced = structure.select(
        &Selection::new()
            .with_complex_type("BookType")
            .with_dependencies(true),
    );

    let keys: Vec<_> = reduced.complex_types.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            clark(LIB, "AddressType"),
            clark(LIB, "BookType"),
            clark(LIB, "PriceType"),
            clark(PUB, "PublisherType"),
        ]
    );
    assert_eq!(reduced.simple_types.len(), 1);
    assert!(reduced.elements.is_empty());
    assert_eq!(reduced.statistics.total_complex_types, 4);
}

#[test]
fn test_find_element_and_path() {
    let structure = parse_schema(fixtures_dir().join("library/library.xsd")).unwrap();

    assert_eq!(structure.find_element("publisher").unwrap().name, "publisher");
    assert_eq!(
        structure.element_path("currency").unwrap(),
        vec!["PriceType", "currency"]
    );
}

// ============================================================================
// Include visibility, sharing and cycles
// ============================================================================

#[test]
fn test_included_definitions_are_visible() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "types.xsd",
        r#"<xs:complexType name="PartType"><xs:sequence><xs:element name="id" type="xs:int"/></xs:sequence></xs:complexType>"#,
    );
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="types.xsd"/>
           <xs:element name="part" type="PartType"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.dependencies["element:part"], vec!["type:PartType"]);
    assert!(structure.dependency_edges[0].cross_file);
}

#[test]
fn test_circular_include_is_fatal() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.xsd", r#"<xs:include schemaLocation="b.xsd"/>"#);
    write(dir.path(), "b.xsd", r#"<xs:include schemaLocation="a.xsd"/>"#);

    match parse_schema(&a) {
        Err(Error::CircularImport(err)) => {
            let a = a.canonicalize().unwrap();
            let b = dir.path().join("b.xsd").canonicalize().unwrap();
            assert!(err.contains(&a));
            assert!(err.contains(&b));
            assert_eq!(err.chain.first(), err.chain.last());
        }
        other => panic!("expected circular import error, got {other:?}"),
    }
}

#[test]
fn test_shared_include_is_loaded_once() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "shared.xsd",
        r#"<xs:simpleType name="Code"><xs:restriction base="xs:string"/></xs:simpleType>"#,
    );
    write(dir.path(), "left.xsd", r#"<xs:include schemaLocation="shared.xsd"/>"#);
    write(dir.path(), "right.xsd", r#"<xs:include schemaLocation="shared.xsd"/>"#);
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="left.xsd"/>
           <xs:include schemaLocation="right.xsd"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.files.len(), 4);
    assert_eq!(structure.simple_types.len(), 1);
    assert!(structure.warnings.is_empty());
}

#[test]
fn test_missing_schema_location_warns_and_completes() {
    let dir = tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="missing.xsd"/>
           <xs:element name="root" type="xs:string"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.elements.len(), 1);
    assert_eq!(structure.file_relationships.len(), 1);
    assert!(structure.file_relationships[0].resolved_path.is_none());
    assert!(matches!(
        structure.warnings[0],
        Warning::UnresolvedLocation { .. }
    ));
}

#[test]
fn test_remote_location_is_not_fetched() {
    let dir = tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:import namespace="urn:remote" schemaLocation="https://example.com/remote.xsd"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.files.len(), 1);
    assert!(matches!(structure.warnings[0], Warning::RemoteLocation { .. }));
}

#[test]
fn test_malformed_file_is_skipped() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("broken.xsd"),
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="a">"#,
    )
    .unwrap();
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="broken.xsd"/>
           <xs:element name="root" type="Missing"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.errors.len(), 1);
    assert!(structure.errors[0].path.ends_with("broken.xsd"));
    assert_eq!(structure.files.len(), 1);
    assert_eq!(structure.unresolved_references.len(), 1);
    assert_eq!(structure.statistics.unresolved_references, 1);
}

#[test]
fn test_search_roots() {
    let dir = tempdir().unwrap();
    let shared = dir.path().join("shared");
    fs::create_dir(&shared).unwrap();
    write(&shared, "common.xsd", r#"<xs:simpleType name="Code"/>"#);
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="common.xsd"/>"#,
    );

    let without = parse_schema(&main).unwrap();
    assert!(without.simple_types.is_empty());

    let parser = SchemaParser::new(Settings::new().with_search_root(&shared));
    let with = parser.parse(&main).unwrap();
    assert_eq!(with.simple_types.len(), 1);
}

// ============================================================================
// Qualified names
// ============================================================================

#[test]
fn test_same_local_name_in_two_namespaces() {
    let dir = tempdir().unwrap();
    write_schema(
        dir.path(),
        "a.xsd",
        r#"targetNamespace="urn:a""#,
        r#"<xs:complexType name="AddressType"><xs:sequence><xs:element name="street" type="xs:string"/></xs:sequence></xs:complexType>"#,
    );
    write_schema(
        dir.path(),
        "b.xsd",
        r#"targetNamespace="urn:b""#,
        r#"<xs:complexType name="AddressType"><xs:sequence><xs:element name="postcode" type="xs:string"/></xs:sequence></xs:complexType>"#,
    );
    let main = write_schema(
        dir.path(),
        "main.xsd",
        r#"targetNamespace="urn:main" xmlns:a="urn:a" xmlns:b="urn:b""#,
        r#"<xs:import namespace="urn:a" schemaLocation="a.xsd"/>
           <xs:import namespace="urn:b" schemaLocation="b.xsd"/>
           <xs:complexType name="CustomerType">
             <xs:sequence>
               <xs:element name="home" type="a:AddressType"/>
               <xs:element name="office" type="b:AddressType"/>
             </xs:sequence>
           </xs:complexType>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert!(structure.warnings.is_empty());
    assert_eq!(structure.complex_types.len(), 3);
    assert_eq!(
        structure.complex_types[&clark("urn:a", "AddressType")].elements[0].name,
        "street"
    );
    assert_eq!(
        structure.complex_types[&clark("urn:b", "AddressType")].elements[0].name,
        "postcode"
    );
    assert_eq!(
        structure.dependencies[&type_key("urn:main", "CustomerType")],
        vec![type_key("urn:a", "AddressType"), type_key("urn:b", "AddressType")]
    );

    let targets: Vec<_> = structure
        .dependency_edges
        .iter()
        .map(|e| (e.target.as_str(), e.target_file.file_name().unwrap().to_str().unwrap()))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("type:{urn:a}AddressType", "a.xsd"),
            ("type:{urn:b}AddressType", "b.xsd"),
        ]
    );
}

#[test]
fn test_element_and_type_sharing_a_name() {
    let dir = tempdir().unwrap();
    let main = write_schema(
        dir.path(),
        "main.xsd",
        r#"targetNamespace="urn:t" xmlns:t="urn:t""#,
        r#"<xs:element name="Address" type="t:Address"/>
           <xs:complexType name="Address">
             <xs:sequence><xs:element name="street" type="t:Street"/></xs:sequence>
           </xs:complexType>
           <xs:simpleType name="Street"><xs:restriction base="xs:string"/></xs:simpleType>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(
        structure.dependencies[&element_key("urn:t", "Address")],
        vec![type_key("urn:t", "Address")]
    );
    assert_eq!(
        structure.dependencies[&type_key("urn:t", "Address")],
        vec![type_key("urn:t", "Street")]
    );
    assert_eq!(
        structure.dependents_of(&type_key("urn:t", "Address")),
        vec![element_key("urn:t", "Address")]
    );

    let element_only = structure.select(&Selection::new().with_element("Address"));
    assert_eq!(element_only.elements.len(), 1);
    assert!(element_only.complex_types.is_empty());
    assert_eq!(element_only.dependencies.len(), 1);

    let closure = structure.select(
        &Selection::new()
            .with_element("Address")
            .with_dependencies(true),
    );
    assert_eq!(closure.complex_types.len(), 1);
    assert_eq!(closure.simple_types.len(), 1);
}

#[test]
fn test_prefix_declared_below_schema_root() {
    let dir = tempdir().unwrap();
    let main = write_schema(
        dir.path(),
        "main.xsd",
        r#"targetNamespace="urn:t""#,
        r#"<xs:element name="root" xmlns:t="urn:t" type="t:RootType"/>
           <xs:complexType name="RootType"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert!(structure.warnings.is_empty());
    assert!(structure.unresolved_references.is_empty());
    assert_eq!(
        structure.dependencies[&element_key("urn:t", "root")],
        vec![type_key("urn:t", "RootType")]
    );
}

#[test]
fn test_unknown_builtin_name_is_unresolved() {
    let dir = tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:element name="when" type="xs:date"/>
           <xs:element name="what" type="xs:NoSuchType"/>"#,
    );

    let structure = parse_schema(&main).unwrap();

    assert_eq!(structure.unresolved_references.len(), 1);
    assert_eq!(structure.unresolved_references[0].reference, "xs:NoSuchType");
    assert_eq!(structure.statistics.unresolved_references, 1);
}

// ============================================================================
// Redefine
// ============================================================================

#[test]
fn test_redefine_replaces_original() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "base.xsd",
        r#"<xs:complexType name="AddressType">
             <xs:sequence><xs:element name="street" type="xs:string"/></xs:sequence>
           </xs:complexType>"#,
    );
    let main = write(
        dir.path(),
        "main.xsd",
        r#"<xs:redefine schemaLocation="base.xsd">
             <xs:complexType name="AddressType">
               <xs:complexContent>
                 <xs:extension base="AddressType">
                   <xs:sequence><xs:element name="country" type="xs:string"/></xs:sequence>
                 </xs:extension>
               </xs:complexContent>
             </xs:complexType>
           </xs:redefine>"#,
    );

    let structure = parse_schema(&main).unwrap();
    let address = structure.complex_type("AddressType").unwrap();
    assert!(address.is_extension());
    assert_eq!(address.elements[0].name, "country");
    assert!(structure.warnings.is_empty());

    // The base of the redefinition is the definition in base.xsd
    assert!(!structure.dependencies.contains_key("type:AddressType"));
    let base = &structure.dependency_edges[0];
    assert_eq!(base.source, "type:AddressType");
    assert_eq!(base.target, "type:AddressType");
    assert!(base.source_file.ends_with("main.xsd"));
    assert!(base.target_file.ends_with("base.xsd"));
    assert!(base.cross_file);

    let parser = SchemaParser::new(Settings::new().with_resolve_redefines(false));
    let original = parser.parse(&main).unwrap();
    let address = original.complex_type("AddressType").unwrap();
    assert_eq!(address.elements[0].name, "street");
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_json_output() {
    let structure = parse_schema(fixtures_dir().join("bookstore.xsd")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&structure.to_json().unwrap()).unwrap();

    assert_eq!(json["statistics"]["total_complex_types"], 3);
    assert_eq!(json["target_namespace"], BS);
    assert!(json["complex_types"][clark(BS, "BookType")].is_object());
    assert_eq!(
        json["simple_types"][clark(BS, "ISBNType")]["restrictions"]["pattern"],
        r"\d{3}-\d{10}"
    );
    assert_eq!(json["dependency_edges"][0]["kind"], "type_reference");
}

// ============================================================================
// Order independence
// ============================================================================

mod order {
    use super::*;
    use proptest::prelude::*;

    const PARTS: [(&str, &str); 5] = [
        (
            "a.xsd",
            r#"<xs:complexType name="Shared"><xs:sequence><xs:element name="fromA" type="xs:string"/></xs:sequence></xs:complexType>"#,
        ),
        (
            "b.xsd",
            r#"<xs:complexType name="Shared"><xs:sequence><xs:element name="fromB" type="Code"/></xs:sequence></xs:complexType>"#,
        ),
        (
            "codes.xsd",
            r#"<xs:simpleType name="Code"><xs:restriction base="xs:token"/></xs:simpleType>"#,
        ),
        (
            "uses.xsd",
            r#"<xs:element name="item" type="Shared"/><xs:element name="other" type="Nowhere"/>"#,
        ),
        (
            "extra.xsd",
            r#"<xs:complexType name="Extra"><xs:complexContent><xs:extension base="Shared"/></xs:complexContent></xs:complexType>"#,
        ),
    ];

    fn includes(order: &[usize]) -> String {
        order
            .iter()
            .map(|&i| format!(r#"<xs:include schemaLocation="{}"/>"#, PARTS[i].0))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_include_order_does_not_change_resolution(
            order in Just((0..PARTS.len()).collect::<Vec<_>>()).prop_shuffle()
        ) {
            let dir = tempdir().unwrap();
            for (name, body) in PARTS {
                write(dir.path(), name, body);
            }
            let sorted: Vec<usize> = (0..PARTS.len()).collect();
            let baseline = write(dir.path(), "baseline.xsd", &includes(&sorted));
            let shuffled = write(dir.path(), "shuffled.xsd", &includes(&order));

            let expected = parse_schema(&baseline).unwrap();
            let actual = parse_schema(&shuffled).unwrap();

            prop_assert_eq!(&expected.complex_types, &actual.complex_types);
            prop_assert_eq!(&expected.simple_types, &actual.simple_types);
            prop_assert_eq!(&expected.dependencies, &actual.dependencies);
            prop_assert_eq!(&expected.dependency_edges, &actual.dependency_edges);
            prop_assert_eq!(&expected.unresolved_references, &actual.unresolved_references);
            prop_assert_eq!(&expected.statistics, &actual.statistics);

            let winner = actual.complex_type("Shared").unwrap();
            prop_assert_eq!(winner.elements[0].name.as_str(), "fromA");
        }
    }
}
