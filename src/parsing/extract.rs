//! Component extraction
//!
//! Walks the top level of one schema document and builds the structural
//! model of its global elements, named complex types and named simple types.
//! Nothing is resolved here: type and base references are kept exactly as
//! written.

use std::collections::BTreeMap;
use std::path::Path;

use super::document::SchemaDocument;
use crate::documents::Element as XmlElement;
use crate::error::Warning;
use crate::model::{
    AnonymousType, Attribute, AttributeUse, Component, ComponentKind, ComplexType, Compositor,
    Derivation, DerivationKind, Element, SimpleType, SimpleVariety, FACETS,
};
use crate::names::{is_valid_ncname, split_qname};
use crate::namespaces::NamespaceContext;

/// Raw reference → namespace it was bound to where it was written
pub type LocalBindings = BTreeMap<String, Option<String>>;

/// Components found in one schema document
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    /// Top-level components in document order
    pub components: Vec<Component>,
    /// Components declared inside `xs:redefine`
    pub redefinitions: Vec<Component>,
    /// Problems found while extracting
    pub warnings: Vec<Warning>,
    /// References whose prefix is bound below the schema root, by component key
    pub bindings: BTreeMap<String, LocalBindings>,
}

impl Extracted {
    /// Number of top-level components of `kind`
    pub fn count(&self, kind: ComponentKind) -> usize {
        self.components.iter().filter(|c| c.kind() == kind).count()
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.redefinitions.is_empty()
    }

    /// Local bindings of the references made by `component`
    pub fn bindings_of(&self, component: &Component) -> LocalBindings {
        self.bindings.get(&component.key()).cloned().unwrap_or_default()
    }
}

/// Extract the components of `doc`, owned by `namespace`.
///
/// `namespace` is the document's effective namespace, which differs from its
/// declared `targetNamespace` for chameleon includes.
pub fn extract(doc: &SchemaDocument, namespace: Option<&str>) -> Extracted {
    let mut extractor = Extractor {
        path: &doc.path,
        root: &doc.root.scope,
        scope: doc.file_name(),
        namespace: namespace.map(str::to_string),
        warnings: Vec::new(),
        bindings: LocalBindings::new(),
    };
    let mut extracted = Extracted::default();
    let mut global_elements = 0;

    for child in doc.root.xsd_children() {
        match child.local_name() {
            "element" => {
                if let Some(name) = extractor.component_name(child) {
                    let scope = extractor.scope.clone();
                    let element = extractor.element(child, Some(name), &scope, global_elements);
                    global_elements += 1;
                    let component = Component::Element(element);
                    extractor.take_bindings(&component, &mut extracted);
                    extracted.components.push(component);
                }
            }
            "complexType" | "simpleType" => {
                if let Some(component) = extractor.named_type(child) {
                    extractor.take_bindings(&component, &mut extracted);
                    extracted.components.push(component);
                }
            }
            "redefine" => {
                for redefined in child.xsd_children() {
                    if let Some(component) = extractor.named_type(redefined) {
                        extractor.take_bindings(&component, &mut extracted);
                        extracted.redefinitions.push(component);
                    }
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "extracted {} components ({} redefinitions) from {}",
        extracted.components.len(),
        extracted.redefinitions.len(),
        doc.path.display()
    );
    extracted.warnings = extractor.warnings;
    extracted
}

/// Content of a complex type, named or anonymous
#[derive(Debug, Default)]
struct Content {
    elements: Vec<Element>,
    attributes: Vec<Attribute>,
    derivation: Option<Derivation>,
    compositor: Option<Compositor>,
    mixed: bool,
}

struct Extractor<'a> {
    path: &'a Path,
    /// Bindings of the schema root
    root: &'a NamespaceContext,
    /// Prefix of synthesized names for anonymous types of global elements
    scope: String,
    namespace: Option<String>,
    warnings: Vec<Warning>,
    /// Local bindings of the component being extracted
    bindings: LocalBindings,
}

impl Extractor<'_> {
    /// Reference-valued attribute, noting a binding made below the root
    fn reference(&mut self, xml: &XmlElement, name: &str) -> Option<String> {
        let raw = attribute(xml, name)?;
        self.bind(xml, &raw);
        Some(raw)
    }

    fn bind(&mut self, xml: &XmlElement, raw: &str) {
        let local = match xml.scope.resolve(raw) {
            Ok(qname) => qname.namespace.filter(|ns| !ns.is_empty()),
            Err(_) => return,
        };
        let document = self
            .root
            .resolve(raw)
            .ok()
            .and_then(|qname| qname.namespace)
            .filter(|ns| !ns.is_empty());
        if local.is_some() && local != document {
            self.bindings.entry(raw.to_string()).or_insert(local);
        }
    }

    fn take_bindings(&mut self, component: &Component, extracted: &mut Extracted) {
        let bindings = std::mem::take(&mut self.bindings);
        if !bindings.is_empty() {
            extracted.bindings.insert(component.key(), bindings);
        }
    }

    /// Name of a global component; unnamed declarations are skipped
    fn component_name(&mut self, xml: &XmlElement) -> Option<String> {
        let name = attribute(xml, "name")?;
        if !is_valid_ncname(&name) {
            self.warnings.push(Warning::InvalidName {
                file: self.path.to_path_buf(),
                name: name.clone(),
            });
        }
        Some(name)
    }

    fn named_type(&mut self, xml: &XmlElement) -> Option<Component> {
        match xml.local_name() {
            "complexType" => {
                let name = self.component_name(xml)?;
                Some(Component::ComplexType(self.complex_type(xml, name)))
            }
            "simpleType" => {
                let name = self.component_name(xml)?;
                Some(Component::SimpleType(self.simple_type(xml, name)))
            }
            _ => None,
        }
    }

    fn complex_type(&mut self, xml: &XmlElement, name: String) -> ComplexType {
        let content = self.complex_content(xml, &name);
        let mut complex = ComplexType::new(name, self.namespace.clone());
        complex.elements = content.elements;
        complex.attributes = content.attributes;
        complex.derivation = content.derivation;
        complex.compositor = content.compositor;
        complex.mixed = content.mixed;
        complex.is_abstract = flag(xml, "abstract");
        complex.documentation = documentation(xml);
        complex
    }

    fn simple_type(&mut self, xml: &XmlElement, name: String) -> SimpleType {
        let mut simple = SimpleType::new(name, self.namespace.clone());
        simple.documentation = documentation(xml);

        for child in xml.xsd_children() {
            match child.local_name() {
                "restriction" => {
                    simple.base_type = self.reference(child, "base");
                    for facet in child.xsd_children() {
                        let value = match facet.get_attribute("value") {
                            Some(value) => value.to_string(),
                            None => continue,
                        };
                        match facet.local_name() {
                            "enumeration" => simple.enumerations.push(value),
                            // Several patterns are alternatives
                            "pattern" => match simple.restrictions.get_mut("pattern") {
                                Some(existing) => {
                                    existing.push('|');
                                    existing.push_str(&value);
                                }
                                None => {
                                    simple.restrictions.insert("pattern".to_string(), value);
                                }
                            },
                            local if FACETS.contains(&local) => {
                                simple.restrictions.insert(local.to_string(), value);
                            }
                            _ => {}
                        }
                    }
                }
                "list" => {
                    simple.variety = SimpleVariety::List {
                        item_type: self.reference(child, "itemType"),
                    };
                }
                "union" => {
                    let member_types: Vec<String> = child
                        .get_attribute("memberTypes")
                        .map(|members| members.split_whitespace().map(str::to_string).collect())
                        .unwrap_or_default();
                    for member in &member_types {
                        self.bind(child, member);
                    }
                    simple.variety = SimpleVariety::Union { member_types };
                }
                _ => {}
            }
        }

        simple
    }

    /// Element declaration or particle. `name` overrides the `name` attribute.
    fn element(
        &mut self,
        xml: &XmlElement,
        name: Option<String>,
        scope: &str,
        index: usize,
    ) -> Element {
        let ref_name = self.reference(xml, "ref");
        let name = name
            .or_else(|| attribute(xml, "name"))
            .or_else(|| ref_name.as_deref().map(|r| split_qname(r).1.to_string()))
            .unwrap_or_else(|| "unnamed".to_string());

        let mut element = Element::new(name, self.namespace.clone());
        element.type_ref = self.reference(xml, "type");
        element.ref_name = ref_name;
        if let Some(min) = attribute(xml, "minOccurs") {
            element.min_occurs = min;
        }
        if let Some(max) = attribute(xml, "maxOccurs") {
            element.max_occurs = max;
        }
        element.documentation = documentation(xml);

        let anonymous_name = format!("{}/{}[{}]", scope, element.name, index);
        if let Some(complex) = xml.xsd_child("complexType") {
            let content = self.complex_content(complex, &anonymous_name);
            element.children = content.elements;
            element.attributes = content.attributes;
            element.anonymous_type = Some(AnonymousType::Complex {
                name: anonymous_name,
                derivation: content.derivation,
                compositor: content.compositor,
                mixed: content.mixed,
            });
        } else if let Some(simple) = xml.xsd_child("simpleType") {
            let simple = self.simple_type(simple, anonymous_name);
            element.anonymous_type = Some(AnonymousType::Simple(simple));
        }

        element
    }

    fn complex_content(&mut self, xml: &XmlElement, scope: &str) -> Content {
        let mut content = Content {
            mixed: flag(xml, "mixed"),
            ..Content::default()
        };
        self.collect_content(xml, scope, &mut content);
        content
    }

    fn collect_content(&mut self, parent: &XmlElement, scope: &str, content: &mut Content) {
        for child in parent.xsd_children() {
            match child.local_name() {
                local @ ("sequence" | "choice" | "all") => {
                    if content.compositor.is_none() {
                        content.compositor = Compositor::from_local_name(local);
                    }
                    self.collect_particles(child, scope, &mut content.elements);
                }
                "attribute" => {
                    let declaration = self.attribute_declaration(child);
                    content.attributes.push(declaration);
                }
                "complexContent" | "simpleContent" => {
                    if flag(child, "mixed") {
                        content.mixed = true;
                    }
                    for derivation in child.xsd_children() {
                        let kind = match derivation.local_name() {
                            "extension" => DerivationKind::Extension,
                            "restriction" => DerivationKind::Restriction,
                            _ => continue,
                        };
                        if let Some(base) = self.reference(derivation, "base") {
                            content.derivation = Some(Derivation { base, kind });
                        }
                        self.collect_content(derivation, scope, content);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_particles(&mut self, group: &XmlElement, scope: &str, elements: &mut Vec<Element>) {
        for child in group.xsd_children() {
            match child.local_name() {
                "element" => {
                    let index = elements.len();
                    let element = self.element(child, None, scope, index);
                    elements.push(element);
                }
                "sequence" | "choice" | "all" => self.collect_particles(child, scope, elements),
                _ => {}
            }
        }
    }

    fn attribute_declaration(&mut self, xml: &XmlElement) -> Attribute {
        let ref_name = self.reference(xml, "ref");
        let name = attribute(xml, "name")
            .or_else(|| ref_name.as_deref().map(|r| split_qname(r).1.to_string()))
            .unwrap_or_else(|| "unnamed".to_string());

        let mut attr = Attribute::new(name);
        attr.type_ref = self.reference(xml, "type");
        attr.ref_name = ref_name;
        attr.use_ = xml
            .get_attribute("use")
            .map(AttributeUse::parse)
            .unwrap_or_default();
        attr.default = xml.get_attribute("default").map(str::to_string);
        attr.fixed = xml.get_attribute("fixed").map(str::to_string);
        attr
    }
}

/// Trimmed, non-empty attribute value
fn attribute(xml: &XmlElement, name: &str) -> Option<String> {
    xml.get_attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn flag(xml: &XmlElement, name: &str) -> bool {
    matches!(xml.get_attribute(name).map(str::trim), Some("true") | Some("1"))
}

/// Text of the first `xs:annotation/xs:documentation`
fn documentation(xml: &XmlElement) -> Option<String> {
    xml.xsd_child("annotation")
        .and_then(|annotation| annotation.xsd_child("documentation"))
        .and_then(|doc| doc.text.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
