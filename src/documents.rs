//! XML document tree
//!
//! Schema files are read into an owned element tree with element names
//! resolved against the in-scope namespace declarations. Malformed input
//! (mismatched or unclosed tags, several roots, undeclared prefixes) is an
//! error, never an empty document.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Prefix used in the source, if any
    pub prefix: Option<String>,
    /// Element attributes by raw name, in document order
    pub attributes: IndexMap<String, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace declarations made on this element
    pub namespaces: NamespaceContext,
    /// Bindings in scope here, inherited ones included
    pub scope: NamespaceContext,
    /// Byte offset of the start tag
    pub position: usize,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
            scope: NamespaceContext::new(),
            position: 0,
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Whether this is the XML Schema element `local_name`
    pub fn is_xsd(&self, local_name: &str) -> bool {
        self.qname.is_xsd() && self.qname.local_name == local_name
    }

    /// Get an attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append text content
    pub fn push_text(&mut self, text: &str) {
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Child elements in the XML Schema namespace
    pub fn xsd_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter(|c| c.qname.is_xsd())
    }

    /// First XML Schema child named `local_name`
    pub fn xsd_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is_xsd(local_name))
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        // In-scope namespace bindings, one entry per open element
        let mut scopes: Vec<NamespaceContext> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if element_stack.is_empty() && doc.root.is_some() {
                        return Err(Error::Xml(format!(
                            "multiple root elements at position {}",
                            position
                        )));
                    }
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let (element, scope) = Self::parse_element(&e, scopes.last(), position)?;
                    element_stack.push(element);
                    scopes.push(scope);
                }
                Ok(Event::End(_)) => {
                    scopes.pop();
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    if element_stack.is_empty() && doc.root.is_some() {
                        return Err(Error::Xml(format!(
                            "multiple root elements at position {}",
                            position
                        )));
                    }
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let (element, _) = Self::parse_element(&e, scopes.last(), position)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                    match element_stack.last_mut() {
                        Some(current) => current.push_text(&text),
                        None if !text.trim().is_empty() => {
                            return Err(Error::Xml(format!(
                                "text outside the root element at position {}",
                                position
                            )))
                        }
                        None => {}
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore other events (comments, processing instructions, etc.)
            }
            buf.clear();
        }

        if let Some(open) = element_stack.last() {
            return Err(Error::Xml(format!(
                "unexpected end of document: element <{}> is not closed",
                open.local_name()
            )));
        }
        if doc.root.is_none() {
            return Err(Error::Xml("document has no root element".to_string()));
        }

        Ok(doc)
    }

    /// Parse element from BytesStart event, returning it with its in-scope bindings
    fn parse_element(
        start: &BytesStart,
        parent_scope: Option<&NamespaceContext>,
        position: usize,
    ) -> Result<(Element, NamespaceContext)> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut declared = NamespaceContext::new();
        let mut attributes = IndexMap::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?;

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                declared.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                declared.add_prefix(prefix, &attr_value);
            } else {
                attributes.insert(attr_name.to_string(), attr_value);
            }
        }

        // Bindings declared here shadow the parent's
        let mut scope = declared.clone();
        if let Some(parent) = parent_scope {
            scope.merge_additive(parent);
            if scope.get_default_namespace().is_none() {
                if let Some(default) = parent.get_default_namespace() {
                    scope.set_default_namespace(default);
                }
            }
        }

        let (prefix, qname) = match name.split_once(':') {
            Some((prefix, local)) => {
                let namespace = scope.get_namespace(prefix).ok_or_else(|| {
                    Error::Xml(format!(
                        "undeclared namespace prefix '{}' on element <{}> at position {}",
                        prefix, name, position
                    ))
                })?;
                (Some(prefix.to_string()), QName::namespaced(namespace, local))
            }
            None => {
                let namespace = scope.get_default_namespace().filter(|ns| !ns.is_empty());
                (None, QName::new(namespace, name.as_str()))
            }
        };

        let mut element = Element::new(qname);
        element.prefix = prefix;
        element.attributes = attributes;
        element.namespaces = declared;
        element.scope = scope.clone();
        element.position = position;

        Ok((element, scope))
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Take ownership of the root element
    pub fn into_root(self) -> Option<Element> {
        self.root
    }
}
