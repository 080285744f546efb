//! XML document tree
//!
//! [`Element`] is the runtime mirror of a schema node: a pure owned tree
//! with no back-references. This module also reads and writes the textual
//! form with quick-xml and edits trees through [`LocationPath`]s.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceScope, QName, XML_NAMESPACE};
use crate::xpath::{LocationPath, PathStep};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
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

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// Number of elements in this subtree, this one included
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Element::element_count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Element::depth).max().unwrap_or(0)
    }
}

/// XML Document representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document around a root element
    pub fn with_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes using default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<(Element, NamespaceScope)> = Vec::new();
        let root_scope = NamespaceScope::new();
        let mut count = 0usize;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let scope = element_stack.last().map(|(_, s)| s).unwrap_or(&root_scope);
                    let (element, scope) = Self::parse_element(&e, scope)?;
                    count += 1;
                    limits.check_nodes(count)?;
                    element_stack.push((element, scope));
                    limits.check_depth(element_stack.len())?;
                }
                Ok(Event::End(_)) => {
                    if let Some((current, _)) = element_stack.pop() {
                        if let Some((parent, _)) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.set_root(current)?;
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let scope = element_stack.last().map(|(_, s)| s).unwrap_or(&root_scope);
                    let (element, _) = Self::parse_element(&e, scope)?;
                    count += 1;
                    limits.check_nodes(count)?;
                    limits.check_depth(element_stack.len() + 1)?;
                    if let Some((parent, _)) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.set_root(element)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let text = String::from_utf8(e.into_inner().into_owned())
                            .map_err(|e| Error::Xml(format!("Invalid CDATA: {}", e)))?;
                        append_text(current, &text);
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

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }
        Ok(doc)
    }

    fn set_root(&mut self, root: Element) -> Result<()> {
        if self.root.is_some() {
            return Err(Error::Xml("Multiple document elements".to_string()));
        }
        self.root = Some(root);
        Ok(())
    }

    /// Parse element from BytesStart event, returning it with its scope
    fn parse_element(
        start: &BytesStart<'_>,
        parent_scope: &NamespaceScope,
    ) -> Result<(Element, NamespaceScope)> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?;

        // Namespace declarations first, they apply to the element itself
        let mut declarations = NamespaceScope::new();
        let mut raw_attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if !declarations.declare(&attr_name, &attr_value) {
                raw_attributes.push((attr_name, attr_value));
            }
        }

        let scope = parent_scope.nested(&declarations);
        let mut element = Element::new(scope.element_name(name)?);
        for (attr_name, attr_value) in raw_attributes {
            element
                .attributes
                .insert(scope.attribute_name(&attr_name)?, attr_value);
        }

        Ok((element, scope))
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Get the root element or fail
    pub fn require_root(&self) -> Result<&Element> {
        self.root
            .as_ref()
            .ok_or_else(|| Error::Document("XML document has no root element".to_string()))
    }

    /// Serialize to an XML string with an UTF-8 declaration
    pub fn to_xml_string(&self, pretty: bool) -> Result<String> {
        let root = self.require_root()?;
        let mut writer = if pretty {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_write_error)?;
        write_element(&mut writer, root, None, true)?;

        let mut out = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| Error::Xml(format!("Invalid UTF-8 output: {}", e)))?;
        if pretty {
            out.push('\n');
        }
        Ok(out)
    }

    /// Replace the text content of every node selected by `path`
    ///
    /// Selected elements lose their children, selected attributes get the
    /// new value. Returns the number of nodes changed.
    pub fn set_text_content(&mut self, path: &LocationPath, value: &str) -> usize {
        let Some(root) = self.root.as_mut() else {
            return 0;
        };
        let steps = path.element_steps();
        let attribute = path.target_attribute();
        let mut changed = 0;

        if let Some((first, rest)) = steps.split_first() {
            if first.matches_element(root.local_name(), 1, &root.attributes) {
                for_each_match(root, rest, &mut |element| match attribute {
                    Some(name) => {
                        for (qname, v) in element.attributes.iter_mut() {
                            if qname.local_name == name {
                                *v = value.to_string();
                                changed += 1;
                            }
                        }
                    }
                    None => {
                        element.children.clear();
                        element.text = Some(value.to_string());
                        changed += 1;
                    }
                });
            }
        }
        changed
    }

    /// Delete every node selected by `path`, returning how many were removed
    ///
    /// The document element itself cannot be deleted.
    pub fn delete_nodes(&mut self, path: &LocationPath) -> Result<usize> {
        let Some(root) = self.root.as_mut() else {
            return Ok(0);
        };
        let steps = path.element_steps();
        let attribute = path.target_attribute();

        let Some((first, rest)) = steps.split_first() else {
            return Ok(0);
        };
        if !first.matches_element(root.local_name(), 1, &root.attributes) {
            return Ok(0);
        }

        match (rest.split_last(), attribute) {
            (_, Some(name)) => {
                let mut removed = 0;
                for_each_match(root, rest, &mut |element| {
                    let before = element.attributes.len();
                    element.attributes.retain(|qname, _| qname.local_name != name);
                    removed += before - element.attributes.len();
                });
                Ok(removed)
            }
            (Some((last, parents)), None) => {
                let mut removed = 0;
                for_each_match(root, parents, &mut |element| {
                    let mut positions = SiblingPositions::default();
                    let before = element.children.len();
                    element.children.retain(|child| {
                        let position = positions.next(child.local_name());
                        !last.matches_element(child.local_name(), position, &child.attributes)
                    });
                    removed += before - element.children.len();
                });
                Ok(removed)
            }
            (None, None) => Err(Error::Path(format!(
                "'{}' selects the document element, which cannot be deleted",
                path
            ))),
        }
    }
}

/// 1-based position counter among same-named siblings
#[derive(Default)]
pub(crate) struct SiblingPositions {
    counts: std::collections::HashMap<String, usize>,
}

impl SiblingPositions {
    pub(crate) fn next(&mut self, local_name: &str) -> usize {
        let count = self.counts.entry(local_name.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

fn for_each_match(element: &mut Element, steps: &[PathStep], f: &mut dyn FnMut(&mut Element)) {
    let Some((step, rest)) = steps.split_first() else {
        f(element);
        return;
    };
    let mut positions = SiblingPositions::default();
    for child in element.children.iter_mut() {
        let position = positions.next(child.local_name());
        if step.matches_element(child.local_name(), position, &child.attributes) {
            for_each_match(child, rest, f);
        }
    }
}

fn append_text(element: &mut Element, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match element.text.as_mut() {
        Some(existing) => existing.push_str(text),
        None => element.text = Some(text.to_string()),
    }
}

fn xml_write_error(e: quick_xml::Error) -> Error {
    Error::Xml(format!("Failed to write XML: {}", e))
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    element: &Element,
    default_namespace: Option<&str>,
    is_root: bool,
) -> Result<()> {
    let name = element.local_name();
    let mut start = BytesStart::new(name);

    let namespace = element.namespace();
    let declare_default = if is_root {
        namespace.is_some()
    } else {
        namespace != default_namespace
    };
    if declare_default {
        start.push_attribute(("xmlns", namespace.unwrap_or("")));
    }

    let mut prefixed = Vec::new();
    for (qname, value) in &element.attributes {
        match &qname.namespace {
            Some(ns) if ns == XML_NAMESPACE => {
                prefixed.push((format!("xml:{}", qname.local_name), value.as_str()));
            }
            Some(ns) => {
                let prefix = format!("a{}", prefixed.len());
                start.push_attribute((format!("xmlns:{}", prefix).as_str(), ns.as_str()));
                prefixed.push((format!("{}:{}", prefix, qname.local_name), value.as_str()));
            }
            None => start.push_attribute((qname.local_name.as_str(), value.as_str())),
        }
    }
    for (attr_name, value) in &prefixed {
        start.push_attribute((attr_name.as_str(), *value));
    }

    if element.children.is_empty() && element.text.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(xml_write_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_write_error)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_write_error)?;
    }
    for child in &element.children {
        write_element(writer, child, namespace, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_write_error)
}
