//! Minimal owned XML element tree.
//!
//! The projector writes into an [`XmlElement`] and the reifier reads from one.
//! Text is parsed with `quick-xml` and written back with its indenting writer.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::node::MAX_DEPTH;
use crate::{Error, Result};

/// A child of an XML element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified tag name.
    pub name: String,
    /// Attributes in document order, keyed by qualified name.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<XmlChild>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder-style [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Append a child element.
    pub fn push_element(&mut self, child: XmlElement) {
        self.children.push(XmlChild::Element(child));
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlChild::Text(text.into()));
    }

    /// Iterate over child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(e) => Some(e),
            _ => None,
        })
    }

    /// The first child that is not a comment.
    pub fn first_significant_child(&self) -> Option<&XmlChild> {
        self.children
            .iter()
            .find(|child| !matches!(child, XmlChild::Comment(_)))
    }

    /// Concatenated text of all descendants, comments excluded.
    pub fn inner_text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlChild::Text(t) => out.push_str(t),
                XmlChild::Element(e) => e.collect_text(out),
                XmlChild::Comment(_) => {}
            }
        }
    }

    /// Parse XML text and return its root element.
    ///
    /// Whitespace-only text is dropped unless it is the content of an element
    /// marked `type="string"`. Elements nested deeper than the container limit
    /// are rejected as malformed input.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    check_depth(stack.len(), reader.buffer_position())?;
                    stack.push(element_from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    check_depth(stack.len(), reader.buffer_position())?;
                    let node = element_from_start(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(node) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        if !text.trim().is_empty() || node.attribute("type") == Some("string") {
                            push_text(node, &text);
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(node) = stack.last_mut() {
                        push_text(node, &String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some(node) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        node.children.push(XmlChild::Comment(text));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {} // declarations, processing instructions, doctype
                Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml(format!("unclosed element <{}>", stack[0].name)));
        }
        root.ok_or_else(|| Error::Xml("No root element found in XML".to_string()))
    }

    /// Serialize to an indented XML document string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_document(&mut output)?;
        String::from_utf8(output).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Write as an XML document with declaration to a writer.
    pub fn write_document<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

        xml_writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        self.write_element(&mut xml_writer)
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| Error::Xml(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Xml(e.to_string()))?;

        for child in &self.children {
            match child {
                XmlChild::Element(e) => e.write_element(writer)?,
                XmlChild::Text(t) => writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(|e| Error::Xml(e.to_string()))?,
                XmlChild::Comment(c) => writer
                    .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                    .map_err(|e| Error::Xml(e.to_string()))?,
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| Error::Xml(e.to_string()))
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = XmlElement::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

fn check_depth(depth: usize, position: u64) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::malformed(format!(
            "elements nested deeper than {} levels at byte {}",
            MAX_DEPTH, position
        )));
    }
    Ok(())
}

/// Attach a finished element to its parent, or make it the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_element(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(Error::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

/// Append text, merging with a directly preceding text node.
fn push_text(node: &mut XmlElement, text: &str) {
    if let Some(XmlChild::Text(existing)) = node.children.last_mut() {
        existing.push_str(text);
    } else {
        node.children.push(XmlChild::Text(text.to_string()));
    }
}
