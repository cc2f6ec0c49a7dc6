//! Reification of XML documents into BYAML nodes.

use byaml_common::Endian;

use crate::dom::{XmlChild, XmlElement};
use crate::error::PoolKind;
use crate::node::{Node, MAX_DEPTH};
use crate::path::{encode_points, PathPoint};
use crate::pool::{BlobPool, StringPool};
use crate::to_xml::YAMLCONV_NAMESPACE;
use crate::{Byaml, Error, Result};

/// Builds nodes from XML, interning names, strings and path blobs into fresh
/// pools as they are first seen.
#[derive(Debug)]
pub struct XmlReifier {
    names: StringPool,
    strings: StringPool,
    paths: BlobPool,
    endian: Endian,
    /// In-scope `xmlns:prefix` bindings, innermost last.
    namespaces: Vec<(String, String)>,
    depth: usize,
}

impl XmlReifier {
    /// Create a reifier with empty pools. `endian` is the byte order path
    /// blobs are packed in.
    pub fn new(endian: Endian) -> Self {
        Self {
            names: StringPool::new(PoolKind::Names),
            strings: StringPool::new(PoolKind::Strings),
            paths: BlobPool::new(PoolKind::Paths),
            endian,
            namespaces: Vec::new(),
            depth: 0,
        }
    }

    pub fn names(&self) -> &StringPool {
        &self.names
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    pub fn paths(&self) -> &BlobPool {
        &self.paths
    }

    /// Hand over the pools built so far: names, strings, paths.
    pub fn into_pools(self) -> (StringPool, StringPool, BlobPool) {
        (self.names, self.strings, self.paths)
    }

    /// Build the node represented by `element`.
    pub fn reify(&mut self, element: &XmlElement) -> Result<Node> {
        if self.depth > MAX_DEPTH {
            return Err(Error::malformed(format!(
                "<{}> is nested deeper than {} levels",
                element.name, MAX_DEPTH
            )));
        }

        let scope = self.namespaces.len();
        for (key, value) in &element.attributes {
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.namespaces.push((prefix.to_string(), value.clone()));
            }
        }

        self.depth += 1;
        let result = self.reify_element(element);
        self.depth -= 1;
        self.namespaces.truncate(scope);
        result
    }

    fn reify_element(&mut self, element: &XmlElement) -> Result<Node> {
        let type_attr = element.attribute("type");

        match element.first_significant_child() {
            None | Some(XmlChild::Element(_)) => match type_attr {
                Some("array") => element
                    .elements()
                    .map(|item| self.reify(item))
                    .collect::<Result<Vec<_>>>()
                    .map(Node::Array),
                Some("path") => self.reify_path(element),
                Some("null") => Ok(Node::Null),
                Some("string") if element.children.is_empty() => {
                    Ok(Node::StringRef(self.strings.intern("")))
                }
                _ => self.reify_object(element),
            },
            Some(_) => {
                let text = element.inner_text();
                if type_attr == Some("string") {
                    return Ok(Node::StringRef(self.strings.intern(text.as_str())));
                }
                infer_scalar(&text)
            }
        }
    }

    fn reify_object(&mut self, element: &XmlElement) -> Result<Node> {
        let mut entries = Vec::new();

        for child in element.elements() {
            let name = self.names.intern(child.name.as_str());
            entries.push((name, self.reify(child)?));
        }

        for (key, value) in &element.attributes {
            if self.is_reserved_attribute(key) {
                continue;
            }
            let name = self.names.intern(key.as_str());
            let node = infer_scalar(value)
                .map_err(|e| Error::malformed(format!("attribute '{}': {}", key, e)))?;
            entries.push((name, node));
        }

        Ok(Node::Object(entries))
    }

    fn reify_path(&mut self, element: &XmlElement) -> Result<Node> {
        let points = element
            .elements()
            .filter(|item| item.name.eq_ignore_ascii_case("point"))
            .map(read_point)
            .collect::<Result<Vec<_>>>()?;

        let blob = encode_points(&points, self.endian);
        Ok(Node::PathData(self.paths.intern(blob.as_slice())))
    }

    /// Namespace declarations and attributes in the converter's own namespace.
    fn is_reserved_attribute(&self, key: &str) -> bool {
        if key == "xmlns" || key.starts_with("xmlns:") {
            return true;
        }
        match key.split_once(':') {
            Some((prefix, _)) => self.namespace_uri(prefix) == Some(YAMLCONV_NAMESPACE),
            None => false,
        }
    }

    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Infer a scalar node from its text.
///
/// A trailing `f` or `F` marks a float; otherwise the text must be a 32-bit
/// integer or a boolean literal. Surrounding whitespace is ignored.
pub fn infer_scalar(text: &str) -> Result<Node> {
    let trimmed = text.trim();

    if let Some(prefix) = trimmed
        .strip_suffix('f')
        .or_else(|| trimmed.strip_suffix('F'))
    {
        return parse_float(prefix).map(Node::Float32);
    }
    if let Ok(value) = trimmed.parse::<i32>() {
        return Ok(Node::Int32(value));
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(Node::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(Node::Bool(false));
    }

    Err(Error::malformed(format!(
        "cannot infer a value type for '{}'",
        text
    )))
}

fn parse_float(text: &str) -> Result<f32> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| Error::malformed(format!("invalid float '{}'", text)))
}

/// Read one `point` element. Float attributes carry a one-character suffix
/// that is dropped before parsing.
fn read_point(element: &XmlElement) -> Result<PathPoint> {
    let float = |key: &str| -> Result<f32> {
        let raw = required_attribute(element, key)?;
        let mut chars = raw.chars();
        chars.next_back();
        parse_float(chars.as_str())
    };

    let value = required_attribute(element, "val")?;
    Ok(PathPoint {
        position: [float("x")?, float("y")?, float("z")?],
        normal: [float("nx")?, float("ny")?, float("nz")?],
        value: value
            .trim()
            .parse()
            .map_err(|_| Error::malformed(format!("invalid point value '{}'", value)))?,
    })
}

fn required_attribute<'e>(element: &'e XmlElement, key: &str) -> Result<&'e str> {
    element.attribute(key).ok_or_else(|| {
        Error::malformed(format!("<{}> is missing attribute '{}'", element.name, key))
    })
}

/// Read an attribute in the converter namespace declared on `element`.
fn yamlconv_attribute<'e>(element: &'e XmlElement, local: &str) -> Option<&'e str> {
    element
        .attributes
        .iter()
        .filter_map(|(k, v)| {
            let prefix = k.strip_prefix("xmlns:")?;
            (v == YAMLCONV_NAMESPACE).then_some(prefix)
        })
        .find_map(|prefix| element.attribute(&format!("{}:{}", prefix, local)))
}

impl Byaml {
    /// Build a document from a parsed XML root element.
    ///
    /// Byte order and version come from the `yamlconv` attributes on the root
    /// when present; the defaults are big-endian, version 1.
    pub fn from_xml_element(root: &XmlElement) -> Result<Self> {
        let endian = match yamlconv_attribute(root, "endianness") {
            Some(name) => name.parse().map_err(Error::MalformedInput)?,
            None => Endian::Big,
        };
        let version = match yamlconv_attribute(root, "version") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::malformed(format!("invalid version '{}'", v)))?,
            None => 1,
        };

        let mut reifier = XmlReifier::new(endian);
        let node = reifier.reify(root)?;
        let (names, strings, paths) = reifier.into_pools();

        log::debug!(
            "reified XML: {} names, {} strings, {} paths",
            names.len(),
            strings.len(),
            paths.len()
        );

        Ok(Self {
            endian,
            version,
            names,
            strings,
            paths,
            root: node,
        })
    }

    /// Parse XML text into a document.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        Self::from_xml_element(&XmlElement::parse(xml)?)
    }

    /// Parse XML bytes into a document.
    pub fn from_xml_bytes(xml: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(xml).map_err(|e| Error::Xml(e.to_string()))?;
        Self::from_xml_str(xml)
    }
}
