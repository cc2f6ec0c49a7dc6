//! Projection of BYAML nodes into XML.

use std::io::Write;

use byaml_common::Endian;

use crate::dom::XmlElement;
use crate::node::Node;
use crate::path::decode_points;
use crate::pool::{BlobPool, StringPool};
use crate::{Byaml, Result};

/// Namespace URI of the converter's bookkeeping attributes.
pub const YAMLCONV_NAMESPACE: &str = "yamlconv";

/// Name of the document element.
pub const ROOT_ELEMENT: &str = "yaml";

/// Writes nodes into XML elements, resolving pooled values.
pub struct XmlProjector<'a> {
    names: &'a StringPool,
    strings: &'a StringPool,
    paths: &'a BlobPool,
    endian: Endian,
}

impl<'a> XmlProjector<'a> {
    /// Create a projector over the given pools. `endian` is the byte order of
    /// path blobs.
    pub fn new(
        names: &'a StringPool,
        strings: &'a StringPool,
        paths: &'a BlobPool,
        endian: Endian,
    ) -> Self {
        Self {
            names,
            strings,
            paths,
            endian,
        }
    }

    /// Write `node` into `element`, adding attributes, text and children.
    pub fn project(&self, node: &Node, element: &mut XmlElement) -> Result<()> {
        match node {
            Node::StringRef(index) => {
                element.set_attribute("type", "string");
                element.set_text(self.strings.resolve(*index)?.as_str());
            }
            Node::PathData(index) => {
                element.set_attribute("type", "path");
                for point in decode_points(self.paths.resolve(*index)?, self.endian)? {
                    let [x, y, z] = point.position;
                    let [nx, ny, nz] = point.normal;
                    element.push_element(
                        XmlElement::new("point")
                            .with_attribute("x", format_float(x))
                            .with_attribute("y", format_float(y))
                            .with_attribute("z", format_float(z))
                            .with_attribute("nx", format_float(nx))
                            .with_attribute("ny", format_float(ny))
                            .with_attribute("nz", format_float(nz))
                            .with_attribute("val", point.value.to_string()),
                    );
                }
            }
            Node::Bool(_) | Node::Int32(_) | Node::Float32(_) => {
                if let Some(text) = scalar_text(node) {
                    element.set_text(text);
                }
            }
            Node::Null => {
                element.set_attribute("type", "null");
            }
            Node::Array(items) => {
                element.set_attribute("type", "array");
                for item in items {
                    let mut child = XmlElement::new("value");
                    self.project(item, &mut child)?;
                    element.push_element(child);
                }
            }
            Node::Object(entries) => {
                for (name_index, child) in entries {
                    let name = self.names.resolve(*name_index)?;
                    match scalar_text(child) {
                        Some(text) if !name.eq_ignore_ascii_case("type") => {
                            element.set_attribute(name.as_str(), text);
                        }
                        _ => {
                            let mut child_element = XmlElement::new(name.as_str());
                            self.project(child, &mut child_element)?;
                            element.push_element(child_element);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Text form of an attribute-eligible node, `None` for every other kind.
pub fn scalar_text(node: &Node) -> Option<String> {
    match node {
        Node::Bool(v) => Some(v.to_string()),
        Node::Int32(v) => Some(v.to_string()),
        Node::Float32(v) => Some(format_float(*v)),
        _ => None,
    }
}

/// Shortest round-trip decimal form of a float with a trailing `f`.
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaNf".to_string()
    } else if value == f32::INFINITY {
        "Infinityf".to_string()
    } else if value == f32::NEG_INFINITY {
        "-Infinityf".to_string()
    } else {
        format!("{}f", value)
    }
}

impl Byaml {
    /// Project the whole document under a `yaml` root element.
    pub fn to_xml_element(&self) -> Result<XmlElement> {
        let mut root = XmlElement::new(ROOT_ELEMENT)
            .with_attribute("xmlns:yamlconv", YAMLCONV_NAMESPACE)
            .with_attribute("yamlconv:endianness", self.endian.name())
            .with_attribute("yamlconv:version", self.version.to_string());

        XmlProjector::new(&self.names, &self.strings, &self.paths, self.endian)
            .project(&self.root, &mut root)?;
        Ok(root)
    }

    /// Convert to an indented XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        self.to_xml_element()?.to_xml_string()
    }

    /// Write XML to a writer.
    pub fn write_xml<W: Write>(&self, writer: W) -> Result<()> {
        self.to_xml_element()?.write_document(writer)
    }
}
