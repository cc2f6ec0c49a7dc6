//! BYAML node model.

use crate::{Error, Result};

/// Nesting limit for containers. Bounds recursion in both directions and
/// stops offset cycles in binary input.
pub(crate) const MAX_DEPTH: usize = 1024;

/// Type tag of a BYAML node, as stored in the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    /// Index into the string table.
    String = 0xA0,
    /// Index into the path table.
    Data = 0xA1,
    /// Positional container.
    Array = 0xC0,
    /// Named container.
    Object = 0xC1,
    /// Pool of strings.
    StringTable = 0xC2,
    /// Pool of binary blobs.
    DataTable = 0xC3,
    Boolean = 0xD0,
    Int = 0xD1,
    Single = 0xD2,
    Null = 0xFF,
}

impl NodeType {
    /// Whether nodes of this type are stored out of line and referenced by offset.
    pub const fn is_container(self) -> bool {
        matches!(self, NodeType::Array | NodeType::Object)
    }
}

impl TryFrom<u8> for NodeType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            0xA0 => NodeType::String,
            0xA1 => NodeType::Data,
            0xC0 => NodeType::Array,
            0xC1 => NodeType::Object,
            0xC2 => NodeType::StringTable,
            0xC3 => NodeType::DataTable,
            0xD0 => NodeType::Boolean,
            0xD1 => NodeType::Int,
            0xD2 => NodeType::Single,
            0xFF => NodeType::Null,
            _ => return Err(Error::malformed(format!("unknown node type {:#04x}", tag))),
        })
    }
}

/// A value in a BYAML tree.
///
/// Strings, object keys and path data are not stored inline; they are indices
/// into the pools of the owning [`Byaml`](crate::Byaml) document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Index into the string table.
    StringRef(u32),
    /// Index into the path table.
    PathData(u32),
    Bool(bool),
    Int32(i32),
    Float32(f32),
    /// Ordered, unnamed children.
    Array(Vec<Node>),
    /// Ordered `(name index, child)` pairs.
    Object(Vec<(u32, Node)>),
    Null,
}

impl Node {
    /// The binary type tag of this node.
    pub const fn node_type(&self) -> NodeType {
        match self {
            Node::StringRef(_) => NodeType::String,
            Node::PathData(_) => NodeType::Data,
            Node::Bool(_) => NodeType::Boolean,
            Node::Int32(_) => NodeType::Int,
            Node::Float32(_) => NodeType::Single,
            Node::Array(_) => NodeType::Array,
            Node::Object(_) => NodeType::Object,
            Node::Null => NodeType::Null,
        }
    }

    /// Number of direct children of a container, zero for leaves.
    pub fn len(&self) -> usize {
        match self {
            Node::Array(items) => items.len(),
            Node::Object(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Whether this node has no direct children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(NodeType::try_from(0xC1).unwrap(), NodeType::Object);
        assert_eq!(Node::Float32(1.0).node_type() as u8, 0xD2);
        assert!(NodeType::Array.is_container());
        assert!(!NodeType::String.is_container());
    }

    #[test]
    fn test_unknown_tag() {
        let err = NodeType::try_from(0x99).unwrap_err();
        assert!(err.is_malformed());
    }
}
