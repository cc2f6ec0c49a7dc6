//! BYAML decoder.
//!
//! Every decode step receives the absolute offset it should read from and
//! opens its own [`BinaryReader`] view there. Sibling slots of a container are
//! addressed from the container's start with a fixed stride, so a nested
//! decode can never disturb where the next sibling is read from.

use byaml_common::{codepage, BinaryReader, Endian};

use crate::error::PoolKind;
use crate::header::ByamlHeader;
use crate::node::{Node, NodeType, MAX_DEPTH};
use crate::pool::{BlobPool, StringPool};
use crate::{Error, Result};

/// A decoded BYAML document: the root node and the pools it references.
#[derive(Debug, Clone)]
pub struct Byaml {
    /// Byte order of the source file and of path blobs.
    pub endian: Endian,
    /// Format version from the header.
    pub version: u16,
    /// Object key names.
    pub names: StringPool,
    /// String values.
    pub strings: StringPool,
    /// Path data blobs.
    pub paths: BlobPool,
    /// Root node.
    pub root: Node,
}

impl Byaml {
    /// Create an empty document.
    pub fn new(endian: Endian, version: u16) -> Self {
        Self {
            endian,
            version,
            names: StringPool::new(PoolKind::Names),
            strings: StringPool::new(PoolKind::Strings),
            paths: BlobPool::new(PoolKind::Paths),
            root: Node::Null,
        }
    }

    /// Check if data starts with a BYAML magic.
    pub fn is_byaml(data: &[u8]) -> bool {
        ByamlHeader::detect(data).is_some()
    }

    /// Parse a complete BYAML file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ByamlHeader::parse(data)?;
        let endian = header.endian;

        let names = match header.name_table_offset {
            0 => Vec::new(),
            offset => decode_string_table(data, offset, endian)?,
        };
        let strings = match header.string_table_offset {
            0 => Vec::new(),
            offset => decode_string_table(data, offset, endian)?,
        };
        let paths = match header.path_table_offset {
            0 => Vec::new(),
            offset => decode_path_table(data, offset, endian)?,
        };

        log::debug!(
            "BYAML v{} ({}-endian): {} names, {} strings, {} paths, root at {:#x}",
            header.version,
            endian,
            names.len(),
            strings.len(),
            paths.len(),
            header.root_offset
        );

        let root = match header.root_offset {
            0 => Node::Null,
            offset => decode_node(data, offset, endian)?,
        };

        let document = Self {
            endian,
            version: header.version,
            names: StringPool::from_entries(PoolKind::Names, names),
            strings: StringPool::from_entries(PoolKind::Strings, strings),
            paths: BlobPool::from_entries(PoolKind::Paths, paths),
            root,
        };
        document.validate()?;
        Ok(document)
    }

    /// Check that every index in the tree addresses an entry of its pool.
    pub fn validate(&self) -> Result<()> {
        self.validate_node(&self.root)
    }

    fn validate_node(&self, node: &Node) -> Result<()> {
        match node {
            Node::StringRef(i) => self.strings.check(*i),
            Node::PathData(i) => self.paths.check(*i),
            Node::Array(items) => items.iter().try_for_each(|item| self.validate_node(item)),
            Node::Object(entries) => entries.iter().try_for_each(|(name, child)| {
                self.names.check(*name)?;
                self.validate_node(child)
            }),
            Node::Bool(_) | Node::Int32(_) | Node::Float32(_) | Node::Null => Ok(()),
        }
    }

    /// Get an object key name by index.
    pub fn name(&self, index: u32) -> Result<&str> {
        self.names.resolve(index).map(String::as_str)
    }

    /// Get a string value by index.
    pub fn string(&self, index: u32) -> Result<&str> {
        self.strings.resolve(index).map(String::as_str)
    }

    /// Get a path blob by index.
    pub fn path(&self, index: u32) -> Result<&[u8]> {
        self.paths.resolve(index).map(Vec::as_slice)
    }
}

/// Decode the container node at `offset`.
///
/// The root of a document must be an array or an object; anything else is
/// malformed.
pub fn decode_node(data: &[u8], offset: u32, endian: Endian) -> Result<Node> {
    let tag = BinaryReader::new_at(data, offset as usize, endian).peek_u8()?;
    match NodeType::try_from(tag)? {
        NodeType::Array => decode_array(data, offset as usize, endian, 0),
        NodeType::Object => decode_object(data, offset as usize, endian, 0),
        other => Err(Error::malformed(format!(
            "expected an array or object at offset {:#x}, found {:?}",
            offset, other
        ))),
    }
}

/// Read a container header: one type byte and a 24-bit count.
fn read_container_header(reader: &mut BinaryReader<'_>) -> Result<(u8, usize)> {
    let tag = reader.read_u8()?;
    let count = reader.read_u24()?;
    Ok((tag, count as usize))
}

fn decode_array(data: &[u8], offset: usize, endian: Endian, depth: usize) -> Result<Node> {
    let mut reader = BinaryReader::new_at(data, offset, endian);
    let (_, count) = read_container_header(&mut reader)?;
    let types = reader.read_bytes(count)?;
    reader.align(4);
    let start = reader.position();

    let mut items = Vec::with_capacity(count);
    for (i, &tag) in types.iter().enumerate() {
        items.push(decode_slot(data, start + i * 4, tag, endian, depth)?);
    }
    Ok(Node::Array(items))
}

fn decode_object(data: &[u8], offset: usize, endian: Endian, depth: usize) -> Result<Node> {
    let mut reader = BinaryReader::new_at(data, offset, endian);
    let (_, count) = read_container_header(&mut reader)?;

    let mut entries = Vec::with_capacity(count.min(reader.remaining() / 8));
    for i in 0..count {
        let entry = offset + 4 + i * 8;
        let mut reader = reader.view_at(entry);
        let name = reader.read_u24()?;
        let tag = reader.read_u8()?;
        entries.push((name, decode_slot(data, entry + 4, tag, endian, depth)?));
    }
    Ok(Node::Object(entries))
}

/// Decode one child slot. Scalars live in the slot itself; containers are
/// referenced by the absolute offset stored there.
fn decode_slot(data: &[u8], slot: usize, tag: u8, endian: Endian, depth: usize) -> Result<Node> {
    let node_type = NodeType::try_from(tag).map_err(|_| {
        Error::malformed(format!("unknown node type {:#04x} at offset {:#x}", tag, slot))
    })?;
    let mut reader = BinaryReader::new_at(data, slot, endian);

    Ok(match node_type {
        NodeType::String => Node::StringRef(reader.read_u32()?),
        NodeType::Data => Node::PathData(reader.read_u32()?),
        NodeType::Boolean => Node::Bool(reader.read_i32()? != 0),
        NodeType::Int => Node::Int32(reader.read_i32()?),
        NodeType::Single => Node::Float32(reader.read_f32()?),
        NodeType::Null => Node::Null,
        NodeType::Array | NodeType::Object => {
            if depth >= MAX_DEPTH {
                return Err(Error::malformed(format!(
                    "containers nested deeper than {} levels at offset {:#x}",
                    MAX_DEPTH, slot
                )));
            }
            let target = reader.read_u32()? as usize;
            if node_type == NodeType::Array {
                decode_array(data, target, endian, depth + 1)?
            } else {
                decode_object(data, target, endian, depth + 1)?
            }
        }
        NodeType::StringTable | NodeType::DataTable => {
            return Err(Error::malformed(format!(
                "table node {:?} used as a value at offset {:#x}",
                node_type, slot
            )))
        }
    })
}

/// Expect a table node with the given tag at `offset` and return its entry count.
fn read_table_header(reader: &mut BinaryReader<'_>, expected: NodeType) -> Result<usize> {
    let offset = reader.position();
    let (tag, count) = read_container_header(reader)?;
    if tag != expected as u8 {
        return Err(Error::malformed(format!(
            "expected {:?} at offset {:#x}, found type {:#04x}",
            expected, offset, tag
        )));
    }
    Ok(count)
}

/// Decode a string table node.
///
/// Entry offsets are relative to the table's own start. String bytes pass
/// through the legacy code page before being read as UTF-8.
pub fn decode_string_table(data: &[u8], offset: u32, endian: Endian) -> Result<Vec<String>> {
    let base = offset as usize;
    let mut reader = BinaryReader::new_at(data, base, endian);
    let count = read_table_header(&mut reader, NodeType::StringTable)?;

    let mut strings = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let relative = reader.read_u32()? as usize;
        let bytes = reader.view_at(base + relative).read_cstring_bytes()?;
        strings.push(codepage::legacy_to_utf8(bytes));
    }
    Ok(strings)
}

/// Decode a path table node.
///
/// The table stores `count + 1` offsets relative to its own start; blob `i`
/// spans from offset `i` to offset `i + 1`.
pub fn decode_path_table(data: &[u8], offset: u32, endian: Endian) -> Result<Vec<Vec<u8>>> {
    let base = offset as usize;
    let mut reader = BinaryReader::new_at(data, base, endian);
    let count = read_table_header(&mut reader, NodeType::DataTable)?;

    let mut offsets = Vec::with_capacity((count + 1).min(reader.remaining() / 4));
    for _ in 0..=count {
        offsets.push(reader.read_u32()? as usize);
    }

    offsets
        .windows(2)
        .map(|pair| -> Result<Vec<u8>> {
            let (start, end) = (pair[0], pair[1]);
            let length = end.checked_sub(start).ok_or_else(|| {
                Error::malformed(format!(
                    "path table at {:#x} has decreasing offsets {:#x} > {:#x}",
                    base, start, end
                ))
            })?;
            let bytes = reader.view_at(base + start).read_bytes(length)?;
            Ok(bytes.to_vec())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use byaml_common::BinaryWriter;

    fn header(writer: &mut BinaryWriter, names: u32, strings: u32, paths: u32, root: u32) {
        writer.write_bytes(b"BY");
        writer.write_u16(1);
        writer.write_u32(names);
        writer.write_u32(strings);
        writer.write_u32(paths);
        writer.write_u32(root);
    }

    /// Object { "a": Int 5, "b": Array [Bool true, Null], "c": "hello" }.
    fn small_document() -> Vec<u8> {
        let mut w = BinaryWriter::new(Endian::Big);
        header(&mut w, 0x14, 0x2C, 0, 0x3C);

        // 0x14: names ["a", "b", "c"]
        w.write_u8(0xC2);
        w.write_u24(3);
        w.write_u32(0x10);
        w.write_u32(0x12);
        w.write_u32(0x14);
        w.write_bytes(b"a\0b\0c\0");
        w.align(4);
        assert_eq!(w.position(), 0x2C);

        // 0x2C: strings ["hello"]
        w.write_u8(0xC2);
        w.write_u24(1);
        w.write_u32(0x08);
        w.write_bytes(b"hello\0");
        w.align(4);
        assert_eq!(w.position(), 0x3C);

        // 0x3C: root object
        w.write_u8(0xC1);
        w.write_u24(3);
        w.write_u24(0);
        w.write_u8(0xD1);
        w.write_i32(5);
        w.write_u24(1);
        w.write_u8(0xC0);
        w.write_u32(0x58);
        w.write_u24(2);
        w.write_u8(0xA0);
        w.write_u32(0);
        assert_eq!(w.position(), 0x58);

        // 0x58: array [true, null]
        w.write_u8(0xC0);
        w.write_u24(2);
        w.write_u8(0xD0);
        w.write_u8(0xFF);
        w.align(4);
        w.write_u32(1);
        w.write_u32(0);
        w.into_inner()
    }

    #[test]
    fn test_parse_small_document() {
        let data = small_document();
        assert!(Byaml::is_byaml(&data));

        let doc = Byaml::parse(&data).unwrap();
        assert_eq!(doc.endian, Endian::Big);
        assert_eq!(doc.names.as_slice(), ["a", "b", "c"]);
        assert_eq!(doc.strings.as_slice(), ["hello"]);
        assert_eq!(
            doc.root,
            Node::Object(vec![
                (0, Node::Int32(5)),
                (1, Node::Array(vec![Node::Bool(true), Node::Null])),
                (2, Node::StringRef(0)),
            ])
        );
        assert_eq!(doc.string(0).unwrap(), "hello");
    }

    #[test]
    fn test_nested_container_far_away_keeps_sibling_slots() {
        let mut w = BinaryWriter::new(Endian::Big);
        // 0x00: object with 4 entries; third is an array placed far later
        w.write_u8(0xC1);
        w.write_u24(4);
        for (name, tag, value) in [
            (0u32, 0xD1u8, 10u32),
            (1, 0xD1, 20),
            (2, 0xC0, 0x200),
            (3, 0xD1, 40),
        ] {
            w.write_u24(name);
            w.write_u8(tag);
            w.write_u32(value);
        }
        while w.position() < 0x200 {
            w.write_u8(0xEE);
        }
        // 0x200: array of 6 ints
        w.write_u8(0xC0);
        w.write_u24(6);
        w.write_bytes(&[0xD1; 6]);
        w.align(4);
        for i in 0..6 {
            w.write_i32(i);
        }
        let data = w.into_inner();

        let root = decode_node(&data, 0, Endian::Big).unwrap();
        let Node::Object(entries) = root else {
            panic!("expected object");
        };
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[2].1.len(), 6);
        assert_eq!(entries[3], (3, Node::Int32(40)));
    }

    #[test]
    fn test_unknown_type_tag_is_malformed() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u8(0xC0);
        w.write_u24(2);
        w.write_u8(0xD1);
        w.write_u8(0x99);
        w.align(4);
        w.write_i32(1);
        w.write_i32(2);
        let data = w.into_inner();

        let err = decode_node(&data, 0, Endian::Big).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("0x99"));
    }

    #[test]
    fn test_little_endian_container() {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_u8(0xC1);
        w.write_u24(1);
        w.write_u24(0);
        w.write_u8(0xD2);
        w.write_f32(1.5);
        let data = w.into_inner();
        assert_eq!(&data[..4], &[0xC1, 0x01, 0x00, 0x00]);

        let root = decode_node(&data, 0, Endian::Little).unwrap();
        assert_eq!(root, Node::Object(vec![(0, Node::Float32(1.5))]));
    }

    #[test]
    fn test_scalar_root_is_malformed() {
        let data = [0xD1, 0, 0, 0, 0, 0, 0, 1];
        assert!(decode_node(&data, 0, Endian::Big).unwrap_err().is_malformed());
    }

    #[test]
    fn test_offset_cycle_is_rejected() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u8(0xC0);
        w.write_u24(1);
        w.write_u8(0xC0);
        w.align(4);
        w.write_u32(0);
        let data = w.into_inner();

        assert!(decode_node(&data, 0, Endian::Big).unwrap_err().is_malformed());
    }

    #[test]
    fn test_deeply_nested_xml_is_rejected() {
        let depth = 200_000;
        let xml = format!("{}1{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(Byaml::from_xml_str(&xml).unwrap_err().is_malformed());
    }

    #[test]
    fn test_offset_past_end_is_out_of_range() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u8(0xC0);
        w.write_u24(1);
        w.write_u8(0xC1);
        w.align(4);
        w.write_u32(0x1000);
        let data = w.into_inner();

        assert!(decode_node(&data, 0, Endian::Big).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_string_table_legacy_decoding() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u8(0xC2);
        w.write_u24(2);
        w.write_u32(0x0C);
        w.write_u32(0x11);
        w.write_bytes("d\u{E9}j\0".as_bytes());
        w.write_bytes(&[b'x', 0xFF, 0]);
        let data = w.into_inner();

        let strings = decode_string_table(&data, 0, Endian::Big).unwrap();
        assert_eq!(strings, vec!["d\u{E9}j".to_string(), "x\u{FFFD}".to_string()]);
    }

    #[test]
    fn test_path_table() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u8(0xC3);
        w.write_u24(2);
        w.write_u32(0x10);
        w.write_u32(0x12);
        w.write_u32(0x15);
        w.write_bytes(&[1, 2, 3, 4, 5]);
        let data = w.into_inner();

        let blobs = decode_path_table(&data, 0, Endian::Big).unwrap();
        assert_eq!(blobs, vec![vec![1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_wrong_table_tag() {
        let data = [0xC3, 0, 0, 0];
        assert!(decode_string_table(&data, 0, Endian::Big)
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn test_dangling_string_index() {
        let mut data = small_document();
        // point "c" at string 7
        let slot = 0x3C + 4 + 2 * 8 + 4;
        data[slot..slot + 4].copy_from_slice(&7u32.to_be_bytes());

        let err = Byaml::parse(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                kind: PoolKind::Strings,
                index: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_document() {
        let mut w = BinaryWriter::new(Endian::Big);
        header(&mut w, 0, 0, 0, 0);
        let doc = Byaml::parse(&w.into_inner()).unwrap();
        assert_eq!(doc.root, Node::Null);
        assert!(doc.names.is_empty());
    }
}
