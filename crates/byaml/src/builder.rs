//! BYAML binary writer.
//!
//! Layout: Header | NameTable | StringTable | PathTable | Nodes
//!
//! Name and string tables are written in ordinal byte order and every index
//! in the tree is remapped to match, and object entries are written sorted by
//! name. Readers that binary-search these tables depend on both.

use byaml_common::BinaryWriter;

use crate::header::ByamlHeader;
use crate::node::{Node, NodeType};
use crate::pool::{BlobPool, StringPool};
use crate::{Byaml, Error, Result};

/// Largest count or index that fits the format's 24-bit fields.
const MAX_U24: usize = 0xFF_FFFF;

impl Byaml {
    /// Encode the document into BYAML bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let names = SortedTable::new(&self.names);
        let strings = SortedTable::new(&self.strings);

        let mut writer = BinaryWriter::new(self.endian);
        let mut header = ByamlHeader {
            endian: self.endian,
            version: self.version,
            name_table_offset: 0,
            string_table_offset: 0,
            path_table_offset: 0,
            root_offset: 0,
        };
        header.write(&mut writer);

        if !names.is_empty() {
            header.name_table_offset = write_string_table(&mut writer, &names.sorted)?;
        }
        if !strings.is_empty() {
            header.string_table_offset = write_string_table(&mut writer, &strings.sorted)?;
        }
        if !self.paths.is_empty() {
            header.path_table_offset = write_path_table(&mut writer, &self.paths)?;
        }

        let mut nodes = NodeWriter {
            writer: &mut writer,
            names: &names,
            strings: &strings,
        };
        header.root_offset = match &self.root {
            Node::Null => 0,
            root @ (Node::Array(_) | Node::Object(_)) => nodes.write_container(root)?,
            other => {
                return Err(Error::malformed(format!(
                    "document root must be an array or object, not {:?}",
                    other.node_type()
                )))
            }
        };

        let mut output = writer.into_inner();
        let mut patched = BinaryWriter::new(self.endian);
        header.write(&mut patched);
        output[..ByamlHeader::SIZE].copy_from_slice(&patched.into_inner());

        log::debug!(
            "encoded BYAML: {} bytes, {} names, {} strings, {} paths",
            output.len(),
            self.names.len(),
            self.strings.len(),
            self.paths.len()
        );
        Ok(output)
    }
}

/// A string pool in sorted order plus the old-index to new-index mapping.
struct SortedTable<'a> {
    sorted: Vec<&'a str>,
    remap: Vec<u32>,
}

impl<'a> SortedTable<'a> {
    fn new(pool: &'a StringPool) -> Self {
        let mut order: Vec<usize> = (0..pool.len()).collect();
        order.sort_by(|&a, &b| pool.as_slice()[a].as_bytes().cmp(pool.as_slice()[b].as_bytes()));

        let mut remap = vec![0u32; pool.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = new_index as u32;
        }

        Self {
            sorted: order.iter().map(|&i| pool.as_slice()[i].as_str()).collect(),
            remap,
        }
    }

    fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    fn index(&self, old: u32) -> u32 {
        self.remap[old as usize]
    }
}

fn check_u24(value: usize, what: &str) -> Result<u32> {
    if value > MAX_U24 {
        return Err(Error::malformed(format!(
            "{} {} does not fit in 24 bits",
            what, value
        )));
    }
    Ok(value as u32)
}

fn write_table_header(writer: &mut BinaryWriter, tag: NodeType, count: usize) -> Result<usize> {
    writer.align(4);
    let start = writer.position();
    writer.write_u8(tag as u8);
    writer.write_u24(check_u24(count, "table size")?);
    Ok(start)
}

/// Write a string table with `count + 1` offsets, the last marking the end.
fn write_string_table(writer: &mut BinaryWriter, strings: &[&str]) -> Result<u32> {
    let start = write_table_header(writer, NodeType::StringTable, strings.len())?;
    let offsets = writer.position();
    for _ in 0..=strings.len() {
        writer.write_u32(0);
    }

    for (i, s) in strings.iter().enumerate() {
        let relative = (writer.position() - start) as u32;
        writer.patch_u32(offsets + i * 4, relative);
        writer.write_bytes(s.as_bytes());
        writer.write_u8(0);
    }
    let end = (writer.position() - start) as u32;
    writer.patch_u32(offsets + strings.len() * 4, end);

    Ok(start as u32)
}

fn write_path_table(writer: &mut BinaryWriter, paths: &BlobPool) -> Result<u32> {
    let start = write_table_header(writer, NodeType::DataTable, paths.len())?;
    let offsets = writer.position();
    for _ in 0..=paths.len() {
        writer.write_u32(0);
    }

    for (i, blob) in paths.iter().enumerate() {
        let relative = (writer.position() - start) as u32;
        writer.patch_u32(offsets + i * 4, relative);
        writer.write_bytes(blob);
    }
    let end = (writer.position() - start) as u32;
    writer.patch_u32(offsets + paths.len() * 4, end);

    Ok(start as u32)
}

struct NodeWriter<'w, 'a> {
    writer: &'w mut BinaryWriter,
    names: &'a SortedTable<'a>,
    strings: &'a SortedTable<'a>,
}

impl NodeWriter<'_, '_> {
    /// Write a container and, after it, everything it references.
    /// Returns the container's offset.
    fn write_container(&mut self, node: &Node) -> Result<u32> {
        self.writer.align(4);
        let start = self.writer.position();
        let mut pending: Vec<(usize, &Node)> = Vec::new();

        match node {
            Node::Array(items) => {
                self.writer.write_u8(NodeType::Array as u8);
                self.writer.write_u24(check_u24(items.len(), "array length")?);
                for item in items {
                    self.writer.write_u8(item.node_type() as u8);
                }
                self.writer.align(4);
                for item in items {
                    let slot = self.writer.position();
                    self.write_slot(item)?;
                    if item.node_type().is_container() {
                        pending.push((slot, item));
                    }
                }
            }
            Node::Object(entries) => {
                self.writer.write_u8(NodeType::Object as u8);
                self.writer.write_u24(check_u24(entries.len(), "object size")?);

                let mut sorted: Vec<(u32, &Node)> = entries
                    .iter()
                    .map(|(name, child)| (self.names.index(*name), child))
                    .collect();
                sorted.sort_by_key(|(name, _)| *name);

                for (name, child) in sorted {
                    self.writer.write_u24(check_u24(name as usize, "name index")?);
                    self.writer.write_u8(child.node_type() as u8);
                    let slot = self.writer.position();
                    self.write_slot(child)?;
                    if child.node_type().is_container() {
                        pending.push((slot, child));
                    }
                }
            }
            other => {
                return Err(Error::malformed(format!(
                    "{:?} is not a container",
                    other.node_type()
                )))
            }
        }

        for (slot, child) in pending {
            let offset = self.write_container(child)?;
            self.writer.patch_u32(slot, offset);
        }

        Ok(start as u32)
    }

    /// Write the 4-byte slot value of a child. Containers get a placeholder
    /// that is patched once their offset is known.
    fn write_slot(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::StringRef(i) => self.writer.write_u32(self.strings.index(*i)),
            Node::PathData(i) => self.writer.write_u32(*i),
            Node::Bool(v) => self.writer.write_u32(u32::from(*v)),
            Node::Int32(v) => self.writer.write_i32(*v),
            Node::Float32(v) => self.writer.write_f32(*v),
            Node::Array(_) | Node::Object(_) | Node::Null => self.writer.write_u32(0),
        }
        Ok(())
    }
}
