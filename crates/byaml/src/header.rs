//! BYAML file header.

use byaml_common::{BinaryReader, BinaryWriter, Endian};

use crate::node::NodeType;
use crate::{Error, Result};

/// BYAML file header.
///
/// Two layouts exist in the wild. Both start with a two-byte magic, a `u16`
/// version and the name and string table offsets. Files with paths carry a
/// path table offset before the root offset (20 bytes total); files without
/// one go straight to the root offset (16 bytes). The third offset is taken
/// as a path table offset when it is zero or points at a path table node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByamlHeader {
    /// Byte order selected by the magic.
    pub endian: Endian,
    /// Format version.
    pub version: u16,
    /// Offset of the name table, or 0 if absent.
    pub name_table_offset: u32,
    /// Offset of the string table, or 0 if absent.
    pub string_table_offset: u32,
    /// Offset of the path table, or 0 if absent.
    pub path_table_offset: u32,
    /// Offset of the root node, or 0 for an empty document.
    pub root_offset: u32,
}

impl ByamlHeader {
    /// Magic of big-endian files.
    pub const MAGIC_BIG: &'static [u8; 2] = b"BY";

    /// Magic of little-endian files.
    pub const MAGIC_LITTLE: &'static [u8; 2] = b"YB";

    /// Size of the header as written by this crate.
    pub const SIZE: usize = 20;

    /// Detect the byte order from the magic, if it is a BYAML magic.
    pub fn detect(data: &[u8]) -> Option<Endian> {
        match data.get(..2)? {
            m if m == Self::MAGIC_BIG => Some(Endian::Big),
            m if m == Self::MAGIC_LITTLE => Some(Endian::Little),
            _ => None,
        }
    }

    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let endian = Self::detect(data).ok_or_else(|| Error::InvalidMagic {
            actual: data[..2.min(data.len())].to_vec(),
        })?;

        let mut reader = BinaryReader::new_at(data, 2, endian);
        let version = reader.read_u16()?;
        let name_table_offset = reader.read_u32()?;
        let string_table_offset = reader.read_u32()?;
        let third = reader.read_u32()?;

        let points_at_path_table =
            data.get(third as usize).copied() == Some(NodeType::DataTable as u8);

        let (path_table_offset, root_offset) = if third != 0 && !points_at_path_table {
            (0, third)
        } else if reader.remaining() >= 4 {
            (third, reader.read_u32()?)
        } else {
            (0, 0)
        };

        Ok(Self {
            endian,
            version,
            name_table_offset,
            string_table_offset,
            path_table_offset,
            root_offset,
        })
    }

    /// Write the header in its 20-byte form.
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(match self.endian {
            Endian::Big => Self::MAGIC_BIG,
            Endian::Little => Self::MAGIC_LITTLE,
        });
        writer.write_u16(self.version);
        writer.write_u32(self.name_table_offset);
        writer.write_u32(self.string_table_offset);
        writer.write_u32(self.path_table_offset);
        writer.write_u32(self.root_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(ByamlHeader::detect(b"BY\0\x01"), Some(Endian::Big));
        assert_eq!(ByamlHeader::detect(b"YB\x01\0"), Some(Endian::Little));
        assert_eq!(ByamlHeader::detect(b"XX"), None);
        assert_eq!(ByamlHeader::detect(b"B"), None);
    }

    #[test]
    fn test_invalid_magic() {
        let result = ByamlHeader::parse(b"NOPE");
        assert!(matches!(result, Err(Error::InvalidMagic { .. })));
    }

    #[test]
    fn test_header_without_path_table() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_bytes(b"BY");
        writer.write_u16(1);
        writer.write_u32(0x10);
        writer.write_u32(0);
        writer.write_u32(0x20); // root
        writer.align(0x20);
        writer.write_u8(0xC1);
        let data = writer.into_inner();

        let header = ByamlHeader::parse(&data).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.path_table_offset, 0);
        assert_eq!(header.root_offset, 0x20);
    }

    #[test]
    fn test_header_with_path_table() {
        let mut writer = BinaryWriter::new(Endian::Little);
        writer.write_bytes(b"YB");
        writer.write_u16(1);
        writer.write_u32(0);
        writer.write_u32(0);
        writer.write_u32(0x14); // path table
        writer.write_u32(0x1C); // root
        writer.write_u8(0xC3);
        let data = writer.into_inner();

        let header = ByamlHeader::parse(&data).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.path_table_offset, 0x14);
        assert_eq!(header.root_offset, 0x1C);
    }

    #[test]
    fn test_header_write_parse() {
        let header = ByamlHeader {
            endian: Endian::Big,
            version: 1,
            name_table_offset: 0x14,
            string_table_offset: 0,
            path_table_offset: 0,
            root_offset: 0x40,
        };
        let mut writer = BinaryWriter::new(Endian::Big);
        header.write(&mut writer);
        let data = writer.into_inner();
        assert_eq!(data.len(), ByamlHeader::SIZE);
        assert_eq!(ByamlHeader::parse(&data).unwrap(), header);
    }
}
