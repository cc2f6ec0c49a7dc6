//! Growable binary output buffer.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::Endian;

/// An in-memory binary writer with a runtime byte order.
///
/// Offsets that are only known after later data has been laid out can be
/// reserved with a placeholder and filled in with [`BinaryWriter::patch_u32`].
#[derive(Debug, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    /// Byte order used for multi-byte writes.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Current write position (the number of bytes written so far).
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        match self.endian {
            Endian::Big => BigEndian::write_u16(&mut bytes, value),
            Endian::Little => LittleEndian::write_u16(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24(&mut self, value: u32) {
        let mut bytes = [0u8; 3];
        match self.endian {
            Endian::Big => BigEndian::write_u24(&mut bytes, value),
            Endian::Little => LittleEndian::write_u24(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        let bytes = self.encode_u32(value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Pad with zero bytes up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) {
        while self.buf.len() % alignment != 0 {
            self.buf.push(0);
        }
    }

    /// Overwrite a previously written u32 at an absolute position.
    ///
    /// # Panics
    ///
    /// Panics if `position + 4` is past the end of the written data.
    pub fn patch_u32(&mut self, position: usize, value: u32) {
        let bytes = self.encode_u32(value);
        self.buf[position..position + 4].copy_from_slice(&bytes);
    }

    /// Consume the writer, returning the written bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn encode_u32(&self, value: u32) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        match self.endian {
            Endian::Big => BigEndian::write_u32(&mut bytes, value),
            Endian::Little => LittleEndian::write_u32(&mut bytes, value),
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryReader;

    #[test]
    fn test_write_then_read() {
        let mut writer = BinaryWriter::new(Endian::Little);
        writer.write_u8(0xC0);
        writer.write_u24(3);
        writer.write_f32(-2.25);
        writer.write_u16(7);
        writer.align(4);
        assert_eq!(writer.position(), 12);

        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes, Endian::Little);
        assert_eq!(reader.read_u8().unwrap(), 0xC0);
        assert_eq!(reader.read_u24().unwrap(), 3);
        assert_eq!(reader.read_f32().unwrap(), -2.25);
        assert_eq!(reader.read_u16().unwrap(), 7);
    }

    #[test]
    fn test_patch_u32() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_u32(0);
        writer.write_u32(0xAABBCCDD);
        writer.patch_u32(0, 0x11223344);
        assert_eq!(
            writer.into_inner(),
            vec![0x11, 0x22, 0x33, 0x44, 0xAA, 0xBB, 0xCC, 0xDD]
        );
    }
}
