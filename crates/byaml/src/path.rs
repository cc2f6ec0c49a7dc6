//! Path point records stored in the path table.

use byaml_common::{BinaryReader, BinaryWriter, Endian};

use crate::error::PoolKind;
use crate::pool::BlobPool;
use crate::{Byaml, Error, Result};

/// One point of a path: position, normal and an integer tag.
///
/// Stored as six `f32` followed by one `i32` in the document's byte order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PathPoint {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub value: i32,
}

impl PathPoint {
    /// Size of one encoded record in bytes.
    pub const SIZE: usize = 28;

    /// Read one record.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut point = PathPoint::default();
        for v in point.position.iter_mut() {
            *v = reader.read_f32()?;
        }
        for v in point.normal.iter_mut() {
            *v = reader.read_f32()?;
        }
        point.value = reader.read_i32()?;
        Ok(point)
    }

    /// Append one record.
    pub fn write(&self, writer: &mut BinaryWriter) {
        for &v in self.position.iter().chain(self.normal.iter()) {
            writer.write_f32(v);
        }
        writer.write_i32(self.value);
    }
}

/// Split a path blob into its point records.
pub fn decode_points(blob: &[u8], endian: Endian) -> Result<Vec<PathPoint>> {
    if blob.len() % PathPoint::SIZE != 0 {
        return Err(Error::malformed(format!(
            "path data of {} bytes is not a whole number of {}-byte points",
            blob.len(),
            PathPoint::SIZE
        )));
    }

    let mut reader = BinaryReader::new(blob, endian);
    let mut points = Vec::with_capacity(blob.len() / PathPoint::SIZE);
    while !reader.is_empty() {
        points.push(PathPoint::read(&mut reader)?);
    }
    Ok(points)
}

/// Pack point records into a path blob.
pub fn encode_points(points: &[PathPoint], endian: Endian) -> Vec<u8> {
    let mut writer = BinaryWriter::new(endian);
    for point in points {
        point.write(&mut writer);
    }
    writer.into_inner()
}

impl Byaml {
    /// Change the document's byte order, re-packing path blobs to match.
    pub fn set_endian(&mut self, endian: Endian) -> Result<()> {
        if endian == self.endian {
            return Ok(());
        }
        let blobs = self
            .paths
            .iter()
            .map(|blob| -> Result<Vec<u8>> {
                Ok(encode_points(&decode_points(blob, self.endian)?, endian))
            })
            .collect::<Result<Vec<_>>>()?;
        self.paths = BlobPool::from_entries(PoolKind::Paths, blobs);
        self.endian = endian;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_points_make_56_bytes() {
        let points = [
            PathPoint {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 1.0, 0.0],
                value: 7,
            },
            PathPoint {
                position: [-4.5, 0.25, 100.0],
                normal: [0.0, 0.0, -1.0],
                value: -1,
            },
        ];
        let blob = encode_points(&points, Endian::Big);
        assert_eq!(blob.len(), 56);
        assert_eq!(&blob[..4], &1.0f32.to_be_bytes());
        assert_eq!(decode_points(&blob, Endian::Big).unwrap(), points);
    }

    #[test]
    fn test_truncated_blob_is_malformed() {
        let err = decode_points(&[0u8; 30], Endian::Little).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_set_endian_repacks_paths() {
        let point = PathPoint {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 0.0, 1.0],
            value: -2,
        };
        let mut doc = Byaml::new(Endian::Big, 1);
        let index = doc.paths.intern(encode_points(&[point], Endian::Big).as_slice());
        doc.root = crate::Node::Array(vec![crate::Node::PathData(index)]);

        doc.set_endian(Endian::Little).unwrap();
        assert_eq!(doc.endian, Endian::Little);
        let blob = doc.path(index).unwrap();
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(decode_points(blob, Endian::Little).unwrap(), vec![point]);
    }
}
