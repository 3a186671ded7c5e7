use byteorder::{ByteOrder as _, LittleEndian};
use pcd_core::pointcloud::point::{Channels, PointSet};

use crate::error::{Result, TruncatedInputError};

use super::Parser;

/// x, y, z, intensity as little-endian f32.
pub const RECORD_SIZE: usize = 4 * 4;

/// Headerless captures made of fixed xyzi records (KITTI velodyne scans).
///
/// Records are taken as-is; no dead-zone filtering applies.
pub struct DenseRecordParser;

impl Parser for DenseRecordParser {
    fn parse(&self, raw: &[u8]) -> Result<PointSet> {
        if raw.len() % RECORD_SIZE != 0 {
            return Err(TruncatedInputError {
                context: "dense records",
                needed: raw.len().next_multiple_of(RECORD_SIZE),
                available: raw.len(),
            }
            .into());
        }

        let count = raw.len() / RECORD_SIZE;
        let channels = Channels {
            intensity: true,
            ..Default::default()
        };
        let mut points = PointSet::with_capacity(count, channels);
        let mut values = [0f32; 4];
        for record in raw.chunks_exact(RECORD_SIZE) {
            LittleEndian::read_f32_into(record, &mut values);
            let [x, y, z, intensity] = values;
            points.push_position(f64::from(x), f64::from(y), f64::from(z));
            points.intensity.push(intensity);
        }

        Ok(points)
    }
}
