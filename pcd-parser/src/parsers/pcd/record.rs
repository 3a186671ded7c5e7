//! Record traversal for the three PCD encodings.
//!
//! The encodings do not decode the same channels: color is only read from
//! ascii records, velocity only from row-major binary rows, normals are skipped
//! by binary_compressed, and the dead-zone filter runs for ascii and row-major
//! binary but not binary_compressed. Existing producers and consumers depend
//! on this exact behavior, so each traversal keeps its own channel plan.

use byteorder::{ByteOrder as _, LittleEndian};
use log::warn;
use pcd_core::pointcloud::point::{Channels, PointSet};

use crate::codec::lzf;
use crate::error::{LayoutError, Result, TruncatedInputError, UnsupportedChannelError};

use super::header::{FieldType, Header};
use super::layout::{FieldLayout, FieldSlot};

/// Width of the x/y/z values, taken from the `x` field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Single,
    Double,
}

impl Precision {
    fn of(slot: &FieldSlot) -> std::result::Result<Self, UnsupportedChannelError> {
        match (slot.kind, slot.size) {
            (FieldType::Float, 4) => Ok(Precision::Single),
            (FieldType::Float, 8) => Ok(Precision::Double),
            (kind, size) => Err(UnsupportedChannelError {
                channel: "position",
                kind: kind.tag(),
                size,
            }),
        }
    }

    fn read(self, buf: &[u8], at: usize) -> std::result::Result<f64, TruncatedInputError> {
        match self {
            Precision::Single => read_f32(buf, at).map(f64::from),
            Precision::Double => {
                let bytes = slice(buf, at, 8)?;
                Ok(LittleEndian::read_f64(bytes))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntensityKind {
    Byte,
    Float,
}

impl IntensityKind {
    /// `None` (with a warning) for anything but U/1 and F/4.
    fn of(slot: &FieldSlot) -> Option<Self> {
        match (slot.kind, slot.size) {
            (FieldType::UnsignedInt, 1) => Some(IntensityKind::Byte),
            (FieldType::Float, 4) => Some(IntensityKind::Float),
            (kind, size) => {
                let err = UnsupportedChannelError {
                    channel: "intensity",
                    kind: kind.tag(),
                    size,
                };
                warn!("{}; intensity channel omitted", err);
                None
            }
        }
    }

    fn read(self, buf: &[u8], at: usize) -> std::result::Result<f32, TruncatedInputError> {
        match self {
            IntensityKind::Byte => slice(buf, at, 1).map(|bytes| f32::from(bytes[0])),
            IntensityKind::Float => read_f32(buf, at),
        }
    }
}

fn slice(buf: &[u8], at: usize, len: usize) -> std::result::Result<&[u8], TruncatedInputError> {
    at.checked_add(len)
        .and_then(|end| buf.get(at..end))
        .ok_or(TruncatedInputError {
            context: "field value",
            needed: at.saturating_add(len),
            available: buf.len(),
        })
}

fn read_f32(buf: &[u8], at: usize) -> std::result::Result<f32, TruncatedInputError> {
    slice(buf, at, 4).map(LittleEndian::read_f32)
}

/// Declared record count, capped by how many rows `bytes` can hold.
fn records_in(points: usize, bytes: usize, row_stride: usize) -> usize {
    points.min(bytes / row_stride.max(1))
}

fn is_dead_zone(x: f64, y: f64, z: f64) -> bool {
    x.is_nan() || (x == 0.0 && y == 0.0 && z == 0.0)
}

struct Position<'a> {
    x: &'a FieldSlot,
    y: &'a FieldSlot,
    z: &'a FieldSlot,
    precision: Precision,
}

impl<'a> Position<'a> {
    fn resolve(layout: &'a FieldLayout) -> Result<Self> {
        // resolve_layout guarantees all three exist
        let field = |name: &'static str| layout.get(name).ok_or(LayoutError::MissingField(name));
        let x = field("x")?;
        Ok(Position {
            x,
            y: field("y")?,
            z: field("z")?,
            precision: Precision::of(x)?,
        })
    }
}

fn float_triplet<'a>(
    layout: &'a FieldLayout,
    names: [&str; 3],
    channel: &'static str,
) -> Option<[&'a FieldSlot; 3]> {
    let slots = [
        layout.get(names[0])?,
        layout.get(names[1])?,
        layout.get(names[2])?,
    ];
    if slots[0].is(FieldType::Float, 4) {
        Some(slots)
    } else {
        let err = UnsupportedChannelError {
            channel,
            kind: slots[0].kind.tag(),
            size: slots[0].size,
        };
        warn!("{}; {} channel omitted", err, channel);
        None
    }
}

fn velocity_pair(layout: &FieldLayout) -> Option<[&FieldSlot; 2]> {
    let slots = [layout.get("vx")?, layout.get("vy")?];
    match slots.iter().find(|slot| !slot.is(FieldType::Float, 4)) {
        None => Some(slots),
        Some(slot) => {
            let err = UnsupportedChannelError {
                channel: "velocity",
                kind: slot.kind.tag(),
                size: slot.size,
            };
            warn!("{}; velocity channel omitted", err);
            None
        }
    }
}

/// Whitespace-separated records, one per line.
pub fn decode_ascii(header: &Header, layout: &FieldLayout, raw: &[u8]) -> Result<PointSet> {
    let body = String::from_utf8_lossy(raw.get(header.header_len..).unwrap_or_default());

    let position = Position::resolve(layout)?;
    let intensity = layout
        .get("intensity")
        .and_then(|slot| IntensityKind::of(slot).map(|kind| (slot.offset, kind)));
    let rgb = layout.offset("rgb");
    let normal = match (
        layout.offset("normal_x"),
        layout.offset("normal_y"),
        layout.offset("normal_z"),
    ) {
        (Some(nx), Some(ny), Some(nz)) => Some([nx, ny, nz]),
        _ => None,
    };

    let channels = Channels {
        intensity: intensity.is_some(),
        color: rgb.is_some(),
        normal: normal.is_some(),
        velocity: false,
    };
    let mut points = PointSet::with_capacity(header.points.min(body.len()), channels);

    for line in body.split('\n') {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        // a missing or malformed token becomes NaN and falls to the dead-zone filter
        let number = |index: usize| -> f64 {
            tokens
                .get(index)
                .and_then(|token| token.parse::<f64>().ok())
                .unwrap_or(f64::NAN)
        };

        let (x, y, z) = (
            number(position.x.offset),
            number(position.y.offset),
            number(position.z.offset),
        );
        if is_dead_zone(x, y, z) {
            continue;
        }
        points.push_position(x, y, z);

        if let Some(index) = rgb {
            let packed = number(index) as i64 as i32;
            points.color.extend_from_slice(&[
                ((packed >> 16) & 0xff) as f32 / 255.0,
                ((packed >> 8) & 0xff) as f32 / 255.0,
                (packed & 0xff) as f32 / 255.0,
            ]);
        }

        if let Some([nx, ny, nz]) = normal {
            points
                .normal
                .extend_from_slice(&[number(nx) as f32, number(ny) as f32, number(nz) as f32]);
        }

        if let Some((index, kind)) = intensity {
            let value = match kind {
                IntensityKind::Byte => number(index).trunc(),
                IntensityKind::Float => number(index),
            };
            points.intensity.push(value as f32);
        }
    }

    Ok(points)
}

/// Fixed-size rows, all fields of a point stored together.
pub fn decode_row_major(header: &Header, layout: &FieldLayout, raw: &[u8]) -> Result<PointSet> {
    let needed = header
        .points
        .checked_mul(layout.row_stride)
        .and_then(|body| body.checked_add(header.header_len));
    let body = match needed {
        Some(end) if end <= raw.len() => &raw[header.header_len..end],
        _ => {
            return Err(TruncatedInputError {
                context: "binary records",
                needed: needed.unwrap_or(usize::MAX),
                available: raw.len(),
            }
            .into())
        }
    };

    let position = Position::resolve(layout)?;
    let intensity = layout
        .get("intensity")
        .and_then(|slot| IntensityKind::of(slot).map(|kind| (slot.offset, kind)));
    let normal = float_triplet(layout, ["normal_x", "normal_y", "normal_z"], "normal");
    let velocity = velocity_pair(layout);

    let channels = Channels {
        intensity: intensity.is_some(),
        color: false,
        normal: normal.is_some(),
        velocity: velocity.is_some(),
    };
    let capacity = records_in(header.points, body.len(), layout.row_stride);
    let mut points = PointSet::with_capacity(capacity, channels);

    for row in (0..header.points).map(|i| i * layout.row_stride) {
        let x = position.precision.read(body, row + position.x.offset)?;
        let y = position.precision.read(body, row + position.y.offset)?;
        let z = position.precision.read(body, row + position.z.offset)?;
        if is_dead_zone(x, y, z) {
            continue;
        }
        points.push_position(x, y, z);

        if let Some([nx, ny, nz]) = normal {
            for slot in [nx, ny, nz] {
                points.normal.push(read_f32(body, row + slot.offset)?);
            }
        }

        if let Some([vx, vy]) = velocity {
            points.velocity.extend_from_slice(&[
                read_f32(body, row + vx.offset)?,
                read_f32(body, row + vy.offset)?,
                0.0,
            ]);
        }

        if let Some((offset, kind)) = intensity {
            points.intensity.push(kind.read(body, row + offset)?);
        }
    }

    Ok(points)
}

/// LZF-compressed field blocks, each holding one field for every point.
///
/// The body starts with two little-endian u32 values, the compressed and the
/// decompressed byte counts. Records are not dead-zone filtered.
pub fn decode_column_major(header: &Header, layout: &FieldLayout, raw: &[u8]) -> Result<PointSet> {
    let sizes_end = header.header_len.saturating_add(8);
    let sizes = raw
        .get(header.header_len..sizes_end)
        .ok_or(TruncatedInputError {
            context: "compressed size prefix",
            needed: sizes_end,
            available: raw.len(),
        })?;
    let compressed_size = LittleEndian::read_u32(&sizes[0..4]) as usize;
    let decompressed_size = LittleEndian::read_u32(&sizes[4..8]) as usize;

    let compressed_end = sizes_end.saturating_add(compressed_size);
    let compressed = raw
        .get(sizes_end..compressed_end)
        .ok_or(TruncatedInputError {
            context: "compressed records",
            needed: compressed_end,
            available: raw.len(),
        })?;
    let body = lzf::decompress(compressed, decompressed_size)?;

    let required = header.points.saturating_mul(layout.row_stride);
    if body.len() < required {
        return Err(TruncatedInputError {
            context: "decompressed records",
            needed: required,
            available: body.len(),
        }
        .into());
    }

    let position = Position::resolve(layout)?;
    let intensity = layout
        .get("intensity")
        .and_then(|slot| IntensityKind::of(slot).map(|kind| (slot, kind)));

    let channels = Channels {
        intensity: intensity.is_some(),
        ..Default::default()
    };
    let capacity = records_in(header.points, body.len(), layout.row_stride);
    let mut points = PointSet::with_capacity(capacity, channels);
    let element = |slot: &FieldSlot, i: usize| slot.offset + slot.footprint() * i;

    for i in 0..header.points {
        let x = position.precision.read(&body, element(position.x, i))?;
        let y = position.precision.read(&body, element(position.y, i))?;
        let z = position.precision.read(&body, element(position.z, i))?;
        points.push_position(x, y, z);

        if let Some((slot, kind)) = intensity {
            points.intensity.push(kind.read(&body, element(slot, i))?);
        }
    }

    Ok(points)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::lzf::tests::literal_stream;
    use crate::error::DecodeError;
    use crate::parsers::pcd::header::{parse_header, DataEncoding};
    use crate::parsers::pcd::layout::resolve_layout;

    fn decode(raw: &[u8]) -> Result<PointSet> {
        let header = parse_header(raw)?;
        let layout = resolve_layout(&header)?;
        match header.data {
            DataEncoding::Ascii => decode_ascii(&header, &layout, raw),
            DataEncoding::Binary => decode_row_major(&header, &layout, raw),
            DataEncoding::BinaryCompressed => decode_column_major(&header, &layout, raw),
        }
    }

    /// Row-major xyz + u8 intensity body.
    pub(crate) fn xyzi_rows(points: &[([f32; 3], u8)]) -> Vec<u8> {
        let mut body = Vec::with_capacity(points.len() * 13);
        for (xyz, intensity) in points {
            for value in xyz {
                body.extend_from_slice(&value.to_le_bytes());
            }
            body.push(*intensity);
        }
        body
    }

    fn transpose(points: &[([f32; 3], u8)]) -> Vec<u8> {
        let mut blocks = Vec::with_capacity(points.len() * 13);
        for axis in 0..3 {
            for (xyz, _) in points {
                blocks.extend_from_slice(&xyz[axis].to_le_bytes());
            }
        }
        blocks.extend(points.iter().map(|(_, intensity)| *intensity));
        blocks
    }

    fn with_size_prefix(stream: &[u8], decompressed_len: usize) -> Vec<u8> {
        let mut body = Vec::with_capacity(stream.len() + 8);
        body.extend_from_slice(&(stream.len() as u32).to_le_bytes());
        body.extend_from_slice(&(decompressed_len as u32).to_le_bytes());
        body.extend_from_slice(stream);
        body
    }

    /// Same points as `xyzi_rows`, transposed into field blocks and
    /// wrapped in the compressed size prefix.
    pub(crate) fn xyzi_blocks(points: &[([f32; 3], u8)]) -> Vec<u8> {
        let blocks = transpose(points);
        with_size_prefix(&literal_stream(&blocks), blocks.len())
    }

    /// Like `xyzi_blocks`, compressed by a real LZF encoder.
    pub(crate) fn xyzi_blocks_packed(points: &[([f32; 3], u8)]) -> Vec<u8> {
        let blocks = transpose(points);
        let stream = ::lzf::compress(&blocks).unwrap();
        with_size_prefix(&stream, blocks.len())
    }

    pub(crate) fn xyzi_header(points: usize, data: &str) -> String {
        format!(
            "# .PCD v0.7 - Point Cloud Data file format\nVERSION 0.7\nFIELDS x y z intensity\nSIZE 4 4 4 1\nTYPE F F F U\nWIDTH {points}\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS {points}\nDATA {data}\n"
        )
    }

    pub(crate) fn capture(header: &str, body: &[u8]) -> Vec<u8> {
        let mut raw = header.as_bytes().to_vec();
        raw.extend_from_slice(body);
        raw
    }

    const SAMPLE: [([f32; 3], u8); 4] = [
        ([1.5, -2.25, 3.0], 10),
        ([0.0, 0.0, 0.0], 20),
        ([-7.125, 8.0, 0.001], 30),
        ([f32::NAN, 1.0, 1.0], 40),
    ];

    #[test]
    fn ascii_keeps_well_formed_points() {
        let raw = "FIELDS x y z\nDATA ascii\n1 2 3\n4 5 6\n\n7 8 9\n";
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.position.len(), 3 * 3);
        assert_eq!(
            points.position,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
        assert!(points.intensity.is_empty());
        assert!(points.is_consistent());
    }

    #[test]
    fn ascii_dead_zone_drops_every_channel() {
        let raw = "FIELDS x y z intensity normal_x normal_y normal_z\nSIZE 4 4 4 4 4 4 4\nTYPE F F F F F F F\nDATA ascii\n\
1 1 1 0.5 0 0 1\n\
0 0 0 0.7 0 1 0\n\
nan 2 2 0.9 1 0 0\n\
bad 2 2 0.9 1 0 0\n\
\n\
3 3 3 0.25 1 0 0\n";
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.position, vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0]);
        assert_eq!(points.intensity, vec![0.5, 0.25]);
        assert_eq!(points.normal, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        assert!(points.is_consistent());
    }

    #[test]
    fn ascii_unpacks_rgb() {
        let packed = (255 << 16) | (128 << 8) | 1;
        let raw = format!("FIELDS x y z rgb\nDATA ascii\n1 2 3 {packed}\n");
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.color, vec![1.0, 128.0 / 255.0, 1.0 / 255.0]);
    }

    #[test]
    fn ascii_byte_intensity_is_truncated() {
        let raw = "FIELDS x y z intensity\nSIZE 4 4 4 1\nTYPE F F F U\nDATA ascii\n1 1 1 12.75\n";
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.intensity, vec![12.0]);
    }

    #[test]
    fn ascii_unsupported_intensity_is_omitted() {
        let raw = "FIELDS x y z intensity\nSIZE 4 4 4 2\nTYPE F F F U\nDATA ascii\n1 1 1 12\n";
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points.intensity.is_empty());
    }

    #[test]
    fn ascii_handles_crlf_lines() {
        let raw = "FIELDS x y z\r\nDATA ascii\r\n1 2 3\r\n4 5 6\r\n";
        let points = decode(raw.as_bytes()).unwrap();
        assert_eq!(points.position, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn row_major_decodes_and_filters() {
        let raw = capture(&xyzi_header(SAMPLE.len(), "binary"), &xyzi_rows(&SAMPLE));
        let points = decode(&raw).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points.position,
            vec![
                1.5,
                -2.25,
                3.0,
                -7.125,
                8.0,
                f64::from(0.001f32)
            ]
        );
        assert_eq!(points.intensity, vec![10.0, 30.0]);
        assert!(points.color.is_empty());
    }

    #[test]
    fn row_major_reads_double_positions() {
        let mut body = Vec::new();
        for value in [1.0e-12f64, 2.0, 3.0] {
            body.extend_from_slice(&value.to_le_bytes());
        }
        body.extend_from_slice(&0.5f32.to_le_bytes());
        let raw = capture(
            "FIELDS x y z intensity\nSIZE 8 8 8 4\nTYPE F F F F\nPOINTS 1\nDATA binary\n",
            &body,
        );
        let points = decode(&raw).unwrap();
        assert_eq!(points.position, vec![1.0e-12, 2.0, 3.0]);
        assert_eq!(points.intensity, vec![0.5]);
    }

    #[test]
    fn row_major_reads_normals_and_velocity() {
        let mut body = Vec::new();
        for value in [1.0f32, 2.0, 3.0, 0.0, 1.0, 0.0, 4.5, -1.5] {
            body.extend_from_slice(&value.to_le_bytes());
        }
        let raw = capture(
            "FIELDS x y z normal_x normal_y normal_z vx vy\nSIZE 4 4 4 4 4 4 4 4\nTYPE F F F F F F F F\nPOINTS 1\nDATA binary\n",
            &body,
        );
        let points = decode(&raw).unwrap();
        assert_eq!(points.normal, vec![0.0, 1.0, 0.0]);
        assert_eq!(points.velocity, vec![4.5, -1.5, 0.0]);
        assert!(points.is_consistent());
    }

    #[test]
    fn row_major_never_populates_color() {
        let mut body = Vec::new();
        for value in [1.0f32, 2.0, 3.0] {
            body.extend_from_slice(&value.to_le_bytes());
        }
        body.extend_from_slice(&[1, 2, 3, 0]);
        let raw = capture(
            "FIELDS x y z rgb\nSIZE 4 4 4 4\nTYPE F F F U\nPOINTS 1\nDATA binary\n",
            &body,
        );
        let points = decode(&raw).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points.color.is_empty());
    }

    #[test]
    fn row_major_unsupported_intensity_is_omitted() {
        let mut body = Vec::new();
        for value in [1.0f32, 2.0, 3.0] {
            body.extend_from_slice(&value.to_le_bytes());
        }
        body.extend_from_slice(&7u16.to_le_bytes());
        let raw = capture(
            "FIELDS x y z intensity\nSIZE 4 4 4 2\nTYPE F F F U\nPOINTS 1\nDATA binary\n",
            &body,
        );
        let points = decode(&raw).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points.intensity.is_empty());
    }

    #[test]
    fn row_major_short_body_is_truncated() {
        let mut raw = capture(&xyzi_header(SAMPLE.len(), "binary"), &xyzi_rows(&SAMPLE));
        raw.truncate(raw.len() - 1);
        assert!(matches!(
            decode(&raw),
            Err(DecodeError::TruncatedInput(TruncatedInputError {
                context: "binary records",
                ..
            }))
        ));
    }

    #[test]
    fn integer_position_is_unsupported() {
        let raw = capture(
            "FIELDS x y z\nSIZE 2 2 2\nTYPE I I I\nPOINTS 1\nDATA binary\n",
            &[1, 0, 2, 0, 3, 0],
        );
        assert_eq!(
            decode(&raw),
            Err(DecodeError::UnsupportedChannel(UnsupportedChannelError {
                channel: "position",
                kind: 'I',
                size: 2
            }))
        );
    }

    #[test]
    fn column_major_keeps_dead_zone_points() {
        let raw = capture(
            &xyzi_header(SAMPLE.len(), "binary_compressed"),
            &xyzi_blocks(&SAMPLE),
        );
        let points = decode(&raw).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(&points.position[3..6], &[0.0, 0.0, 0.0]);
        assert!(points.position[9].is_nan());
        assert_eq!(points.intensity, vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn origin_is_filtered_only_outside_compressed_records() {
        let sample = [([0.0f32, 0.0, 0.0], 1), ([1.0, 2.0, 3.0], 2)];
        let ascii = "FIELDS x y z intensity\nSIZE 4 4 4 1\nTYPE F F F U\nDATA ascii\n0 0 0 1\n1 2 3 2\n";
        let rows = capture(&xyzi_header(2, "binary"), &xyzi_rows(&sample));
        let blocks = capture(&xyzi_header(2, "binary_compressed"), &xyzi_blocks(&sample));

        assert_eq!(decode(ascii.as_bytes()).unwrap().len(), 1);
        assert_eq!(decode(&rows).unwrap().len(), 1);
        assert_eq!(decode(&blocks).unwrap().len(), 2);
    }

    #[test]
    fn row_and_column_major_agree_on_positions() {
        let sample: Vec<([f32; 3], u8)> = (1..=50)
            .map(|i| {
                let f = i as f32;
                ([f * 0.1, -f / 3.0, f * f * 1.0e-3], i as u8)
            })
            .collect();
        let rows = capture(&xyzi_header(sample.len(), "binary"), &xyzi_rows(&sample));
        let blocks = capture(
            &xyzi_header(sample.len(), "binary_compressed"),
            &xyzi_blocks(&sample),
        );

        let from_rows = decode(&rows).unwrap();
        let from_blocks = decode(&blocks).unwrap();
        assert_eq!(from_rows.len(), 50);
        assert_eq!(from_rows.position, from_blocks.position);
        assert_eq!(from_rows.intensity, from_blocks.intensity);
    }

    #[test]
    fn row_and_column_major_agree_on_encoded_repetitive_scan() {
        let ring = [
            ([1.0f32, 0.0, 0.5], 10),
            ([0.0, 1.0, 0.5], 20),
            ([-1.0, 0.0, 0.5], 30),
            ([0.0, -1.0, 0.5], 40),
            ([0.5, 0.5, 1.5], 50),
        ];
        let sample: Vec<([f32; 3], u8)> = ring.iter().copied().cycle().take(400).collect();

        let packed = xyzi_blocks_packed(&sample);
        // back-references shrink the blocks well below their raw size
        assert!(packed.len() < sample.len() * 13 / 4);

        let rows = capture(&xyzi_header(sample.len(), "binary"), &xyzi_rows(&sample));
        let blocks = capture(&xyzi_header(sample.len(), "binary_compressed"), &packed);
        let from_rows = decode(&rows).unwrap();
        let from_blocks = decode(&blocks).unwrap();
        assert_eq!(from_rows.len(), 400);
        assert_eq!(from_rows.position, from_blocks.position);
        assert_eq!(from_rows.intensity, from_blocks.intensity);
    }

    #[test]
    fn column_major_corrupt_stream_is_rejected() {
        let mut body = Vec::new();
        body.extend_from_slice(&2u32.to_le_bytes());
        body.extend_from_slice(&13u32.to_le_bytes());
        body.extend_from_slice(&[0x20, 0x00]);
        let raw = capture(&xyzi_header(1, "binary_compressed"), &body);
        assert!(matches!(decode(&raw), Err(DecodeError::Corruption(_))));
    }

    #[test]
    fn column_major_missing_prefix_is_truncated() {
        let raw = capture(&xyzi_header(1, "binary_compressed"), &[1, 0, 0]);
        assert!(matches!(
            decode(&raw),
            Err(DecodeError::TruncatedInput(TruncatedInputError {
                context: "compressed size prefix",
                ..
            }))
        ));
    }

    #[test]
    fn column_major_short_payload_is_truncated() {
        let sample = [([1.0f32, 2.0, 3.0], 4)];
        let raw = capture(&xyzi_header(2, "binary_compressed"), &xyzi_blocks(&sample));
        assert!(matches!(
            decode(&raw),
            Err(DecodeError::TruncatedInput(TruncatedInputError {
                context: "decompressed records",
                needed: 26,
                available: 13
            }))
        ));
    }
}
