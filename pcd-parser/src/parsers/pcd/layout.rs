use crate::error::LayoutError;

use super::header::{DataEncoding, FieldType, Header};

const POSITION_FIELDS: [&str; 3] = ["x", "y", "z"];

/// Where one field lives inside a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub name: String,
    /// Token index (ascii), byte offset within a row (binary) or byte offset
    /// of the field's block (binary_compressed).
    pub offset: usize,
    pub kind: FieldType,
    pub size: usize,
    pub count: usize,
}

impl FieldSlot {
    /// Bytes one record spends on this field.
    pub fn footprint(&self) -> usize {
        self.size.saturating_mul(self.count)
    }

    pub fn is(&self, kind: FieldType, size: usize) -> bool {
        self.kind == kind && self.size == size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub encoding: DataEncoding,
    pub slots: Vec<FieldSlot>,
    /// Sum of size × count over all fields.
    pub row_stride: usize,
}

impl FieldLayout {
    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn offset(&self, name: &str) -> Option<usize> {
        self.get(name).map(|slot| slot.offset)
    }
}

/// Computes per-field offsets for the header's encoding.
///
/// Binary encodings need SIZE, TYPE and COUNT to line up with FIELDS, and
/// every field must take up at least one byte. Ascii records are addressed by
/// token, so missing entries fall back to a single 4-byte float.
pub fn resolve_layout(header: &Header) -> Result<FieldLayout, LayoutError> {
    let expected = header.fields.len();
    if header.data != DataEncoding::Ascii {
        for (directive, found) in [
            ("SIZE", header.sizes.len()),
            ("TYPE", header.types.len()),
            ("COUNT", header.counts.len()),
        ] {
            if found != expected {
                return Err(LayoutError::CardinalityMismatch {
                    directive,
                    expected,
                    found,
                });
            }
        }
    }

    for name in POSITION_FIELDS {
        if header.field_index(name).is_none() {
            return Err(LayoutError::MissingField(name));
        }
    }

    let mut slots = Vec::with_capacity(expected);
    let mut cursor = 0usize;
    for (i, name) in header.fields.iter().enumerate() {
        let kind = header.types.get(i).copied().unwrap_or(FieldType::Float);
        let size = header.sizes.get(i).copied().unwrap_or(4);
        let count = header.counts.get(i).copied().unwrap_or(1);
        if header.data != DataEncoding::Ascii && size.saturating_mul(count) == 0 {
            return Err(LayoutError::ZeroWidthField(name.clone()));
        }

        let offset = match header.data {
            DataEncoding::Ascii | DataEncoding::Binary => cursor,
            DataEncoding::BinaryCompressed => cursor.saturating_mul(header.points),
        };
        slots.push(FieldSlot {
            name: name.clone(),
            offset,
            kind,
            size,
            count,
        });

        cursor = match header.data {
            DataEncoding::Ascii => cursor.saturating_add(count),
            DataEncoding::Binary | DataEncoding::BinaryCompressed => {
                cursor.saturating_add(size.saturating_mul(count))
            }
        };
    }

    let row_stride = slots
        .iter()
        .fold(0usize, |acc, slot| acc.saturating_add(slot.footprint()));

    Ok(FieldLayout {
        encoding: header.data,
        slots,
        row_stride,
    })
}
