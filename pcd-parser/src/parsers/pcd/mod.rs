use log::debug;
use pcd_core::pointcloud::point::PointSet;

use crate::error::Result;

use super::{FormatHint, Parser};

pub mod header;
pub mod layout;
pub mod record;

use header::{parse_header, DataEncoding};
use layout::resolve_layout;

/// Captures that start with a textual PCD header.
pub struct PcdParser {
    pub hint: FormatHint,
}

impl Parser for PcdParser {
    fn parse(&self, raw: &[u8]) -> Result<PointSet> {
        let header = parse_header(raw)?;
        let layout = resolve_layout(&header)?;

        let hinted_text = self.hint == FormatHint::HeaderedText;
        if hinted_text != (layout.encoding == DataEncoding::Ascii) {
            debug!(
                "format hint {:?} disagrees with DATA {:?}, following the header",
                self.hint, layout.encoding
            );
        }

        match layout.encoding {
            DataEncoding::Ascii => record::decode_ascii(&header, &layout, raw),
            DataEncoding::Binary => record::decode_row_major(&header, &layout, raw),
            DataEncoding::BinaryCompressed => record::decode_column_major(&header, &layout, raw),
        }
    }
}
