use log::debug;
use pcd_core::pointcloud::point::PointSet;

use crate::error::Result;
use crate::parsers::{FormatHint, ParserProvider as _};

/// Decodes one capture.
///
/// `DenseRecord` buffers are read as fixed xyzi records; any other hint makes
/// the textual header authoritative for the record encoding.
///
/// # Errors
/// Header, layout, decompression and truncation failures abort the decode.
/// Optional channels with an unsupported type/size are left out of the
/// result instead.
pub fn load(raw: &[u8], hint: FormatHint) -> Result<PointSet> {
    let parser = hint.get_parser();
    let points = parser.parse(raw)?;

    debug!(
        "decoded {} points from {} bytes ({:?}): {:?}",
        points.len(),
        raw.len(),
        hint,
        points.channels()
    );
    Ok(points)
}

/// Like [`load`], deriving the hint from a file name or URL.
pub fn load_named(raw: &[u8], name: &str) -> Result<PointSet> {
    load(raw, FormatHint::from_resource_name(name))
}
