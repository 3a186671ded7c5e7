use pcd_core::pointcloud::point::PointSet;

use crate::error::Result;

pub mod bin;
pub mod pcd;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self, raw: &[u8]) -> Result<PointSet>;
}

/// How the caller expects a capture to be laid out.
///
/// Headered captures are finally decoded according to their DATA directive;
/// the hint only decides whether a header is looked for at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    HeaderedText,
    HeaderedBinary,
    DenseRecord,
}

impl FormatHint {
    /// Derives the hint from a file name or URL.
    pub fn from_resource_name(name: &str) -> Self {
        let path = name.split('?').next().unwrap_or_default();
        let extension = match path.rsplit_once('.') {
            Some((_, extension)) if !extension.contains('/') => extension,
            _ => "",
        };
        get_format_hint(extension)
    }
}

pub fn get_format_hint(extension: &str) -> FormatHint {
    match extension.to_ascii_lowercase().as_str() {
        "pcd" => FormatHint::HeaderedBinary,
        "txt" | "ascii" => FormatHint::HeaderedText,
        _ => FormatHint::DenseRecord,
    }
}

impl ParserProvider for FormatHint {
    fn get_parser(&self) -> Box<dyn Parser> {
        match self {
            FormatHint::HeaderedText | FormatHint::HeaderedBinary => {
                Box::new(pcd::PcdParser { hint: *self })
            }
            FormatHint::DenseRecord => Box::new(bin::DenseRecordParser),
        }
    }
}
