//! Decoder for point-cloud captures: PCD files (ascii, binary and
//! binary_compressed) and headerless xyzi record dumps.

pub mod codec;
pub mod error;
pub mod loader;
pub mod parsers;

pub use error::{
    CorruptionError, DecodeError, HeaderError, LayoutError, TruncatedInputError,
    UnsupportedChannelError,
};
pub use loader::{load, load_named};
pub use parsers::{FormatHint, Parser, ParserProvider};
