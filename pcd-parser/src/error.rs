use thiserror::Error;

/// The textual header could not be turned into a `Header`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderError {
    #[error("missing {0} directive")]
    MissingDirective(&'static str),

    #[error("invalid number {token:?} in {directive} directive")]
    InvalidNumber {
        directive: &'static str,
        token: String,
    },

    #[error("invalid field type {0:?}, expected one of F, U, I")]
    InvalidType(String),

    #[error("unknown data encoding {0:?}")]
    UnknownEncoding(String),

    #[error("field {0:?} declared more than once")]
    DuplicateField(String),
}

/// Per-field directives disagree with FIELDS.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{directive} has {found} entries but FIELDS has {expected}")]
    CardinalityMismatch {
        directive: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("required field {0:?} is missing")]
    MissingField(&'static str),

    #[error("field {0:?} occupies no bytes in a binary record")]
    ZeroWidthField(String),
}

/// An LZF stream broke one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorruptionError {
    #[error("compressed stream ends early at input byte {at}")]
    TruncatedInput { at: usize },

    #[error("back-reference at output byte {position} reaches {distance} bytes back")]
    InvalidBackReference { position: usize, distance: usize },

    #[error("output needs {needed} bytes but only {capacity} were declared")]
    OutputOverflow { needed: usize, capacity: usize },

    #[error("stream produced {produced} bytes, {expected} were declared")]
    LengthMismatch { expected: usize, produced: usize },
}

/// The buffer is shorter than the header arithmetic demands.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{context}: need {needed} bytes, only {available} available")]
pub struct TruncatedInputError {
    pub context: &'static str,
    pub needed: usize,
    pub available: usize,
}

/// A channel's declared type/size is not one the decoder reads.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unsupported {channel} field: type {kind} with size {size}")]
pub struct UnsupportedChannelError {
    pub channel: &'static str,
    pub kind: char,
    pub size: usize,
}

/// Every failure a decode can end with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("corrupt compressed data: {0}")]
    Corruption(#[from] CorruptionError),

    #[error("truncated input: {0}")]
    TruncatedInput(#[from] TruncatedInputError),

    #[error("{0}")]
    UnsupportedChannel(#[from] UnsupportedChannelError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
