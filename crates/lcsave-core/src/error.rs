use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Save format not recognized: {0}")]
    FormatNotRecognized(String),

    #[error("Block tag mismatch at offset {offset:#x}: expected {expected:?}, got {actual:?}")]
    BlockTagMismatch {
        expected: String,
        actual: String,
        offset: usize,
    },

    #[error(
        "Buffer overflow at offset {offset:#x}: writing {requested} bytes exceeds capacity {capacity}"
    )]
    BufferOverflow {
        offset: usize,
        requested: usize,
        capacity: usize,
    },

    #[error(
        "Buffer underflow at offset {offset:#x}: reading {requested} bytes but only {available} remain"
    )]
    BufferUnderflow {
        offset: usize,
        requested: usize,
        available: usize,
    },

    #[error("Size invariant violated by {record}: declared {expected} bytes, transferred {actual}")]
    SizeInvariantViolation {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{record} holds {count} entries but the format stores {capacity}")]
    TooManyEntries {
        record: &'static str,
        count: usize,
        capacity: usize,
    },

    #[error("Outer block {block} needs {size} bytes but the working buffer holds {capacity}")]
    CapacityExceeded {
        block: usize,
        size: usize,
        capacity: usize,
    },

    #[error("{record}.{field} = {value} does not fit the {width}-byte field of this format")]
    ValueOutOfRange {
        record: &'static str,
        field: &'static str,
        value: i64,
        width: usize,
    },

    #[error("Invalid boolean at offset {offset:#x}: {value}")]
    InvalidBoolean { offset: usize, value: u8 },

    #[error("Invalid block length at offset {offset:#x}: {declared}")]
    InvalidBlockLength { offset: usize, declared: u32 },

    #[error("Checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("File size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Byte offset the error was raised at, when one is known
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::BlockTagMismatch { offset, .. }
            | Error::BufferOverflow { offset, .. }
            | Error::BufferUnderflow { offset, .. }
            | Error::InvalidBlockLength { offset, .. }
            | Error::InvalidBoolean { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Rebase an offset measured inside a sub-buffer that starts at `base`
    pub fn shifted(mut self, base: usize) -> Self {
        match &mut self {
            Error::BlockTagMismatch { offset, .. }
            | Error::BufferOverflow { offset, .. }
            | Error::BufferUnderflow { offset, .. }
            | Error::InvalidBlockLength { offset, .. }
            | Error::InvalidBoolean { offset, .. } => *offset += base,
            _ => {}
        }
        self
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// True for errors that mean the bytes are not a save this engine knows,
    /// as opposed to a known save that is damaged.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Error::FormatNotRecognized(_))
    }
}
