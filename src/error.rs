use std::fmt;
use std::io;

use thiserror::Error;

use crate::dataset::label::Label;

/// Which of the two IDX streams an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Images,
    Labels,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Images => write!(f, "image"),
            StreamKind::Labels => write!(f, "label"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MnistError {
    #[error("I/O error reading {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("truncated {stream} stream: expected {expected} bytes, only {available} available")]
    TruncatedStream {
        stream: StreamKind,
        expected: usize,
        available: usize,
    },

    #[error("invalid {stream} header: field `{field}` is {value}")]
    InvalidHeader {
        stream: StreamKind,
        field: &'static str,
        value: i32,
    },

    #[error("invalid {stream} magic: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic {
        stream: StreamKind,
        expected: i32,
        found: i32,
    },

    #[error("stream count mismatch: {images} images vs {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("label {value} of sample {index} is not a class in 0..=9")]
    InvalidLabel { index: usize, value: u8 },

    #[error("capacity exceeded: builder already holds {capacity} samples")]
    CapacityExceeded { capacity: usize },

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("cursor is not on a sample; call advance() first")]
    InvalidCursor,

    #[error("class {label} has no samples")]
    EmptyClass { label: Label },

    #[error("dataset has no samples")]
    EmptyDataset,

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MnistError {
    pub(crate) fn io(origin: impl Into<String>, source: io::Error) -> Self {
        MnistError::Io {
            origin: origin.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MnistError>;
