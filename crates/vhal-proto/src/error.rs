//! Error types for frame and message decoding

use thiserror::Error;

/// A frame or message body that could not be decoded
///
/// Every variant means the bytes are malformed; a connection that produces
/// one cannot be resynchronised and should be torn down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than four bytes available for the length prefix
    #[error("truncated frame header: {0} of 4 bytes")]
    TruncatedHeader(usize),

    /// Length prefix disagrees with the bytes that follow it
    #[error("frame length mismatch: header declares {declared} bytes, {available} available")]
    LengthMismatch { declared: usize, available: usize },

    /// Declared body length is zero
    #[error("empty frame")]
    EmptyFrame,

    /// Declared body length exceeds the configured limit
    #[error("frame of {len} bytes exceeds limit of {max}")]
    Oversize { len: usize, max: usize },

    /// Body is not a valid protobuf message
    #[error("invalid message body: {0}")]
    Decode(String),

    /// Command lacks the record it operates on
    #[error("{command} carries no {record} record")]
    MissingRecord {
        command: &'static str,
        record: &'static str,
    },

    /// Enumerated field holds a value outside its domain
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: i32 },
}

impl From<prost::DecodeError> for ParseError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}
