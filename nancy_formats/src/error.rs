use thiserror::Error;

/// Convenience alias used across the record catalog.
pub type Result<T, E = RecordError> = std::result::Result<T, E>;

/// Error conditions raised while decoding action records.
///
/// None of these are recoverable: the record stream has no resync points, so a
/// single bad record invalidates every record after it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("stream exhausted at offset {position:#x}: needed {requested} bytes, {available} left")]
    StreamExhausted {
        position: u64,
        requested: usize,
        available: usize,
    },
    #[error("seek by {offset} from offset {position:#x} leaves the {len}-byte buffer")]
    SeekOutOfRange { position: u64, offset: i64, len: usize },
    #[error("malformed {record} record: {message}")]
    FormatViolation {
        record: &'static str,
        message: String,
    },
    #[error("action record kind {0:#04x} is not supported")]
    UnsupportedKind(u8),
}

impl RecordError {
    pub fn violation(record: &'static str, message: impl Into<String>) -> Self {
        RecordError::FormatViolation {
            record,
            message: message.into(),
        }
    }

    pub fn is_format_violation(&self) -> bool {
        matches!(self, RecordError::FormatViolation { .. })
    }

    pub fn is_stream_exhausted(&self) -> bool {
        matches!(
            self,
            RecordError::StreamExhausted { .. } | RecordError::SeekOutOfRange { .. }
        )
    }
}
