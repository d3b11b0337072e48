use std::fmt;

use serde::{Serialize, Serializer};

use crate::cursor::RecordCursor;
use crate::error::{RecordError, Result};

/// Byte range copied verbatim from the script stream.
///
/// Layouts that size later reads from bytes inside an earlier read go through
/// [`Payload::byte_at`], which refuses offsets past the copied data.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn read(cursor: &mut RecordCursor<'_>, len: usize) -> Result<Self> {
        cursor.read_vec(len).map(Payload)
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Payload(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn byte_at(&self, offset: usize, record: &'static str) -> Result<u8> {
        self.0.get(offset).copied().ok_or_else(|| {
            RecordError::violation(
                record,
                format!(
                    "offset {offset:#x} lies outside the {:#x}-byte payload",
                    self.0.len()
                ),
            )
        })
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let hex: String = self.0.iter().map(|byte| format!("{byte:02x}")).collect();
        serializer.serialize_str(&hex)
    }
}
