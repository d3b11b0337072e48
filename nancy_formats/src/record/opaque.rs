use serde::Serialize;

use crate::cursor::RecordCursor;
use crate::error::{RecordError, Result};
use crate::record::payload::Payload;

/// Longest text a `TextBoxWrite` record may declare.
pub const MAX_TEXT_BOX_CHARS: u16 = 10_000;

const TELEPHONE_HEADER_SIZE: usize = 0x48C;
const TELEPHONE_COUNT_OFFSET: usize = 0x48A;
const TELEPHONE_ENTRY_SIZE: usize = 235;
const TELEPHONE_CAPACITY: usize = 0x2016;

pub fn read_fixed(cursor: &mut RecordCursor<'_>, len: usize) -> Result<(Payload, usize)> {
    Ok((Payload::read(cursor, len)?, len))
}

/// Copy a blob whose length is `count * stride + base`, with `count` stored
/// `count_offset` bytes into the blob itself.
pub fn read_counted(
    cursor: &mut RecordCursor<'_>,
    record: &'static str,
    count_offset: i64,
    signed: bool,
    stride: usize,
    base: usize,
) -> Result<(Payload, usize)> {
    let count = if signed {
        let count = cursor.peek_i16_at(count_offset)?;
        usize::try_from(count).map_err(|_| {
            RecordError::violation(record, format!("element count {count} is negative"))
        })?
    } else {
        cursor.peek_u16_at(count_offset)? as usize
    };
    let total = count * stride + base;
    Ok((Payload::read(cursor, total)?, total))
}

/// Text box contents: a `u16` length followed by that many bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBoxWrite {
    pub raw: Payload,
}

impl TextBoxWrite {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let len = cursor.peek_u16_at(0)?;
        if len > MAX_TEXT_BOX_CHARS {
            return Err(RecordError::violation(
                "TextBoxWrite",
                format!("{len} text box chars exceeds the limit of {MAX_TEXT_BOX_CHARS}"),
            ));
        }
        let total = len as usize + 2;
        let raw = Payload::read(cursor, total)?;
        Ok((TextBoxWrite { raw }, total))
    }

    /// Text up to the first NUL, decoded lossily.
    pub fn text(&self) -> String {
        let body = self.raw.as_bytes().get(2..).unwrap_or_default();
        let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        String::from_utf8_lossy(&body[..end]).into_owned()
    }
}

/// Telephone puzzle: a fixed header whose byte at 0x48A counts trailing
/// 235-byte entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Telephone {
    pub header: Payload,
    pub entries: Payload,
}

impl Telephone {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let header = Payload::read(cursor, TELEPHONE_HEADER_SIZE)?;
        let count = header.byte_at(TELEPHONE_COUNT_OFFSET, "Telephone")? as usize;
        let entries_len = count * TELEPHONE_ENTRY_SIZE;
        let total = TELEPHONE_HEADER_SIZE + entries_len;
        if total > TELEPHONE_CAPACITY {
            return Err(RecordError::violation(
                "Telephone",
                format!(
                    "{count} entries need {total:#x} bytes, capacity is {TELEPHONE_CAPACITY:#x}"
                ),
            ));
        }
        let entries = Payload::read(cursor, entries_len)?;
        Ok((Telephone { header, entries }, total))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len() / TELEPHONE_ENTRY_SIZE
    }
}
