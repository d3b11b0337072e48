use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{RecordError, Result};

/// Little-endian reader over an in-memory script segment.
///
/// Every read either consumes exactly its width or fails without moving the
/// position, so a failed record never leaves the cursor half-way through it.
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> RecordCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(bytes),
        }
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.inner.position() as usize)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_available(1)?;
        self.inner.read_u8().map_err(|_| self.exhausted(1))
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure_available(1)?;
        self.inner.read_i8().map_err(|_| self.exhausted(1))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure_available(2)?;
        self.inner
            .read_u16::<LittleEndian>()
            .map_err(|_| self.exhausted(2))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure_available(2)?;
        self.inner
            .read_i16::<LittleEndian>()
            .map_err(|_| self.exhausted(2))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure_available(4)?;
        self.inner
            .read_u32::<LittleEndian>()
            .map_err(|_| self.exhausted(4))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure_available(4)?;
        self.inner
            .read_i32::<LittleEndian>()
            .map_err(|_| self.exhausted(4))
    }

    /// Copy exactly `buf.len()` bytes into `buf`.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_available(buf.len())?;
        self.inner
            .read_exact(buf)
            .map_err(|_| self.exhausted(buf.len()))
    }

    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_available(len)?;
        let mut buf = vec![0u8; len];
        self.read_raw(&mut buf)?;
        Ok(buf)
    }

    /// Move by `offset` bytes from the current position. Landing exactly on
    /// the end of the buffer is allowed; anything outside `0..=len` is not.
    pub fn seek_relative(&mut self, offset: i64) -> Result<()> {
        let position = self.inner.position();
        let target = i64::try_from(position)
            .ok()
            .and_then(|pos| pos.checked_add(offset))
            .filter(|&target| target >= 0 && target as u64 <= self.len() as u64)
            .ok_or(RecordError::SeekOutOfRange {
                position,
                offset,
                len: self.len(),
            })?;
        self.inner
            .seek(SeekFrom::Start(target as u64))
            .map_err(|_| RecordError::SeekOutOfRange {
                position,
                offset,
                len: self.len(),
            })?;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        let offset = i64::try_from(count).map_err(|_| self.exhausted(count))?;
        self.seek_relative(offset)
    }

    /// Read a little-endian `u16` located `offset` bytes ahead without
    /// disturbing the read position.
    pub fn peek_u16_at(&mut self, offset: i64) -> Result<u16> {
        self.seek_relative(offset)?;
        let value = self.read_u16();
        let back = if value.is_ok() { -(offset + 2) } else { -offset };
        self.seek_relative(back)?;
        value
    }

    pub fn peek_i16_at(&mut self, offset: i64) -> Result<i16> {
        self.peek_u16_at(offset).map(|raw| raw as i16)
    }

    fn ensure_available(&self, requested: usize) -> Result<()> {
        if self.remaining() < requested {
            return Err(self.exhausted(requested));
        }
        Ok(())
    }

    fn exhausted(&self, requested: usize) -> RecordError {
        RecordError::StreamExhausted {
            position: self.inner.position(),
            requested,
            available: self.remaining(),
        }
    }
}
