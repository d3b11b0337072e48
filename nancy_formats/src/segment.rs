use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use memmap2::MmapOptions;
use serde::Serialize;

use crate::cursor::RecordCursor;
use crate::error::Result;
use crate::record::{RecordBody, RecordKind, read_record};

/// One record pulled out of a script segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentEntry {
    pub index: usize,
    pub kind: RecordKind,
    pub tag: u8,
    /// Offset of the kind tag within the segment.
    pub offset: u64,
    /// Payload length, excluding the tag byte.
    pub len: usize,
    pub body: RecordBody,
}

/// Flat run of `[tag][payload]` records as handed over by the scene loader.
#[derive(Debug, Clone, Default)]
pub struct ScriptSegment {
    source: Option<PathBuf>,
    entries: Vec<SegmentEntry>,
}

impl ScriptSegment {
    /// Parse every record in `bytes`. Any failure rejects the whole segment.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = RecordCursor::new(bytes);
        let mut entries = Vec::new();
        while !cursor.is_at_end() {
            let offset = cursor.position();
            let tag = cursor.read_u8()?;
            let kind = RecordKind::from_tag(tag)?;
            let (body, len) = read_record(kind, &mut cursor)?;
            entries.push(SegmentEntry {
                index: entries.len(),
                kind,
                tag,
                offset,
                len,
                body,
            });
        }
        Ok(ScriptSegment {
            source: None,
            entries,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)
            .with_context(|| format!("opening script segment {}", path_buf.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("reading metadata for {}", path_buf.display()))?
            .len();
        // Mapping a zero-length file fails on some platforms.
        let mut segment = if len == 0 {
            ScriptSegment::default()
        } else {
            let mmap = unsafe { MmapOptions::new().map(&file) }
                .with_context(|| format!("memory-mapping script segment {}", path_buf.display()))?;
            ScriptSegment::parse(&mmap)
                .with_context(|| format!("parsing script segment {}", path_buf.display()))?
        };
        segment.source = Some(path_buf);
        Ok(segment)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn entries(&self) -> &[SegmentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes covered by the segment, tags included.
    pub fn byte_len(&self) -> u64 {
        self.entries
            .last()
            .map(|entry| entry.offset + 1 + entry.len as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_segment() -> Vec<u8> {
        let mut data = vec![0x0C];
        for value in [7u16, 3, 100, 1] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&[0x68, 0x00]);
        data.extend_from_slice(&[0x4C, 0x01]);
        data
    }

    #[test]
    fn parses_records_in_sequence() {
        let segment = ScriptSegment::parse(&sample_segment()).unwrap();
        assert_eq!(segment.len(), 3);
        let kinds: Vec<_> = segment.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecordKind::SceneChange,
                RecordKind::ResetAndStartTimer,
                RecordKind::TextBoxClear
            ]
        );
        assert_eq!(segment.entries()[1].offset, 9);
        assert_eq!(segment.entries()[2].index, 2);
        assert_eq!(segment.byte_len(), 13);
    }

    #[test]
    fn unknown_tag_rejects_the_segment() {
        let mut data = sample_segment();
        data.push(0x01);
        assert_eq!(
            ScriptSegment::parse(&data).unwrap_err(),
            RecordError::UnsupportedKind(0x01)
        );
    }

    #[test]
    fn truncated_tail_rejects_the_segment() {
        let mut data = sample_segment();
        data.extend_from_slice(&[0x6B, 0xff, 0xff]);
        let err = ScriptSegment::parse(&data).unwrap_err();
        assert!(err.is_stream_exhausted());
    }

    #[test]
    fn opens_segment_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&sample_segment()).unwrap();
        let segment = ScriptSegment::open(file.path()).unwrap();
        assert_eq!(segment.len(), 3);
        assert_eq!(segment.source(), Some(file.path()));
    }
}
