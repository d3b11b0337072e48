use serde::Serialize;

use crate::cursor::RecordCursor;
use crate::error::{RecordError, Result};
use crate::record::payload::Payload;

pub const PRIMARY_VIDEO_HEADER_SIZE: usize = 0x69C;
pub const CONDITION_FLAGS_SIZE: usize = 5;
pub const RESPONSE_BODY_SIZE: usize = 0x1D8;

/// Five undecoded bytes describing one dialogue condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionFlags(pub [u8; CONDITION_FLAGS_SIZE]);

impl ConditionFlags {
    fn read_list(cursor: &mut RecordCursor<'_>, count: usize) -> Result<Vec<Self>> {
        // Counts come straight from the stream; let exhaustion stop a bogus one.
        let mut flags = Vec::with_capacity(count.min(cursor.remaining() / CONDITION_FLAGS_SIZE));
        for _ in 0..count {
            let mut raw = [0u8; CONDITION_FLAGS_SIZE];
            cursor.read_raw(&mut raw)?;
            flags.push(ConditionFlags(raw));
        }
        Ok(flags)
    }
}

/// Player response offered during a primary video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseStruct {
    pub condition_flags: Vec<ConditionFlags>,
    pub body: Payload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagsStruct {
    pub condition_flags: Vec<ConditionFlags>,
    pub value: u32,
}

/// Dialogue video on channel 0, the deepest nested layout in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayPrimaryVideo {
    pub video: Payload,
    pub responses: Vec<ResponseStruct>,
    pub flags_structs: Vec<FlagsStruct>,
}

impl PlayPrimaryVideo {
    const NAME: &'static str = "PlayPrimaryVideoChan0";

    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let video = Payload::read(cursor, PRIMARY_VIDEO_HEADER_SIZE)?;
        let mut consumed = PRIMARY_VIDEO_HEADER_SIZE;

        let response_count = cursor.read_u16()? as usize;
        consumed += 2;
        let mut responses = Vec::with_capacity(response_count.min(16));
        for _ in 0..response_count {
            // Stored as a u32 but only the low half is a count.
            let condition_count = cursor.read_u32()? as u16 as usize;
            let condition_flags = ConditionFlags::read_list(cursor, condition_count)?;
            let body = Payload::read(cursor, RESPONSE_BODY_SIZE)?;
            consumed += 4 + condition_count * CONDITION_FLAGS_SIZE + RESPONSE_BODY_SIZE;
            responses.push(ResponseStruct {
                condition_flags,
                body,
            });
        }

        let branch_count = cursor.read_u16()?;
        consumed += 2;
        if branch_count != 0 {
            return Err(RecordError::violation(
                Self::NAME,
                format!("{branch_count} scene branch structs present but their layout is unknown"),
            ));
        }

        let flags_count = cursor.read_u16()? as usize;
        consumed += 2;
        let mut flags_structs = Vec::with_capacity(flags_count.min(16));
        for _ in 0..flags_count {
            let condition_count = cursor.read_u16()? as usize;
            let condition_flags = ConditionFlags::read_list(cursor, condition_count)?;
            let value = cursor.read_u32()?;
            consumed += 2 + condition_count * CONDITION_FLAGS_SIZE + 4;
            flags_structs.push(FlagsStruct {
                condition_flags,
                value,
            });
        }

        Ok((
            PlayPrimaryVideo {
                video,
                responses,
                flags_structs,
            },
            consumed,
        ))
    }
}

/// Fixed offsets of one bitmap-animation variant.
#[derive(Debug, Clone, Copy)]
struct BitmapLayout {
    name: &'static str,
    header_size: usize,
    frame_capacity: usize,
    trailer_count_offset: usize,
}

const STATIC_BITMAP: BitmapLayout = BitmapLayout {
    name: "PlayStaticBitmapAnimation",
    header_size: 0x72,
    frame_capacity: 0x252,
    trailer_count_offset: 0x70,
};

const INT_STATIC_BITMAP: BitmapLayout = BitmapLayout {
    name: "PlayIntStaticBitmapAnimation",
    header_size: 0x76,
    frame_capacity: 0x256,
    trailer_count_offset: 0x74,
};

const FIRST_FRAME_OFFSET: usize = 0x16;
const LAST_FRAME_OFFSET: usize = 0x18;
const FRAME_ENTRY_SIZE: usize = 16;
const TRAILER_ENTRY_SIZE: usize = 34;

/// Bitmap animation whose frame table and trailer are sized by bytes inside
/// its own header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BitmapAnimation {
    pub interactive: bool,
    pub header: Payload,
    pub frames: Payload,
    pub trailer: Payload,
}

impl BitmapAnimation {
    pub fn read_static(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        Self::read_with(cursor, STATIC_BITMAP, false)
    }

    pub fn read_interactive(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        Self::read_with(cursor, INT_STATIC_BITMAP, true)
    }

    fn read_with(
        cursor: &mut RecordCursor<'_>,
        layout: BitmapLayout,
        interactive: bool,
    ) -> Result<(Self, usize)> {
        let header = Payload::read(cursor, layout.header_size)?;

        let first = header.byte_at(FIRST_FRAME_OFFSET, layout.name)? as usize;
        let last = header.byte_at(LAST_FRAME_OFFSET, layout.name)? as usize;
        if last < first {
            return Err(RecordError::violation(
                layout.name,
                format!("last frame {last} precedes first frame {first}"),
            ));
        }
        let frames_len = (last - first + 1) * FRAME_ENTRY_SIZE;
        if frames_len > layout.frame_capacity {
            return Err(RecordError::violation(
                layout.name,
                format!(
                    "frame table of {frames_len:#x} bytes exceeds the {:#x}-byte region",
                    layout.frame_capacity
                ),
            ));
        }
        let frames = Payload::read(cursor, frames_len)?;

        let trailer_count = header.byte_at(layout.trailer_count_offset, layout.name)? as usize;
        let trailer_len = trailer_count * TRAILER_ENTRY_SIZE;
        let trailer = Payload::read(cursor, trailer_len)?;

        let consumed = layout.header_size + frames_len + trailer_len;
        Ok((
            BitmapAnimation {
                interactive,
                header,
                frames,
                trailer,
            },
            consumed,
        ))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / FRAME_ENTRY_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary_video_bytes(responses: &[usize], flags_structs: &[usize]) -> Vec<u8> {
        let mut data = vec![0u8; PRIMARY_VIDEO_HEADER_SIZE];
        data.extend_from_slice(&(responses.len() as u16).to_le_bytes());
        for &conditions in responses {
            data.extend_from_slice(&(conditions as u32).to_le_bytes());
            data.extend(vec![0xc0; conditions * CONDITION_FLAGS_SIZE]);
            data.extend(vec![0xee; RESPONSE_BODY_SIZE]);
        }
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&(flags_structs.len() as u16).to_le_bytes());
        for &conditions in flags_structs {
            data.extend_from_slice(&(conditions as u16).to_le_bytes());
            data.extend(vec![0xc1; conditions * CONDITION_FLAGS_SIZE]);
            data.extend_from_slice(&0xdead_beefu32.to_le_bytes());
        }
        data
    }

    #[test]
    fn empty_primary_video_consumes_fixed_portion() {
        let data = primary_video_bytes(&[], &[]);
        let mut cursor = RecordCursor::new(&data);
        let (video, consumed) = PlayPrimaryVideo::read(&mut cursor).unwrap();
        assert_eq!(consumed, PRIMARY_VIDEO_HEADER_SIZE + 6);
        assert_eq!(cursor.position(), consumed as u64);
        assert!(video.responses.is_empty());
        assert!(video.flags_structs.is_empty());
    }

    #[test]
    fn nested_groups_are_bounded_by_their_counts() {
        let mut data = primary_video_bytes(&[2, 0], &[1, 3]);
        data.push(0x55);
        let mut cursor = RecordCursor::new(&data);
        let (video, consumed) = PlayPrimaryVideo::read(&mut cursor).unwrap();

        let expected = PRIMARY_VIDEO_HEADER_SIZE
            + 2
            + (4 + 2 * 5 + RESPONSE_BODY_SIZE)
            + (4 + RESPONSE_BODY_SIZE)
            + 2
            + 2
            + (2 + 5 + 4)
            + (2 + 3 * 5 + 4);
        assert_eq!(consumed, expected);
        assert_eq!(cursor.position(), expected as u64);
        assert_eq!(cursor.remaining(), 1);

        assert_eq!(video.responses[0].condition_flags.len(), 2);
        assert_eq!(video.responses[0].condition_flags[1].0, [0xc0; 5]);
        assert_eq!(video.responses[1].body.as_bytes()[0], 0xee);
        assert_eq!(video.flags_structs[1].condition_flags.len(), 3);
        assert_eq!(video.flags_structs[1].value, 0xdead_beef);
    }

    #[test]
    fn response_condition_count_uses_low_half_only() {
        let mut data = vec![0u8; PRIMARY_VIDEO_HEADER_SIZE];
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&0x0001_0001u32.to_le_bytes());
        data.extend(vec![0xc0; CONDITION_FLAGS_SIZE]);
        data.extend(vec![0xee; RESPONSE_BODY_SIZE]);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        let mut cursor = RecordCursor::new(&data);
        let (video, consumed) = PlayPrimaryVideo::read(&mut cursor).unwrap();
        assert_eq!(video.responses[0].condition_flags.len(), 1);
        assert_eq!(consumed, data.len());
        assert!(cursor.is_at_end());
    }

    #[test]
    fn scene_branches_are_refused() {
        let mut data = vec![0u8; PRIMARY_VIDEO_HEADER_SIZE];
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        let mut cursor = RecordCursor::new(&data);
        let err = PlayPrimaryVideo::read(&mut cursor).unwrap_err();
        assert!(err.is_format_violation());
    }

    fn bitmap_header(size: usize, first: u8, last: u8, count_offset: usize, count: u8) -> Vec<u8> {
        let mut header = vec![0u8; size];
        header[FIRST_FRAME_OFFSET] = first;
        header[LAST_FRAME_OFFSET] = last;
        header[count_offset] = count;
        header
    }

    #[test]
    fn static_bitmap_sizes_tail_from_header_bytes() {
        let mut data = bitmap_header(0x72, 2, 5, 0x70, 3);
        data.extend(vec![1u8; 4 * 16]);
        data.extend(vec![2u8; 3 * 34]);
        let mut cursor = RecordCursor::new(&data);
        let (anim, consumed) = BitmapAnimation::read_static(&mut cursor).unwrap();
        assert_eq!(consumed, 0x72 + 64 + 102);
        assert!(cursor.is_at_end());
        assert_eq!(anim.frame_count(), 4);
        assert_eq!(anim.trailer.len(), 102);
        assert!(!anim.interactive);
    }

    #[test]
    fn interactive_bitmap_uses_its_own_offsets() {
        let mut data = bitmap_header(0x76, 0, 0, 0x74, 1);
        data.extend(vec![0u8; 16 + 34]);
        let mut cursor = RecordCursor::new(&data);
        let (anim, consumed) = BitmapAnimation::read_interactive(&mut cursor).unwrap();
        assert_eq!(consumed, 0x76 + 16 + 34);
        assert!(anim.interactive);
    }

    #[test]
    fn inverted_frame_range_is_a_format_violation() {
        let mut data = bitmap_header(0x72, 5, 2, 0x70, 0);
        data.extend(vec![0u8; 64]);
        let mut cursor = RecordCursor::new(&data);
        let err = BitmapAnimation::read_static(&mut cursor).unwrap_err();
        assert!(err.is_format_violation());
    }

    #[test]
    fn oversized_frame_table_is_a_format_violation() {
        let data = bitmap_header(0x72, 0, 200, 0x70, 0);
        let mut cursor = RecordCursor::new(&data);
        let err = BitmapAnimation::read_static(&mut cursor).unwrap_err();
        assert!(err.is_format_violation());
    }
}
