//! Action record catalog.
//!
//! Every kind knows how to pull exactly its own bytes off a [`RecordCursor`]
//! and report how many it took. Layouts fall into three families: fixed
//! opaque blobs, blobs sized by a count embedded in themselves, and records
//! decoded field by field (some nested two levels deep).

mod flags;
mod kind;
mod opaque;
mod payload;
mod scene;
mod video;

use serde::Serialize;

use crate::cursor::RecordCursor;
use crate::error::{RecordError, Result};

pub use flags::{
    DifficultyLevel, EVENT_FLAG_SLOTS, EventFlag, EventFlagDesc, EventFlags, EventFlagsMultiHs,
};
pub use kind::{Layout, RecordKind};
pub use opaque::{MAX_TEXT_BOX_CHARS, Telephone, TextBoxWrite};
pub use payload::Payload;
pub use scene::{Hot1FrSceneChange, SceneChange};
pub use video::{BitmapAnimation, ConditionFlags, FlagsStruct, PlayPrimaryVideo, ResponseStruct};

/// Decoded contents of one action record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum RecordBody {
    SceneChange(SceneChange),
    Hot1FrSceneChange(Hot1FrSceneChange),
    EventFlags(EventFlags),
    EventFlagsMultiHs(EventFlagsMultiHs),
    DifficultyLevel(DifficultyLevel),
    PrimaryVideo(PlayPrimaryVideo),
    BitmapAnimation(BitmapAnimation),
    TextBoxWrite(TextBoxWrite),
    Telephone(Telephone),
    /// Single byte whose meaning is not decoded.
    Byte { value: u8 },
    /// Padding byte that was skipped.
    Empty,
    Opaque { data: Payload },
}

/// Decode one record of `kind` starting at the cursor position.
///
/// Returns the body and the byte count the layout computed for itself. The
/// caller is expected to compare that count against the cursor advance.
pub fn parse_record(
    kind: RecordKind,
    cursor: &mut RecordCursor<'_>,
) -> Result<(RecordBody, usize)> {
    match kind.layout() {
        Layout::Fixed(len) => {
            let (data, consumed) = opaque::read_fixed(cursor, len)?;
            Ok((RecordBody::Opaque { data }, consumed))
        }
        Layout::Counted {
            count_offset,
            signed,
            stride,
            base,
        } => {
            let (data, consumed) =
                opaque::read_counted(cursor, kind.name(), count_offset, signed, stride, base)?;
            Ok((RecordBody::Opaque { data }, consumed))
        }
        Layout::Byte => Ok((RecordBody::Byte { value: cursor.read_u8()? }, 1)),
        Layout::Skip => {
            cursor.skip(1)?;
            Ok((RecordBody::Empty, 1))
        }
        Layout::Structured => parse_structured(kind, cursor),
    }
}

/// [`parse_record`] plus the integrity check: the layout's own byte count
/// must match how far the cursor actually moved.
pub fn read_record(
    kind: RecordKind,
    cursor: &mut RecordCursor<'_>,
) -> Result<(RecordBody, usize)> {
    let start = cursor.position();
    let (body, consumed) = parse_record(kind, cursor)?;
    let advanced = cursor.position() - start;
    if advanced != consumed as u64 {
        return Err(RecordError::violation(
            kind.name(),
            format!("layout reported {consumed} bytes but the cursor moved {advanced}"),
        ));
    }
    Ok((body, consumed))
}

fn parse_structured(
    kind: RecordKind,
    cursor: &mut RecordCursor<'_>,
) -> Result<(RecordBody, usize)> {
    let parsed = match kind {
        RecordKind::SceneChange => {
            let (record, consumed) = SceneChange::read(cursor)?;
            (RecordBody::SceneChange(record), consumed)
        }
        RecordKind::Hot1FrSceneChange => {
            let (record, consumed) = Hot1FrSceneChange::read(cursor)?;
            (RecordBody::Hot1FrSceneChange(record), consumed)
        }
        RecordKind::EventFlags => {
            let (record, consumed) = EventFlags::read(cursor)?;
            (RecordBody::EventFlags(record), consumed)
        }
        RecordKind::EventFlagsMultiHs => {
            let (record, consumed) = EventFlagsMultiHs::read(cursor)?;
            (RecordBody::EventFlagsMultiHs(record), consumed)
        }
        RecordKind::DifficultyLevel => {
            let (record, consumed) = DifficultyLevel::read(cursor)?;
            (RecordBody::DifficultyLevel(record), consumed)
        }
        RecordKind::PlayPrimaryVideoChan0 => {
            let (record, consumed) = PlayPrimaryVideo::read(cursor)?;
            (RecordBody::PrimaryVideo(record), consumed)
        }
        RecordKind::PlayStaticBitmapAnimation => {
            let (record, consumed) = BitmapAnimation::read_static(cursor)?;
            (RecordBody::BitmapAnimation(record), consumed)
        }
        RecordKind::PlayIntStaticBitmapAnimation => {
            let (record, consumed) = BitmapAnimation::read_interactive(cursor)?;
            (RecordBody::BitmapAnimation(record), consumed)
        }
        RecordKind::TextBoxWrite => {
            let (record, consumed) = TextBoxWrite::read(cursor)?;
            (RecordBody::TextBoxWrite(record), consumed)
        }
        RecordKind::Telephone => {
            let (record, consumed) = Telephone::read(cursor)?;
            (RecordBody::Telephone(record), consumed)
        }
        other => {
            return Err(RecordError::violation(
                other.name(),
                "kind has no field-by-field decoder",
            ));
        }
    };
    Ok(parsed)
}
