use serde::Serialize;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::cursor::RecordCursor;
use crate::error::{RecordError, Result};
use crate::hotspot::{HOTSPOT_DESC_SIZE, HotspotDesc};

pub const EVENT_FLAG_SLOTS: usize = 10;
pub const EVENT_FLAG_DESC_SIZE: usize = 4;
pub const EVENT_FLAGS_SIZE: usize = EVENT_FLAG_SLOTS * EVENT_FLAG_DESC_SIZE;
pub const DIFFICULTY_LEVEL_SIZE: usize = 6;

/// Tri-state value stored in the event-flag table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u16)]
pub enum EventFlag {
    #[default]
    Unset = 0,
    False = 1,
    True = 2,
}

impl EventFlag {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(EventFlag::Unset),
            1 => Some(EventFlag::False),
            2 => Some(EventFlag::True),
            _ => None,
        }
    }

    pub fn raw(self) -> u16 {
        self as u16
    }
}

/// One `(label, flag)` slot. A wire label of -1 decodes to `None` and means
/// the slot is never applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventFlagDesc {
    pub label: Option<u16>,
    pub flag: EventFlag,
}

impl EventFlagDesc {
    pub fn read(cursor: &mut RecordCursor<'_>, record: &'static str) -> Result<Self> {
        let label = cursor.read_i16()?;
        let raw_flag = cursor.read_u16()?;
        match label {
            // Unused slots carry whatever the authoring tool left behind.
            -1 => Ok(EventFlagDesc {
                label: None,
                flag: EventFlag::from_raw(raw_flag).unwrap_or_default(),
            }),
            label if label < -1 => Err(RecordError::violation(
                record,
                format!("event flag label {label} is negative"),
            )),
            label => {
                let flag = EventFlag::from_raw(raw_flag).ok_or_else(|| {
                    RecordError::violation(
                        record,
                        format!("event flag {label} has invalid value {raw_flag}"),
                    )
                })?;
                Ok(EventFlagDesc {
                    label: Some(label as u16),
                    flag,
                })
            }
        }
    }
}

/// Ten event-flag assignments applied in one go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventFlags {
    pub descs: [EventFlagDesc; EVENT_FLAG_SLOTS],
}

impl EventFlags {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        Self::read_as(cursor, "EventFlags")
    }

    fn read_as(cursor: &mut RecordCursor<'_>, record: &'static str) -> Result<(Self, usize)> {
        let mut descs = [EventFlagDesc::default(); EVENT_FLAG_SLOTS];
        for desc in descs.iter_mut() {
            *desc = EventFlagDesc::read(cursor, record)?;
        }
        Ok((EventFlags { descs }, EVENT_FLAGS_SIZE))
    }

    /// Slots that will actually be written, in slot order.
    pub fn applied(&self) -> impl Iterator<Item = (u16, EventFlag)> + '_ {
        self.descs
            .iter()
            .filter_map(|desc| desc.label.map(|label| (label, desc.flag)))
    }
}

/// Event flags gated behind a set of per-frame hotspots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventFlagsMultiHs {
    pub flags: EventFlags,
    pub hotspots: Vec<HotspotDesc>,
}

impl EventFlagsMultiHs {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let (flags, flags_size) = EventFlags::read_as(cursor, "EventFlagsMultiHs")?;
        let count = cursor.read_u16()? as usize;
        let hotspots = HotspotDesc::read_list(cursor, count)?;
        let consumed = flags_size + 2 + count * HOTSPOT_DESC_SIZE;
        Ok((EventFlagsMultiHs { flags, hotspots }, consumed))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DifficultyLevel {
    pub difficulty: u16,
    pub flag: EventFlagDesc,
}

impl DifficultyLevel {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let difficulty = cursor.read_u16()?;
        let flag = EventFlagDesc::read(cursor, "DifficultyLevel")?;
        Ok((DifficultyLevel { difficulty, flag }, DIFFICULTY_LEVEL_SIZE))
    }
}
