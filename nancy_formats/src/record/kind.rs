use serde::Serialize;

use crate::error::{RecordError, Result};

/// How a record kind lays out its bytes after the kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Constant-size opaque blob.
    Fixed(usize),
    /// Opaque blob whose size comes from a count stored `count_offset` bytes
    /// into the record: `count * stride + base`.
    Counted {
        count_offset: i64,
        signed: bool,
        stride: usize,
        base: usize,
    },
    /// A single byte that carries no decoded meaning.
    Byte,
    /// A single padding byte that is skipped.
    Skip,
    /// Decoded field by field.
    Structured,
}

macro_rules! record_kinds {
    ($($variant:ident = $tag:literal => $layout:expr,)+) => {
        /// Closed set of action record kinds, keyed by the tag byte that
        /// precedes each record in a script segment.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[repr(u8)]
        pub enum RecordKind {
            $($variant = $tag,)+
        }

        impl RecordKind {
            pub const ALL: &'static [RecordKind] = &[$(RecordKind::$variant,)+];

            pub fn from_tag(tag: u8) -> Result<Self> {
                match tag {
                    $($tag => Ok(RecordKind::$variant),)+
                    other => Err(RecordError::UnsupportedKind(other)),
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(RecordKind::$variant => stringify!($variant),)+
                }
            }

            pub fn layout(self) -> Layout {
                match self {
                    $(RecordKind::$variant => $layout,)+
                }
            }
        }
    };
}

const fn counted(count_offset: i64, stride: usize, base: usize) -> Layout {
    Layout::Counted {
        count_offset,
        signed: false,
        stride,
        base,
    }
}

const fn counted_signed(count_offset: i64, stride: usize, base: usize) -> Layout {
    Layout::Counted {
        count_offset,
        signed: true,
        stride,
        base,
    }
}

record_kinds! {
    Hot1FrSceneChange = 0x0A => Layout::Structured,
    HotMultiframeSceneChange = 0x0B => counted_signed(0x08, 0x12, 0x0A),
    SceneChange = 0x0C => Layout::Structured,
    HotMultiframeMultisceneChange = 0x0D => counted(0x14, 0x12, 0x16),
    Hot1FrExitSceneChange = 0x0E => Layout::Fixed(0x1A),
    StartFrameNextScene = 0x16 => Layout::Fixed(0x04),
    StartStopPlayerScrolling = 0x1E => Layout::Byte,
    StartStopPlayerScrollingAlt = 0x1F => Layout::Byte,
    PlayPrimaryVideoChan0 = 0x32 => Layout::Structured,
    PlaySecondaryVideoChan0 = 0x33 => counted_signed(0x33, 0x42, 0x35),
    PlaySecondaryVideoChan1 = 0x34 => counted_signed(0x33, 0x42, 0x35),
    PlaySecondaryMovie = 0x35 => counted(0xD2, 0x42, 0xD4),
    PlayStaticBitmapAnimation = 0x36 => Layout::Structured,
    PlayIntStaticBitmapAnimation = 0x37 => Layout::Structured,
    MapCall = 0x3C => Layout::Byte,
    MapCallHot1Fr = 0x3D => Layout::Fixed(0x12),
    MapCallHotMultiframe = 0x3E => counted(0x00, 0x12, 0x02),
    MapLocationAccess = 0x3F => Layout::Fixed(0x04),
    MapSound = 0x42 => Layout::Fixed(0x10),
    MapAviOverride = 0x43 => Layout::Fixed(0x02),
    MapAviOverrideOff = 0x44 => Layout::Byte,
    TextBoxWrite = 0x4B => Layout::Structured,
    TextBoxClear = 0x4C => Layout::Byte,
    BumpPlayerClock = 0x64 => Layout::Fixed(0x05),
    SaveContinueGame = 0x65 => Layout::Byte,
    TurnOffMainRendering = 0x66 => Layout::Byte,
    TurnOnMainRendering = 0x67 => Layout::Byte,
    ResetAndStartTimer = 0x68 => Layout::Skip,
    StopTimer = 0x69 => Layout::Skip,
    EventFlagsMultiHs = 0x6A => Layout::Structured,
    EventFlags = 0x6B => Layout::Structured,
    OrderingPuzzle = 0x6C => Layout::Fixed(0x26D),
    LoseGame = 0x6D => Layout::Byte,
    PushScene = 0x6E => Layout::Byte,
    PopScene = 0x6F => Layout::Byte,
    WinGame = 0x70 => Layout::Byte,
    DifficultyLevel = 0x71 => Layout::Structured,
    RotatingLockPuzzle = 0x72 => Layout::Fixed(0x2A4),
    LeverPuzzle = 0x73 => Layout::Fixed(0x192),
    Telephone = 0x74 => Layout::Structured,
    SliderPuzzle = 0x75 => Layout::Fixed(0x544),
    PasswordPuzzle = 0x76 => Layout::Fixed(0xD7),
    AddInventoryNoHs = 0x78 => Layout::Fixed(0x02),
    RemoveInventoryNoHs = 0x79 => Layout::Fixed(0x02),
    ShowInventoryItem = 0x7A => counted(0x0C, 0x22, 0x0E),
    PlayDigiSoundAndDie = 0x96 => Layout::Fixed(0x2B),
    PlayDigiSoundAndDieAlt = 0x97 => Layout::Fixed(0x2B),
    PlaySoundPanFrameAnchorAndDie = 0x98 => Layout::Fixed(0x20),
    PlaySoundMultiHs = 0x99 => counted(0x2F, 0x12, 0x31),
    HintSystem = 0xA0 => Layout::Fixed(0x23),
}

impl RecordKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Kinds whose effect is spread over several ticks.
    pub fn is_staged(self) -> bool {
        matches!(
            self,
            RecordKind::Hot1FrSceneChange | RecordKind::EventFlagsMultiHs
        )
    }
}

impl TryFrom<u8> for RecordKind {
    type Error = RecordError;

    fn try_from(tag: u8) -> Result<Self> {
        RecordKind::from_tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_the_table() {
        for &kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert_eq!(RecordKind::ALL.len(), 50);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(
            RecordKind::from_tag(0x00),
            Err(RecordError::UnsupportedKind(0x00))
        );
        assert_eq!(
            RecordKind::from_tag(0x77),
            Err(RecordError::UnsupportedKind(0x77))
        );
    }

    #[test]
    fn scene_change_family_layouts() {
        assert_eq!(RecordKind::from_tag(0x0C).unwrap().name(), "SceneChange");
        assert_eq!(
            RecordKind::HotMultiframeSceneChange.layout(),
            Layout::Counted {
                count_offset: 0x08,
                signed: true,
                stride: 0x12,
                base: 0x0A,
            }
        );
        assert!(RecordKind::Hot1FrSceneChange.is_staged());
        assert!(!RecordKind::SceneChange.is_staged());
    }
}
