use serde::Serialize;

use crate::cursor::RecordCursor;
use crate::error::Result;
use crate::hotspot::{HOTSPOT_DESC_SIZE, HotspotDesc};

pub const SCENE_CHANGE_SIZE: usize = 8;
pub const HOT_1FR_SCENE_CHANGE_SIZE: usize = SCENE_CHANGE_SIZE + HOTSPOT_DESC_SIZE;

/// Navigation target shared by every scene-change record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneChange {
    pub scene_id: u16,
    pub frame_id: u16,
    pub vertical_offset: u16,
    pub do_not_start_sound: bool,
}

impl SceneChange {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let scene_id = cursor.read_u16()?;
        let frame_id = cursor.read_u16()?;
        let vertical_offset = cursor.read_u16()?;
        let do_not_start_sound = cursor.read_u16()? != 0;
        Ok((
            SceneChange {
                scene_id,
                frame_id,
                vertical_offset,
                do_not_start_sound,
            },
            SCENE_CHANGE_SIZE,
        ))
    }
}

/// Scene change that only fires once its single-frame hotspot is clicked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Hot1FrSceneChange {
    pub scene: SceneChange,
    pub hotspot: HotspotDesc,
}

impl Hot1FrSceneChange {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<(Self, usize)> {
        let (scene, _) = SceneChange::read(cursor)?;
        let hotspot = HotspotDesc::read(cursor)?;
        Ok((Hot1FrSceneChange { scene, hotspot }, HOT_1FR_SCENE_CHANGE_SIZE))
    }
}
