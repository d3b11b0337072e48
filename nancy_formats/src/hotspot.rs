use serde::{Deserialize, Serialize};

use crate::cursor::RecordCursor;
use crate::error::Result;

/// Size of a serialized [`HotspotDesc`] on the wire.
pub const HOTSPOT_DESC_SIZE: usize = 0x12;

/// Screen rectangle stored as four 32-bit edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Half-open containment test: the right and bottom edges are exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Clickable region tied to a single view frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotDesc {
    pub frame_id: u16,
    pub coords: Rect,
}

impl HotspotDesc {
    pub fn read(cursor: &mut RecordCursor<'_>) -> Result<Self> {
        let frame_id = cursor.read_u16()?;
        // Edges are stored unsigned but the engine treats them as plain ints.
        let left = cursor.read_u32()? as i32;
        let top = cursor.read_u32()? as i32;
        let right = cursor.read_u32()? as i32;
        let bottom = cursor.read_u32()? as i32;
        Ok(HotspotDesc {
            frame_id,
            coords: Rect::new(left, top, right, bottom),
        })
    }

    pub fn read_list(cursor: &mut RecordCursor<'_>, count: usize) -> Result<Vec<Self>> {
        let mut hotspots = Vec::with_capacity(count);
        for _ in 0..count {
            hotspots.push(Self::read(cursor)?);
        }
        Ok(hotspots)
    }
}
