use log::{debug, info, trace};
use nancy_formats::{read_record, RecordCursor, RecordError, RecordKind, Rect, ScriptSegment};
use serde::Serialize;
use thiserror::Error;

use crate::record::{ActionRecord, Step};
use crate::state::PlayState;

/// A record failed to load; nothing from the failing batch was kept.
#[derive(Debug, Error)]
#[error("action record {index} (tag {tag:#04x}) failed to load")]
pub struct LoadError {
    pub index: usize,
    pub tag: u8,
    #[source]
    pub source: RecordError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentStatus {
    Running,
    Finished,
}

/// Owns the action records of the active scene and drives them tick by tick.
#[derive(Debug, Default)]
pub struct ActionManager {
    records: Vec<ActionRecord>,
    ticks: u64,
}

impl ActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one record whose tag the caller has already read and append it
    /// to the sequence. Returns the payload bytes consumed.
    pub fn load_record(
        &mut self,
        tag: u8,
        cursor: &mut RecordCursor<'_>,
    ) -> Result<usize, LoadError> {
        let index = self.records.len();
        let record = decode(index, tag, cursor)?;
        let consumed = record.byte_len();
        self.records.push(record);
        Ok(consumed)
    }

    /// Load a whole `[tag][payload]` run. Either every record is appended or
    /// none is.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<usize, LoadError> {
        let mut cursor = RecordCursor::new(bytes);
        let mut staged = Vec::new();
        while !cursor.is_at_end() {
            let index = self.records.len() + staged.len();
            let tag = cursor.read_u8().map_err(|source| LoadError {
                index,
                tag: 0,
                source,
            })?;
            staged.push(decode(index, tag, &mut cursor)?);
        }
        let loaded = staged.len();
        self.records.extend(staged);
        Ok(loaded)
    }

    /// Adopt the records of an already-parsed segment.
    pub fn load_segment(&mut self, segment: &ScriptSegment) -> usize {
        self.records.extend(
            segment
                .entries()
                .iter()
                .map(|entry| ActionRecord::new(entry.kind, entry.body.clone(), entry.len)),
        );
        segment.len()
    }

    /// Drop every record, e.g. when the scene is replaced.
    pub fn clear(&mut self) {
        self.records.clear();
        self.ticks = 0;
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&ActionRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending(&self) -> usize {
        self.records.iter().filter(|record| !record.is_done()).count()
    }

    /// Run every unfinished record once, in sequence order.
    pub fn tick(&mut self, play: &mut PlayState) -> SegmentStatus {
        self.ticks += 1;
        let mut pending = 0;
        for (index, record) in self.records.iter_mut().enumerate() {
            if record.is_done() {
                continue;
            }
            match record.execute(play) {
                Step::Pending => pending += 1,
                Step::Done => trace!("record {index} ({}) done", record.kind().name()),
            }
        }
        trace!("tick {}: {pending} records pending", self.ticks);
        if pending == 0 {
            if !self.records.is_empty() {
                info!("segment finished after {} ticks", self.ticks);
            }
            SegmentStatus::Finished
        } else {
            SegmentStatus::Running
        }
    }

    /// Hotspots the presentation layer should currently offer, in sequence
    /// order.
    pub fn live_hotspots(&self) -> Vec<(usize, Rect)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| record.live_hotspot().map(|rect| (index, rect)))
            .collect()
    }

    /// First live hotspot containing the point.
    pub fn hotspot_at(&self, x: i32, y: i32) -> Option<usize> {
        self.live_hotspots()
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(index, _)| index)
    }

    /// Move the record at `index` from `Run` to `End`.
    pub fn trigger(&mut self, index: usize) -> bool {
        self.records
            .get_mut(index)
            .map(ActionRecord::request_end)
            .unwrap_or(false)
    }

    /// Trigger whichever live hotspot contains the point.
    pub fn click(&mut self, x: i32, y: i32) -> Option<usize> {
        let index = self.hotspot_at(x, y)?;
        if self.trigger(index) {
            debug!("click ({x}, {y}) triggered record {index}");
            Some(index)
        } else {
            None
        }
    }
}

fn decode(
    index: usize,
    tag: u8,
    cursor: &mut RecordCursor<'_>,
) -> Result<ActionRecord, LoadError> {
    let wrap = |source| LoadError { index, tag, source };
    let kind = RecordKind::from_tag(tag).map_err(wrap)?;
    let offset = cursor.position();
    let (body, consumed) = read_record(kind, cursor).map_err(wrap)?;
    debug!(
        "loaded record {index}: {} at {offset:#x}, {consumed} bytes",
        kind.name()
    );
    Ok(ActionRecord::new(kind, body, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nancy_formats::record::EventFlag;

    fn scene_change(tag: u8, scene: u16, frame: u16) -> Vec<u8> {
        let mut data = vec![tag];
        for value in [scene, frame, 0u16, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    fn hot_scene_change(scene: u16, hotspot_frame: u16, rect: [u32; 4]) -> Vec<u8> {
        let mut data = scene_change(0x0A, scene, 0);
        data.extend_from_slice(&hotspot_frame.to_le_bytes());
        for edge in rect {
            data.extend_from_slice(&edge.to_le_bytes());
        }
        data
    }

    fn event_flags(label: i16, flag: u16) -> Vec<u8> {
        let mut data = vec![0x6B];
        data.extend_from_slice(&label.to_le_bytes());
        data.extend_from_slice(&flag.to_le_bytes());
        for _ in 1..10 {
            data.extend_from_slice(&(-1i16).to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn load_record_reports_bytes_consumed() {
        let data = scene_change(0x0C, 7, 3);
        let mut cursor = RecordCursor::new(&data[1..]);
        let mut manager = ActionManager::new();
        assert_eq!(manager.load_record(data[0], &mut cursor).unwrap(), 8);
        assert_eq!(cursor.position(), 8);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.records()[0].kind(), RecordKind::SceneChange);
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let data = [0u8; 4];
        let mut cursor = RecordCursor::new(&data);
        let mut manager = ActionManager::new();
        let err = manager.load_record(0x02, &mut cursor).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.source, RecordError::UnsupportedKind(0x02));
        assert_eq!(cursor.position(), 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn failed_batch_leaves_manager_untouched() {
        let mut data = scene_change(0x0C, 1, 1);
        data.extend(event_flags(2, 2));
        data.extend_from_slice(&[0x4B, 0x11, 0x27]);
        let mut manager = ActionManager::new();
        let err = manager.load_bytes(&data).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.tag, 0x4B);
        assert!(err.source.is_format_violation());
        assert!(manager.is_empty());
    }

    #[test]
    fn passive_records_finish_on_first_tick() {
        let mut data = event_flags(4, 2);
        data.extend_from_slice(&[0x68, 0x00]);
        data.extend(scene_change(0x0C, 9, 2));
        let mut manager = ActionManager::new();
        assert_eq!(manager.load_bytes(&data).unwrap(), 3);

        let mut play = PlayState::default();
        assert_eq!(manager.tick(&mut play), SegmentStatus::Finished);
        assert_eq!(play.event_flag(4), EventFlag::True);
        assert!(play.timer.active);
        assert_eq!(play.scene.scene_id, 9);
        assert_eq!(manager.pending(), 0);

        let settled = play.clone();
        assert_eq!(manager.tick(&mut play), SegmentStatus::Finished);
        assert_eq!(play, settled);
    }

    #[test]
    fn click_commits_live_hotspot_on_next_tick() {
        let mut data = hot_scene_change(20, 0, [0, 0, 100, 100]);
        data.extend(hot_scene_change(30, 1, [200, 0, 300, 100]));
        let mut manager = ActionManager::new();
        manager.load_bytes(&data).unwrap();

        let mut play = PlayState::default();
        assert_eq!(manager.tick(&mut play), SegmentStatus::Running);
        assert_eq!(manager.live_hotspots(), vec![(0, Rect::new(0, 0, 100, 100))]);
        assert_eq!(manager.click(250, 50), None);

        play.current_view_frame = 1;
        manager.tick(&mut play);
        assert_eq!(manager.hotspot_at(250, 50), Some(1));
        assert_eq!(manager.click(250, 50), Some(1));
        assert!(!play.scene.load_pending);

        assert_eq!(manager.tick(&mut play), SegmentStatus::Running);
        assert_eq!(play.scene.scene_id, 30);
        assert!(play.scene.load_pending);
        assert!(manager.records()[1].is_done());
        assert!(!manager.records()[0].is_done());
        assert_eq!(manager.pending(), 1);
    }

    #[test]
    fn clear_discards_records() {
        let mut manager = ActionManager::new();
        manager.load_bytes(&hot_scene_change(1, 0, [0, 0, 1, 1])).unwrap();
        manager.tick(&mut PlayState::default());
        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(manager.ticks(), 0);
        assert!(!manager.trigger(0));
    }
}
