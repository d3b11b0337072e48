use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use nancy_formats::record::{EventFlag, SceneChange};
use serde::{Deserialize, Serialize};

/// Scene-manager fields touched by scene-change records.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneState {
    pub scene_id: u16,
    /// Set when a record queued a new scene; the loader clears it.
    pub load_pending: bool,
    pub do_not_start_sound: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerState {
    pub active: bool,
    pub elapsed_ms: u64,
}

/// The slice of live engine state that action records may read or write.
///
/// The presentation layer owns the "current" fields and updates them between
/// ticks; records only ever write the queued/flag/timer/difficulty fields.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayState {
    pub scene: SceneState,
    pub current_view_frame: u16,
    pub current_vertical_scroll: u16,
    pub queued_view_frame: u16,
    pub queued_max_vertical_scroll: u16,
    pub event_flags: BTreeMap<u16, EventFlag>,
    pub timer: TimerState,
    pub difficulty: u16,
}

impl PlayState {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read play state file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse play state json: {}", path.display()))
    }

    pub fn event_flag(&self, label: u16) -> EventFlag {
        self.event_flags.get(&label).copied().unwrap_or_default()
    }

    pub fn set_event_flag(&mut self, label: u16, flag: EventFlag) {
        self.event_flags.insert(label, flag);
    }

    pub fn queue_scene_change(&mut self, change: &SceneChange) {
        self.scene.scene_id = change.scene_id;
        self.scene.do_not_start_sound = change.do_not_start_sound;
        self.scene.load_pending = true;
        self.queued_view_frame = change.frame_id;
        self.queued_max_vertical_scroll = change.vertical_offset;
    }

    /// Restart or stop the player timer; both zero the elapsed time.
    pub fn reset_timer(&mut self, active: bool) {
        self.timer.active = active;
        self.timer.elapsed_ms = 0;
    }

    pub fn advance_timer(&mut self, delta_ms: u64) {
        if self.timer.active {
            self.timer.elapsed_ms = self.timer.elapsed_ms.saturating_add(delta_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn unset_labels_read_as_unset() {
        let mut state = PlayState::default();
        assert_eq!(state.event_flag(12), EventFlag::Unset);
        state.set_event_flag(12, EventFlag::True);
        assert_eq!(state.event_flag(12), EventFlag::True);
    }

    #[test]
    fn timer_only_runs_while_active() {
        let mut state = PlayState::default();
        state.advance_timer(50);
        assert_eq!(state.timer.elapsed_ms, 0);
        state.reset_timer(true);
        state.advance_timer(50);
        state.advance_timer(25);
        assert_eq!(state.timer.elapsed_ms, 75);
        state.reset_timer(false);
        assert!(!state.timer.active);
        assert_eq!(state.timer.elapsed_ms, 0);
    }

    #[test]
    fn loads_partial_state_from_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"current_view_frame": 4, "event_flags": {{"9": 2}}, "timer": {{"active": true}}}}"#
        )
        .unwrap();
        let state = PlayState::from_json_file(file.path()).unwrap();
        assert_eq!(state.current_view_frame, 4);
        assert_eq!(state.event_flag(9), EventFlag::True);
        assert!(state.timer.active);
        assert_eq!(state.difficulty, 0);
    }
}
