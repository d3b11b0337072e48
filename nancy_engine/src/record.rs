//! Execution side of action records.
//!
//! Passive kinds apply their effect on the first tick and finish. Staged
//! kinds walk `Begin -> Run -> End`: `Begin` falls straight through into
//! `Run`, `Run` repeats every tick while a hotspot is offered to the player,
//! and `End` (requested from outside, usually by a click) commits the effect.

use log::{debug, info, trace};
use nancy_formats::record::{EventFlags, EventFlagsMultiHs, Hot1FrSceneChange};
use nancy_formats::{RecordBody, RecordKind, Rect};
use serde::Serialize;

use crate::state::PlayState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecState {
    Begin,
    Run,
    End,
}

/// Outcome of a single `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pending,
    Done,
}

#[derive(Debug, Clone)]
struct Stage {
    state: ExecState,
    done: bool,
    latched: Option<Rect>,
    live: Option<Rect>,
}

impl Stage {
    fn new() -> Self {
        Stage {
            state: ExecState::Begin,
            done: false,
            latched: None,
            live: None,
        }
    }

    fn finish(&mut self) -> Step {
        self.live = None;
        self.done = true;
        Step::Done
    }
}

/// A parsed record plus its playback state.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    kind: RecordKind,
    body: RecordBody,
    byte_len: usize,
    stage: Stage,
}

impl ActionRecord {
    pub fn new(kind: RecordKind, body: RecordBody, byte_len: usize) -> Self {
        ActionRecord {
            kind,
            body,
            byte_len,
            stage: Stage::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    /// Payload bytes this record occupied in its segment.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn state(&self) -> ExecState {
        self.stage.state
    }

    pub fn is_done(&self) -> bool {
        self.stage.done
    }

    /// Hotspot currently offered to the player, if any.
    pub fn live_hotspot(&self) -> Option<Rect> {
        self.stage.live
    }

    /// Ask a staged record to commit on its next tick. Only honoured while
    /// the record is in `Run`.
    pub fn request_end(&mut self) -> bool {
        if self.stage.done || self.stage.state != ExecState::Run {
            return false;
        }
        self.stage.state = ExecState::End;
        true
    }

    pub fn execute(&mut self, play: &mut PlayState) -> Step {
        if self.stage.done {
            return Step::Done;
        }
        match &self.body {
            RecordBody::Hot1FrSceneChange(hot) => step_hot_scene_change(hot, &mut self.stage, play),
            RecordBody::EventFlagsMultiHs(multi) => {
                step_event_flags_multi_hs(multi, &mut self.stage, play)
            }
            body => {
                apply_passive(self.kind, body, play);
                self.stage.state = ExecState::End;
                self.stage.finish()
            }
        }
    }
}

fn enter_run(stage: &mut Stage, latch: Option<Rect>) -> ExecState {
    if stage.state == ExecState::Begin {
        stage.latched = latch;
        stage.state = ExecState::Run;
    }
    stage.state
}

fn step_hot_scene_change(
    hot: &Hot1FrSceneChange,
    stage: &mut Stage,
    play: &mut PlayState,
) -> Step {
    match enter_run(stage, Some(hot.hotspot.coords)) {
        ExecState::End => {
            info!(
                "scene change to {} (frame {}, scroll {})",
                hot.scene.scene_id, hot.scene.frame_id, hot.scene.vertical_offset
            );
            play.queue_scene_change(&hot.scene);
            stage.finish()
        }
        _ => {
            stage.live = if hot.hotspot.frame_id == play.current_view_frame {
                stage.latched
            } else {
                None
            };
            Step::Pending
        }
    }
}

fn step_event_flags_multi_hs(
    multi: &EventFlagsMultiHs,
    stage: &mut Stage,
    play: &mut PlayState,
) -> Step {
    match enter_run(stage, None) {
        ExecState::End => {
            apply_event_flags(&multi.flags, play);
            stage.finish()
        }
        _ => {
            // Later hotspots win when several share the current frame.
            stage.live = multi
                .hotspots
                .iter()
                .rev()
                .find(|desc| desc.frame_id == play.current_view_frame)
                .map(|desc| desc.coords);
            trace!("multi-hotspot flags live: {:?}", stage.live);
            Step::Pending
        }
    }
}

fn apply_event_flags(flags: &EventFlags, play: &mut PlayState) {
    for (label, flag) in flags.applied() {
        debug!("event flag {label} = {flag:?}");
        play.set_event_flag(label, flag);
    }
}

fn apply_passive(kind: RecordKind, body: &RecordBody, play: &mut PlayState) {
    match body {
        RecordBody::SceneChange(change) => {
            info!(
                "scene change to {} (frame {}, scroll {})",
                change.scene_id, change.frame_id, change.vertical_offset
            );
            play.queue_scene_change(change);
        }
        RecordBody::EventFlags(flags) => apply_event_flags(flags, play),
        RecordBody::DifficultyLevel(level) => {
            play.difficulty = level.difficulty;
            if let Some(label) = level.flag.label {
                play.set_event_flag(label, level.flag.flag);
            }
        }
        _ => match kind {
            RecordKind::ResetAndStartTimer => play.reset_timer(true),
            RecordKind::StopTimer => play.reset_timer(false),
            other => trace!("{} has no engine-state effect", other.name()),
        },
    }
}
