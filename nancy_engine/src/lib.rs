//! Execution side of the action-record interpreter: the engine state records
//! touch, the per-record state machine and the dispatcher that ticks them.

pub mod action_manager;
pub mod record;
pub mod state;

pub use action_manager::{ActionManager, LoadError, SegmentStatus};
pub use record::{ActionRecord, ExecState, Step};
pub use state::PlayState;
