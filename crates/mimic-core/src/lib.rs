//! mimic-core: session model + playback scheduling.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! Platform specific I/O (real input injection) lives in `mimic-platform`.

mod engine;
mod interpolate;
mod storage;
mod timing;

pub use engine::{
    Engine, EngineError, EngineResult, EngineState, InputFault, InputSink, PlaybackStatus,
};
pub use storage::{
    ensure_scripts_dir, list_scripts, load_named, load_script, save_named, save_script,
    scripts_dir, StorageError, StorageResult,
};
pub use timing::{cancellable_wait, TimeSplit};

use serde::{Deserialize, Serialize};

/// Default inter-step delay for newly captured actions.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Default share of an action's delay spent on drag/scroll motion.
pub const DEFAULT_ACTION_TIME_RATIO: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What a scripted step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Move to a point and click.
    Click { button: MouseButton },
    /// Press at `start`, sweep to `end`, release.
    Drag { button: MouseButton },
    /// Wheel scroll; distance derived from the vertical span `start` → `end`.
    Scroll,
}

/// One scripted pointer step with its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub start: Point,
    /// Meaningful only for Drag/Scroll; clicks ignore it.
    pub end: Point,
    /// Whole time budget of the step in milliseconds.
    pub delay_ms: u64,
}

impl Action {
    pub fn click(button: MouseButton, at: Point) -> Self {
        Self { kind: ActionKind::Click { button }, start: at, end: at, delay_ms: DEFAULT_DELAY_MS }
    }

    pub fn drag(button: MouseButton, start: Point, end: Point) -> Self {
        Self { kind: ActionKind::Drag { button }, start, end, delay_ms: DEFAULT_DELAY_MS }
    }

    pub fn scroll(start: Point, end: Point) -> Self {
        Self { kind: ActionKind::Scroll, start, end, delay_ms: DEFAULT_DELAY_MS }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// The user-edited action list plus loop configuration.
///
/// Owned by one [`Engine`]; edits go through the engine's guarded
/// mutation commands so the list never changes during playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub actions: Vec<Action>,
    /// 0 means loop until stopped.
    pub repeat_count: u32,
    /// Fraction of each drag/scroll delay spent on motion, in [0, 1].
    pub action_time_ratio: f32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            repeat_count: 0,
            action_time_ratio: DEFAULT_ACTION_TIME_RATIO,
        }
    }
}
