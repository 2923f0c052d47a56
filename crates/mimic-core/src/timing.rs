//! Action/rest time split and cancellable waits.

use crate::{Action, ActionKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Upper bound on a single uninterruptible sleep inside a wait.
const WAIT_SLICE_MS: u64 = 100;

/// How an action's delay budget splits between motion and idling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSplit {
    /// Time spent performing drag/scroll motion. Zero for clicks.
    pub action_ms: u64,
    /// Time to idle after the step. `action_ms + rest_ms == delay_ms`.
    pub rest_ms: u64,
}

impl TimeSplit {
    /// Split an action's delay according to the session's motion ratio.
    ///
    /// Clicks have no motion phase, so the whole delay is rest time.
    /// For drag/scroll the motion share is `floor(delay_ms * ratio)` and
    /// the rest phase gets the exact remainder.
    pub fn for_action(action: &Action, ratio: f32) -> Self {
        match action.kind {
            ActionKind::Click { .. } => Self { action_ms: 0, rest_ms: action.delay_ms },
            ActionKind::Drag { .. } | ActionKind::Scroll => {
                let action_ms = (action.delay_ms as f64 * f64::from(ratio)) as u64;
                Self { action_ms, rest_ms: action.delay_ms - action_ms }
            }
        }
    }
}

/// Sleep for `total_ms`, re-checking `cancel` at most every 100ms so a
/// stop request is honored promptly regardless of the total duration.
///
/// Returns `false` if the wait was cut short by cancellation.
pub fn cancellable_wait(total_ms: u64, cancel: &AtomicBool) -> bool {
    trace!(total_ms, "wait");
    let mut waited = 0u64;
    while waited < total_ms {
        if cancel.load(Ordering::Acquire) {
            return false;
        }
        let slice = (total_ms - waited).min(WAIT_SLICE_MS);
        thread::sleep(Duration::from_millis(slice));
        waited += slice;
    }
    true
}
