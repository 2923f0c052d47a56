//! Discrete stepping for continuous gestures (drag motion, wheel scroll).

use crate::engine::{InputFault, InputSink};
use crate::{MouseButton, Point};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Cursor moves every 10ms during a drag sweep.
const MOVE_STEP_MS: u64 = 10;
/// Wheel events fire every 50ms during a scroll.
const SCROLL_STEP_MS: u64 = 50;
/// Scroll units per pixel of vertical span; positive spans scroll up.
const SCROLL_GAIN: i32 = 5;

/// Move to the point and click. No motion phase.
pub(crate) fn click(
    sink: &dyn InputSink,
    at: Point,
    button: MouseButton,
) -> Result<(), InputFault> {
    debug!(x = at.x, y = at.y, ?button, "click");
    sink.move_cursor(at.x, at.y)?;
    sink.press(button)?;
    sink.release(button)
}

/// Press at `start`, sweep toward `end` over `action_ms`, release.
///
/// The release is issued on every exit path: completion, cancellation
/// mid-sweep, and sink faults. A run may be interrupted at any moment
/// and must never leave the button logically held down.
pub(crate) fn drag(
    sink: &dyn InputSink,
    start: Point,
    end: Point,
    button: MouseButton,
    action_ms: u64,
    cancel: &AtomicBool,
) -> Result<(), InputFault> {
    debug!(?start, ?end, ?button, action_ms, "drag");
    sink.move_cursor(start.x, start.y)?;
    sink.press(button)?;

    let motion = match smooth_move(sink, start, end, action_ms, cancel) {
        // Completed sweep settles exactly on the end point.
        Ok(true) => sink.move_cursor(end.x, end.y),
        // Cancelled sweep stays at the last computed position.
        Ok(false) => Ok(()),
        Err(fault) => Err(fault),
    };
    let release = sink.release(button);
    motion.and(release)
}

/// Linear sweep from `start` to `end` in 10ms steps.
///
/// Each step lands on `start + trunc(delta * i / steps)` per axis, so
/// intermediate positions truncate toward the start point. Returns
/// `Ok(false)` if cancelled before finishing; the cursor is left at the
/// last computed position, not forced to `end`.
fn smooth_move(
    sink: &dyn InputSink,
    start: Point,
    end: Point,
    action_ms: u64,
    cancel: &AtomicBool,
) -> Result<bool, InputFault> {
    let steps = (action_ms / MOVE_STEP_MS).max(1);
    for i in 1..=steps {
        if cancel.load(Ordering::Acquire) {
            return Ok(false);
        }
        let frac = i as f64 / steps as f64;
        let x = start.x + ((end.x - start.x) as f64 * frac) as i32;
        let y = start.y + ((end.y - start.y) as f64 * frac) as i32;
        sink.move_cursor(x, y)?;
        thread::sleep(Duration::from_millis(MOVE_STEP_MS));
    }
    Ok(true)
}

/// Move to `start` and deliver the scroll distance in 50ms steps.
///
/// The distance is `(start.y - end.y) * 5`, positive scrolling up. The
/// per-step amount is a truncating division, so the delivered total can
/// undershoot the full distance by up to `steps - 1` units. Kept as-is:
/// this matches the long-observed behavior of the feature.
pub(crate) fn scroll(
    sink: &dyn InputSink,
    start: Point,
    end: Point,
    action_ms: u64,
    cancel: &AtomicBool,
) -> Result<(), InputFault> {
    debug!(?start, ?end, action_ms, "scroll");
    sink.move_cursor(start.x, start.y)?;

    // Delta math in i64: extreme spans exceed i32. The final cast wraps
    // the way 32-bit wheel arithmetic always has.
    let scroll_delta = (i64::from(start.y) - i64::from(end.y)) * i64::from(SCROLL_GAIN);
    let steps = scroll_steps(action_ms);
    let per_step = (scroll_delta / i64::from(steps)) as i32;
    for _ in 0..steps {
        if cancel.load(Ordering::Acquire) {
            return Ok(());
        }
        sink.scroll(per_step)?;
        thread::sleep(Duration::from_millis(SCROLL_STEP_MS));
    }
    Ok(())
}

/// Step count for a scroll, clamped so the i32 cast stays positive for
/// any `action_ms` the type admits.
fn scroll_steps(action_ms: u64) -> i32 {
    (action_ms / SCROLL_STEP_MS).clamp(1, i32::MAX as u64) as i32
}
