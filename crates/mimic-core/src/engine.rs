//! Playback engine: state machine + execution thread.

use crate::interpolate;
use crate::timing::{cancellable_wait, TimeSplit};
use crate::{Action, ActionKind, MouseButton, Session};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Engine state machine.
///
/// `Stopping` is a transient marker between a stop request and the
/// execution thread parking back to `Idle`; callers treat it as still
/// busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Idle, waiting for a start.
    Idle,
    /// Executing a session.
    Running,
    /// Stop requested, execution thread winding down.
    Stopping,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

fn state_of(word: u8) -> EngineState {
    match word {
        STATE_RUNNING => EngineState::Running,
        STATE_STOPPING => EngineState::Stopping,
        _ => EngineState::Idle,
    }
}

/// Errors returned synchronously by engine calls.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The call is not valid in the engine's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// A configuration value was rejected.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// An Input Sink call failed during a run. Fatal for that run.
#[derive(Debug, Clone, Error)]
#[error("input injection failed: {0}")]
pub struct InputFault(pub String);

/// Capability performing actual pointer/button/scroll events.
///
/// Calls are assumed synchronous and fast; any failure aborts the
/// current run.
pub trait InputSink: Send + Sync {
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), InputFault>;
    fn press(&self, button: MouseButton) -> Result<(), InputFault>;
    fn release(&self, button: MouseButton) -> Result<(), InputFault>;
    fn scroll(&self, units: i32) -> Result<(), InputFault>;
}

/// Status updates delivered asynchronously to the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Back to idle; a new start is accepted.
    Idle,
    /// Execution started.
    Running,
    /// A full pass over the action list completed (bounded runs only).
    RunningLoop { loop_index: u32, repeat_count: u32 },
    /// The run ended, either by request or after the last pass.
    Stopped,
    /// The run aborted on an input fault.
    Error { message: String },
}

/// The playback engine. Owns the session; drives one execution thread
/// at a time.
///
/// The control surface never blocks on the execution thread: `stop`
/// flips an atomic flag, guard checks read an atomic state word, and
/// status arrives over the channel handed out by [`Engine::new`].
pub struct Engine<S: InputSink + 'static> {
    sink: Arc<S>,
    session: Mutex<Session>,
    state: Arc<AtomicU8>,
    cancel: Arc<AtomicBool>,
    status_tx: Sender<PlaybackStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: InputSink + 'static> Engine<S> {
    /// Create an engine around an input sink. The receiver carries
    /// status updates for the lifetime of the engine.
    pub fn new(sink: S) -> (Self, Receiver<PlaybackStatus>) {
        let (status_tx, status_rx) = bounded(256);
        let engine = Self {
            sink: Arc::new(sink),
            session: Mutex::new(Session::default()),
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            cancel: Arc::new(AtomicBool::new(false)),
            status_tx,
            worker: Mutex::new(None),
        };
        (engine, status_rx)
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        state_of(self.state.load(Ordering::Acquire))
    }

    /// Whether a run is active (including stop wind-down).
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) != STATE_IDLE
    }

    /// Begin playback. `repeat_count` of 0 loops until stopped.
    ///
    /// Returns immediately after spawning the execution thread; status
    /// changes arrive on the channel. Rejected while a run is active or
    /// when the session has no actions.
    pub fn start(&self, repeat_count: u32) -> EngineResult<()> {
        let mut session = self.session.lock().unwrap();
        if session.actions.is_empty() {
            return Err(EngineError::InvalidOperation("no actions to execute"));
        }
        self.state
            .compare_exchange(
                STATE_IDLE,
                STATE_RUNNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| EngineError::InvalidOperation("playback is already active"))?;

        session.repeat_count = repeat_count;
        // Snapshot while still holding the session lock; the thread
        // never touches the live session after this point.
        let actions = session.actions.clone();
        let ratio = session.action_time_ratio;
        drop(session);

        self.cancel.store(false, Ordering::Release);
        // The previous thread (if any) already parked to Idle; reap it.
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }

        info!(repeat_count, action_count = actions.len(), "starting playback");
        let worker = Worker {
            sink: Arc::clone(&self.sink),
            actions,
            ratio,
            repeat_count,
            state: Arc::clone(&self.state),
            cancel: Arc::clone(&self.cancel),
            status_tx: self.status_tx.clone(),
        };
        *self.worker.lock().unwrap() = Some(thread::spawn(move || worker.run()));
        Ok(())
    }

    /// Request a stop. Idempotent; a no-op unless a run is active.
    /// Never blocks: the execution thread observes the flag at its next
    /// checkpoint (within 100ms) and parks back to Idle on its own.
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(
                STATE_RUNNING,
                STATE_STOPPING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            info!("stop requested");
            self.cancel.store(true, Ordering::Release);
        }
    }

    // === Session commands (rejected while a run is active) ===

    /// Append an action to the session.
    pub fn push_action(&self, action: Action) -> EngineResult<()> {
        let mut session = self.lock_idle()?;
        debug!(?action, "action added");
        session.actions.push(action);
        Ok(())
    }

    /// Remove the action at `index`.
    pub fn remove_action(&self, index: usize) -> EngineResult<()> {
        let mut session = self.lock_idle()?;
        if index >= session.actions.len() {
            return Err(EngineError::InvalidOperation("action index out of range"));
        }
        session.actions.remove(index);
        Ok(())
    }

    /// Replace the action at `index` with an edited one.
    pub fn replace_action(&self, index: usize, action: Action) -> EngineResult<()> {
        let mut session = self.lock_idle()?;
        match session.actions.get_mut(index) {
            Some(slot) => {
                *slot = action;
                Ok(())
            }
            None => Err(EngineError::InvalidOperation("action index out of range")),
        }
    }

    /// Replace the whole action list (script load).
    pub fn replace_actions(&self, actions: Vec<Action>) -> EngineResult<()> {
        let mut session = self.lock_idle()?;
        debug!(count = actions.len(), "action list replaced");
        session.actions = actions;
        Ok(())
    }

    /// Set the drag/scroll motion share of each delay. Must be in [0, 1].
    pub fn set_action_time_ratio(&self, ratio: f32) -> EngineResult<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(EngineError::Configuration(format!(
                "action time ratio must be within [0, 1], got {ratio}"
            )));
        }
        let mut session = self.lock_idle()?;
        session.action_time_ratio = ratio;
        Ok(())
    }

    /// Snapshot of the current action list (for display/persistence).
    pub fn actions(&self) -> Vec<Action> {
        self.session.lock().unwrap().actions.clone()
    }

    pub fn action_time_ratio(&self) -> f32 {
        self.session.lock().unwrap().action_time_ratio
    }

    /// Acquire the session for editing, or fail if a run is active.
    ///
    /// The state check happens under the session lock — the same lock
    /// `start` holds across its Idle→Running transition — so an edit
    /// that passes the check cannot interleave with a starting run.
    fn lock_idle(&self) -> EngineResult<MutexGuard<'_, Session>> {
        let session = self.session.lock().unwrap();
        if self.state.load(Ordering::Acquire) != STATE_IDLE {
            return Err(EngineError::InvalidOperation(
                "session is locked while playback is active",
            ));
        }
        Ok(session)
    }
}

impl<S: InputSink + 'static> Drop for Engine<S> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

/// How a run ended.
enum RunEnd {
    /// All bounded passes completed.
    Completed,
    /// Cancelled by a stop request.
    Cancelled,
    /// An input sink call failed.
    Faulted(String),
}

/// State moved onto the execution thread: a snapshot of the session
/// plus the shared atomics.
struct Worker<S: InputSink> {
    sink: Arc<S>,
    actions: Vec<Action>,
    ratio: f32,
    repeat_count: u32,
    state: Arc<AtomicU8>,
    cancel: Arc<AtomicBool>,
    status_tx: Sender<PlaybackStatus>,
}

impl<S: InputSink> Worker<S> {
    fn run(self) {
        debug!("playback thread started");
        self.emit(PlaybackStatus::Running);

        let terminal = match self.run_passes() {
            RunEnd::Completed => {
                info!("playback completed");
                PlaybackStatus::Stopped
            }
            RunEnd::Cancelled => {
                info!("playback cancelled");
                PlaybackStatus::Stopped
            }
            RunEnd::Faulted(message) => {
                error!(%message, "playback aborted on input fault");
                PlaybackStatus::Error { message }
            }
        };
        self.emit(terminal);

        // Only the execution thread writes the exit transition.
        self.state.store(STATE_IDLE, Ordering::Release);
        self.emit(PlaybackStatus::Idle);
        debug!("playback thread exiting");
    }

    fn run_passes(&self) -> RunEnd {
        let mut completed = 0u32;
        loop {
            if self.repeat_count > 0 && completed >= self.repeat_count {
                return RunEnd::Completed;
            }

            for action in &self.actions {
                if self.cancelled() {
                    return RunEnd::Cancelled;
                }
                if let Err(fault) = self.dispatch(action) {
                    return RunEnd::Faulted(fault.to_string());
                }
            }

            if self.cancelled() {
                return RunEnd::Cancelled;
            }
            if self.repeat_count > 0 {
                completed += 1;
                self.emit(PlaybackStatus::RunningLoop {
                    loop_index: completed,
                    repeat_count: self.repeat_count,
                });
            }
        }
    }

    /// Perform one action, then its rest-phase wait. A cancelled rest
    /// wait is not an error; the pass loop notices the flag next.
    fn dispatch(&self, action: &Action) -> Result<(), InputFault> {
        let split = TimeSplit::for_action(action, self.ratio);
        match action.kind {
            ActionKind::Click { button } => {
                interpolate::click(self.sink.as_ref(), action.start, button)?;
            }
            ActionKind::Drag { button } => {
                interpolate::drag(
                    self.sink.as_ref(),
                    action.start,
                    action.end,
                    button,
                    split.action_ms,
                    &self.cancel,
                )?;
            }
            ActionKind::Scroll => {
                interpolate::scroll(
                    self.sink.as_ref(),
                    action.start,
                    action.end,
                    split.action_ms,
                    &self.cancel,
                )?;
            }
        }
        cancellable_wait(split.rest_ms, &self.cancel);
        Ok(())
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    fn emit(&self, status: PlaybackStatus) {
        if let Err(e) = self.status_tx.try_send(status) {
            warn!("failed to emit status: {}", e);
        }
    }
}
