//! Input sink implementations.

use crate::{PlatformError, PlatformResult};
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use mimic_core::{InputFault, InputSink, MouseButton};
use std::sync::Mutex;
use tracing::debug;

/// Minimal no-op sink for early UI development / testing.
pub struct NoopSink;

impl InputSink for NoopSink {
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), InputFault> {
        debug!(x, y, "NoopSink: would move cursor");
        Ok(())
    }

    fn press(&self, button: MouseButton) -> Result<(), InputFault> {
        debug!(?button, "NoopSink: would press");
        Ok(())
    }

    fn release(&self, button: MouseButton) -> Result<(), InputFault> {
        debug!(?button, "NoopSink: would release");
        Ok(())
    }

    fn scroll(&self, units: i32) -> Result<(), InputFault> {
        debug!(units, "NoopSink: would scroll");
        Ok(())
    }
}

/// Real input sink using the `enigo` crate.
pub struct EnigoSink {
    enigo: Mutex<Enigo>,
}

impl EnigoSink {
    /// Create a new EnigoSink.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings)
            .map_err(|e| PlatformError::InjectionFailed(format!("failed to create Enigo: {e}")))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn inject<T>(&self, what: &str, op: impl FnOnce(&mut Enigo) -> Result<T, enigo::InputError>)
        -> Result<T, InputFault>
    {
        let mut enigo = self.enigo.lock().unwrap();
        op(&mut enigo)
            .map_err(|e| PlatformError::InjectionFailed(format!("{what}: {e}")).into())
    }
}

impl InputSink for EnigoSink {
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), InputFault> {
        debug!(x, y, "injecting cursor move");
        self.inject("move", |enigo| enigo.move_mouse(x, y, Coordinate::Abs))
    }

    fn press(&self, button: MouseButton) -> Result<(), InputFault> {
        debug!(?button, "injecting button press");
        self.inject("press", |enigo| {
            enigo.button(button_to_enigo(button), Direction::Press)
        })
    }

    fn release(&self, button: MouseButton) -> Result<(), InputFault> {
        debug!(?button, "injecting button release");
        self.inject("release", |enigo| {
            enigo.button(button_to_enigo(button), Direction::Release)
        })
    }

    fn scroll(&self, units: i32) -> Result<(), InputFault> {
        debug!(units, "injecting scroll");
        // The engine's units are wheel convention (positive = up);
        // enigo's vertical axis counts positive as scrolling down.
        self.inject("scroll", |enigo| enigo.scroll(-units, Axis::Vertical))
    }
}

fn button_to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
    }
}
