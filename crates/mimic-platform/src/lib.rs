//! mimic-platform: OS input injection behind mimic-core's sink trait.
//!
//! This crate provides:
//! - A real injector built on `enigo` (mouse move/press/release/scroll)
//! - A no-op injector for wiring a control surface without injecting

mod error;
mod injector;

pub use error::{PlatformError, PlatformResult};
pub use injector::{EnigoSink, NoopSink};
