//! Common error types for mimic-platform.

use mimic_core::InputFault;
use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not implemented")]
    NotImplemented,
    #[error("injection failed: {0}")]
    InjectionFailed(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

impl From<PlatformError> for InputFault {
    fn from(e: PlatformError) -> Self {
        InputFault(e.to_string())
    }
}
