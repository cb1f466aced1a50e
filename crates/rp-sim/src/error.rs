use thiserror::Error;

use rp_core::CoreError;

/// Errors returned by engine controls.  Anomalies met while ticking are
/// never errors; they halt playback through the observer instead.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot start playback: the route path has fewer than two points")]
    EmptyPath,

    #[error("speed multiplier must be finite and > 0, got {0}")]
    InvalidSpeedMultiplier(f64),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
