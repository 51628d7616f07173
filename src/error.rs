/// Error kinds surfaced by the simulation core.
///
/// Precondition violations (`InvalidArgument`, `InvalidState`) are raised
/// immediately and never clamped. Persistence and resource failures are
/// separate kinds so the frontend can degrade instead of stopping the loop.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidState { from: String, to: String },

    #[error("persistence failure at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize data: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not parse data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("resource unavailable: {0}")]
    Resource(String),

    #[error("bad level layout: {0}")]
    Level(String),
}

impl SimError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }

    pub fn invalid_state(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        SimError::InvalidState {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }

    /// True for failures the game loop should log and survive.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            SimError::Persistence { .. }
                | SimError::Serialize(_)
                | SimError::Parse(_)
                | SimError::Resource(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject negative, NaN or infinite frame durations.
pub fn check_delta(delta_time: f32) -> Result<()> {
    if !delta_time.is_finite() || delta_time < 0.0 {
        return Err(SimError::invalid_argument(format!(
            "deltaTime must be finite and >= 0, got {delta_time}"
        )));
    }
    Ok(())
}
