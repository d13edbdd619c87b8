//! Error types for the animation timeline

use thiserror::Error;

/// Animation timeline error types
#[derive(Debug, Error)]
pub enum AnimatorError {
    /// Animation tag name not known to any applier
    #[error("Unknown animation kind: {0}")]
    UnknownAnimation(String),

    /// Animation received the wrong number of parameters
    #[error("Invalid parameter count for {kind}: expected {expected}, got {actual}")]
    InvalidArity {
        /// Animation kind
        kind: &'static str,
        /// Accepted parameter counts
        expected: &'static str,
        /// Received parameter count
        actual: usize,
    },

    /// Animation parameter is not a finite number
    #[error("Invalid parameter for {kind}: {value}")]
    InvalidParameter {
        /// Animation kind
        kind: &'static str,
        /// Offending value
        value: f64,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Event or configuration (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Font lookup or shaping failed
    #[error("Font error: {0}")]
    FontError(String),
}

impl AnimatorError {
    /// Check if the error only disables a single effect
    ///
    /// Recoverable errors are logged and the event keeps rendering with its
    /// pure (unanimated) state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownAnimation(_)
                | Self::InvalidArity { .. }
                | Self::InvalidParameter { .. }
                | Self::InvalidColor(_)
                | Self::FontError(_)
        )
    }
}
