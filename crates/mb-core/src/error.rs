//! Error types for the mediation bridge

use thiserror::Error;

/// Infrastructure error (configuration, I/O)
#[derive(Error, Debug)]
pub enum MbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for infrastructure operations
pub type MbResult<T> = Result<T, MbError>;

/// Failure outcome of an ad operation.
///
/// Caller misuse variants are produced synchronously without contacting the
/// native engine. `Native` carries the engine's code and message verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    #[error("load already in progress")]
    LoadInProgress,

    #[error("ad is not ready to show")]
    NotReady,

    #[error("{operation} is not allowed while {state}")]
    InvalidState { operation: String, state: String },

    #[error("invalid ad instance")]
    InvalidInstance,

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("native error {code}: {message}")]
    Native { code: i32, message: String },

    #[error("ad expired")]
    Expired,

    #[error("request cleared before the native engine answered")]
    Cleared,

    #[error("instance destroyed before the native engine answered")]
    Destroyed,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("adapter error: {0}")]
    Adapter(String),
}

impl AdError {
    /// Native failure with engine-provided code and message
    pub fn native(code: i32, message: impl Into<String>) -> Self {
        Self::Native {
            code,
            message: message.into(),
        }
    }

    /// Operation attempted in a state that does not allow it
    pub fn invalid_state(operation: impl Into<String>, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }

    /// True for errors caused by calling an operation at the wrong time
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            AdError::LoadInProgress
                | AdError::NotReady
                | AdError::InvalidState { .. }
                | AdError::InvalidInstance
                | AdError::InvalidPlacement(_)
        )
    }

    /// Native error code, if this error came from the engine
    pub fn native_code(&self) -> Option<i32> {
        match self {
            AdError::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for ad operations
pub type AdResult<T> = Result<T, AdError>;
