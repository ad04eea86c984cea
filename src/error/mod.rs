//! Error types for ScreenPass.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all ScreenPass operations.
#[derive(Error, Debug)]
pub enum ScreenPassError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stream resolution failed: {0}")]
    Resolve(String),
}

impl ScreenPassError {
    /// Whether the remedy for this error is re-running the device-code flow.
    ///
    /// UI callers use this to decide between showing the login screen and a
    /// generic retry affordance.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Auth(
                AuthError::AuthRequired { .. }
                    | AuthError::Denied { .. }
                    | AuthError::Timeout { .. }
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, ScreenPassError>;
