use thiserror::Error;

use super::providers::Provider;

/// Normalized authentication errors across providers.
///
/// The device-code flow and validator resolve recoverable conditions
/// (pending, slow-down, refreshable expiry) internally; only the terminal
/// kinds below reach callers.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid credential and nothing left to refresh; the caller must run
    /// the full device-code flow.
    #[error("{provider}: authorization required")]
    AuthRequired { provider: Provider },

    /// The user rejected the grant.
    #[error("{provider}: the user denied the authorization request")]
    Denied { provider: Provider },

    /// The device code expired before the user authorized.
    #[error("{provider}: device code expired before authorization completed")]
    Timeout { provider: Provider },

    /// Malformed or unexpected provider response; not retried automatically.
    #[error("{provider}: unexpected response: {message}")]
    Protocol { provider: Provider, message: String },

    /// Transport-level failure.
    #[error("{provider}: network error: {message}")]
    Network { provider: Provider, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    pub fn protocol(provider: Provider, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider,
            message: message.into(),
        }
    }

    pub fn network(provider: Provider, error: reqwest::Error) -> Self {
        Self::Network {
            provider,
            message: error.to_string(),
        }
    }

    /// The provider this error occurred against, where one applies.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::AuthRequired { provider }
            | Self::Denied { provider }
            | Self::Timeout { provider }
            | Self::Protocol { provider, .. }
            | Self::Network { provider, .. } => Some(*provider),
            Self::Io(_) | Self::Serialization(_) => None,
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
