//! Configuration (env via dotenvy, explicit overrides win).

use std::path::PathBuf;

use crate::error::{Result, ScreenPassError};

/// OAuth client registration for one provider.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Crate configuration: client registrations plus the credential directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub trakt: ProviderCredentials,
    pub premiumize: ProviderCredentials,
    /// Override for the credential store directory; `None` means the default
    /// under the user's home.
    pub credential_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(trakt: ProviderCredentials, premiumize: ProviderCredentials) -> Self {
        Self {
            trakt,
            premiumize,
            credential_dir: None,
        }
    }

    pub fn with_credential_dir(mut self, dir: PathBuf) -> Self {
        self.credential_dir = Some(dir);
        self
    }

    /// Load from the environment (`TRAKT_CLIENT_ID`, `TRAKT_CLIENT_SECRET`,
    /// `PREMIUMIZE_CLIENT_ID`, `PREMIUMIZE_CLIENT_SECRET`, optional
    /// `SCREENPASS_DIR`). A `.env` file is honored when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self {
            trakt: ProviderCredentials {
                client_id: require_env("TRAKT_CLIENT_ID")?,
                client_secret: require_env("TRAKT_CLIENT_SECRET")?,
            },
            premiumize: ProviderCredentials {
                client_id: require_env("PREMIUMIZE_CLIENT_ID")?,
                client_secret: require_env("PREMIUMIZE_CLIENT_SECRET")?,
            },
            credential_dir: std::env::var("SCREENPASS_DIR").ok().map(PathBuf::from),
        };
        Ok(config)
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ScreenPassError::Configuration(format!(
            "missing required environment variable {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_carries_credentials() {
        let config = Config::new(
            ProviderCredentials::new("t-id", "t-secret"),
            ProviderCredentials::new("p-id", "p-secret"),
        );
        assert_eq!(config.trakt.client_id, "t-id");
        assert_eq!(config.premiumize.client_secret, "p-secret");
        assert!(config.credential_dir.is_none());
    }

    #[test]
    fn with_credential_dir_overrides_default() {
        let config = Config::new(
            ProviderCredentials::new("t", "t"),
            ProviderCredentials::new("p", "p"),
        )
        .with_credential_dir(PathBuf::from("/tmp/screenpass-test"));
        assert_eq!(
            config.credential_dir.as_deref(),
            Some(std::path::Path::new("/tmp/screenpass-test"))
        );
    }
}
