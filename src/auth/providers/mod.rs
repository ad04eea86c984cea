//! Provider backends for the device-code grant and token endpoints.

pub mod premiumize;
pub mod trakt;

pub use premiumize::PremiumizeAuth;
pub use trakt::TraktAuth;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use strum::{Display, EnumString};

use super::error::AuthError;
use super::session::{DeviceAuthSession, DevicePoll, TokenGrant};

/// The external services this crate authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Provider {
    /// Watchlist/scrobble tracking service.
    Trakt,
    /// Debrid/stream-resolution service.
    Premiumize,
}

/// Provider-specific halves of the OAuth protocol.
///
/// Each backend speaks exactly the field set its provider documents; the
/// request shapes are not interchangeable (Premiumize wants
/// `response_type=device_code` form fields where Trakt takes JSON).
#[async_trait]
pub trait ProviderAuth: Send + Sync {
    fn provider(&self) -> Provider;

    /// Base URL for authenticated API calls.
    fn api_base_url(&self) -> &str;

    /// Request a device/user code pair from the token endpoint.
    async fn start_device_code(&self) -> Result<DeviceAuthSession, AuthError>;

    /// One poll of the token endpoint, classified. Never sleeps; pacing
    /// belongs to the flow.
    async fn poll_device_code(
        &self,
        session: &DeviceAuthSession,
    ) -> Result<DevicePoll, AuthError>;

    /// Exchange a refresh token for a fresh grant.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;

    /// Whether the provider still accepts this access token.
    ///
    /// `Ok(false)` means the token was rejected; transport failures are `Err`.
    async fn probe_access_token(&self, access_token: &str) -> Result<bool, AuthError>;

    /// Look up the authenticated account name, for providers that have one.
    async fn fetch_identity(&self, access_token: &str) -> Result<Option<String>, AuthError>;

    /// Server-side token revocation. Providers without a revoke endpoint
    /// return `Ok(())`.
    async fn revoke(&self, access_token: &str) -> Result<(), AuthError>;

    /// Attach provider-specific authentication to an outbound request
    /// (bearer header for Trakt, query parameter for Premiumize).
    fn apply_auth(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_display_is_kebab_case() {
        assert_eq!(Provider::Trakt.to_string(), "trakt");
        assert_eq!(Provider::Premiumize.to_string(), "premiumize");
    }

    #[test]
    fn provider_parses_from_kebab_case() {
        assert_eq!(Provider::from_str("trakt").unwrap(), Provider::Trakt);
        assert_eq!(
            Provider::from_str("premiumize").unwrap(),
            Provider::Premiumize
        );
        assert!(Provider::from_str("netflix").is_err());
    }
}
