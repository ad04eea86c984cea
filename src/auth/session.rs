use chrono::{DateTime, Utc};

use super::providers::Provider;

/// Ephemeral device-code session for one authorization attempt.
///
/// Owned by the flow for the duration of the attempt; never persisted. The
/// `device_code` is only ever sent back to the provider, while the
/// `user_code`/`verification_url` pair is surfaced to the end user.
#[derive(Debug, Clone)]
pub struct DeviceAuthSession {
    pub provider: Provider,
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Seconds until the provider invalidates the device code.
    pub expires_in: u64,
    /// Minimum gap between polls, as dictated by the provider.
    pub interval_secs: u64,
}

/// What the user must be shown to complete a device-code authorization.
///
/// Sent exactly once per device dance over a oneshot channel, right after the
/// provider issues the code pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePrompt {
    pub verification_url: String,
    pub user_code: String,
}

/// Access/refresh pair returned by a token exchange (device or refresh grant).
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Classification of a single token-endpoint poll.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    /// User has not approved yet; poll again after the interval.
    Pending,
    /// Provider asked for a longer gap between polls.
    SlowDown,
    /// Token pair issued.
    Authorized { grant: TokenGrant },
    /// User rejected the grant.
    Denied,
    /// The device code is no longer valid.
    Expired,
}

/// A live credential for one provider.
///
/// At most one credential per provider is persisted at a time; writing a new
/// one supersedes the previous one.
#[derive(Debug, Clone)]
pub struct Credential {
    pub provider: Provider,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub obtained_at: DateTime<Utc>,
    /// Authenticated account name; Trakt only.
    pub username: Option<String>,
}
