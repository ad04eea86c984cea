use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use tracing::debug;

use super::{Provider, ProviderAuth};
use crate::auth::error::AuthError;
use crate::auth::session::{DeviceAuthSession, DevicePoll, TokenGrant};

const DEFAULT_TOKEN_URL: &str = "https://www.premiumize.me/token";
const DEFAULT_API_BASE_URL: &str = "https://www.premiumize.me/api";

/// Premiumize OAuth backend.
///
/// Device code and token exchange share one form-encoded `/token` endpoint;
/// the device-code request is distinguished by `response_type=device_code`.
/// Poll outcomes arrive as an `error` string in the JSON body rather than an
/// HTTP status. Premiumize issues no refresh tokens and has no revoke
/// endpoint; API calls authenticate with an `access_token` query parameter.
pub struct PremiumizeAuth {
    client: reqwest::Client,
    token_url: String,
    api_base_url: String,
    client_id: String,
    client_secret: String,
}

impl PremiumizeAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[async_trait]
impl ProviderAuth for PremiumizeAuth {
    fn provider(&self) -> Provider {
        Provider::Premiumize
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    async fn start_device_code(&self) -> Result<DeviceAuthSession, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("response_type", "device_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Premiumize, e))?;
        if !resp.status().is_success() {
            return Err(AuthError::protocol(
                Provider::Premiumize,
                format!("device code request failed with status {}", resp.status()),
            ));
        }
        let payload: PremiumizeDeviceCodeResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(
                Provider::Premiumize,
                format!("invalid device code response: {e}"),
            )
        })?;
        Ok(DeviceAuthSession {
            provider: Provider::Premiumize,
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_url: payload.verification_uri,
            expires_in: payload.expires_in,
            interval_secs: payload.interval,
        })
    }

    async fn poll_device_code(
        &self,
        session: &DeviceAuthSession,
    ) -> Result<DevicePoll, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", session.device_code.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "device_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Premiumize, e))?;
        let status = resp.status();
        // Errors come back in the body with a 4xx status, so parse either way.
        let payload: PremiumizeTokenResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(Provider::Premiumize, format!("invalid token response: {e}"))
        })?;
        debug!(%status, error = payload.error.as_deref(), "premiumize token poll");
        if let Some(access_token) = payload.access_token {
            return Ok(DevicePoll::Authorized {
                grant: TokenGrant {
                    access_token,
                    refresh_token: payload.refresh_token,
                },
            });
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DevicePoll::Pending),
            Some("slow_down") => Ok(DevicePoll::SlowDown),
            Some("access_denied") => Ok(DevicePoll::Denied),
            Some("expired_token") => Ok(DevicePoll::Expired),
            Some(other) => Err(AuthError::protocol(
                Provider::Premiumize,
                format!("device token error: {other}"),
            )),
            None => Err(AuthError::protocol(
                Provider::Premiumize,
                format!("token response missing both token and error (status {status})"),
            )),
        }
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AuthError> {
        // Premiumize access tokens are long-lived and the service offers no
        // refresh grant; a rejected token always means a fresh device dance.
        Err(AuthError::protocol(
            Provider::Premiumize,
            "provider does not issue refresh tokens",
        ))
    }

    async fn probe_access_token(&self, access_token: &str) -> Result<bool, AuthError> {
        let resp = self
            .client
            .get(format!("{}/account/info", self.api_base_url))
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Premiumize, e))?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        let payload: PremiumizeStatusResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(
                Provider::Premiumize,
                format!("invalid account info response: {e}"),
            )
        })?;
        Ok(payload.status == "success")
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<Option<String>, AuthError> {
        Ok(None)
    }

    async fn revoke(&self, _access_token: &str) -> Result<(), AuthError> {
        // No revoke endpoint; logout clears local state only.
        Ok(())
    }

    fn apply_auth(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request.query(&[("access_token", access_token)])
    }
}

#[derive(Debug, Deserialize)]
struct PremiumizeDeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct PremiumizeTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PremiumizeStatusResponse {
    status: String,
}
