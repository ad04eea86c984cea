use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Provider, ProviderAuth};
use crate::auth::error::AuthError;
use crate::auth::session::{DeviceAuthSession, DevicePoll, TokenGrant};

const DEFAULT_BASE_URL: &str = "https://api.trakt.tv";

/// Trakt OAuth backend.
///
/// All endpoints live on one host: `/oauth/device/code`, `/oauth/device/token`,
/// `/oauth/token` (refresh), `/oauth/revoke`, and `/users/me` as the probe and
/// identity lookup. Requests are JSON; poll outcomes are keyed off the HTTP
/// status code (400 = pending, 410 = expired, 418 = denied, 429 = slow down).
pub struct TraktAuth {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl TraktAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// API headers Trakt requires on every call besides the bearer token.
    fn api_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Content-Type", "application/json")
            .header("trakt-api-version", "2")
            .header("trakt-api-key", self.client_id.as_str())
    }
}

#[async_trait]
impl ProviderAuth for TraktAuth {
    fn provider(&self) -> Provider {
        Provider::Trakt
    }

    fn api_base_url(&self) -> &str {
        &self.base_url
    }

    async fn start_device_code(&self) -> Result<DeviceAuthSession, AuthError> {
        let resp = self
            .client
            .post(format!("{}/oauth/device/code", self.base_url))
            .json(&json!({ "client_id": self.client_id }))
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        if !resp.status().is_success() {
            return Err(AuthError::protocol(
                Provider::Trakt,
                format!("device code request failed with status {}", resp.status()),
            ));
        }
        let payload: TraktDeviceCodeResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(Provider::Trakt, format!("invalid device code response: {e}"))
        })?;
        Ok(DeviceAuthSession {
            provider: Provider::Trakt,
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_url: payload.verification_url,
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
            .post(format!("{}/oauth/device/token", self.base_url))
            .json(&json!({
                "code": session.device_code,
                "client_id": self.client_id,
                "client_secret": self.client_secret,
            }))
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        let status = resp.status();
        debug!(%status, "trakt device token poll");
        match status {
            StatusCode::OK => {
                let payload: TraktTokenResponse = resp.json().await.map_err(|e| {
                    AuthError::protocol(Provider::Trakt, format!("invalid token response: {e}"))
                })?;
                Ok(DevicePoll::Authorized {
                    grant: TokenGrant {
                        access_token: payload.access_token,
                        refresh_token: payload.refresh_token,
                    },
                })
            }
            StatusCode::BAD_REQUEST => Ok(DevicePoll::Pending),
            StatusCode::TOO_MANY_REQUESTS => Ok(DevicePoll::SlowDown),
            StatusCode::IM_A_TEAPOT => Ok(DevicePoll::Denied),
            StatusCode::GONE => Ok(DevicePoll::Expired),
            other => Err(AuthError::protocol(
                Provider::Trakt,
                format!("device token poll failed with status {other}"),
            )),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let resp = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .json(&json!({
                "refresh_token": refresh_token,
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "grant_type": "refresh_token",
            }))
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        if !resp.status().is_success() {
            return Err(AuthError::protocol(
                Provider::Trakt,
                format!("refresh grant failed with status {}", resp.status()),
            ));
        }
        let payload: TraktTokenResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(Provider::Trakt, format!("invalid refresh response: {e}"))
        })?;
        Ok(TokenGrant {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        })
    }

    async fn probe_access_token(&self, access_token: &str) -> Result<bool, AuthError> {
        let resp = self
            .api_request(self.client.get(format!("{}/users/me", self.base_url)))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        match resp.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            other => Err(AuthError::protocol(
                Provider::Trakt,
                format!("account probe failed with status {other}"),
            )),
        }
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<Option<String>, AuthError> {
        let resp = self
            .api_request(self.client.get(format!("{}/users/me", self.base_url)))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        if !resp.status().is_success() {
            return Err(AuthError::protocol(
                Provider::Trakt,
                format!("identity lookup failed with status {}", resp.status()),
            ));
        }
        let payload: TraktUserResponse = resp.json().await.map_err(|e| {
            AuthError::protocol(Provider::Trakt, format!("invalid identity response: {e}"))
        })?;
        Ok(Some(payload.username))
    }

    async fn revoke(&self, access_token: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(format!("{}/oauth/revoke", self.base_url))
            .json(&json!({
                "token": access_token,
                "client_id": self.client_id,
                "client_secret": self.client_secret,
            }))
            .send()
            .await
            .map_err(|e| AuthError::network(Provider::Trakt, e))?;
        if !resp.status().is_success() {
            return Err(AuthError::protocol(
                Provider::Trakt,
                format!("revoke failed with status {}", resp.status()),
            ));
        }
        Ok(())
    }

    fn apply_auth(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        self.api_request(request).bearer_auth(access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TraktDeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct TraktTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TraktUserResponse {
    username: String,
}
