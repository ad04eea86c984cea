//! Authenticated request client with a bounded retry-after-401 policy.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::auth::error::AuthError;
use crate::auth::providers::Provider;
use crate::auth::service::AuthService;
use crate::auth::store::Role;

/// A single outbound provider API call, described independently of transport
/// details so it can be replayed verbatim after a credential refresh.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path joined onto the provider's API base URL, e.g. `/users/me/lists`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// The only path application code should use to reach provider APIs that
/// need authentication.
///
/// Every call reads the current access token from the store, attaches it the
/// way the provider expects, and sends the request. On a 401 the client makes
/// exactly one recovery attempt: it asks the validator for a fresh token and
/// replays the request once, returning that second response regardless of its
/// status. If the validator reports that re-authorization is needed, all
/// stored credentials for the provider are cleared and
/// [`AuthError::AuthRequired`] is surfaced without a replay. A request is
/// never retried more than once for authorization reasons.
pub struct AuthedClient {
    service: Arc<AuthService>,
    client: reqwest::Client,
}

impl AuthedClient {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self {
            service,
            client: reqwest::Client::new(),
        }
    }

    pub async fn call(
        &self,
        provider: Provider,
        spec: &RequestSpec,
    ) -> Result<reqwest::Response, AuthError> {
        let store = self.service.store();
        let token = store
            .get(provider, Role::AccessToken)?
            .ok_or(AuthError::AuthRequired { provider })?;

        let response = self.send(provider, spec, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(%provider, path = %spec.path, "request unauthorized, attempting token recovery");
        match self.service.ensure_valid_access_token(provider).await {
            Ok(fresh) => self.send(provider, spec, &fresh).await,
            Err(AuthError::AuthRequired { .. }) => {
                for role in Role::ALL {
                    store.clear(provider, role)?;
                }
                Err(AuthError::AuthRequired { provider })
            }
            Err(other) => Err(other),
        }
    }

    async fn send(
        &self,
        provider: Provider,
        spec: &RequestSpec,
        access_token: &str,
    ) -> Result<reqwest::Response, AuthError> {
        let backend = self.service.backend(provider);
        let url = format!("{}{}", backend.api_base_url(), spec.path);
        let mut request = self.client.request(spec.method.clone(), url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        backend
            .apply_auth(request, access_token)
            .send()
            .await
            .map_err(|e| AuthError::network(provider, e))
    }
}
