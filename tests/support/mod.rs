#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wiremock::MockServer;

use screenpass::auth::providers::{PremiumizeAuth, Provider, TraktAuth};
use screenpass::auth::service::AuthService;
use screenpass::auth::store::{CredentialStore, Role};
use screenpass::auth::AuthError;

pub const TRAKT_CLIENT_ID: &str = "trakt-client-id";
pub const TRAKT_CLIENT_SECRET: &str = "trakt-client-secret";
pub const PREMIUMIZE_CLIENT_ID: &str = "prem-client-id";
pub const PREMIUMIZE_CLIENT_SECRET: &str = "prem-client-secret";

#[derive(Default)]
pub struct InMemoryCredentialStore {
    values: Mutex<HashMap<(Provider, Role), String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, provider: Provider, role: Role, value: &str) {
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert((provider, role), value.to_string());
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, provider: Provider, role: Role) -> Result<Option<String>, AuthError> {
        Ok(self
            .values
            .lock()
            .expect("store lock poisoned")
            .get(&(provider, role))
            .cloned())
    }

    fn set(&self, provider: Provider, role: Role, value: &str) -> Result<(), AuthError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert((provider, role), value.to_string());
        Ok(())
    }

    fn clear(&self, provider: Provider, role: Role) -> Result<(), AuthError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .remove(&(provider, role));
        Ok(())
    }
}

pub fn trakt_backend(server: &MockServer) -> TraktAuth {
    TraktAuth::new(TRAKT_CLIENT_ID, TRAKT_CLIENT_SECRET).with_base_url(server.uri())
}

pub fn premiumize_backend(server: &MockServer) -> PremiumizeAuth {
    PremiumizeAuth::new(PREMIUMIZE_CLIENT_ID, PREMIUMIZE_CLIENT_SECRET)
        .with_token_url(format!("{}/token", server.uri()))
        .with_api_base_url(format!("{}/api", server.uri()))
}

/// Service with both backends pointed at one mock server. Trakt and
/// Premiumize paths never collide (`/oauth/*` and `/users/me` vs. `/token`
/// and `/api/*`).
pub fn mock_service(store: Arc<InMemoryCredentialStore>, server: &MockServer) -> AuthService {
    AuthService::with_backends(store, trakt_backend(server), premiumize_backend(server))
}
