use std::sync::Arc;

use tracing::{debug, warn};

use super::error::AuthError;
use super::providers::ProviderAuth;
use super::store::{CredentialStore, Role};

/// Checks stored access tokens against the provider and refreshes expired
/// ones where a refresh grant exists.
///
/// The validator never starts a device-code flow itself; its side effects are
/// bounded to reading, refreshing, and clearing the store. When nothing is
/// recoverable it signals [`AuthError::AuthRequired`] and leaves the decision
/// to re-authorize with the caller.
pub struct TokenValidator {
    store: Arc<dyn CredentialStore>,
}

impl TokenValidator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Return an access token the provider currently accepts.
    ///
    /// Fast path: the stored token probes as live and is returned unchanged.
    /// Otherwise the stale token is cleared and one refresh exchange is
    /// attempted; any refresh failure also clears the refresh token so the
    /// next call goes straight to `AuthRequired`.
    pub async fn ensure_valid_access_token(
        &self,
        backend: &dyn ProviderAuth,
    ) -> Result<String, AuthError> {
        let provider = backend.provider();
        let Some(access) = self.store.get(provider, Role::AccessToken)? else {
            return Err(AuthError::AuthRequired { provider });
        };
        if backend.probe_access_token(&access).await? {
            return Ok(access);
        }
        debug!(%provider, "stored access token rejected, attempting refresh");
        self.store.clear(provider, Role::AccessToken)?;

        let Some(refresh) = self.store.get(provider, Role::RefreshToken)? else {
            return Err(AuthError::AuthRequired { provider });
        };
        match backend.refresh(&refresh).await {
            Ok(grant) => {
                self.store
                    .set(provider, Role::AccessToken, &grant.access_token)?;
                if let Some(rotated) = &grant.refresh_token {
                    self.store.set(provider, Role::RefreshToken, rotated)?;
                }
                debug!(%provider, "access token refreshed");
                Ok(grant.access_token)
            }
            Err(err) => {
                warn!(%provider, error = %err, "refresh grant failed, clearing refresh token");
                self.store.clear(provider, Role::RefreshToken)?;
                Err(AuthError::AuthRequired { provider })
            }
        }
    }
}
