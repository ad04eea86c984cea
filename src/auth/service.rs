use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::error::AuthError;
use super::providers::{PremiumizeAuth, Provider, ProviderAuth, TraktAuth};
use super::session::{Credential, DevicePoll, DevicePrompt, TokenGrant};
use super::store::{CredentialStore, Role};
use super::validator::TokenValidator;
use crate::config::Config;

/// Fixed amount added to the poll interval on each `slow_down` signal.
const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(2);

/// Facade over the device-code flows and token lifecycle of both providers.
///
/// All I/O decisions (rendering the code prompt, navigation after login)
/// belong to the caller; the service only returns typed results and errors.
/// The credential store is the single source of truth: nothing is cached
/// between operations, so every call re-reads it.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use screenpass::auth::service::AuthService;
/// use screenpass::auth::store::FileCredentialStore;
/// use screenpass::config::Config;
///
/// # fn example() -> screenpass::error::Result<()> {
/// let config = Config::from_env()?;
/// let store = Arc::new(FileCredentialStore::new_default());
/// let auth = AuthService::new(store, &config);
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    validator: TokenValidator,
    trakt: TraktAuth,
    premiumize: PremiumizeAuth,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &Config) -> Self {
        let trakt = TraktAuth::new(
            config.trakt.client_id.clone(),
            config.trakt.client_secret.clone(),
        );
        let premiumize = PremiumizeAuth::new(
            config.premiumize.client_id.clone(),
            config.premiumize.client_secret.clone(),
        );
        Self::with_backends(store, trakt, premiumize)
    }

    /// Construct with explicit backends; used by tests to point the service
    /// at mock servers.
    pub fn with_backends(
        store: Arc<dyn CredentialStore>,
        trakt: TraktAuth,
        premiumize: PremiumizeAuth,
    ) -> Self {
        Self {
            validator: TokenValidator::new(store.clone()),
            store,
            trakt,
            premiumize,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub(crate) fn backend(&self, provider: Provider) -> &dyn ProviderAuth {
        match provider {
            Provider::Trakt => &self.trakt,
            Provider::Premiumize => &self.premiumize,
        }
    }

    /// Obtain a live credential for `provider`, running the device-code dance
    /// if the stored one cannot be validated or refreshed.
    ///
    /// When user interaction is needed, the verification URL and user code
    /// are sent once on `prompt`; on the fast path the sender is dropped
    /// unused. Callers are responsible for not starting two flows for the
    /// same provider at once, since each would surface a different user code.
    ///
    /// Polling honors the provider interval, stretches it by two seconds per
    /// `slow_down` signal, and gives up with [`AuthError::Timeout`] once the
    /// accumulated wait would pass `expires_in`.
    pub async fn authorize(
        &self,
        provider: Provider,
        prompt: oneshot::Sender<DevicePrompt>,
    ) -> Result<Credential, AuthError> {
        let backend = self.backend(provider);

        match self.validator.ensure_valid_access_token(backend).await {
            Ok(access) => {
                debug!(%provider, "existing credential still valid, skipping device flow");
                return self.credential_from_store(provider, access);
            }
            Err(AuthError::AuthRequired { .. }) => {}
            Err(other) => return Err(other),
        }

        let session = backend.start_device_code().await?;
        debug!(
            %provider,
            user_code = %session.user_code,
            expires_in = session.expires_in,
            interval = session.interval_secs,
            "device code issued"
        );
        // Receiver may have gone away; the flow still completes.
        let _ = prompt.send(DevicePrompt {
            verification_url: session.verification_url.clone(),
            user_code: session.user_code.clone(),
        });

        let deadline = Instant::now() + Duration::from_secs(session.expires_in);
        let mut interval = Duration::from_secs(session.interval_secs);
        loop {
            match backend.poll_device_code(&session).await? {
                DevicePoll::Authorized { grant } => {
                    return self.finish_authorization(provider, grant).await;
                }
                DevicePoll::Pending => {}
                DevicePoll::SlowDown => {
                    interval += SLOW_DOWN_INCREMENT;
                    debug!(%provider, interval_secs = interval.as_secs(), "slow down requested");
                }
                DevicePoll::Denied => {
                    return Err(AuthError::Denied { provider });
                }
                DevicePoll::Expired => {
                    return Err(AuthError::Timeout { provider });
                }
            }
            if Instant::now() + interval >= deadline {
                return Err(AuthError::Timeout { provider });
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Persist a fresh grant and assemble the resulting credential, fetching
    /// the account name for providers that expose one.
    async fn finish_authorization(
        &self,
        provider: Provider,
        grant: TokenGrant,
    ) -> Result<Credential, AuthError> {
        self.store
            .set(provider, Role::AccessToken, &grant.access_token)?;
        match &grant.refresh_token {
            Some(refresh) => self.store.set(provider, Role::RefreshToken, refresh)?,
            // A grant without a refresh token supersedes any stored one.
            None => self.store.clear(provider, Role::RefreshToken)?,
        }
        let username = self
            .backend(provider)
            .fetch_identity(&grant.access_token)
            .await?;
        if let Some(name) = &username {
            self.store.set(provider, Role::Username, name)?;
        }
        debug!(%provider, username = username.as_deref(), "authorization complete");
        Ok(Credential {
            provider,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            obtained_at: Utc::now(),
            username,
        })
    }

    fn credential_from_store(
        &self,
        provider: Provider,
        access_token: String,
    ) -> Result<Credential, AuthError> {
        Ok(Credential {
            provider,
            access_token,
            refresh_token: self.store.get(provider, Role::RefreshToken)?,
            obtained_at: Utc::now(),
            username: self.store.get(provider, Role::Username)?,
        })
    }

    /// Validate the stored access token, refreshing it if the provider
    /// rejects it. See [`TokenValidator::ensure_valid_access_token`].
    pub async fn ensure_valid_access_token(
        &self,
        provider: Provider,
    ) -> Result<String, AuthError> {
        self.validator
            .ensure_valid_access_token(self.backend(provider))
            .await
    }

    /// Clear all stored credentials for a provider, revoking server-side
    /// first where the provider supports it. Revocation is best-effort;
    /// local state is cleared regardless. Idempotent.
    pub async fn logout(&self, provider: Provider) -> Result<(), AuthError> {
        if let Some(access) = self.store.get(provider, Role::AccessToken)? {
            if let Err(err) = self.backend(provider).revoke(&access).await {
                warn!(%provider, error = %err, "server-side revoke failed, clearing locally");
            }
        }
        for role in Role::ALL {
            self.store.clear(provider, role)?;
        }
        Ok(())
    }

    /// Whether a credential is stored for the provider. A presence check
    /// only; the token may still be rejected on first use.
    pub fn is_logged_in(&self, provider: Provider) -> Result<bool, AuthError> {
        Ok(self.store.get(provider, Role::AccessToken)?.is_some())
    }
}
