//! ScreenPass — device-code OAuth and token lifecycle for streaming-media
//! providers.
//!
//! The crate owns the authentication core shared by a media-browsing app's
//! two external integrations: the Trakt tracking service and the Premiumize
//! debrid service. It covers the OAuth 2.0 Device Authorization Grant
//! (RFC 8628), token validation and refresh, credential storage, and an
//! authenticated request client with a bounded retry-after-401 policy.
//! Screen rendering, navigation, and stream-resolution strategies live with
//! the caller; stream resolution plugs in behind [`resolve::StreamResolver`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use screenpass::prelude::*;
//! use tokio::sync::oneshot;
//!
//! # async fn example() -> screenpass::error::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(FileCredentialStore::new_default());
//! let auth = Arc::new(AuthService::new(store, &config));
//!
//! let (prompt_tx, prompt_rx) = oneshot::channel::<DevicePrompt>();
//! tokio::spawn(async move {
//!     if let Ok(prompt) = prompt_rx.await {
//!         println!("Visit {} and enter {}", prompt.verification_url, prompt.user_code);
//!     }
//! });
//! let credential = auth.authorize(Provider::Trakt, prompt_tx).await?;
//! println!("Logged in as {:?}", credential.username);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod resolve;
