//! Convenience re-exports for common use.

pub use crate::auth::providers::Provider;
pub use crate::auth::service::AuthService;
pub use crate::auth::session::{Credential, DevicePrompt};
pub use crate::auth::store::{CredentialStore, FileCredentialStore, Role};
pub use crate::auth::AuthError;
pub use crate::client::{AuthedClient, RequestSpec};
pub use crate::config::Config;
pub use crate::error::{Result, ScreenPassError};
pub use crate::resolve::{MediaKind, MediaRef, StreamResolver};
