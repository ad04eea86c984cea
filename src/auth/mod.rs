//! Device-code OAuth flows, token lifecycle, and credential storage.

pub mod error;
pub mod providers;
pub mod service;
pub mod session;
pub mod store;
pub mod validator;

pub use error::AuthError;
pub use providers::Provider;
pub use service::AuthService;
pub use session::{Credential, DeviceAuthSession, DevicePoll, DevicePrompt, TokenGrant};
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, Role};
pub use validator::TokenValidator;
