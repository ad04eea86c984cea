use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::providers::Provider;

/// The role a stored credential string plays for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    AccessToken,
    RefreshToken,
    Username,
}

impl Role {
    /// Stable key suffix; persisted names are `{provider}_{role}`.
    pub fn key(&self) -> &'static str {
        match self {
            Role::AccessToken => "access_token",
            Role::RefreshToken => "refresh_token",
            Role::Username => "username",
        }
    }

    pub const ALL: [Role; 3] = [Role::AccessToken, Role::RefreshToken, Role::Username];
}

/// Storage abstraction for persisted credentials.
///
/// Implementations provide last-writer-wins semantics per key; callers that
/// need ordering across concurrent writers to the same provider+role must
/// serialize themselves. A missing key is `Ok(None)`, never an error, and
/// clearing a missing key is a no-op success.
pub trait CredentialStore: Send + Sync {
    fn get(&self, provider: Provider, role: Role) -> Result<Option<String>, AuthError>;
    fn set(&self, provider: Provider, role: Role, value: &str) -> Result<(), AuthError>;
    fn clear(&self, provider: Provider, role: Role) -> Result<(), AuthError>;
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_screenpass_dir()
    }
}

/// File-backed credential store using one TOML file per provider+role key.
///
/// Writes go through a temp file followed by a rename, so a reader never
/// observes a partial value. Files are created with mode 0600 on unix.
///
/// # Example
/// ```no_run
/// use screenpass::auth::store::{CredentialStore, FileCredentialStore, Role};
/// use screenpass::auth::providers::Provider;
///
/// let store = FileCredentialStore::new_default();
/// store.set(Provider::Trakt, Role::AccessToken, "tok-123")?;
/// assert_eq!(store.get(Provider::Trakt, Role::AccessToken)?.as_deref(), Some("tok-123"));
/// # Ok::<(), screenpass::auth::AuthError>(())
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
    // Serializes read-modify-write sequences (e.g. refresh vs. logout racing
    // on the same key).
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_screenpass_dir(),
            lock: Mutex::new(()),
        }
    }

    fn credential_path(&self, provider: Provider, role: Role) -> PathBuf {
        self.base_dir.join(format!("{provider}_{}.toml", role.key()))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<(), AuthError> {
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, provider: Provider, role: Role) -> Result<Option<String>, AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.credential_path(provider, role);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.value))
    }

    fn set(&self, provider: Provider, role: Role, value: &str) -> Result<(), AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.credential_path(provider, role);
        Self::ensure_parent(&path)?;
        let file = CredentialFile {
            version: 1,
            provider: provider.to_string(),
            role: role.key().to_string(),
            value: value.to_string(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        Self::write_atomic(&path, &serialized)
    }

    fn clear(&self, provider: Provider, role: Role) -> Result<(), AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.credential_path(provider, role);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    provider: String,
    role: String,
    value: String,
    saved_at: DateTime<Utc>,
}

fn default_screenpass_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".screenpass"))
        .unwrap_or_else(|| PathBuf::from(".screenpass"))
}
