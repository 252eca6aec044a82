use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skycast_core::{AuthError, CredentialBackend};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Service name used for keyring entries
const KEYRING_SERVICE: &str = "skycast";

/// Opaque key/value store for credentials.
///
/// The client only ever stores the session token, but stores are keyed so
/// that one backend can serve several deployments.
pub trait CredentialStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError>;

    fn store(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// Build the store selected in the configuration.
pub fn open_store(backend: CredentialBackend, config_dir: &Path) -> Arc<dyn CredentialStore> {
    match backend {
        CredentialBackend::File => Arc::new(FileCredentialStore::new(config_dir.join("tokens"))),
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(KEYRING_SERVICE)),
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::default()),
    }
}

/// Credential as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    value: String,

    /// Unix timestamp of when the credential was written
    stored_at: i64,
}

/// File-based storage: one JSON file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> AuthError {
    AuthError::StorageError(format!("{}: {}", context, e))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| storage_error("Failed to read credential file", e))?;

        let stored: StoredCredential = serde_json::from_str(&json)
            .map_err(|e| storage_error("Failed to deserialize credential", e))?;

        tracing::debug!("Loaded credential {} from {:?}", key, path);
        Ok(Some(stored.value))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), AuthError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| storage_error("Failed to create tokens directory", e))?;

        let stored = StoredCredential {
            value: value.to_string(),
            stored_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| storage_error("Failed to serialize credential", e))?;

        let path = self.path_for(key);
        fs::write(&path, json).map_err(|e| storage_error("Failed to write credential file", e))?;

        tracing::info!("Stored credential {} at {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let path = self.path_for(key);

        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| storage_error("Failed to delete credential file", e))?;
            tracing::info!("Deleted credential {}", key);
        }

        Ok(())
    }
}

/// System keyring storage.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, key).map_err(|e| storage_error("Keyring unavailable", e))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(storage_error("Failed to read keyring entry", e)),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| storage_error("Failed to write keyring entry", e))?;
        tracing::info!("Stored credential {} in system keyring", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(storage_error("Failed to delete keyring entry", e)),
        }
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
