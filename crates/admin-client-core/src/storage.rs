//! Client local persistence of the credentials.
//!
//! The token and the identity are always written together as one record
//! under [`STORAGE_SESSION_KEY`] so a half written pair cannot exist. Records
//! left by older clients under two separate keys are migrated on load.

use admin_shared::{
    const_config::storage::{STORAGE_LEGACY_TOKEN_KEY, STORAGE_LEGACY_USER_KEY, STORAGE_SESSION_KEY},
    uac::Identity,
};
use secrecy::{ExposeSecret as _, SecretString};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::{self, Write as _},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage key {0:?} is not valid")]
    InvalidKey(String),
    #[error("failed to access storage entry {key:?}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize session record")]
    Serialize(#[from] serde_json::Error),
}

/// A durable key value store for the client, similar to a browser's local
/// storage
pub trait CredentialStore: Debug + Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that is not present is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Only lives as long as the process, mainly for tests
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

/// Values hold the token so only the keys are shown
impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(_) => return f.write_str("MemoryStore { <poisoned> }"),
        };
        keys.sort();
        f.debug_struct("MemoryStore").field("keys", &keys).finish()
    }
}

impl MemoryStore {
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().expect("mutex poisoned").contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("mutex poisoned").is_empty()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().expect("mutex poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().expect("mutex poisoned").remove(key);
        Ok(())
    }
}

/// Stores each key as a file in a folder.
///
/// Writes go to a temporary file that is then renamed over the target so a
/// reader never sees a partially written value
#[derive(Debug, Clone)]
pub struct FileStore {
    folder: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(folder: P) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let is_valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !is_valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.folder.join(format!("{key}.json")))
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.folder).map_err(io_err)?;
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp_path, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// The persisted half of a session
#[derive(serde::Serialize, serde::Deserialize, Clone)]
pub struct StoredSession {
    #[serde(serialize_with = "serialize_token")]
    pub token: SecretString,
    pub identity: Identity,
}

fn serialize_token<S: serde::Serializer>(token: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(token.expose_secret())
}

impl StoredSession {
    pub fn new(token: SecretString, identity: Identity) -> Self {
        Self { token, identity }
    }
}

impl Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("has_token", &!self.token.expose_secret().is_empty())
            .field("identity", &self.identity)
            .finish()
    }
}

#[derive(Debug)]
pub enum LoadedSession {
    Absent,
    /// Something was stored but it cannot be used, includes the reason
    Malformed(String),
    Present(StoredSession),
}

/// Reads and writes the session record on top of a [`CredentialStore`]
#[derive(Debug, Clone)]
pub struct SessionStorage {
    store: Arc<dyn CredentialStore>,
}

impl SessionStorage {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    #[instrument(ret)]
    pub fn load(&self) -> Result<LoadedSession, StorageError> {
        if let Some(raw) = self.store.get(STORAGE_SESSION_KEY)? {
            return Ok(match serde_json::from_str::<StoredSession>(&raw) {
                Ok(session) => LoadedSession::Present(session),
                Err(e) => LoadedSession::Malformed(format!("stored session unreadable: {e}")),
            });
        }
        self.load_legacy()
    }

    fn load_legacy(&self) -> Result<LoadedSession, StorageError> {
        let token = self.store.get(STORAGE_LEGACY_TOKEN_KEY)?;
        let user = self.store.get(STORAGE_LEGACY_USER_KEY)?;
        let (token, user) = match (token, user) {
            (None, None) => return Ok(LoadedSession::Absent),
            (Some(token), Some(user)) => (token, user),
            _ => {
                return Ok(LoadedSession::Malformed(
                    "only one half of the legacy credential pair is stored".to_string(),
                ))
            }
        };
        let identity = match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => identity,
            Err(e) => {
                return Ok(LoadedSession::Malformed(format!(
                    "legacy stored user unreadable: {e}"
                )))
            }
        };
        let session = StoredSession::new(token.into(), identity);
        self.save(&session)?;
        info!("migrated legacy credential pair into a single record");
        Ok(LoadedSession::Present(session))
    }

    /// Also removes any legacy entries once the record is written
    #[instrument(err(Debug))]
    pub fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.store.set(STORAGE_SESSION_KEY, &raw)?;
        self.remove_legacy()
    }

    #[instrument(err(Debug))]
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(STORAGE_SESSION_KEY)?;
        self.remove_legacy()
    }

    fn remove_legacy(&self) -> Result<(), StorageError> {
        for key in [STORAGE_LEGACY_TOKEN_KEY, STORAGE_LEGACY_USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(?e, key, "failed to remove legacy entry");
                return Err(e);
            }
        }
        Ok(())
    }
}
