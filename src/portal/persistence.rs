//! Blob persistence behind the entity store.
//!
//! Each collection is stored as one JSON array under a fixed key, and a singleton slot holds
//! the current session identity. Backends only move blobs; record semantics live in the store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

/// Storage key of the session identity slot.
pub const SESSION_KEY: &str = "university_project_current_user";

/// The four record collections kept by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Projects,
    Applications,
    Meetings,
}

impl Collection {
    pub const fn storage_key(self) -> &'static str {
        match self {
            Collection::Users => "university_project_users",
            Collection::Projects => "university_project_projects",
            Collection::Applications => "university_project_applications",
            Collection::Meetings => "university_project_meetings",
        }
    }
}

/// Storage abstraction so the store can run against memory in tests and files in the CLI.
pub trait PersistenceBackend: Send + Sync {
    /// Load a collection in stored order. `None` means the collection was never written.
    fn load(&self, collection: Collection) -> Result<Option<Vec<Value>>, PersistenceError>;
    /// Replace the whole collection.
    fn store(&self, collection: Collection, records: Vec<Value>) -> Result<(), PersistenceError>;
    fn load_session(&self) -> Result<Option<Value>, PersistenceError>;
    /// Write the session slot; `None` clears it.
    fn store_session(&self, session: Option<Value>) -> Result<(), PersistenceError>;
}

/// Error enumeration for backend failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("blob stored under {key} is not valid JSON: {source}")]
    Codec {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// In-process backend holding serialized blobs, the way a browser key-value store would.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<&'static str, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, key: &'static str) -> Result<Option<String>, PersistenceError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory backend lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &'static str, blob: Option<String>) -> Result<(), PersistenceError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory backend lock poisoned".into()))?;
        match blob {
            Some(blob) => {
                guard.insert(key, blob);
            }
            None => {
                guard.remove(key);
            }
        }
        Ok(())
    }
}

impl PersistenceBackend for MemoryBackend {
    fn load(&self, collection: Collection) -> Result<Option<Vec<Value>>, PersistenceError> {
        let key = collection.storage_key();
        self.read(key)?
            .map(|blob| decode(key, &blob))
            .transpose()
    }

    fn store(&self, collection: Collection, records: Vec<Value>) -> Result<(), PersistenceError> {
        let key = collection.storage_key();
        let blob = encode(key, &records)?;
        self.write(key, Some(blob))
    }

    fn load_session(&self) -> Result<Option<Value>, PersistenceError> {
        self.read(SESSION_KEY)?
            .map(|blob| decode(SESSION_KEY, &blob))
            .transpose()
    }

    fn store_session(&self, session: Option<Value>) -> Result<(), PersistenceError> {
        let blob = session
            .map(|value| encode(SESSION_KEY, &value))
            .transpose()?;
        self.write(SESSION_KEY, blob)
    }
}

/// Backend writing one `<key>.json` file per collection under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read(&self, key: &'static str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn write(&self, key: &'static str, blob: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root).map_err(|source| PersistenceError::Io {
            path: self.root.clone(),
            source,
        })?;

        // Stage then rename; readers never observe a partial collection.
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, blob).map_err(|source| PersistenceError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| PersistenceError::Io { path, source })
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn load(&self, collection: Collection) -> Result<Option<Vec<Value>>, PersistenceError> {
        let key = collection.storage_key();
        self.read(key)?
            .map(|blob| decode(key, &blob))
            .transpose()
    }

    fn store(&self, collection: Collection, records: Vec<Value>) -> Result<(), PersistenceError> {
        let key = collection.storage_key();
        let blob = encode(key, &records)?;
        self.write(key, &blob)
    }

    fn load_session(&self) -> Result<Option<Value>, PersistenceError> {
        self.read(SESSION_KEY)?
            .map(|blob| decode(SESSION_KEY, &blob))
            .transpose()
    }

    fn store_session(&self, session: Option<Value>) -> Result<(), PersistenceError> {
        match session {
            Some(value) => {
                let blob = encode(SESSION_KEY, &value)?;
                self.write(SESSION_KEY, &blob)
            }
            None => {
                let path = self.path_for(SESSION_KEY);
                match fs::remove_file(&path) {
                    Ok(()) => Ok(()),
                    Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
                    Err(source) => Err(PersistenceError::Io { path, source }),
                }
            }
        }
    }
}

fn encode<T: serde::Serialize + ?Sized>(
    key: &'static str,
    value: &T,
) -> Result<String, PersistenceError> {
    serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Codec { key, source })
}

fn decode<T: serde::de::DeserializeOwned>(
    key: &'static str,
    blob: &str,
) -> Result<T, PersistenceError> {
    serde_json::from_str(blob).map_err(|source| PersistenceError::Codec { key, source })
}
