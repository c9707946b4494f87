//! Persistence of the session snapshot to a durable string store.
//!
//! The whole [`SessionSnapshot`] is written as one JSON value under a single
//! key, wrapped in a versioned envelope:
//!
//! ```json
//! {"version": 1, "snapshot": {"dayStartTime": 1736931600.0, "phase": "prompt", ...}}
//! ```
//!
//! Writes always replace the full value, so a failed write leaves the previous
//! value in place rather than a partial one. Readers reject envelopes with a
//! version they do not know instead of guessing at the layout.
//!
//! The [`Persistence`] bridge never surfaces storage failures to its caller:
//! an unavailable store or unparseable data degrades to "nothing to resume".

use std::collections::HashMap;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionSnapshot;

/// Current envelope format version.
pub const FORMAT_VERSION: u32 = 1;

/// Default key under which the snapshot is stored.
pub const DEFAULT_STORAGE_KEY: &str = "flowSession";

/// Errors from a durable store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The host has no durable storage.
    #[error("durable storage is unavailable")]
    Unavailable,

    /// The backend failed while reading or writing.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

/// Errors from saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode or decode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored envelope was written by an unknown format version.
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),
}

/// A string-keyed durable slot.
pub trait SnapshotStore {
    /// Returns the stored value, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the key. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store, useful for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw stored value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A store for hosts with no durable storage; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl SnapshotStore for UnavailableStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Asks the host a yes/no question.
///
/// Used before replacing a fresh session with a stored one. Closures taking
/// the prompt text implement this directly.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    snapshot: &'a SessionSnapshot,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    snapshot: SessionSnapshot,
}

/// Encodes a snapshot into the versioned JSON envelope.
pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<String, PersistError> {
    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        snapshot,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes a versioned JSON envelope.
pub fn decode_snapshot(raw: &str) -> Result<SessionSnapshot, PersistError> {
    let header: EnvelopeHeader = serde_json::from_str(raw)?;
    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }
    let envelope: Envelope = serde_json::from_str(raw)?;
    Ok(envelope.snapshot)
}

/// Bridge between the session and a durable store.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: SnapshotStore> Persistence<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Creates a bridge using [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes the full snapshot, replacing any stored value.
    pub fn try_save(&mut self, snapshot: &SessionSnapshot) -> Result<(), PersistError> {
        let encoded = encode_snapshot(snapshot)?;
        self.store.write(&self.key, &encoded)?;
        Ok(())
    }

    /// Reads the stored snapshot.
    ///
    /// Missing, empty, or whitespace-only values are `Ok(None)`.
    pub fn try_load(&self) -> Result<Option<SessionSnapshot>, PersistError> {
        let Some(raw) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        decode_snapshot(&raw).map(Some)
    }

    /// Removes the stored snapshot.
    pub fn try_clear(&mut self) -> Result<(), PersistError> {
        self.store.remove(&self.key)?;
        Ok(())
    }

    /// Like [`try_save`](Self::try_save), logging failures instead of
    /// returning them. Returns whether the write succeeded.
    pub fn save(&mut self, snapshot: &SessionSnapshot) -> bool {
        match self.try_save(snapshot) {
            Ok(()) => {
                tracing::debug!(key = %self.key, phase = %snapshot.phase, "snapshot saved");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to save snapshot");
                false
            }
        }
    }

    /// Like [`try_load`](Self::try_load), treating any failure as "no
    /// stored session".
    pub fn load(&self) -> Option<SessionSnapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring stored snapshot");
                None
            }
        }
    }

    /// Like [`try_clear`](Self::try_clear), logging failures.
    pub fn clear(&mut self) -> bool {
        match self.try_clear() {
            Ok(()) => {
                tracing::debug!(key = %self.key, "stored snapshot cleared");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to clear snapshot");
                false
            }
        }
    }
}
