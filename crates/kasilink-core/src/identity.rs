//! Local identity management.
//!
//! Each install of the client gets a stable `{user_id, device_id}` pair,
//! generated once and persisted locally. The identity tags outgoing traffic;
//! it is never shared across devices and is reset only by an explicit
//! logout/reinstall (delete the store).
//!
//! Storage is an explicitly injected [`IdentityStore`] handle rather than a
//! hidden singleton, so tests isolate state and the host platform decides
//! where bytes actually live.

use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::Environment;

/// Stable per-install identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Random 128-bit user identifier, lowercase hex.
    pub user_id: String,
    /// Random 128-bit device identifier, lowercase hex.
    pub device_id: String,
}

/// Errors from identity persistence.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The backing store could not be read or written.
    ///
    /// Deliberately NOT treated as "absent": regenerating on a transient
    /// read failure would silently orphan the existing identity.
    #[error("identity storage unavailable: {reason}")]
    StorageUnavailable {
        /// Description of the underlying failure.
        reason: String,
    },

    /// The identity could not be encoded for storage.
    #[error("identity serialization failed: {reason}")]
    Serialization {
        /// Description of the underlying failure.
        reason: String,
    },
}

/// Injected storage handle for the persisted identity blob.
///
/// Implementations store one opaque byte blob. `load` distinguishes "nothing
/// stored yet" (`Ok(None)`) from "storage is broken" (`Err`); the manager
/// regenerates only in the former case.
pub trait IdentityStore {
    /// Read the stored blob, if any.
    fn load(&self) -> Result<Option<Vec<u8>>, IdentityError>;

    /// Persist the blob, replacing any previous value.
    fn store(&self, bytes: &[u8]) -> Result<(), IdentityError>;
}

impl<S: IdentityStore + ?Sized> IdentityStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Vec<u8>>, IdentityError> {
        (**self).load()
    }

    fn store(&self, bytes: &[u8]) -> Result<(), IdentityError> {
        (**self).store(bytes)
    }
}

/// File-backed identity store.
///
/// A missing file is `Ok(None)`; any other I/O failure is
/// [`IdentityError::StorageUnavailable`].
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Store the identity blob at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<Vec<u8>>, IdentityError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => {
                Err(IdentityError::StorageUnavailable { reason: error.to_string() })
            },
        }
    }

    fn store(&self, bytes: &[u8]) -> Result<(), IdentityError> {
        std::fs::write(&self.path, bytes)
            .map_err(|error| IdentityError::StorageUnavailable { reason: error.to_string() })
    }
}

/// In-memory identity store for tests.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `bytes` (e.g., corrupt fixtures).
    pub fn with_blob(bytes: Vec<u8>) -> Self {
        Self { blob: Mutex::new(Some(bytes)) }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<Vec<u8>>, IdentityError> {
        Ok(self.blob.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, bytes: &[u8]) -> Result<(), IdentityError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }
}

/// Creates the local identity on first use and caches it for the process
/// lifetime.
///
/// The mutex serializes racing first-run calls: exactly one identity is ever
/// generated and written, and every caller observes it.
pub struct IdentityManager<E: Environment, S: IdentityStore> {
    env: E,
    store: S,
    cached: Mutex<Option<Identity>>,
}

impl<E: Environment, S: IdentityStore> IdentityManager<E, S> {
    /// Create a manager over the given environment and store.
    pub fn new(env: E, store: S) -> Self {
        Self { env, store, cached: Mutex::new(None) }
    }

    /// Return the persisted identity, creating and persisting a fresh one if
    /// none exists yet.
    ///
    /// Idempotent: repeated calls on the same device return the identical
    /// identity. Stored bytes that fail to decode are treated as absent and
    /// regenerated; an I/O-level read failure propagates instead, so a
    /// transient storage outage cannot silently orphan an identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::StorageUnavailable`] when the store cannot
    /// be read or written.
    pub fn get_or_create(&self) -> Result<Identity, IdentityError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(identity) = cached.as_ref() {
            return Ok(identity.clone());
        }

        let identity = match self.store.load()? {
            Some(bytes) => match ciborium::de::from_reader::<Identity, _>(&bytes[..]) {
                Ok(identity) => identity,
                Err(error) => {
                    tracing::warn!(%error, "stored identity undecodable, regenerating");
                    self.generate_and_persist()?
                },
            },
            None => self.generate_and_persist()?,
        };

        *cached = Some(identity.clone());
        Ok(identity)
    }

    fn generate_and_persist(&self) -> Result<Identity, IdentityError> {
        let identity = Identity {
            user_id: format!("{:032x}", self.env.random_u128()),
            device_id: format!("{:032x}", self.env.random_u128()),
        };

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&identity, &mut bytes)
            .map_err(|error| IdentityError::Serialization { reason: error.to_string() })?;
        self.store.store(&bytes)?;

        tracing::info!(user_id = %identity.user_id, "created fresh local identity");
        Ok(identity)
    }
}
