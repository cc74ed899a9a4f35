//! Client error types.

use kasilink_core::IdentityError;
use kasilink_crypto::CryptoError;
use thiserror::Error;

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Group not found in client state.
    #[error("group not joined: {group_id}")]
    GroupNotFound {
        /// The group that was not found.
        group_id: String,
    },

    /// Group already has a key installed.
    #[error("group already joined: {group_id}")]
    GroupAlreadyJoined {
        /// The group that already exists.
        group_id: String,
    },

    /// Cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Identity persistence failed.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// The background key derivation task did not complete.
    #[error("key derivation task failed: {reason}")]
    KeyDerivation {
        /// Description of the task failure.
        reason: String,
    },
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate tampering, programmer error, or a broken host.
    /// Transient errors can be recovered by joining the group or retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            // Fatal: tampering or precondition violations
            Self::Crypto(_) | Self::Identity(_) | Self::KeyDerivation { .. } => true,

            // Transient: can be recovered
            Self::GroupNotFound { .. } | Self::GroupAlreadyJoined { .. } => false,
        }
    }
}
