//! Transparency-log data model.
//!
//! A client receives a [`TransparencyBundle`] from the log service and makes
//! exactly one trust decision with it: is this device public key published in
//! the log? The types here carry everything that decision needs and nothing
//! else; the bundle is owned transiently by the caller and never persisted.

use serde::{Deserialize, Serialize};

/// Size of a Merkle tree digest in bytes (SHA-512 truncated to 256 bits).
pub const DIGEST_SIZE: usize = 32;

/// A 256-bit Merkle tree digest.
pub type Digest = [u8; DIGEST_SIZE];

/// A 256-bit device public key (Curve25519/Ed25519 point encoding).
pub type DevicePublicKey = [u8; 32];

/// Signed snapshot of the transparency log at a point in time.
///
/// # Invariants
///
/// - `signature` must verify over the canonical encoding of
///   `(tree_size, root_hash, signed_at)` under the log's known public key.
///   A head whose signature does not verify must never be treated as
///   authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeHead {
    /// Number of leaves in the tree at signing time.
    pub tree_size: u32,
    /// Merkle root hash over all leaves.
    pub root_hash: Digest,
    /// Signing time, milliseconds since the Unix epoch.
    pub signed_at: i64,
    /// Detached Ed25519 signature over the canonical head encoding.
    ///
    /// Kept as raw bytes rather than a fixed array: a malformed length is a
    /// verification failure, not a deserialization failure.
    pub signature: Vec<u8>,
}

/// Sibling hashes needed to recompute the root from one specific leaf.
///
/// A proof is meaningless without the [`TreeHead`] it is presented against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Position of the leaf in the tree.
    pub leaf_index: u64,
    /// Sibling hashes ordered from the leaf level up to the root.
    pub path: Vec<Digest>,
}

/// One published device identity.
///
/// Created once by the log when a device registers its keys and immutable
/// once leaf-hashed into a tree. The log is append-only: revocation is a new
/// record state, never a mutation of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceKeyRecord {
    /// Owning user.
    pub user_id: String,
    /// Device within that user's account.
    pub device_id: String,
    /// The published device public key.
    pub device_public_key: DevicePublicKey,
    /// Publication time, milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Revocation time, if the key has been revoked.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revoked_at: Option<i64>,
}

impl DeviceKeyRecord {
    /// Whether this record is revoked as of the caller's clock.
    ///
    /// Inclusion in the log proves *publication*, not *current validity*:
    /// the bundle validator deliberately does not apply this check. Callers
    /// decide the freshness policy and supply their own `now_ms`.
    pub fn is_revoked_at(&self, now_ms: i64) -> bool {
        self.revoked_at.is_some_and(|revoked_at| revoked_at <= now_ms)
    }
}

/// Everything a client needs for one trust decision about one device key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyBundle {
    /// Signed tree head the proof is anchored to.
    pub head: TreeHead,
    /// Candidate device records; the validator scans these for the target
    /// public key.
    pub records: Vec<DeviceKeyRecord>,
    /// Inclusion proof for the target record under `head.root_hash`.
    pub proof: InclusionProof,
}
