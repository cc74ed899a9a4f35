//! Merkle proof engine.
//!
//! Recomputes a tree root from a leaf and an inclusion path. Pure functions,
//! no I/O: the transparency log built the tree, the client only refolds it.
//!
//! The tree hash is SHA-512 truncated to its first 256 bits, for both leaf
//! hashing and interior nodes.

use kasilink_proto::{DeviceKeyRecord, Digest, InclusionProof, encode_device_record};
use sha2::{Digest as _, Sha512};

/// Truncate a SHA-512 digest to the tree's 256-bit width.
fn truncate(full: impl AsRef<[u8]>) -> Digest {
    let mut out = [0u8; 32];
    out.copy_from_slice(&full.as_ref()[..32]);
    out
}

/// Leaf hash of a device key record: SHA-512 over the canonical record
/// encoding, truncated to 256 bits.
pub fn hash_leaf(record: &DeviceKeyRecord) -> Digest {
    truncate(Sha512::digest(encode_device_record(record)))
}

/// Interior node hash: SHA-512 over `left || right`, truncated to 256 bits.
pub fn parent(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha512::new();
    hasher.update(left);
    hasher.update(right);
    truncate(hasher.finalize())
}

/// Fold a leaf hash up an inclusion path and compare against the expected
/// root.
///
/// The side each sibling joins on follows the leaf index parity at that
/// level: an even index means the running node is a left child, odd means
/// right, and the index halves each level. An empty path means the leaf
/// itself must equal the root (tree of size 1).
///
/// A mismatch returns `false`, never an error: distrust is an expected
/// outcome callers branch on.
pub fn verify_inclusion(leaf_hash: &Digest, proof: &InclusionProof, expected_root: &Digest) -> bool {
    let mut hash = *leaf_hash;
    let mut index = proof.leaf_index;

    for sibling in &proof.path {
        hash = if index & 1 == 0 { parent(&hash, sibling) } else { parent(sibling, &hash) };
        index >>= 1;
    }

    // Fixed-width arrays: equality cannot silently truncate or accept a
    // differing length.
    hash == *expected_root
}
