//! Tree head signature verification.
//!
//! The transparency log signs every tree head snapshot with its long-term
//! Ed25519 key; that key reaches clients out of band. A head whose signature
//! does not verify must never be treated as authoritative.

use ed25519_dalek::{Signature, VerifyingKey};
use kasilink_proto::{TreeHead, encode_tree_head};

/// Verify a tree head's detached Ed25519 signature.
///
/// The signature covers the canonical encoding of
/// `(tree_size, root_hash, signed_at)` - see
/// [`kasilink_proto::encode_tree_head`]. Returns `false` on a malformed
/// public key, a signature of the wrong length, or any mutation of the
/// signed fields. Purely a function of its inputs: no network, no state.
pub fn verify_tree_head_signature(head: &TreeHead, log_public_key: &[u8; 32]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(log_public_key) else {
        return false;
    };

    let Ok(signature_bytes) = <[u8; 64]>::try_from(head.signature.as_slice()) else {
        return false;
    };
    let signature = Signature::from_bytes(&signature_bytes);

    key.verify_strict(&encode_tree_head(head), &signature).is_ok()
}
