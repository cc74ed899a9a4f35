//! Transparency bundle validation.
//!
//! Composes tree head signature verification and Merkle inclusion into the
//! single trust decision of the system: a device key is usable for key
//! agreement if and only if [`verify_transparency_bundle`] returns `true`.

use kasilink_crypto::{hash_leaf, verify_inclusion, verify_tree_head_signature};
use kasilink_proto::{DevicePublicKey, TransparencyBundle};

/// Decide whether `expected_device_public_key` has been legitimately
/// published to the transparency log described by `bundle`.
///
/// In order, short-circuiting on the first failure:
///
/// 1. Authenticate `bundle.head` under the log's known public key.
/// 2. Scan `bundle.records` for the first record carrying the expected
///    device public key - an unpublished key must never be trusted.
/// 3. Leaf-hash that record and verify inclusion against `head.root_hash`
///    via `bundle.proof`.
///
/// Fails closed: any step that does not verify yields `false`, and each
/// rejection emits a `tracing` debug event naming the step. A `false` here
/// is an expected, recoverable outcome the caller branches on (refuse to
/// message the device), not an error.
///
/// Inclusion proves *publication*, not *current validity*: a record with a
/// set `revoked_at` still verifies, because the log is append-only history.
/// Callers must separately reject records revoked before their own explicit
/// clock via [`kasilink_proto::DeviceKeyRecord::is_revoked_at`].
pub fn verify_transparency_bundle(
    bundle: &TransparencyBundle,
    log_public_key: &[u8; 32],
    expected_device_public_key: &DevicePublicKey,
) -> bool {
    if !verify_tree_head_signature(&bundle.head, log_public_key) {
        tracing::debug!(tree_size = bundle.head.tree_size, "tree head signature rejected");
        return false;
    }

    let Some(record) = bundle
        .records
        .iter()
        .find(|record| record.device_public_key == *expected_device_public_key)
    else {
        tracing::debug!("device key not published in bundle records");
        return false;
    };

    let leaf = hash_leaf(record);
    let included = verify_inclusion(&leaf, &bundle.proof, &bundle.head.root_hash);
    if !included {
        tracing::debug!(
            user_id = %record.user_id,
            device_id = %record.device_id,
            leaf_index = bundle.proof.leaf_index,
            "inclusion proof rejected"
        );
    }

    included
}
