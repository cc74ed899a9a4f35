//! Canonical byte encodings of verification inputs.
//!
//! The tree head signature and every leaf hash are computed over these exact
//! bytes, so the layout is fixed by hand rather than delegated to a serde
//! backend: a serializer upgrade must never change what a signature covers.
//!
//! All multi-byte integers are big-endian. Host byte order would break
//! verification between platforms that disagree on it; network byte order
//! is normative.

use crate::transparency::{DeviceKeyRecord, TreeHead};

/// Encoded length of the signed tree head fields:
/// `tree_size` (4) + `root_hash` (32) + `signed_at` (8).
pub const TREE_HEAD_SIGNED_LEN: usize = 44;

/// Canonical encoding of a tree head's signed fields.
///
/// Layout: `tree_size` u32 BE || `root_hash` || `signed_at` i64 BE.
/// The `signature` field itself is not part of the encoding.
pub fn encode_tree_head(head: &TreeHead) -> [u8; TREE_HEAD_SIGNED_LEN] {
    let mut out = [0u8; TREE_HEAD_SIGNED_LEN];
    out[0..4].copy_from_slice(&head.tree_size.to_be_bytes());
    out[4..36].copy_from_slice(&head.root_hash);
    out[36..44].copy_from_slice(&head.signed_at.to_be_bytes());
    out
}

/// Canonical encoding of a device key record, the preimage of its leaf hash.
///
/// Layout, field order fixed:
///
/// ```text
/// user_id length    u32 BE || user_id UTF-8 bytes
/// device_id length  u32 BE || device_id UTF-8 bytes
/// device_public_key 32 raw bytes
/// created_at        i64 BE
/// revocation marker u8 (0 = absent, 1 = present) || revoked_at i64 BE if 1
/// ```
///
/// Length prefixes keep the encoding injective: `("ab", "c")` and
/// `("a", "bc")` must not collide into the same leaf hash.
pub fn encode_device_record(record: &DeviceKeyRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        4 + record.user_id.len() + 4 + record.device_id.len() + 32 + 8 + 1 + 8,
    );

    encode_str(&mut out, &record.user_id);
    encode_str(&mut out, &record.device_id);
    out.extend_from_slice(&record.device_public_key);
    out.extend_from_slice(&record.created_at.to_be_bytes());

    match record.revoked_at {
        Some(revoked_at) => {
            out.push(1);
            out.extend_from_slice(&revoked_at.to_be_bytes());
        },
        None => out.push(0),
    }

    out
}

fn encode_str(out: &mut Vec<u8>, value: &str) {
    // u32 length prefix; identifiers are short, saturation is unreachable in
    // practice but must not silently truncate the prefix.
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}
