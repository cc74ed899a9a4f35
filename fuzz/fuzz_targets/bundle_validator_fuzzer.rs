//! Fuzz target for the transparency bundle validator
//!
//! Arbitrary bundles model a malicious or buggy log service.
//!
//! # Invariants
//!
//! - `verify_transparency_bundle` NEVER panics, whatever the bundle shape
//! - A signature that is not 64 bytes long is always rejected
//! - An arbitrary bundle never verifies: accepting one would mean forging
//!   an Ed25519 signature from fuzz input
//! - An empty record list is always rejected (no key, no trust)

#![no_main]

use arbitrary::Arbitrary;
use kasilink_core::verify_transparency_bundle;
use kasilink_proto::{
    DeviceKeyRecord, InclusionProof, TransparencyBundle, TreeHead,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzedRecord {
    user_id: String,
    device_id: String,
    device_public_key: [u8; 32],
    created_at: i64,
    revoked_at: Option<i64>,
}

#[derive(Debug, Arbitrary)]
struct FuzzedBundle {
    tree_size: u32,
    root_hash: [u8; 32],
    signed_at: i64,
    signature: Vec<u8>,
    records: Vec<FuzzedRecord>,
    leaf_index: u64,
    path: Vec<[u8; 32]>,
    log_public_key: [u8; 32],
    expected_device_public_key: [u8; 32],
}

fuzz_target!(|input: FuzzedBundle| {
    let bundle = TransparencyBundle {
        head: TreeHead {
            tree_size: input.tree_size,
            root_hash: input.root_hash,
            signed_at: input.signed_at,
            signature: input.signature,
        },
        records: input
            .records
            .into_iter()
            .map(|record| DeviceKeyRecord {
                user_id: record.user_id,
                device_id: record.device_id,
                device_public_key: record.device_public_key,
                created_at: record.created_at,
                revoked_at: record.revoked_at,
            })
            .collect(),
        proof: InclusionProof { leaf_index: input.leaf_index, path: input.path },
    };

    let trusted = verify_transparency_bundle(
        &bundle,
        &input.log_public_key,
        &input.expected_device_public_key,
    );

    assert!(!trusted, "fuzz input forged a signed, included device record");
});
