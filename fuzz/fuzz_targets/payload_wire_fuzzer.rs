//! Fuzz target for the payload wire codec
//!
//! The decoder faces bytes straight off the transport.
//!
//! # Invariants
//!
//! - `from_wire` NEVER panics, whatever the input
//! - A successful decode re-encodes to an equivalent payload (canonical
//!   round-trip)
//! - A decode error is one of the declared codec errors

#![no_main]

use kasilink_proto::EncryptedPayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match EncryptedPayload::from_wire(data) {
        Ok(payload) => {
            let reencoded = payload.to_wire();
            let decoded = EncryptedPayload::from_wire(&reencoded)
                .unwrap_or_else(|_| panic!("re-encoded payload failed to decode"));
            assert_eq!(payload, decoded, "wire round-trip not canonical");
        },
        Err(_) => {
            // Rejection is fine; reaching here without a panic is the point.
        },
    }
});
