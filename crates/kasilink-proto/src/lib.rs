//! KasiLink Trust Core Data Model
//!
//! This crate defines the types exchanged between a KasiLink client and its
//! external collaborators (the transparency-log service and the message
//! transport), plus the canonical byte encodings that signing, leaf hashing,
//! and verification all operate on.
//!
//! # Design
//!
//! - All types are plain data: no I/O, no cryptography. The primitives that
//!   consume them live in `kasilink-crypto`.
//! - Canonical encodings are deterministic and fixed-layout: the same logical
//!   value always serializes to the same bytes, on every platform. Integers
//!   are big-endian on the wire.
//! - Serde + CBOR is the codec for storage and transport envelopes; the
//!   canonical encodings in [`codec`] are hand-laid-out because signatures
//!   and leaf hashes must be stable across serializer versions.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod payloads;
pub mod transparency;

pub use codec::{TREE_HEAD_SIGNED_LEN, encode_device_record, encode_tree_head};
pub use payloads::{
    EncryptedPayload, MessageKind, NONCE_SIZE, PAYLOAD_WIRE_VERSION, PayloadCodecError,
    WireMessage,
};
pub use transparency::{
    DIGEST_SIZE, DeviceKeyRecord, DevicePublicKey, Digest, InclusionProof, TransparencyBundle,
    TreeHead,
};
