//! KasiLink Cryptographic Primitives
//!
//! This crate provides the cryptographic building blocks for the KasiLink
//! trust core.
//!
//! # Design
//!
//! All functions in this crate are pure - they have no side effects and
//! produce deterministic outputs given the same inputs. Random bytes required
//! for encryption must be provided by the caller, enabling:
//!
//! - Deterministic testing with seeded RNG
//! - Sans-IO architecture compatibility
//! - No coupling to application-level abstractions
//!
//! # Security Properties
//!
//! - Fail Closed: a tree head or inclusion proof that does not verify is
//!   reported as untrusted, never as an exception the caller might swallow
//! - Authenticated Encryption: confidentiality and integrity are bound in a
//!   single AEAD pass; tampering surfaces as a decryption failure
//! - Nonce Freshness: every encryption consumes a caller-supplied fresh
//!   192-bit nonce; reuse under one key breaks the scheme

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod content;
pub mod kdf;
pub mod merkle;
pub mod tree_head;

pub use content::{CryptoError, KEY_SIZE, decrypt_with_key, encrypt_with_key};
pub use kdf::{GROUP_KEY_SIZE, GroupKey, PBKDF2_ITERATIONS, derive_group_key};
pub use merkle::{hash_leaf, parent, verify_inclusion};
pub use tree_head::verify_tree_head_signature;
