//! Group key derivation.
//!
//! Every member of a conversation group derives the same 256-bit symmetric
//! key from a shared passphrase and a public, deterministic salt (the group
//! identifier), so the key itself never crosses the wire.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a derived group key in bytes (256 bits).
pub const GROUP_KEY_SIZE: usize = 32;

/// PBKDF2 iteration count.
///
/// High on purpose: the cost deters offline brute force of weak passphrases.
/// Derivation is CPU-bound and blocking - dispatch it off latency-sensitive
/// threads (`kasilink-client` provides a `spawn_blocking` wrapper).
pub const PBKDF2_ITERATIONS: u32 = 150_000;

/// A 256-bit symmetric group key.
///
/// Zeroized on drop. The `Debug` impl redacts the key bytes so the value can
/// never leak through logging.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct GroupKey([u8; GROUP_KEY_SIZE]);

impl GroupKey {
    /// Wrap pre-provisioned key material.
    pub fn from_bytes(bytes: [u8; GROUP_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; GROUP_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GroupKey(<redacted 32 bytes>)")
    }
}

/// Derive a group key from a passphrase and a public per-group salt.
///
/// PBKDF2-HMAC-SHA-256 with [`PBKDF2_ITERATIONS`] rounds, 256-bit output.
/// Deterministic: the same `(passphrase, salt)` pair always yields the same
/// key, with no cross-call caching - a cache keyed on the guessable salt
/// alone would confuse keys across users.
pub fn derive_group_key(passphrase: &str, salt: &str) -> GroupKey {
    let mut key = [0u8; GROUP_KEY_SIZE];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);
    GroupKey(key)
}
