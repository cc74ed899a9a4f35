//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples trust-core logic from system resources
//! (wall clock, randomness). Production code plugs in the system clock and
//! OS entropy; tests plug in a fixed clock and a counter, making nonce
//! draws, identity generation, and timestamp stamping reproducible.
//!
//! # Invariants
//!
//! - Determinism: given the same seed, `random_bytes()` produces the same
//!   sequence in test implementations
//! - Isolation: implementations must not share global state

/// Abstract environment providing wall-clock time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. RNG quality: `random_bytes()` uses cryptographically secure entropy in
///    production - nonces and identity ids are drawn through it
/// 2. Minimal panics: methods are infallible except in exceptional
///    circumstances (e.g., OS entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current wall-clock time in milliseconds since the Unix
    /// epoch.
    ///
    /// Used to stamp outgoing messages. Revocation-freshness checks
    /// deliberately do NOT read this: callers pass their own explicit clock
    /// so the policy stays theirs.
    fn now_millis(&self) -> i64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use OS entropy
    /// (`getrandom`), never a non-cryptographic generator: every AEAD nonce
    /// flows through here, and nonce reuse under one key is fatal.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u128`.
    ///
    /// Convenience for 128-bit identifier generation (user and device ids).
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }
}
