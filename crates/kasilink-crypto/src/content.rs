//! Authenticated content encryption.
//!
//! XChaCha20-Poly1305: a stream cipher plus authenticator binding
//! confidentiality and integrity in one pass, with a 192-bit nonce wide
//! enough to draw at random for every message.

use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use kasilink_proto::{EncryptedPayload, NONCE_SIZE};
use thiserror::Error;

/// Required symmetric key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Errors from content encryption and decryption.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The supplied key is not exactly 256 bits.
    ///
    /// A precondition violation (programmer error), reported before any
    /// cryptographic work is attempted.
    #[error("invalid key length: expected {KEY_SIZE} bytes, got {actual}")]
    InvalidKeyLength {
        /// Length of the key that was supplied.
        actual: usize,
    },

    /// The AEAD refused the plaintext.
    ///
    /// Only reachable when the plaintext exceeds the cipher's length limit,
    /// far beyond any realistic message size.
    #[error("encryption failed: plaintext exceeds cipher limits")]
    EncryptionFailed,

    /// The authentication tag did not verify.
    ///
    /// Indicates tampering or a wrong key. No partial or unauthenticated
    /// plaintext is ever returned.
    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,
}

fn check_key(key: &[u8]) -> Result<&Key, CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength { actual: key.len() });
    }
    Ok(Key::from_slice(key))
}

/// Encrypt a plaintext under a 256-bit key.
///
/// `nonce` must be freshly drawn from a cryptographically secure source for
/// every call; reusing a nonce under the same key breaks both
/// confidentiality and authenticity. Randomness is caller-supplied so this
/// function stays pure.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `key` is not exactly
/// [`KEY_SIZE`] bytes.
pub fn encrypt_with_key(
    plaintext: &[u8],
    key: &[u8],
    nonce: [u8; NONCE_SIZE],
) -> Result<EncryptedPayload, CryptoError> {
    let cipher = XChaCha20Poly1305::new(check_key(key)?);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(EncryptedPayload { ciphertext, nonce })
}

/// Decrypt a payload under a 256-bit key.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] for a malformed key and
/// [`CryptoError::DecryptionFailed`] when the authentication tag does not
/// verify - tampering with any bit of the ciphertext or nonce surfaces here,
/// never as silently wrong plaintext.
pub fn decrypt_with_key(payload: &EncryptedPayload, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(check_key(key)?);

    cipher
        .decrypt(XNonce::from_slice(&payload.nonce), payload.ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::kdf::derive_group_key;

    const TEST_KEY: [u8; KEY_SIZE] = [0x5A; KEY_SIZE];
    const TEST_NONCE: [u8; NONCE_SIZE] = [0x33; NONCE_SIZE];

    #[test]
    fn roundtrip() {
        let payload = encrypt_with_key(b"sawubona", &TEST_KEY, TEST_NONCE).unwrap();
        let plaintext = decrypt_with_key(&payload, &TEST_KEY).unwrap();
        assert_eq!(plaintext, b"sawubona");
    }

    #[test]
    fn roundtrip_with_derived_key() {
        let key = derive_group_key("stokvel-secret", "township-market");
        let payload = encrypt_with_key(b"meet at noon", key.as_bytes(), TEST_NONCE).unwrap();
        assert_eq!(decrypt_with_key(&payload, key.as_bytes()).unwrap(), b"meet at noon");
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let payload = encrypt_with_key(b"sawubona", &TEST_KEY, TEST_NONCE).unwrap();
        assert_ne!(payload.ciphertext.as_slice(), b"sawubona");
        // Poly1305 tag adds 16 bytes.
        assert_eq!(payload.ciphertext.len(), b"sawubona".len() + 16);
    }

    #[test]
    fn short_key_rejected_before_any_crypto() {
        let result = encrypt_with_key(b"x", &[0u8; 16], TEST_NONCE);
        assert_eq!(result, Err(CryptoError::InvalidKeyLength { actual: 16 }));

        let payload = EncryptedPayload { ciphertext: vec![0u8; 24], nonce: TEST_NONCE };
        let result = decrypt_with_key(&payload, &[0u8; 33]);
        assert_eq!(result, Err(CryptoError::InvalidKeyLength { actual: 33 }));
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let payload = encrypt_with_key(b"sawubona", &TEST_KEY, TEST_NONCE).unwrap();
        let result = decrypt_with_key(&payload, &[0xA5; KEY_SIZE]);
        assert_eq!(result, Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut payload = encrypt_with_key(b"sawubona", &TEST_KEY, TEST_NONCE).unwrap();
        payload.ciphertext[0] ^= 0x01;
        assert_eq!(decrypt_with_key(&payload, &TEST_KEY), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn tampered_nonce_fails() {
        let mut payload = encrypt_with_key(b"sawubona", &TEST_KEY, TEST_NONCE).unwrap();
        payload.nonce[NONCE_SIZE - 1] ^= 0x80;
        assert_eq!(decrypt_with_key(&payload, &TEST_KEY), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let payload = encrypt_with_key(b"", &TEST_KEY, TEST_NONCE).unwrap();
        assert_eq!(decrypt_with_key(&payload, &TEST_KEY).unwrap(), Vec::<u8>::new());
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary(
            plaintext in proptest::collection::vec(any::<u8>(), 0..1024),
            key in proptest::array::uniform32(any::<u8>()),
            nonce in proptest::array::uniform24(any::<u8>()),
        ) {
            let payload = encrypt_with_key(&plaintext, &key, nonce).unwrap();
            prop_assert_eq!(decrypt_with_key(&payload, &key).unwrap(), plaintext);
        }

        #[test]
        fn any_ciphertext_bitflip_detected(
            plaintext in proptest::collection::vec(any::<u8>(), 1..256),
            byte_index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut payload = encrypt_with_key(&plaintext, &TEST_KEY, TEST_NONCE).unwrap();
            let index = byte_index.index(payload.ciphertext.len());
            payload.ciphertext[index] ^= 1 << bit;

            prop_assert_eq!(
                decrypt_with_key(&payload, &TEST_KEY),
                Err(CryptoError::DecryptionFailed)
            );
        }
    }
}
