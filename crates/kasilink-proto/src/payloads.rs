//! Message payload types.
//!
//! [`EncryptedPayload`] is the only wire artifact the crypto core defines:
//! a ciphertext plus the fresh nonce it was sealed with. The envelope types
//! ([`WireMessage`], [`DecryptedMessage`]) carry payloads between the client
//! state machine and the external transport; the transport owns everything
//! beyond them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of an AEAD nonce in bytes (192 bits).
pub const NONCE_SIZE: usize = 24;

/// Current version byte of the payload wire format.
pub const PAYLOAD_WIRE_VERSION: u8 = 1;

/// Minimum length of a wire-encoded payload:
/// version (1) + nonce (24) + ciphertext length (4).
const PAYLOAD_WIRE_HEADER_LEN: usize = 1 + NONCE_SIZE + 4;

/// An authenticated ciphertext and the nonce it was produced under.
///
/// Produced fresh for every plaintext. A nonce must never be reused under
/// the same key: every encryption call draws a new random nonce from a
/// cryptographically secure source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// AEAD ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
    /// The 192-bit nonce used for this single encryption.
    pub nonce: [u8; NONCE_SIZE],
}

/// Errors from decoding a wire-encoded payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadCodecError {
    /// The leading version byte is not one this codec understands.
    #[error("unsupported payload wire version: {found}")]
    UnsupportedVersion {
        /// The version byte that was found.
        found: u8,
    },

    /// The input ended before the announced content did.
    #[error("truncated payload: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to finish decoding.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },
}

impl EncryptedPayload {
    /// Encode for transport.
    ///
    /// Layout: version u8 || nonce || ciphertext length u32 BE || ciphertext.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PAYLOAD_WIRE_HEADER_LEN + self.ciphertext.len());
        out.push(PAYLOAD_WIRE_VERSION);
        out.extend_from_slice(&self.nonce);
        let len = u32::try_from(self.ciphertext.len()).unwrap_or(u32::MAX);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.ciphertext[..len as usize]);
        out
    }

    /// Decode a wire-encoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadCodecError`] on an unknown version byte or on input
    /// shorter than its announced content. Never panics on arbitrary bytes.
    pub fn from_wire(data: &[u8]) -> Result<Self, PayloadCodecError> {
        if data.len() < PAYLOAD_WIRE_HEADER_LEN {
            return Err(PayloadCodecError::Truncated {
                needed: PAYLOAD_WIRE_HEADER_LEN,
                available: data.len(),
            });
        }

        if data[0] != PAYLOAD_WIRE_VERSION {
            return Err(PayloadCodecError::UnsupportedVersion { found: data[0] });
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[1..1 + NONCE_SIZE]);

        let len_start = 1 + NONCE_SIZE;
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[len_start..len_start + 4]);
        let ciphertext_len = u32::from_be_bytes(len_bytes) as usize;

        let body_start = PAYLOAD_WIRE_HEADER_LEN;
        let needed = body_start + ciphertext_len;
        if data.len() < needed {
            return Err(PayloadCodecError::Truncated { needed, available: data.len() });
        }

        let ciphertext = data[body_start..needed].to_vec();
        Ok(Self { ciphertext, nonce })
    }
}

/// Kind of a transport-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A member joined the group.
    Join,
    /// A member left the group.
    Leave,
    /// An encrypted content message.
    Message,
    /// A replay of stored history.
    History,
    /// A server-originated notice.
    System,
}

/// Transport envelope for one group message.
///
/// The trust core guarantees the semantics of `payload`; the outer framing
/// (HTTP body, socket frame, ...) belongs to the transport layer. The
/// decrypted counterpart is delivered through the client's actions rather
/// than a wire type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// What this message is.
    pub kind: MessageKind,
    /// Conversation group the message belongs to.
    pub group_id: String,
    /// Sender's stable user id.
    pub user_id: String,
    /// Encrypted content, present for `Message` kinds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<EncryptedPayload>,
    /// Sender-side timestamp, milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<i64>,
}
