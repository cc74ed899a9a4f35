//! Client events and actions.
//!
//! The client is a pure state machine: the caller feeds [`ClientEvent`]s in
//! and performs the I/O described by the returned [`ClientAction`]s. Nothing
//! in here touches the network.

use kasilink_proto::{
    DeviceKeyRecord, DevicePublicKey, EncryptedPayload, TransparencyBundle, WireMessage,
};

/// Input to the client state machine.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Decide whether a peer device key may be trusted.
    ///
    /// `now_ms` is the caller's clock for the revocation-freshness check:
    /// inclusion in the log proves publication, while freshness policy
    /// belongs to the caller.
    TrustDevice {
        /// Bundle fetched from the transparency-log service.
        bundle: TransparencyBundle,
        /// The device key the caller wants to message.
        device_public_key: DevicePublicKey,
        /// Caller's wall clock, milliseconds since the Unix epoch.
        now_ms: i64,
    },

    /// Install a derived (or provisioned) key for a conversation group.
    JoinGroup {
        /// Group identifier, also the public KDF salt.
        group_id: String,
        /// The group's symmetric key.
        key: kasilink_crypto::GroupKey,
    },

    /// Forget a group and its key.
    LeaveGroup {
        /// Group to leave.
        group_id: String,
    },

    /// Encrypt and send a message to a group.
    SendMessage {
        /// Target group.
        group_id: String,
        /// Message content.
        plaintext: Vec<u8>,
    },

    /// An encrypted payload arrived from the transport.
    PayloadReceived {
        /// Group the payload belongs to.
        group_id: String,
        /// Sender's user id, as carried by the envelope.
        user_id: String,
        /// The sealed content.
        payload: EncryptedPayload,
        /// Sender-side timestamp, milliseconds since the Unix epoch.
        created_at: i64,
    },
}

/// Output of the client state machine; the caller performs the I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Hand a message to the transport.
    Send(WireMessage),

    /// Deliver a decrypted message to the application.
    DeliverMessage {
        /// Group the message belongs to.
        group_id: String,
        /// Sender's user id.
        user_id: String,
        /// Recovered plaintext.
        plaintext: Vec<u8>,
        /// Sender-side timestamp.
        created_at: i64,
    },

    /// A device key passed transparency verification and the freshness
    /// check; it may now be used for key agreement.
    DeviceTrusted {
        /// The published record backing the trust decision.
        record: DeviceKeyRecord,
    },

    /// A device key failed verification; refuse to message it.
    DeviceRejected {
        /// The key that was rejected.
        device_public_key: DevicePublicKey,
        /// Which check rejected it.
        reason: String,
    },

    /// Diagnostic message for the host's logger.
    Log {
        /// Human-readable description.
        message: String,
    },
}
