//! Client state machine.
//!
//! The `Client` composes the trust core for a message-transport layer: it
//! decides which device keys to trust, holds group keys, and turns plaintext
//! into sealed wire messages and back. Pure state machine - returns actions,
//! caller handles I/O.

use std::collections::HashMap;

use kasilink_core::{Environment, Identity, verify_transparency_bundle};
use kasilink_crypto::{GroupKey, decrypt_with_key, derive_group_key, encrypt_with_key};
use kasilink_proto::{DeviceKeyRecord, DevicePublicKey, MessageKind, NONCE_SIZE, WireMessage};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
};

/// Client state machine.
///
/// Manages trusted peer devices and group keys, and encrypts/decrypts
/// message content.
///
/// # Type Parameters
///
/// - `E`: Environment implementation for time/randomness
pub struct Client<E: Environment> {
    /// Our persistent identity.
    identity: Identity,

    /// The transparency log's public key, distributed out of band.
    log_public_key: [u8; 32],

    /// Devices that passed the transparency check, by device public key.
    trusted_devices: HashMap<DevicePublicKey, DeviceKeyRecord>,

    /// Keys for joined groups.
    groups: HashMap<String, GroupKey>,

    /// Environment for time/randomness.
    env: E,
}

impl<E: Environment> Client<E> {
    /// Create a new client with the given identity and log public key.
    pub fn new(env: E, identity: Identity, log_public_key: [u8; 32]) -> Self {
        Self {
            identity,
            log_public_key,
            trusted_devices: HashMap::new(),
            groups: HashMap::new(),
            env,
        }
    }

    /// Get the client's user id.
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    /// Get the number of joined groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Check whether a group key is installed.
    pub fn is_member(&self, group_id: &str) -> bool {
        self.groups.contains_key(group_id)
    }

    /// Check whether a device key has passed verification.
    pub fn is_trusted(&self, device_public_key: &DevicePublicKey) -> bool {
        self.trusted_devices.contains_key(device_public_key)
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the event cannot be processed. Trust
    /// rejections are NOT errors: they surface as
    /// [`ClientAction::DeviceRejected`], an expected outcome the caller
    /// branches on.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::TrustDevice { bundle, device_public_key, now_ms } => {
                Ok(self.handle_trust_device(&bundle, device_public_key, now_ms))
            },
            ClientEvent::JoinGroup { group_id, key } => self.handle_join_group(group_id, key),
            ClientEvent::LeaveGroup { group_id } => self.handle_leave_group(&group_id),
            ClientEvent::SendMessage { group_id, plaintext } => {
                self.handle_send_message(&group_id, &plaintext)
            },
            ClientEvent::PayloadReceived { group_id, user_id, payload, created_at } => {
                self.handle_payload(&group_id, user_id, &payload, created_at)
            },
        }
    }

    /// Run the transparency check plus the caller-clock freshness policy.
    fn handle_trust_device(
        &mut self,
        bundle: &kasilink_proto::TransparencyBundle,
        device_public_key: DevicePublicKey,
        now_ms: i64,
    ) -> Vec<ClientAction> {
        if !verify_transparency_bundle(bundle, &self.log_public_key, &device_public_key) {
            return vec![ClientAction::DeviceRejected {
                device_public_key,
                reason: "transparency verification failed".to_string(),
            }];
        }

        // The validator proved publication; the record is therefore present.
        let Some(record) = bundle
            .records
            .iter()
            .find(|record| record.device_public_key == device_public_key)
        else {
            return vec![ClientAction::DeviceRejected {
                device_public_key,
                reason: "record missing from bundle".to_string(),
            }];
        };

        // Publication is not validity: apply the freshness policy with the
        // caller's clock.
        if record.is_revoked_at(now_ms) {
            return vec![ClientAction::DeviceRejected {
                device_public_key,
                reason: "device key revoked".to_string(),
            }];
        }

        self.trusted_devices.insert(device_public_key, record.clone());

        vec![
            ClientAction::DeviceTrusted { record: record.clone() },
            ClientAction::Log {
                message: format!(
                    "trusted device {} of user {}",
                    record.device_id, record.user_id
                ),
            },
        ]
    }

    fn handle_join_group(
        &mut self,
        group_id: String,
        key: GroupKey,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.groups.contains_key(&group_id) {
            return Err(ClientError::GroupAlreadyJoined { group_id });
        }

        let join = WireMessage {
            kind: MessageKind::Join,
            group_id: group_id.clone(),
            user_id: self.identity.user_id.clone(),
            payload: None,
            created_at: Some(self.env.now_millis()),
        };

        self.groups.insert(group_id, key);
        Ok(vec![ClientAction::Send(join)])
    }

    fn handle_leave_group(&mut self, group_id: &str) -> Result<Vec<ClientAction>, ClientError> {
        if self.groups.remove(group_id).is_none() {
            return Err(ClientError::GroupNotFound { group_id: group_id.to_string() });
        }

        Ok(vec![ClientAction::Send(WireMessage {
            kind: MessageKind::Leave,
            group_id: group_id.to_string(),
            user_id: self.identity.user_id.clone(),
            payload: None,
            created_at: Some(self.env.now_millis()),
        })])
    }

    fn handle_send_message(
        &mut self,
        group_id: &str,
        plaintext: &[u8],
    ) -> Result<Vec<ClientAction>, ClientError> {
        let key = self
            .groups
            .get(group_id)
            .ok_or_else(|| ClientError::GroupNotFound { group_id: group_id.to_string() })?;

        // Fresh nonce per encryption, drawn from the environment's CSPRNG.
        let mut nonce = [0u8; NONCE_SIZE];
        self.env.random_bytes(&mut nonce);

        let payload = encrypt_with_key(plaintext, key.as_bytes(), nonce)?;

        Ok(vec![ClientAction::Send(WireMessage {
            kind: MessageKind::Message,
            group_id: group_id.to_string(),
            user_id: self.identity.user_id.clone(),
            payload: Some(payload),
            created_at: Some(self.env.now_millis()),
        })])
    }

    fn handle_payload(
        &mut self,
        group_id: &str,
        user_id: String,
        payload: &kasilink_proto::EncryptedPayload,
        created_at: i64,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let key = self
            .groups
            .get(group_id)
            .ok_or_else(|| ClientError::GroupNotFound { group_id: group_id.to_string() })?;

        // A tag mismatch here is tampering or a wrong key; it propagates as
        // a fatal error, never as silently wrong plaintext.
        let plaintext = decrypt_with_key(payload, key.as_bytes())?;

        Ok(vec![ClientAction::DeliverMessage {
            group_id: group_id.to_string(),
            user_id,
            plaintext,
            created_at,
        }])
    }
}

/// Derive a group key without blocking the caller's thread.
///
/// PBKDF2 at 150k iterations is CPU-bound by design; this wrapper runs it on
/// the blocking pool so latency-sensitive tasks stay responsive.
///
/// # Errors
///
/// Returns [`ClientError::KeyDerivation`] if the blocking task is cancelled
/// or panics.
pub async fn derive_group_key_off_thread(
    passphrase: String,
    salt: String,
) -> Result<GroupKey, ClientError> {
    tokio::task::spawn_blocking(move || derive_group_key(&passphrase, &salt))
        .await
        .map_err(|error| ClientError::KeyDerivation { reason: error.to_string() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use kasilink_crypto::derive_group_key;

    use super::*;

    /// Deterministic environment: fixed clock, counting RNG.
    #[derive(Clone)]
    struct TestEnv {
        counter: Arc<Mutex<u8>>,
    }

    impl TestEnv {
        fn new() -> Self {
            Self { counter: Arc::new(Mutex::new(0)) }
        }
    }

    impl Environment for TestEnv {
        fn now_millis(&self) -> i64 {
            1_700_000_000_000
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
            for byte in buffer.iter_mut() {
                *byte = *counter;
                *counter = counter.wrapping_add(1);
            }
        }
    }

    fn identity() -> Identity {
        Identity { user_id: "a".repeat(32), device_id: "b".repeat(32) }
    }

    fn client() -> Client<TestEnv> {
        Client::new(TestEnv::new(), identity(), [0u8; 32])
    }

    fn group_key() -> GroupKey {
        derive_group_key("stokvel-secret", "township-market")
    }

    #[test]
    fn create_client() {
        let client = client();
        assert_eq!(client.user_id(), "a".repeat(32));
        assert_eq!(client.group_count(), 0);
    }

    #[test]
    fn join_group_announces_membership() {
        let mut client = client();

        let actions = client
            .handle(ClientEvent::JoinGroup {
                group_id: "township-market".to_string(),
                key: group_key(),
            })
            .unwrap();

        assert!(client.is_member("township-market"));
        match &actions[0] {
            ClientAction::Send(message) => {
                assert_eq!(message.kind, MessageKind::Join);
                assert_eq!(message.group_id, "township-market");
                assert!(message.payload.is_none());
            },
            other => panic!("expected Send action, got {other:?}"),
        }
    }

    #[test]
    fn join_twice_fails() {
        let mut client = client();
        client
            .handle(ClientEvent::JoinGroup {
                group_id: "township-market".to_string(),
                key: group_key(),
            })
            .unwrap();

        let result = client.handle(ClientEvent::JoinGroup {
            group_id: "township-market".to_string(),
            key: group_key(),
        });
        assert!(matches!(result, Err(ClientError::GroupAlreadyJoined { .. })));
    }

    #[test]
    fn send_to_unknown_group_fails() {
        let mut client = client();

        let result = client.handle(ClientEvent::SendMessage {
            group_id: "nowhere".to_string(),
            plaintext: b"hello".to_vec(),
        });

        assert!(matches!(result, Err(ClientError::GroupNotFound { .. })));
    }

    #[test]
    fn leave_unknown_group_fails() {
        let mut client = client();

        let result = client.handle(ClientEvent::LeaveGroup { group_id: "nowhere".to_string() });
        assert!(matches!(result, Err(ClientError::GroupNotFound { .. })));
    }

    #[test]
    fn send_message_produces_sealed_envelope() {
        let mut client = client();
        client
            .handle(ClientEvent::JoinGroup {
                group_id: "township-market".to_string(),
                key: group_key(),
            })
            .unwrap();

        let actions = client
            .handle(ClientEvent::SendMessage {
                group_id: "township-market".to_string(),
                plaintext: b"meet at noon".to_vec(),
            })
            .unwrap();

        assert_eq!(actions.len(), 1);
        match &actions[0] {
            ClientAction::Send(message) => {
                assert_eq!(message.kind, MessageKind::Message);
                assert_eq!(message.user_id, "a".repeat(32));
                assert_eq!(message.created_at, Some(1_700_000_000_000));
                let payload = message.payload.as_ref().unwrap();
                assert_ne!(payload.ciphertext.as_slice(), b"meet at noon");
            },
            other => panic!("expected Send action, got {other:?}"),
        }
    }

    #[test]
    fn nonces_are_fresh_per_message() {
        let mut client = client();
        client
            .handle(ClientEvent::JoinGroup {
                group_id: "township-market".to_string(),
                key: group_key(),
            })
            .unwrap();

        let first = client
            .handle(ClientEvent::SendMessage {
                group_id: "township-market".to_string(),
                plaintext: b"one".to_vec(),
            })
            .unwrap();
        let second = client
            .handle(ClientEvent::SendMessage {
                group_id: "township-market".to_string(),
                plaintext: b"two".to_vec(),
            })
            .unwrap();

        let nonce = |actions: &[ClientAction]| match &actions[0] {
            ClientAction::Send(message) => message.payload.as_ref().unwrap().nonce,
            other => panic!("expected Send action, got {other:?}"),
        };

        assert_ne!(nonce(&first), nonce(&second));
    }

    #[test]
    fn send_then_receive_roundtrip() {
        // Two members derive the same key from the shared passphrase; what
        // one seals, the other opens.
        let mut sender = client();
        let mut receiver = Client::new(
            TestEnv::new(),
            Identity { user_id: "c".repeat(32), device_id: "d".repeat(32) },
            [0u8; 32],
        );

        for client in [&mut sender, &mut receiver] {
            client
                .handle(ClientEvent::JoinGroup {
                    group_id: "township-market".to_string(),
                    key: group_key(),
                })
                .unwrap();
        }

        let actions = sender
            .handle(ClientEvent::SendMessage {
                group_id: "township-market".to_string(),
                plaintext: b"meet at noon".to_vec(),
            })
            .unwrap();

        let message = match &actions[0] {
            ClientAction::Send(message) => message.clone(),
            other => panic!("expected Send action, got {other:?}"),
        };

        let delivered = receiver
            .handle(ClientEvent::PayloadReceived {
                group_id: message.group_id,
                user_id: message.user_id,
                payload: message.payload.unwrap(),
                created_at: message.created_at.unwrap(),
            })
            .unwrap();

        match &delivered[0] {
            ClientAction::DeliverMessage { plaintext, user_id, .. } => {
                assert_eq!(plaintext.as_slice(), b"meet at noon");
                assert_eq!(user_id, &"a".repeat(32));
            },
            other => panic!("expected DeliverMessage action, got {other:?}"),
        }
    }

    #[test]
    fn tampered_payload_is_fatal() {
        let mut client = client();
        client
            .handle(ClientEvent::JoinGroup {
                group_id: "township-market".to_string(),
                key: group_key(),
            })
            .unwrap();

        let actions = client
            .handle(ClientEvent::SendMessage {
                group_id: "township-market".to_string(),
                plaintext: b"meet at noon".to_vec(),
            })
            .unwrap();

        let mut payload = match &actions[0] {
            ClientAction::Send(message) => message.payload.clone().unwrap(),
            other => panic!("expected Send action, got {other:?}"),
        };
        payload.ciphertext[0] ^= 0x01;

        let result = client.handle(ClientEvent::PayloadReceived {
            group_id: "township-market".to_string(),
            user_id: "mallory".to_string(),
            payload,
            created_at: 0,
        });

        match result {
            Err(error) => assert!(error.is_fatal()),
            Ok(actions) => panic!("tampering went undetected: {actions:?}"),
        }
    }

    #[tokio::test]
    async fn off_thread_derivation_matches_inline() {
        let expected = derive_group_key("stokvel-secret", "township-market");
        let derived = derive_group_key_off_thread(
            "stokvel-secret".to_string(),
            "township-market".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(derived.as_bytes(), expected.as_bytes());
    }
}
