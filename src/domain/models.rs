use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated principal resulting from a successful credential exchange.
///
/// At most one live `Identity` exists per device session; it is produced by
/// the auth backend on registration or sign-in and dropped on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    // ---
    /// Stable opaque user id assigned by the auth backend.
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// A credential returned from the platform broker, exactly one variant per
/// authentication attempt.
///
/// This is a closed union; broker responses are normalized into it before
/// dispatch, and a response that does not map onto it fails the attempt
/// rather than silently defaulting (see
/// [`BrokerCredential`](crate::domain::BrokerCredential)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    // ---
    Password {
        identifier: String,
        secret: String,
    },
    /// An opaque, backend-verifiable assertion or attestation blob.
    PublicKey {
        id: String,
        client_response_json: String,
    },
    FederatedToken {
        raw_token: String,
    },
}

/// A single-use 32-byte random value embedded into broker requests to
/// prevent replay.
///
/// Challenges are consumed by value when a request is built, so one challenge
/// can never back two broker round trips. The `Debug` impl is redacted; a
/// challenge must never reach logs or persistent storage.
pub struct Challenge {
    // ---
    bytes: [u8; Challenge::LEN],
}

impl Challenge {
    // ---
    pub const LEN: usize = 32;

    pub(crate) fn from_bytes(bytes: [u8; Challenge::LEN]) -> Self {
        // ---
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; Challenge::LEN] {
        // ---
        &self.bytes
    }

    /// Base64url encoding used when embedding the challenge into the JSON
    /// options handed to the platform broker.
    pub fn to_base64url(&self) -> String {
        // ---
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(self.bytes)
    }
}

impl std::fmt::Debug for Challenge {
    // ---
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ---
        f.write_str("Challenge(..)")
    }
}

impl PartialEq for Challenge {
    // ---
    fn eq(&self, other: &Self) -> bool {
        // ---
        self.bytes == other.bytes
    }
}

/// Durable record of a registered public-key credential.
///
/// Stored in the `passkeys` collection keyed by `credential_id`. Every
/// mutation is gated on `owner_user_id` matching the session identity
/// (see [`CredentialStore`](crate::CredentialStore)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassKeyRecord {
    // ---
    /// Primary key, as reported by the platform broker.
    pub credential_id: String,
    pub owner_user_id: String,
    /// Opaque public-key material; verified by the backend, never parsed here.
    pub public_key_material: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub device_info: Option<DeviceInfo>,
}

impl PassKeyRecord {
    // ---
    pub fn new(
        credential_id: String,
        owner_user_id: String,
        public_key_material: String,
        display_name: Option<String>,
        device_info: Option<DeviceInfo>,
    ) -> Self {
        // ---
        Self {
            credential_id,
            owner_user_id,
            public_key_material,
            display_name,
            created_at: Utc::now(),
            last_used_at: None,
            device_info,
        }
    }
}

/// Metadata about the device a passkey was created on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    // ---
    pub model: String,
    pub manufacturer: String,
    pub platform_version: String,
}

/// Partial update for a `users` profile document.
///
/// Only `Some` fields are written; merge semantics guarantee that unrelated
/// fields already present in the document survive the upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    // ---
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
