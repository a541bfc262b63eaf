//! Platform credential broker capability.
//!
//! The broker is the device-level mediator for stored secrets, device-bound
//! key pairs, and federated tokens. This crate only issues requests to it and
//! interprets its typed responses; the key-pair generation and user
//! verification it performs are entirely external.

use std::sync::Arc;

use super::error::BrokerError;

/// Request to create a new device-bound public-key credential.
#[derive(Debug, Clone)]
pub struct CreateCredentialRequest {
    // ---
    pub user_id: String,
    pub display_name: String,
    /// WebAuthn-style creation options, challenge embedded, built by
    /// [`creation_options_json`](crate::infrastructure::creation_options_json).
    pub options_json: String,
}

/// Successful response to a credential creation request.
#[derive(Debug, Clone)]
pub struct CreatedCredential {
    // ---
    /// Credential class reported by the platform. Anything other than
    /// [`CreatedCredential::PUBLIC_KEY`] is platform version skew and is
    /// rejected by the registration flow.
    pub type_name: String,
    /// Credential id assigned by the authenticator.
    pub credential_id: String,
    /// Attestation blob; opaque here, verified by the auth backend.
    pub registration_response_json: String,
}

impl CreatedCredential {
    // ---
    /// Type name of a device-bound public-key credential.
    pub const PUBLIC_KEY: &'static str = "public-key";
}

/// One credential mechanism offered in a composite get-request.
///
/// The broker presents all offered options at once and returns exactly one
/// credential of the kind the user picked.
#[derive(Debug, Clone)]
pub enum CredentialOption {
    // ---
    /// A password previously saved with the platform.
    Password,
    /// Device-bound public-key credential; carries WebAuthn-style request
    /// options with the challenge embedded.
    PublicKey { request_json: String },
    /// Federated identity token from the configured provider. When
    /// `filter_authorized_accounts` is set the provider sheet only offers
    /// accounts already authorized for this application.
    Federated {
        client_id: String,
        filter_authorized_accounts: bool,
    },
}

impl CredentialOption {
    // ---
    /// Short label used in request logging.
    pub fn label(&self) -> &'static str {
        // ---
        match self {
            CredentialOption::Password => "password",
            CredentialOption::PublicKey { .. } => "public-key",
            CredentialOption::Federated { .. } => "federated",
        }
    }
}

/// Composite credential request spanning one or more options.
#[derive(Debug, Clone)]
pub struct GetCredentialRequest {
    // ---
    pub options: Vec<CredentialOption>,
}

/// The single credential a broker get-request resolves to.
///
/// `Unknown` captures platform version skew: a credential class the broker
/// produced but this crate does not model. Dispatch maps it to
/// `UnrecognizedCredentialType` explicitly; there is no silent default arm.
#[derive(Debug, Clone)]
pub enum BrokerCredential {
    // ---
    Password {
        identifier: String,
        secret: String,
    },
    PublicKey {
        id: String,
        client_response_json: String,
    },
    FederatedToken {
        raw_token: String,
    },
    Unknown {
        type_name: String,
    },
}

/// Abstraction over the platform credential broker.
#[async_trait::async_trait]
pub trait CredentialBroker: Send + Sync {
    // ---
    /// Create a new public-key credential for the given user.
    async fn create_credential(
        &self,
        request: CreateCredentialRequest,
    ) -> Result<CreatedCredential, BrokerError>;

    /// Resolve a composite request to exactly one credential.
    async fn get_credential(
        &self,
        request: GetCredentialRequest,
    ) -> Result<BrokerCredential, BrokerError>;
}

/// Type alias for any platform backend that implements CredentialBroker.
pub type CredentialBrokerPtr = Arc<dyn CredentialBroker>;
