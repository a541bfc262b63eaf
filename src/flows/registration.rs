//! Passkey registration flow.
//!
//! Orchestrates creation of a new public-key credential through the platform
//! broker and records it durably:
//! 1. draw a single-use challenge
//! 2. send a creation request to the broker
//! 3. persist a `PassKeyRecord` built from the broker's response
//!
//! All broker and store failures are mapped to [`RegistrationError`]
//! variants and returned; nothing is persisted unless the broker step
//! succeeded.

use std::sync::Arc;

use crate::challenge::ChallengeGenerator;
use crate::config::{DeviceConfig, RelyingPartyConfig};
use crate::domain::{
    CreateCredentialRequest, CreatedCredential, CredentialBrokerPtr, PassKeyRecord,
    RegistrationError,
};
use crate::infrastructure::creation_options_json;
use crate::store::CredentialStore;

// ============================================================================
// Outcome Types
// ============================================================================

/// Successful completion of a registration.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    // ---
    /// Credential id of the newly persisted record.
    pub credential_id: String,
}

/// Flow phases, logged for diagnosis. `Succeeded`/`Failed` are the function's
/// return value rather than phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationPhase {
    // ---
    RequestingChallenge,
    AwaitingBrokerResponse,
    Persisting,
}

// ============================================================================
// Registration Flow
// ============================================================================

/// Creates new public-key credentials and records them in the credential
/// store.
pub struct RegistrationFlow {
    // ---
    broker: CredentialBrokerPtr,
    store: Arc<CredentialStore>,
    challenges: ChallengeGenerator,
    relying_party: RelyingPartyConfig,
    device: DeviceConfig,
}

impl RegistrationFlow {
    // ---
    pub fn new(
        broker: CredentialBrokerPtr,
        store: Arc<CredentialStore>,
        relying_party: RelyingPartyConfig,
        device: DeviceConfig,
    ) -> Self {
        // ---
        Self {
            broker,
            store,
            challenges: ChallengeGenerator::new(),
            relying_party,
            device,
        }
    }

    /// Register a new passkey for `user_id`.
    ///
    /// On success exactly one `PassKeyRecord` has been persisted; on any
    /// failure the store is untouched.
    pub async fn register_passkey(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        // ---
        let display_name = display_name.unwrap_or(user_id);

        tracing::debug!("Registration phase: {:?}", RegistrationPhase::RequestingChallenge);
        let challenge = self.challenges.new_challenge();
        let options_json =
            creation_options_json(&self.relying_party, user_id, display_name, challenge);

        tracing::debug!(
            "Registration phase: {:?}",
            RegistrationPhase::AwaitingBrokerResponse
        );
        let created = self
            .broker
            .create_credential(CreateCredentialRequest {
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                options_json,
            })
            .await
            .map_err(|e| {
                tracing::error!("Broker failed to create credential: {}", e);
                RegistrationError::from(e)
            })?;

        if created.type_name != CreatedCredential::PUBLIC_KEY {
            tracing::error!("Unexpected credential type received: {}", created.type_name);
            return Err(RegistrationError::UnrecognizedCredentialType(
                created.type_name,
            ));
        }

        let credential_id = extract_credential_id(&created)?;

        tracing::debug!("Registration phase: {:?}", RegistrationPhase::Persisting);
        let record = PassKeyRecord::new(
            credential_id.clone(),
            user_id.to_string(),
            created.registration_response_json,
            Some(display_name.to_string()),
            self.device.device_info(),
        );

        self.store.save(record).await.map_err(|e| {
            tracing::error!("Failed to persist passkey record: {}", e);
            RegistrationError::from(e)
        })?;

        tracing::info!(
            "Registration completed for user: {} (credential: {})",
            user_id,
            credential_id
        );

        Ok(RegistrationOutcome { credential_id })
    }
}

/// Credential id as reported inside the registration response JSON, falling
/// back to the broker-level id when the field is absent.
fn extract_credential_id(created: &CreatedCredential) -> Result<String, RegistrationError> {
    // ---
    let response: serde_json::Value = serde_json::from_str(&created.registration_response_json)
        .map_err(|e| RegistrationError::MalformedResponse(e.to_string()))?;

    let id = response
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or(&created.credential_id);

    if id.is_empty() {
        return Err(RegistrationError::MalformedResponse(
            "response carries no credential id".to_string(),
        ));
    }
    Ok(id.to_string())
}

// ============================================================================
// Tests
// ============================================================================
