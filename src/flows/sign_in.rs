//! Sign-in orchestration.
//!
//! Two entry points: direct identifier+secret exchange with the auth
//! backend, and broker-mediated sign-in where the platform broker is offered
//! password, public-key, and federated options at once and returns exactly
//! one credential. The orchestrator dispatches on the returned variant,
//! verifies it through the matching path, and falls back once to a reduced
//! option set when the broker reports a transient interruption.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::challenge::ChallengeGenerator;
use crate::config::{FederatedConfig, RelyingPartyConfig};
use crate::domain::{
    AuthBackendPtr, BrokerCredential, BrokerError, Credential, CredentialBrokerPtr,
    CredentialOption, GetCredentialRequest, Identity, ProfilePatch, ProfileStorePtr, SignInError,
};
use crate::infrastructure::request_options_json;
use crate::store::CredentialStore;

// ============================================================================
// Outcome Types
// ============================================================================

/// Terminal outcome of a broker-mediated sign-in attempt.
///
/// Cancellation is a user decision, not a failure, so it lives on the `Ok`
/// side; every failure reason is a [`SignInError`].
#[derive(Debug, Clone)]
pub enum BrokerSignIn {
    // ---
    Authenticated(Identity),
    Cancelled,
}

// ============================================================================
// Sign-In Orchestrator
// ============================================================================

/// Issues composite credential requests and verifies whichever credential
/// the broker returns.
pub struct SignInOrchestrator {
    // ---
    broker: CredentialBrokerPtr,
    backend: AuthBackendPtr,
    store: Arc<CredentialStore>,
    profiles: ProfileStorePtr,
    challenges: ChallengeGenerator,
    relying_party: RelyingPartyConfig,
    federated: FederatedConfig,
    /// Serializes broker requests: at most one in flight per instance, and
    /// the fallback retry is sequential with the original request.
    request_gate: Mutex<()>,
}

impl SignInOrchestrator {
    // ---
    pub fn new(
        broker: CredentialBrokerPtr,
        backend: AuthBackendPtr,
        store: Arc<CredentialStore>,
        profiles: ProfileStorePtr,
        relying_party: RelyingPartyConfig,
        federated: FederatedConfig,
    ) -> Self {
        // ---
        Self {
            broker,
            backend,
            store,
            profiles,
            challenges: ChallengeGenerator::new(),
            relying_party,
            federated,
            request_gate: Mutex::new(()),
        }
    }

    /// Direct credential sign-in: exchange identifier+secret with the auth
    /// backend. No broker involvement.
    pub async fn sign_in_with_password(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Identity, SignInError> {
        // ---
        let identity = self.backend.authenticate(identifier, secret).await?;
        tracing::info!("Signed in with password for user: {}", identity.id);
        Ok(identity)
    }

    /// Broker-mediated sign-in offering password, public-key, and federated
    /// options simultaneously.
    ///
    /// On a transient broker interruption, retries exactly once with the
    /// public-key option dropped; a second interruption fails the attempt.
    /// User cancellation terminates the attempt without any fallback.
    pub async fn sign_in_with_broker(&self) -> Result<BrokerSignIn, SignInError> {
        // ---
        let _gate = self.request_gate.lock().await;

        let request = GetCredentialRequest {
            options: self.composite_options(true),
        };
        let labels: Vec<_> = request.options.iter().map(|o| o.label()).collect();
        tracing::debug!("Issuing composite credential request: {:?}", labels);

        let credential = match self.broker.get_credential(request).await {
            Ok(credential) => credential,
            Err(BrokerError::Cancelled) => {
                tracing::info!("Sign-in cancelled by user");
                return Ok(BrokerSignIn::Cancelled);
            }
            Err(BrokerError::Interrupted) => {
                tracing::warn!(
                    "Credential request interrupted; retrying once without the public-key option"
                );
                let fallback = GetCredentialRequest {
                    options: self.composite_options(false),
                };
                match self.broker.get_credential(fallback).await {
                    Ok(credential) => credential,
                    Err(BrokerError::Cancelled) => {
                        tracing::info!("Fallback sign-in cancelled by user");
                        return Ok(BrokerSignIn::Cancelled);
                    }
                    Err(e) => {
                        tracing::error!("Fallback credential request failed: {}", e);
                        return Err(e.into());
                    }
                }
            }
            Err(e) => {
                tracing::error!("Credential request failed: {}", e);
                return Err(e.into());
            }
        };

        let credential = normalize(credential)?;
        self.dispatch(credential).await.map(BrokerSignIn::Authenticated)
    }

    /// Option set for a composite request. The fallback request drops the
    /// public-key option and keeps password + federated.
    fn composite_options(&self, include_public_key: bool) -> Vec<CredentialOption> {
        // ---
        let mut options = vec![CredentialOption::Password];

        if include_public_key {
            let challenge = self.challenges.new_challenge();
            options.push(CredentialOption::PublicKey {
                request_json: request_options_json(&self.relying_party, challenge),
            });
        }

        options.push(CredentialOption::Federated {
            client_id: self.federated.client_id.clone(),
            filter_authorized_accounts: self.federated.filter_authorized_accounts,
        });
        options
    }

    /// Verify a normalized credential through its matching path.
    async fn dispatch(&self, credential: Credential) -> Result<Identity, SignInError> {
        // ---
        match credential {
            Credential::PublicKey { id, .. } => {
                // The backend validated the assertion during the exchange;
                // the current session is the proof.
                let identity = self
                    .backend
                    .current_session()
                    .await
                    .ok_or(SignInError::SessionMissing)?;
                tracing::info!("Signed in with passkey for user: {}", identity.id);

                // Bookkeeping only; a store hiccup must not undo a completed
                // sign-in.
                if let Err(e) = self.store.touch_last_used(&id, &identity.id).await {
                    tracing::warn!("Failed to stamp last-used for {}: {}", id, e);
                }
                Ok(identity)
            }

            Credential::Password { identifier, secret } => {
                // ---
                self.sign_in_with_password(&identifier, &secret).await
            }

            Credential::FederatedToken { raw_token } => {
                // ---
                let identity = self.backend.authenticate_with_token(&raw_token).await?;
                tracing::info!("Signed in with federated token for user: {}", identity.id);

                let now = Utc::now();
                self.profiles
                    .merge_profile(
                        &identity.id,
                        ProfilePatch {
                            email: Some(identity.email.clone()),
                            display_name: identity.display_name.clone(),
                            last_sign_in_at: Some(now),
                            updated_at: Some(now),
                        },
                    )
                    .await?;
                Ok(identity)
            }
        }
    }
}

/// Map the broker's response union onto the closed domain credential union.
/// `Unknown` is the only variant without a counterpart and fails here, so
/// dispatch never sees a credential it cannot verify.
fn normalize(credential: BrokerCredential) -> Result<Credential, SignInError> {
    // ---
    match credential {
        BrokerCredential::Password { identifier, secret } => {
            Ok(Credential::Password { identifier, secret })
        }
        BrokerCredential::PublicKey {
            id,
            client_response_json,
        } => Ok(Credential::PublicKey {
            id,
            client_response_json,
        }),
        BrokerCredential::FederatedToken { raw_token } => {
            Ok(Credential::FederatedToken { raw_token })
        }
        BrokerCredential::Unknown { type_name } => {
            tracing::error!("Unsupported credential type: {}", type_name);
            Err(SignInError::UnrecognizedCredentialType(type_name))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
