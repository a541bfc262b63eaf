// src/lib.rs
use anyhow::Result;
use std::sync::Arc;

use domain::{AuthBackendPtr, CredentialBrokerPtr, PasskeyRepositoryPtr, ProfileStorePtr};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod challenge;
mod config;
mod flows;
mod infrastructure;
mod session;
mod store;

// Hoist up only the public symbol(s)
pub use challenge::ChallengeGenerator;
pub use session::SessionObserver;
pub use store::CredentialStore;

pub use config::*;

pub use flows::{
    AccountExistenceProbe, // ---
    AccountManager,
    BrokerSignIn,
    RegistrationFlow,
    RegistrationOutcome,
    SignInOrchestrator,
};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_store, // ---
    creation_options_json,
    request_options_json,
    MemoryStore,
};

/// Fully wired auth core.
///
/// This struct is the dependency-injection container for the subsystem: it
/// receives the three external capability handles (platform credential
/// broker, auth backend, document store collections) and wires every flow
/// around them. Components share the same `Arc`ed handles rather than
/// constructing platform singletons ad hoc, so every one of them can be
/// substituted with a fake in tests.
pub struct AuthCore {
    // ---
    store: Arc<CredentialStore>,
    registration: Arc<RegistrationFlow>,
    sign_in: SignInOrchestrator,
    accounts: AccountManager,
    probe: AccountExistenceProbe,
    session: SessionObserver,
}

impl AuthCore {
    // ---
    /// Wires the auth core from an explicit configuration.
    pub fn new(
        config: AuthConfig,
        broker: CredentialBrokerPtr,
        backend: AuthBackendPtr,
        passkeys: PasskeyRepositoryPtr,
        profiles: ProfileStorePtr,
    ) -> Self {
        // ---
        let store = Arc::new(CredentialStore::new(passkeys));

        let registration = Arc::new(RegistrationFlow::new(
            broker.clone(),
            store.clone(),
            config.relying_party.clone(),
            config.device.clone(),
        ));

        let sign_in = SignInOrchestrator::new(
            broker,
            backend.clone(),
            store.clone(),
            profiles.clone(),
            config.relying_party.clone(),
            config.federated.clone(),
        );

        let accounts = AccountManager::new(
            backend.clone(),
            store.clone(),
            profiles,
            registration.clone(),
        );

        let probe = AccountExistenceProbe::new(backend.clone());
        let session = SessionObserver::new(backend);

        AuthCore {
            store,
            registration,
            sign_in,
            accounts,
            probe,
            session,
        }
    }

    /// Durable passkey record store.
    pub fn store(&self) -> &CredentialStore {
        // ---
        &self.store
    }

    /// Passkey registration flow.
    pub fn registration(&self) -> &RegistrationFlow {
        // ---
        &self.registration
    }

    /// Sign-in orchestrator.
    pub fn sign_in(&self) -> &SignInOrchestrator {
        // ---
        &self.sign_in
    }

    /// Account lifecycle operations.
    pub fn accounts(&self) -> &AccountManager {
        // ---
        &self.accounts
    }

    /// Account existence probe.
    pub fn probe(&self) -> &AccountExistenceProbe {
        // ---
        &self.probe
    }

    /// Session state observer.
    pub fn session(&self) -> &SessionObserver {
        // ---
        &self.session
    }
}

/// Build the auth core with configuration loaded from environment variables.
pub fn create_auth_core(
    broker: CredentialBrokerPtr,
    backend: AuthBackendPtr,
    passkeys: PasskeyRepositoryPtr,
    profiles: ProfileStorePtr,
) -> Result<AuthCore> {
    // ---
    // Load all configuration from environment
    let config = AuthConfig::from_env()?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    Ok(AuthCore::new(config, broker, backend, passkeys, profiles))
}
