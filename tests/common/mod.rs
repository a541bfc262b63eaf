// Test helpers are intentionally partially used
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;

use credman_core::domain::{
    AuthBackend, BackendError, BackendErrorKind, BrokerCredential, BrokerError,
    CreateCredentialRequest, CreatedCredential, CredentialBroker, GetCredentialRequest, Identity,
    SessionEvents,
};
use credman_core::{AuthConfig, AuthCore, DeviceConfig, FederatedConfig, RelyingPartyConfig};

// ============================================================================
// Config helpers
// ============================================================================

pub fn test_config() -> AuthConfig {
    // ---
    AuthConfig {
        relying_party: RelyingPartyConfig {
            rp_id: "example.com".to_string(),
            rp_name: "Test App".to_string(),
            request_timeout: Duration::from_millis(30_000),
        },
        federated: FederatedConfig {
            client_id: "client-123.apps.example".to_string(),
            filter_authorized_accounts: true,
        },
        device: DeviceConfig::default(),
    }
}

pub fn identity(id: &str, email: &str) -> Identity {
    // ---
    Identity {
        id: id.to_string(),
        email: email.to_string(),
        display_name: None,
        email_verified: false,
    }
}

// ============================================================================
// Fake credential broker
// ============================================================================

/// Broker scripted with queued responses; records every get-request so tests
/// can assert how many requests went out and which options they offered.
pub struct FakeBroker {
    // ---
    pub create_responses: Mutex<VecDeque<Result<CreatedCredential, BrokerError>>>,
    pub get_responses: Mutex<VecDeque<Result<BrokerCredential, BrokerError>>>,
    pub get_requests: Mutex<Vec<GetCredentialRequest>>,
}

impl FakeBroker {
    // ---
    pub fn new() -> Arc<Self> {
        // ---
        Arc::new(Self {
            create_responses: Mutex::new(VecDeque::new()),
            get_responses: Mutex::new(VecDeque::new()),
            get_requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push_create(&self, response: Result<CreatedCredential, BrokerError>) {
        // ---
        self.create_responses.lock().unwrap().push_back(response);
    }

    pub fn push_get(&self, response: Result<BrokerCredential, BrokerError>) {
        // ---
        self.get_responses.lock().unwrap().push_back(response);
    }

    pub fn get_request_count(&self) -> usize {
        // ---
        self.get_requests.lock().unwrap().len()
    }

    /// Option labels of the nth recorded get-request.
    pub fn offered_options(&self, n: usize) -> Vec<&'static str> {
        // ---
        self.get_requests.lock().unwrap()[n]
            .options
            .iter()
            .map(|o| o.label())
            .collect()
    }

    pub fn public_key_created(credential_id: &str) -> CreatedCredential {
        // ---
        CreatedCredential {
            type_name: CreatedCredential::PUBLIC_KEY.to_string(),
            credential_id: credential_id.to_string(),
            registration_response_json: format!("{{\"id\":\"{credential_id}\"}}"),
        }
    }
}

#[async_trait::async_trait]
impl CredentialBroker for FakeBroker {
    // ---
    async fn create_credential(
        &self,
        _request: CreateCredentialRequest,
    ) -> Result<CreatedCredential, BrokerError> {
        // ---
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted create_credential call")
    }

    async fn get_credential(
        &self,
        request: GetCredentialRequest,
    ) -> Result<BrokerCredential, BrokerError> {
        // ---
        self.get_requests.lock().unwrap().push(request);
        self.get_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted get_credential call")
    }
}

// ============================================================================
// Fake auth backend
// ============================================================================

struct Account {
    // ---
    secret: String,
    identity: Identity,
}

/// Backend with in-memory accounts, a current-session slot, and a broadcast
/// channel standing in for the backend's pushed session notifications.
pub struct FakeBackend {
    // ---
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, Identity>>,
    session: Mutex<Option<Identity>>,
    events: broadcast::Sender<Option<Identity>>,
}

impl FakeBackend {
    // ---
    pub fn new() -> Arc<Self> {
        // ---
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events,
        })
    }

    pub fn seed_account(&self, email: &str, secret: &str, identity: Identity) {
        // ---
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                secret: secret.to_string(),
                identity,
            },
        );
    }

    pub fn seed_token(&self, raw_token: &str, identity: Identity) {
        // ---
        self.tokens
            .lock()
            .unwrap()
            .insert(raw_token.to_string(), identity);
    }

    pub fn seed_session(&self, identity: Identity) {
        // ---
        *self.session.lock().unwrap() = Some(identity);
    }

    fn set_session(&self, identity: Option<Identity>) {
        // ---
        *self.session.lock().unwrap() = identity.clone();
        let _ = self.events.send(identity);
    }
}

#[async_trait::async_trait]
impl AuthBackend for FakeBackend {
    // ---
    async fn create_account(&self, email: &str, secret: &str) -> Result<Identity, BackendError> {
        // ---
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(BackendError::new(
                BackendErrorKind::EmailInUse,
                "account already exists",
            ));
        }

        let identity = Identity {
            id: format!("user-{}", accounts.len() + 1),
            email: email.to_string(),
            display_name: None,
            email_verified: false,
        };
        accounts.insert(
            email.to_string(),
            Account {
                secret: secret.to_string(),
                identity: identity.clone(),
            },
        );
        drop(accounts);

        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Identity, BackendError> {
        // ---
        let identity = {
            let accounts = self.accounts.lock().unwrap();
            let account = accounts.get(identifier).ok_or_else(|| {
                BackendError::new(BackendErrorKind::UnknownAccount, "no such account")
            })?;
            if account.secret != secret {
                return Err(BackendError::new(
                    BackendErrorKind::InvalidSecret,
                    "secret mismatch",
                ));
            }
            account.identity.clone()
        };

        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    async fn authenticate_with_token(&self, raw_token: &str) -> Result<Identity, BackendError> {
        // ---
        let identity = self
            .tokens
            .lock()
            .unwrap()
            .get(raw_token)
            .cloned()
            .ok_or_else(|| BackendError::new(BackendErrorKind::Other, "unknown token"))?;

        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    async fn current_session(&self) -> Option<Identity> {
        // ---
        self.session.lock().unwrap().clone()
    }

    fn session_events(&self) -> SessionEvents {
        // ---
        let rx = self.events.subscribe();
        futures::stream::unfold(rx, |mut rx| async move {
            match rx.recv().await {
                Ok(event) => Some((event, rx)),
                Err(_) => None,
            }
        })
        .boxed()
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        // ---
        self.set_session(None);
        Ok(())
    }

    async fn delete_account(&self) -> Result<(), BackendError> {
        // ---
        let identity = self.session.lock().unwrap().clone().ok_or_else(|| {
            BackendError::new(BackendErrorKind::SessionMissing, "no session")
        })?;

        self.accounts.lock().unwrap().remove(&identity.email);
        self.set_session(None);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        // ---
        if !self.accounts.lock().unwrap().contains_key(email) {
            return Err(BackendError::new(
                BackendErrorKind::UnknownAccount,
                "no such account",
            ));
        }
        Ok(())
    }

    async fn send_verification_email(&self) -> Result<(), BackendError> {
        // ---
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|_| ())
            .ok_or_else(|| BackendError::new(BackendErrorKind::SessionMissing, "no session"))
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct TestCore {
    // ---
    pub core: AuthCore,
    pub broker: Arc<FakeBroker>,
    pub backend: Arc<FakeBackend>,
    pub memory: Arc<credman_core::MemoryStore>,
}

/// Wire an AuthCore around fakes and the in-memory document store.
pub fn wire_core() -> TestCore {
    // ---
    let broker = FakeBroker::new();
    let backend = FakeBackend::new();
    let memory = credman_core::create_memory_store();

    let core = AuthCore::new(
        test_config(),
        broker.clone(),
        backend.clone(),
        memory.passkeys(),
        memory.profiles(),
    );

    TestCore {
        core,
        broker,
        backend,
        memory,
    }
}
