//! Account existence probe for sign-up vs. sign-in routing.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::domain::{AuthBackendPtr, BackendErrorKind, ProbeError};

// ---

/// Minimal syntactic gate; real deliverability is the backend's concern.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern compiles"));

// ---

/// Determines whether an email address already has a registered account.
///
/// The backend offers no dedicated existence-check endpoint, so the probe
/// performs a throwaway credential exchange and classifies the backend's
/// structured rejection kind. The classification never inspects message
/// text.
///
/// The probe's true/false distinction is for flow routing only; UI layers
/// must not surface it verbatim, or account enumeration becomes trivial.
pub struct AccountExistenceProbe {
    // ---
    backend: AuthBackendPtr,
}

impl AccountExistenceProbe {
    // ---
    pub fn new(backend: AuthBackendPtr) -> Self {
        // ---
        Self { backend }
    }

    /// True if an account is registered for `email`.
    ///
    /// # Errors
    /// `MalformedEmail` for invalid syntax; any backend failure that carries
    /// no existence signal is surfaced, not swallowed.
    pub async fn exists(&self, email: &str) -> Result<bool, ProbeError> {
        // ---
        if !EMAIL_PATTERN.is_match(email) {
            return Err(ProbeError::MalformedEmail);
        }

        // Random throwaway secret; it can never match a real credential, so
        // the exchange is only ever a classification oracle.
        let throwaway = format!("probe-{}", Uuid::new_v4());

        match self.backend.authenticate(email, &throwaway).await {
            Ok(_) => {
                // A random secret authenticating means the backend is not
                // validating secrets at all; still an existence signal.
                tracing::warn!("Existence probe unexpectedly authenticated: {}", email);
                Ok(true)
            }
            Err(e) => match e.kind() {
                BackendErrorKind::InvalidSecret => Ok(true),
                BackendErrorKind::UnknownAccount => Ok(false),
                BackendErrorKind::MalformedEmail => Err(ProbeError::MalformedEmail),
                _ => {
                    tracing::error!("Existence probe failed: {}", e);
                    Err(ProbeError::Backend(e))
                }
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{AuthBackend, BackendError, Identity, SessionEvents};
    use std::sync::Arc;

    /// Backend that rejects every exchange with a fixed kind.
    struct RejectingBackend {
        // ---
        kind: BackendErrorKind,
    }

    #[async_trait::async_trait]
    impl AuthBackend for RejectingBackend {
        // ---
        async fn create_account(&self, _e: &str, _s: &str) -> Result<Identity, BackendError> {
            unimplemented!()
        }
        async fn authenticate(&self, _i: &str, _s: &str) -> Result<Identity, BackendError> {
            Err(BackendError::new(self.kind, "scripted rejection"))
        }
        async fn authenticate_with_token(&self, _t: &str) -> Result<Identity, BackendError> {
            unimplemented!()
        }
        async fn current_session(&self) -> Option<Identity> {
            None
        }
        fn session_events(&self) -> SessionEvents {
            unimplemented!()
        }
        async fn sign_out(&self) -> Result<(), BackendError> {
            unimplemented!()
        }
        async fn delete_account(&self) -> Result<(), BackendError> {
            unimplemented!()
        }
        async fn reset_password(&self, _e: &str) -> Result<(), BackendError> {
            unimplemented!()
        }
        async fn send_verification_email(&self) -> Result<(), BackendError> {
            unimplemented!()
        }
    }

    fn probe(kind: BackendErrorKind) -> AccountExistenceProbe {
        // ---
        AccountExistenceProbe::new(Arc::new(RejectingBackend { kind }))
    }

    #[tokio::test]
    async fn invalid_secret_means_account_exists() {
        // ---
        let exists = probe(BackendErrorKind::InvalidSecret)
            .exists("alice@example.com")
            .await
            .unwrap();
        assert!(exists);
    }

    #[tokio::test]
    async fn unknown_account_means_no_account() {
        // ---
        let exists = probe(BackendErrorKind::UnknownAccount)
            .exists("nobody@example.com")
            .await
            .unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    async fn malformed_email_rejected_before_backend_call() {
        // ---
        // The backend would classify as InvalidSecret (exists), so an error
        // here proves the syntax gate ran first.
        let err = probe(BackendErrorKind::InvalidSecret)
            .exists("not-an-email")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::MalformedEmail));
    }

    #[tokio::test]
    async fn backend_malformed_email_kind_maps_to_probe_error() {
        // ---
        let err = probe(BackendErrorKind::MalformedEmail)
            .exists("odd@but.syntactically-fine")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::MalformedEmail));
    }

    #[tokio::test]
    async fn unrelated_backend_failure_is_surfaced() {
        // ---
        let err = probe(BackendErrorKind::Other)
            .exists("alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Backend(_)));
    }
}
