//! Auth backend capability.
//!
//! The backend is the remote identity service that owns accounts, validates
//! secrets/assertions/tokens, and pushes session-change notifications. The
//! transport to it is out of scope; this trait is the seam.

use std::sync::Arc;

use futures::stream::BoxStream;

use super::error::BackendError;
use super::models::Identity;

/// Infinite stream of session states pushed by the backend. Each emission is
/// the new session identity, or `None` after sign-out.
pub type SessionEvents = BoxStream<'static, Option<Identity>>;

/// Abstraction over the remote auth backend.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    // ---
    /// Create a new email/secret account.
    async fn create_account(&self, email: &str, secret: &str) -> Result<Identity, BackendError>;

    /// Exchange an identifier and secret for an identity.
    async fn authenticate(&self, identifier: &str, secret: &str)
        -> Result<Identity, BackendError>;

    /// Exchange a federated identity-provider token for an identity.
    async fn authenticate_with_token(&self, raw_token: &str) -> Result<Identity, BackendError>;

    /// Identity of the currently authenticated session, if any.
    async fn current_session(&self) -> Option<Identity>;

    /// Subscribe to backend-pushed session changes. Does not replay the
    /// current state; see [`SessionObserver`](crate::SessionObserver) for the
    /// snapshot-then-events composition.
    fn session_events(&self) -> SessionEvents;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Permanently delete the current session's account.
    async fn delete_account(&self) -> Result<(), BackendError>;

    /// Send a password reset email.
    async fn reset_password(&self, email: &str) -> Result<(), BackendError>;

    /// Send a verification email to the current session's address.
    async fn send_verification_email(&self) -> Result<(), BackendError>;
}

/// Type alias for any identity service that implements AuthBackend.
pub type AuthBackendPtr = Arc<dyn AuthBackend>;
