//! Typed failure taxonomy for every boundary in the crate.
//!
//! Nothing in this crate uses panics or catch-alls for control flow; each
//! failure path is visible in the signature that produces it. The only fatal
//! condition is an unavailable entropy source during challenge generation.

use thiserror::Error;

/// Errors surfaced by the platform credential broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    // ---
    /// Device/platform lacks the capability (e.g. no passkey support).
    #[error("credential broker is not supported on this device")]
    NotSupported,

    /// User aborted the platform sheet; terminal, never retried.
    #[error("credential request was cancelled by the user")]
    Cancelled,

    /// Transient platform failure; eligible for the one-shot fallback.
    #[error("credential request was interrupted")]
    Interrupted,

    /// The broker had nothing to offer for the requested options.
    #[error("no saved credential is available")]
    NoCredential,

    #[error("credential broker failure: {0}")]
    Other(String),
}

/// Structured classification of an auth backend rejection.
///
/// Callers branch on this kind, never on message text; messages are for
/// logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    // ---
    /// Account exists but the supplied secret did not match.
    InvalidSecret,
    /// No account is registered for the supplied identifier.
    UnknownAccount,
    /// The identifier is not a syntactically valid email address.
    MalformedEmail,
    /// An account already exists for the email (sign-up only).
    EmailInUse,
    /// The operation requires an authenticated session and none exists.
    SessionMissing,
    Other,
}

/// Error returned by the auth backend capability.
#[derive(Debug, Error)]
#[error("auth backend rejected the exchange ({kind:?}): {message}")]
pub struct BackendError {
    // ---
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    // ---
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        // ---
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> BackendErrorKind {
        // ---
        self.kind
    }
}

/// Errors from the durable credential/profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    // ---
    /// Record absent, or present but owned by another user. Ownership
    /// mismatches are deliberately collapsed into `NotFound` so callers can
    /// never learn that another user's credential exists.
    #[error("credential record not found")]
    NotFound,

    /// Underlying persistence failure; the caller may retry at its own layer.
    #[error("credential store failure: {0}")]
    Backend(String),
}

/// Errors from the account-existence probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    // ---
    #[error("email address is not syntactically valid")]
    MalformedEmail,

    /// A backend failure that carries no existence signal; surfaced, not
    /// swallowed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Terminal failure reasons for the passkey registration flow.
#[derive(Debug, Error)]
pub enum RegistrationError {
    // ---
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Broker returned a response type this flow does not handle; a
    /// programming or platform-version-skew bug, never retried.
    #[error("broker returned an unrecognized credential type: {0}")]
    UnrecognizedCredentialType(String),

    /// The broker's registration response JSON could not be interpreted.
    #[error("broker registration response was malformed: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Terminal failure reasons for sign-in orchestration.
#[derive(Debug, Error)]
pub enum SignInError {
    // ---
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Broker returned a variant outside the closed credential union.
    #[error("broker returned an unrecognized credential type: {0}")]
    UnrecognizedCredentialType(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A public-key assertion arrived without an authenticated backend
    /// session to resolve it against.
    #[error("no authenticated session for the asserted credential")]
    SessionMissing,

    #[error(transparent)]
    Store(#[from] StoreError),
}
