mod backend;
mod broker;
mod error;
mod models;
mod repository;

// Publicly expose the external capability abstractions
pub use backend::{AuthBackend, AuthBackendPtr, SessionEvents};
pub use broker::{
    BrokerCredential, CreateCredentialRequest, CreatedCredential, CredentialBroker,
    CredentialBrokerPtr, CredentialOption, GetCredentialRequest,
};
pub use repository::{
    PasskeyRepository, PasskeyRepositoryPtr, ProfileStore, ProfileStorePtr, RecordWatch,
};

// Publicly expose the data model and failure taxonomy
pub use error::{
    BackendError, BackendErrorKind, BrokerError, ProbeError, RegistrationError, SignInError,
    StoreError,
};
pub use models::{Challenge, Credential, DeviceInfo, Identity, PassKeyRecord, ProfilePatch};
