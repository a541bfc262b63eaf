mod account;
mod probe;
pub(crate) mod registration;
mod sign_in;

pub use account::AccountManager;
pub use probe::AccountExistenceProbe;
pub use registration::{RegistrationFlow, RegistrationOutcome};
pub use sign_in::{BrokerSignIn, SignInOrchestrator};
