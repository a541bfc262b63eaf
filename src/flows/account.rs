//! Account lifecycle operations around the core sign-in/registration flows.
//!
//! Sign-up, sign-out, withdrawal, and the small email-maintenance
//! passthroughs. Sign-out and withdrawal also clear the session user's
//! passkey records so no credential outlives the account it belongs to.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{AuthBackendPtr, Identity, ProfilePatch, ProfileStorePtr, SignInError};
use crate::flows::registration::RegistrationFlow;
use crate::store::CredentialStore;

// ---

/// Account creation and teardown.
pub struct AccountManager {
    // ---
    backend: AuthBackendPtr,
    store: Arc<CredentialStore>,
    profiles: ProfileStorePtr,
    registration: Arc<RegistrationFlow>,
}

impl AccountManager {
    // ---
    pub fn new(
        backend: AuthBackendPtr,
        store: Arc<CredentialStore>,
        profiles: ProfileStorePtr,
        registration: Arc<RegistrationFlow>,
    ) -> Self {
        // ---
        Self {
            backend,
            store,
            profiles,
            registration,
        }
    }

    /// Create a new account, write its profile document, and optionally
    /// register a passkey.
    ///
    /// Passkey registration is best-effort: its failure is logged and the
    /// sign-up still succeeds with the created identity.
    pub async fn sign_up(
        &self,
        email: &str,
        secret: &str,
        display_name: &str,
        enable_passkey: bool,
    ) -> Result<Identity, SignInError> {
        // ---
        let identity = self.backend.create_account(email, secret).await?;
        tracing::info!("Created account for user: {}", identity.id);

        let now = Utc::now();
        self.profiles
            .merge_profile(
                &identity.id,
                ProfilePatch {
                    email: Some(email.to_string()),
                    display_name: Some(display_name.to_string()),
                    last_sign_in_at: Some(now),
                    updated_at: Some(now),
                },
            )
            .await?;

        if enable_passkey {
            if let Err(e) = self
                .registration
                .register_passkey(&identity.id, Some(display_name))
                .await
            {
                tracing::warn!("Passkey registration during sign-up failed: {}", e);
            }
        }

        Ok(identity)
    }

    /// End the session, removing the user's passkey records first.
    pub async fn sign_out(&self) -> Result<(), SignInError> {
        // ---
        if let Some(identity) = self.backend.current_session().await {
            self.store.delete_all_for_owner(&identity.id).await?;
        }
        self.backend.sign_out().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Permanently delete the account: passkey records, profile document,
    /// then the backend account itself.
    pub async fn withdraw(&self) -> Result<(), SignInError> {
        // ---
        let identity = self
            .backend
            .current_session()
            .await
            .ok_or(SignInError::SessionMissing)?;

        self.store.delete_all_for_owner(&identity.id).await?;
        self.profiles.remove_profile(&identity.id).await?;
        self.backend.delete_account().await?;

        tracing::info!("Withdrew account for user: {}", identity.id);
        Ok(())
    }

    /// Send a password reset email.
    pub async fn reset_password(&self, email: &str) -> Result<(), SignInError> {
        // ---
        self.backend.reset_password(email).await?;
        Ok(())
    }

    /// Send a verification email for the current session's address.
    pub async fn send_verification_email(&self) -> Result<(), SignInError> {
        // ---
        self.backend.send_verification_email().await?;
        Ok(())
    }

    /// Whether the current session's email address has been verified.
    pub async fn is_email_verified(&self) -> bool {
        // ---
        self.backend
            .current_session()
            .await
            .map(|identity| identity.email_verified)
            .unwrap_or(false)
    }
}
