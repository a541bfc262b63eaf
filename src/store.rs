//! Ownership-guarded operations over the durable passkey collection.

use chrono::Utc;

use crate::domain::{PassKeyRecord, PasskeyRepositoryPtr, RecordWatch, StoreError};

// ---

/// Queryable, subscribable store of registered passkey records.
///
/// Every mutating operation re-checks that the record's recorded owner
/// matches the caller's session user id before touching the store. The
/// client holds write credentials to the store directly, so this is a
/// deliberate application-level authorization layer rather than a
/// store-level access rule.
///
/// The check-then-act sequence is not atomic: a concurrent revocation
/// between the ownership read and the write could let a stale write
/// through. Single-user-device usage keeps that window low-impact.
pub struct CredentialStore {
    // ---
    repository: PasskeyRepositoryPtr,
}

impl CredentialStore {
    // ---
    pub fn new(repository: PasskeyRepositoryPtr) -> Self {
        // ---
        Self { repository }
    }

    /// Upsert a record. Idempotent on identical content.
    pub async fn save(&self, record: PassKeyRecord) -> Result<(), StoreError> {
        // ---
        tracing::debug!("Saving passkey record: {}", record.credential_id);
        self.repository.put(record).await
    }

    /// Fetch a record by credential id.
    pub async fn find(&self, credential_id: &str) -> Result<Option<PassKeyRecord>, StoreError> {
        // ---
        self.repository.get(credential_id).await
    }

    /// One-shot listing of a user's records.
    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<PassKeyRecord>, StoreError> {
        // ---
        self.repository.list_by_owner(user_id).await
    }

    /// Live view of a user's records; re-emits on every change to the set.
    /// The stream is open-ended and non-restartable; subscribe again for a
    /// fresh snapshot. Dropping it detaches the underlying listener.
    pub async fn watch_by_owner(&self, user_id: &str) -> Result<RecordWatch, StoreError> {
        // ---
        self.repository.watch_by_owner(user_id).await
    }

    /// True only if the record exists and its recorded owner matches the
    /// session user.
    pub async fn verify_ownership(
        &self,
        credential_id: &str,
        session_user_id: &str,
    ) -> Result<bool, StoreError> {
        // ---
        match self.repository.get(credential_id).await? {
            Some(record) => Ok(record.owner_user_id == session_user_id),
            None => {
                tracing::debug!("Passkey record not found: {}", credential_id);
                Ok(false)
            }
        }
    }

    /// Stamp a record's last-used time after a successful sign-in
    /// verification.
    ///
    /// Fails with `NotFound` when the record is absent or owned by another
    /// user; the two cases are indistinguishable to the caller.
    pub async fn touch_last_used(
        &self,
        credential_id: &str,
        session_user_id: &str,
    ) -> Result<(), StoreError> {
        // ---
        if !self.verify_ownership(credential_id, session_user_id).await? {
            tracing::warn!(
                "Rejected last-used update for credential not owned by session: {}",
                credential_id
            );
            return Err(StoreError::NotFound);
        }

        self.repository.set_last_used(credential_id, Utc::now()).await?;
        tracing::debug!("Updated last-used timestamp: {}", credential_id);
        Ok(())
    }

    /// Remove a single record, subject to the same ownership precondition as
    /// [`touch_last_used`](Self::touch_last_used).
    pub async fn delete(
        &self,
        credential_id: &str,
        session_user_id: &str,
    ) -> Result<(), StoreError> {
        // ---
        if !self.verify_ownership(credential_id, session_user_id).await? {
            tracing::warn!(
                "Rejected delete for credential not owned by session: {}",
                credential_id
            );
            return Err(StoreError::NotFound);
        }

        self.repository.remove(credential_id).await?;
        tracing::info!("Deleted passkey record: {}", credential_id);
        Ok(())
    }

    /// Remove every record owned by the session user. Used by sign-out and
    /// account withdrawal; the owner filter itself is the authorization.
    pub async fn delete_all_for_owner(&self, session_user_id: &str) -> Result<(), StoreError> {
        // ---
        self.repository.remove_all_for_owner(session_user_id).await?;
        tracing::info!("Deleted all passkey records for user: {}", session_user_id);
        Ok(())
    }
}
