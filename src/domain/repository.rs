//! Document store seams for credential records and user profiles.
//!
//! The remote store is treated as a keyed, queryable, subscribable document
//! database with two logical collections: `passkeys` keyed by credential id
//! and `users` keyed by user id. These traits are implemented by
//! `infrastructure::memory` and substituted with fakes in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use super::error::StoreError;
use super::models::{PassKeyRecord, ProfilePatch};

/// Live, continuously-updating view of an owner's records. Open-ended and
/// non-restartable; create a fresh subscription to restart. Dropping the
/// stream detaches the underlying listener.
pub type RecordWatch = BoxStream<'static, Vec<PassKeyRecord>>;

/// Persistence seam for the `passkeys` collection.
#[async_trait::async_trait]
pub trait PasskeyRepository: Send + Sync {
    // ---
    /// Upsert a record keyed by its credential id. Idempotent on identical
    /// content.
    async fn put(&self, record: PassKeyRecord) -> Result<(), StoreError>;

    /// Fetch a record by credential id.
    async fn get(&self, credential_id: &str) -> Result<Option<PassKeyRecord>, StoreError>;

    /// All records owned by a user.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<PassKeyRecord>, StoreError>;

    /// Subscribe to the owner's record set. The first emission is the set at
    /// subscription time; one emission follows every subsequent change.
    async fn watch_by_owner(&self, user_id: &str) -> Result<RecordWatch, StoreError>;

    /// Set the last-used timestamp on an existing record.
    async fn set_last_used(
        &self,
        credential_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Remove a record by credential id.
    async fn remove(&self, credential_id: &str) -> Result<(), StoreError>;

    /// Remove every record owned by a user. Used on sign-out and account
    /// withdrawal.
    async fn remove_all_for_owner(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Type alias for any store backend that implements PasskeyRepository.
pub type PasskeyRepositoryPtr = Arc<dyn PasskeyRepository>;

/// Persistence seam for the `users` collection.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    // ---
    /// Merge-upsert a profile document: only the patch's `Some` fields are
    /// written, unrelated fields already in the document survive.
    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> Result<(), StoreError>;

    /// Fetch a profile document as stored.
    async fn get_profile(&self, user_id: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Delete a profile document. Used on account withdrawal.
    async fn remove_profile(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Type alias for any store backend that implements ProfileStore.
pub type ProfileStorePtr = Arc<dyn ProfileStore>;
