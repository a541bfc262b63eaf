use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::mpsc;

use crate::domain::{
    PassKeyRecord, PasskeyRepository, ProfilePatch, ProfileStore, RecordWatch, StoreError,
};

// ---

struct Watcher {
    // ---
    id: u64,
    owner_user_id: String,
    tx: mpsc::UnboundedSender<Vec<PassKeyRecord>>,
}

#[derive(Default)]
struct Collections {
    // ---
    /// `passkeys` collection, keyed by credential id.
    passkeys: HashMap<String, PassKeyRecord>,
    /// `users` collection, keyed by user id.
    users: HashMap<String, serde_json::Map<String, serde_json::Value>>,
    watchers: Vec<Watcher>,
    next_watcher_id: u64,
}

impl Collections {
    // ---
    fn owned_by(&self, user_id: &str) -> Vec<PassKeyRecord> {
        // ---
        let mut records: Vec<_> = self
            .passkeys
            .values()
            .filter(|r| r.owner_user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.credential_id.cmp(&b.credential_id));
        records
    }

    /// Push a fresh snapshot to every watcher of the given owner, pruning
    /// watchers whose receiving side has gone away.
    fn notify(&mut self, owner_user_id: &str) {
        // ---
        let snapshot = self.owned_by(owner_user_id);
        self.watchers.retain(|w| {
            if w.owner_user_id != owner_user_id {
                return true;
            }
            w.tx.send(snapshot.clone()).is_ok()
        });
    }
}

// ---

/// In-memory implementation of both document store collections.
///
/// Mirrors the semantics the crate expects from the remote store: keyed
/// upserts, owner-filtered queries, merge-semantics profile writes, and
/// snapshot listeners that emit the current set on attach and after every
/// change. Listener detach counts are observable for tests.
pub struct MemoryStore {
    // ---
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    // ---
    pub fn new() -> Arc<Self> {
        // ---
        Arc::new(Self {
            collections: Arc::new(Mutex::new(Collections::default())),
        })
    }

    /// Handle usable as the `passkeys` collection seam.
    pub fn passkeys(self: &Arc<Self>) -> Arc<dyn PasskeyRepository> {
        // ---
        self.clone()
    }

    /// Handle usable as the `users` collection seam.
    pub fn profiles(self: &Arc<Self>) -> Arc<dyn ProfileStore> {
        // ---
        self.clone()
    }

    /// Number of currently attached snapshot listeners.
    pub fn live_watchers(&self) -> usize {
        // ---
        self.collections.lock().expect("store mutex poisoned").watchers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        // ---
        self.collections.lock().expect("store mutex poisoned")
    }
}

// ---

/// Stream of owner snapshots; detaches its listener when dropped.
struct SnapshotWatch {
    // ---
    rx: mpsc::UnboundedReceiver<Vec<PassKeyRecord>>,
    _guard: DetachGuard,
}

impl Stream for SnapshotWatch {
    // ---
    type Item = Vec<PassKeyRecord>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // ---
        self.get_mut().rx.poll_recv(cx)
    }
}

struct DetachGuard {
    // ---
    id: u64,
    collections: Weak<Mutex<Collections>>,
}

impl Drop for DetachGuard {
    // ---
    fn drop(&mut self) {
        // ---
        if let Some(collections) = self.collections.upgrade() {
            if let Ok(mut state) = collections.lock() {
                state.watchers.retain(|w| w.id != self.id);
            }
        }
    }
}

// ---

#[async_trait::async_trait]
impl PasskeyRepository for MemoryStore {
    // ---
    async fn put(&self, record: PassKeyRecord) -> Result<(), StoreError> {
        // ---
        let owner = record.owner_user_id.clone();
        let mut state = self.lock();
        state.passkeys.insert(record.credential_id.clone(), record);
        state.notify(&owner);
        Ok(())
    }

    async fn get(&self, credential_id: &str) -> Result<Option<PassKeyRecord>, StoreError> {
        // ---
        Ok(self.lock().passkeys.get(credential_id).cloned())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<PassKeyRecord>, StoreError> {
        // ---
        Ok(self.lock().owned_by(user_id))
    }

    async fn watch_by_owner(&self, user_id: &str) -> Result<RecordWatch, StoreError> {
        // ---
        let (tx, rx) = mpsc::unbounded_channel();

        let mut state = self.lock();
        let id = state.next_watcher_id;
        state.next_watcher_id += 1;

        // Initial snapshot reflects the set at subscription time.
        let _ = tx.send(state.owned_by(user_id));
        state.watchers.push(Watcher {
            id,
            owner_user_id: user_id.to_string(),
            tx,
        });
        drop(state);

        let watch = SnapshotWatch {
            rx,
            _guard: DetachGuard {
                id,
                collections: Arc::downgrade(&self.collections),
            },
        };
        Ok(Box::pin(watch))
    }

    async fn set_last_used(
        &self,
        credential_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // ---
        let mut state = self.lock();
        let record = state
            .passkeys
            .get_mut(credential_id)
            .ok_or(StoreError::NotFound)?;
        record.last_used_at = Some(at);
        let owner = record.owner_user_id.clone();
        state.notify(&owner);
        Ok(())
    }

    async fn remove(&self, credential_id: &str) -> Result<(), StoreError> {
        // ---
        let mut state = self.lock();
        match state.passkeys.remove(credential_id) {
            Some(record) => {
                state.notify(&record.owner_user_id);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn remove_all_for_owner(&self, user_id: &str) -> Result<(), StoreError> {
        // ---
        let mut state = self.lock();
        state.passkeys.retain(|_, r| r.owner_user_id != user_id);
        state.notify(user_id);
        Ok(())
    }
}

// ---

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    // ---
    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> Result<(), StoreError> {
        // ---
        let patch = serde_json::to_value(&patch)
            .map_err(|e| StoreError::Backend(format!("failed to serialize profile patch: {e}")))?;

        let mut state = self.lock();
        let document = state.users.entry(user_id.to_string()).or_default();

        if let serde_json::Value::Object(fields) = patch {
            for (key, value) in fields {
                // Merge semantics: absent patch fields never clobber
                // existing document fields.
                if !value.is_null() {
                    document.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        // ---
        Ok(self
            .lock()
            .users
            .get(user_id)
            .cloned()
            .map(serde_json::Value::Object))
    }

    async fn remove_profile(&self, user_id: &str) -> Result<(), StoreError> {
        // ---
        self.lock().users.remove(user_id);
        Ok(())
    }
}

// ---
