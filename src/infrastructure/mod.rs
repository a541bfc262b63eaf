mod broker_options;
mod memory;

use std::sync::Arc;

// Re-export the option builders and the store factory for easy access
pub use broker_options::{creation_options_json, request_options_json};
pub use memory::MemoryStore;

/// Creates an in-memory document store serving both the `passkeys` and
/// `users` collection seams.
pub fn create_memory_store() -> Arc<MemoryStore> {
    // ---
    MemoryStore::new()
}
