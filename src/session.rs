//! Session observation for the rest of the application.
//!
//! Exposes the current authenticated identity and a live stream of
//! session changes, driven purely by backend-pushed events.

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::domain::{AuthBackendPtr, Identity};

// ---

/// Live view over the backend's session state.
///
/// Each subscription is infinite and non-restartable: the first emission
/// reflects the session at subscription time, every later emission is a
/// backend-pushed change. Subscribe again for fresh initial state.
pub struct SessionObserver {
    // ---
    backend: AuthBackendPtr,
}

impl SessionObserver {
    // ---
    pub fn new(backend: AuthBackendPtr) -> Self {
        // ---
        Self { backend }
    }

    /// Identity of the current session, if any.
    pub async fn current(&self) -> Option<Identity> {
        // ---
        self.backend.current_session().await
    }

    /// Subscribe to session changes.
    ///
    /// No polling is involved; after the initial snapshot the stream only
    /// moves when the backend pushes an event. Emissions may interleave with
    /// in-flight registration or sign-in operations.
    pub fn observe(&self) -> BoxStream<'static, Option<Identity>> {
        // ---
        let backend = self.backend.clone();
        let events = backend.session_events();

        let initial = {
            let backend = backend.clone();
            async move { backend.current_session().await }
        };

        futures::stream::once(initial).chain(events).boxed()
    }
}
