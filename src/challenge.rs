//! Single-use challenge generation for broker requests.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::Challenge;

/// Produces cryptographically random, single-use challenge values.
///
/// Challenges are 32 bytes drawn from the operating system's CSPRNG. They
/// have no persistence and are consumed within one broker round trip; the
/// request builders take them by value so a challenge cannot be reused.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChallengeGenerator;

impl ChallengeGenerator {
    // ---
    pub fn new() -> Self {
        // ---
        Self
    }

    /// Draw a fresh challenge.
    ///
    /// An unavailable entropy source is unrecoverable and aborts the calling
    /// flow; `OsRng` panics rather than returning weakened output.
    pub fn new_challenge(&self) -> Challenge {
        // ---
        let mut bytes = [0u8; Challenge::LEN];
        OsRng.fill_bytes(&mut bytes);
        Challenge::from_bytes(bytes)
    }
}
