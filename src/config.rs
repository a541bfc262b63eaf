// src/config.rs

//! Auth core configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the auth core.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

use crate::domain::DeviceInfo;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an environment variable that must be present, erroring out of the
/// enclosing `from_env` with a message naming the missing key.
///
/// Used for values the auth core cannot substitute a default for, such as
/// the relying party id. Absence means a broken deployment, so the error
/// propagates instead of being papered over.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads and parses an environment variable, substituting the given default
/// when the variable is absent or unparseable.
///
/// Only tunables go through this macro; anything security-relevant uses
/// `required_env!` so a typo cannot silently fall back.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a `from_env` call failed because the named variable was
/// unset, checking the error message pins down which key was missing.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated auth core configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub relying_party: relying_party::RelyingPartyConfig,
    pub federated: federated::FederatedConfig,
    pub device: device::DeviceConfig,
}

impl AuthConfig {
    /// Loads and validates all auth core configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            relying_party: relying_party::RelyingPartyConfig::from_env()?,
            federated: federated::FederatedConfig::from_env()?,
            device: device::DeviceConfig::from_env(),
        })
    }
}

// ============================================================
// Relying party configuration
// ============================================================

mod relying_party {
    // ---
    use super::*;

    /// Relying party identity embedded into broker credential requests.
    ///
    /// These values are security-critical: they bind every created and
    /// asserted credential to this application's backend domain.
    #[derive(Debug, Clone)]
    pub struct RelyingPartyConfig {
        /// Relying Party ID (typically the backend's domain name).
        pub rp_id: String,

        /// Human-readable Relying Party name.
        pub rp_name: String,

        /// Timeout handed to the broker for credential requests.
        pub request_timeout: Duration,
    }

    impl RelyingPartyConfig {
        /// Builds a [`RelyingPartyConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// The relying party id must be explicitly provided.
        pub fn from_env() -> Result<Self> {
            // ---
            let rp_id = required_env!("CREDMAN_RP_ID");

            let rp_name =
                std::env::var("CREDMAN_RP_NAME").unwrap_or_else(|_| "credman-core".to_string());

            let timeout_ms = optional_env_parse!("CREDMAN_REQUEST_TIMEOUT_MS", u64, 30_000);

            Ok(Self {
                rp_id,
                rp_name,
                request_timeout: Duration::from_millis(timeout_ms),
            })
        }
    }
}
pub use relying_party::RelyingPartyConfig;

// ============================================================
// Federated provider configuration
// ============================================================

mod federated {
    // ---
    use super::*;

    /// Federated identity provider configuration.
    #[derive(Debug, Clone)]
    pub struct FederatedConfig {
        /// Server client id registered with the identity provider.
        pub client_id: String,

        /// Restrict the provider sheet to accounts already authorized for
        /// this application. Defaults to true.
        pub filter_authorized_accounts: bool,
    }

    impl FederatedConfig {
        /// Builds a [`FederatedConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the provider client id is missing; the
        /// federated sign-in option cannot be offered without it.
        pub fn from_env() -> Result<Self> {
            // ---
            let client_id = required_env!("CREDMAN_FEDERATED_CLIENT_ID");
            let filter_authorized_accounts =
                optional_env_parse!("CREDMAN_FEDERATED_FILTER_AUTHORIZED", bool, true);

            Ok(Self {
                client_id,
                filter_authorized_accounts,
            })
        }
    }
}
pub use federated::FederatedConfig;

// ============================================================
// Device metadata configuration
// ============================================================

mod device {
    // ---
    use super::*;

    /// Optional device metadata recorded alongside newly registered
    /// passkeys. All fields must be present for a record to carry
    /// device info; partial metadata is dropped.
    #[derive(Debug, Clone, Default)]
    pub struct DeviceConfig {
        pub model: Option<String>,
        pub manufacturer: Option<String>,
        pub platform_version: Option<String>,
    }

    impl DeviceConfig {
        /// Builds a [`DeviceConfig`] from environment variables. Never
        /// fails; device metadata is best-effort.
        pub fn from_env() -> Self {
            // ---
            Self {
                model: std::env::var("CREDMAN_DEVICE_MODEL").ok(),
                manufacturer: std::env::var("CREDMAN_DEVICE_MANUFACTURER").ok(),
                platform_version: std::env::var("CREDMAN_DEVICE_PLATFORM_VERSION").ok(),
            }
        }

        /// Complete device info, if every field was configured.
        pub fn device_info(&self) -> Option<DeviceInfo> {
            // ---
            match (&self.model, &self.manufacturer, &self.platform_version) {
                (Some(model), Some(manufacturer), Some(platform_version)) => Some(DeviceInfo {
                    model: model.clone(),
                    manufacturer: manufacturer.clone(),
                    platform_version: platform_version.clone(),
                }),
                _ => None,
            }
        }
    }
}
pub use device::DeviceConfig;

// ============================================================
// Tests
// ============================================================
