//! WebAuthn-style option payloads for broker requests.
//!
//! The platform broker consumes creation and request options as JSON. These
//! builders embed the relying party identity from configuration and consume
//! the challenge by value, so one challenge can never back two requests.

use base64::Engine;
use serde_json::json;

use crate::config::RelyingPartyConfig;
use crate::domain::Challenge;

/// Options for creating a new public-key credential.
///
/// ES256 (`alg: -7`) with a platform-attached, resident-key authenticator;
/// the shape the platform broker expects for passkey creation.
pub fn creation_options_json(
    config: &RelyingPartyConfig,
    user_id: &str,
    display_name: &str,
    challenge: Challenge,
) -> String {
    // ---
    let user_handle = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(user_id.as_bytes());

    json!({
        "rp": {
            "id": config.rp_id,
            "name": config.rp_name,
        },
        "user": {
            "id": user_handle,
            "name": user_id,
            "displayName": display_name,
        },
        "challenge": challenge.to_base64url(),
        "pubKeyCredParams": [
            { "type": "public-key", "alg": -7 }
        ],
        "timeout": config.request_timeout.as_millis() as u64,
        "authenticatorSelection": {
            "authenticatorAttachment": "platform",
            "requireResidentKey": true,
            "userVerification": "preferred",
        },
    })
    .to_string()
}

/// Options for requesting an assertion from an already-registered
/// credential. An empty `allowCredentials` lets the broker offer every
/// passkey it holds for this relying party.
pub fn request_options_json(config: &RelyingPartyConfig, challenge: Challenge) -> String {
    // ---
    json!({
        "rpId": config.rp_id,
        "challenge": challenge.to_base64url(),
        "timeout": config.request_timeout.as_millis() as u64,
        "userVerification": "preferred",
        "allowCredentials": [],
    })
    .to_string()
}
