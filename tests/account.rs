//! Integration tests for account lifecycle and session observation.

use credman_core::domain::{BrokerError, SignInError};
use futures::StreamExt;

mod common;
use common::{identity, wire_core, FakeBroker};

// ============================================================================
// Sign-Up
// ============================================================================

#[tokio::test]
async fn sign_up_creates_account_profile_and_passkey() {
    // ---
    let t = wire_core();
    t.broker.push_create(Ok(FakeBroker::public_key_created("cred-1")));

    let created = t
        .core
        .accounts()
        .sign_up("alice@example.com", "s3cret", "Alice", true)
        .await
        .unwrap();

    let doc = t
        .memory
        .profiles()
        .get_profile(&created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["email"], "alice@example.com");
    assert_eq!(doc["display_name"], "Alice");

    let records = t.core.store().list_by_owner(&created.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn sign_up_survives_passkey_registration_failure() {
    // ---
    let t = wire_core();
    t.broker.push_create(Err(BrokerError::NotSupported));

    let created = t
        .core
        .accounts()
        .sign_up("alice@example.com", "s3cret", "Alice", true)
        .await
        .unwrap();

    // Account and profile exist; no passkey record does.
    assert!(t
        .memory
        .profiles()
        .get_profile(&created.id)
        .await
        .unwrap()
        .is_some());
    assert!(t.core.store().list_by_owner(&created.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn sign_up_without_passkey_never_calls_broker() {
    // ---
    let t = wire_core();

    t.core
        .accounts()
        .sign_up("alice@example.com", "s3cret", "Alice", false)
        .await
        .unwrap();

    // An unscripted broker call would have panicked; also nothing stored.
    assert!(t.core.store().list_by_owner("user-1").await.unwrap().is_empty());
}

// ============================================================================
// Sign-Out / Withdraw
// ============================================================================

#[tokio::test]
async fn sign_out_clears_passkey_records_and_session() {
    // ---
    let t = wire_core();
    t.broker.push_create(Ok(FakeBroker::public_key_created("cred-1")));
    let created = t
        .core
        .accounts()
        .sign_up("alice@example.com", "s3cret", "Alice", true)
        .await
        .unwrap();

    t.core.accounts().sign_out().await.unwrap();

    assert!(t.core.store().list_by_owner(&created.id).await.unwrap().is_empty());
    assert!(t.core.session().current().await.is_none());
}

#[tokio::test]
async fn withdraw_removes_records_profile_and_account() {
    // ---
    let t = wire_core();
    t.broker.push_create(Ok(FakeBroker::public_key_created("cred-1")));
    let created = t
        .core
        .accounts()
        .sign_up("alice@example.com", "s3cret", "Alice", true)
        .await
        .unwrap();

    t.core.accounts().withdraw().await.unwrap();

    assert!(t.core.store().list_by_owner(&created.id).await.unwrap().is_empty());
    assert!(t
        .memory
        .profiles()
        .get_profile(&created.id)
        .await
        .unwrap()
        .is_none());

    // The account is gone from the backend too.
    let err = t
        .core
        .sign_in()
        .sign_in_with_password("alice@example.com", "s3cret")
        .await
        .unwrap_err();
    assert!(matches!(err, SignInError::Backend(_)));
}

#[tokio::test]
async fn withdraw_without_session_fails() {
    // ---
    let t = wire_core();
    let err = t.core.accounts().withdraw().await.unwrap_err();
    assert!(matches!(err, SignInError::SessionMissing));
}

// ============================================================================
// Session Observation
// ============================================================================

#[tokio::test]
async fn session_stream_starts_with_current_state_then_follows_events() {
    // ---
    let t = wire_core();
    t.backend
        .seed_account("alice@example.com", "s3cret", identity("u1", "alice@example.com"));

    let mut sessions = t.core.session().observe();

    // First emission: state at subscription time (signed out).
    assert!(sessions.next().await.unwrap().is_none());

    t.core
        .sign_in()
        .sign_in_with_password("alice@example.com", "s3cret")
        .await
        .unwrap();
    let signed_in = sessions.next().await.unwrap().unwrap();
    assert_eq!(signed_in.id, "u1");

    t.core.accounts().sign_out().await.unwrap();
    assert!(sessions.next().await.unwrap().is_none());
}

#[tokio::test]
async fn each_subscription_gets_fresh_initial_state() {
    // ---
    let t = wire_core();
    t.backend.seed_session(identity("u1", "alice@example.com"));

    let mut sessions = t.core.session().observe();
    let initial = sessions.next().await.unwrap().unwrap();
    assert_eq!(initial.id, "u1");

    assert!(!t.core.accounts().is_email_verified().await);
}
