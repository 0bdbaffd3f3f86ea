//! Tests for error mapping and client configuration.

use std::time::Duration;

use serial_test::serial;

use crate::client::FirestoreConfig;
use crate::error::FirestoreError;

const ENV_KEYS: [&str; 7] = [
    "GCP_PROJECT_ID",
    "FIREBASE_PROJECT_ID",
    "FIRESTORE_EMULATOR_HOST",
    "FIRESTORE_CONNECT_TIMEOUT_SECS",
    "FIRESTORE_RETRY_BASE_MS",
    "FIRESTORE_RETRY_MAX_MS",
    "FIRESTORE_DATABASE_ID",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

// =============================================================================
// Error mapping
// =============================================================================

#[test]
fn test_error_from_http_status() {
    assert!(matches!(
        FirestoreError::from_http_status(429, "slow down"),
        FirestoreError::RateLimited(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(503, "unavailable"),
        FirestoreError::ServerError(503, _)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(400, "bad request"),
        FirestoreError::RequestFailed(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(404, "missing"),
        FirestoreError::NotFound(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(409, "conflict"),
        FirestoreError::AlreadyExists(_)
    ));
}

#[test]
fn test_only_transient_errors_are_retryable() {
    assert!(FirestoreError::from_http_status(429, "").is_retryable());
    assert!(FirestoreError::from_http_status(500, "").is_retryable());
    assert!(FirestoreError::from_http_status(502, "").is_retryable());
    assert!(!FirestoreError::from_http_status(400, "").is_retryable());
    assert!(!FirestoreError::from_http_status(403, "").is_retryable());
    assert!(!FirestoreError::from_http_status(409, "").is_retryable());
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(FirestoreError::RateLimited(1000).http_status(), Some(429));
    assert_eq!(
        FirestoreError::ServerError(502, "bad gateway".into()).http_status(),
        Some(502)
    );
    assert_eq!(FirestoreError::NotFound("doc".into()).http_status(), Some(404));
    assert_eq!(FirestoreError::InvalidResponse("x".into()).http_status(), None);
}

#[test]
fn test_error_retry_after_ms() {
    assert_eq!(FirestoreError::RateLimited(5000).retry_after_ms(), Some(5000));
    assert_eq!(FirestoreError::ServerError(500, "error".into()).retry_after_ms(), None);
}

// =============================================================================
// Config
// =============================================================================

#[test]
#[serial]
fn test_config_requires_project_id() {
    clear_env();
    assert!(FirestoreConfig::from_env().is_err());

    std::env::set_var("GCP_PROJECT_ID", "");
    assert!(FirestoreConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_config_prefers_gcp_project_id() {
    clear_env();
    std::env::set_var("GCP_PROJECT_ID", "gcp-project");
    std::env::set_var("FIREBASE_PROJECT_ID", "firebase-project");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.project_id, "gcp-project");
    assert_eq!(config.database_id, "(default)");
    clear_env();
}

#[test]
#[serial]
fn test_config_reads_emulator_and_timeouts() {
    clear_env();
    std::env::set_var("FIREBASE_PROJECT_ID", "demo-jobs");
    std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "15");
    std::env::set_var("FIRESTORE_RETRY_BASE_MS", "50");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.emulator_host.as_deref(), Some("localhost:8080"));
    assert_eq!(config.connect_timeout, Duration::from_secs(15));
    assert_eq!(config.retry.base_delay_ms, 50);
    clear_env();
}

#[test]
#[serial]
fn test_config_ignores_invalid_numbers() {
    clear_env();
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "not-a-number");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert!(config.emulator_host.is_none());
    clear_env();
}
