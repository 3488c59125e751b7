//! Error classification and retry behaviour.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use unistore_core::{with_retry, Error, ErrorCategory, ErrorKind, RetryPolicy};

#[test]
fn test_classification_is_deterministic() {
    let cases = [
        ("HTTP 404: key not found", ErrorKind::NotFound),
        ("connection reset by peer", ErrorKind::Network),
        ("403 Forbidden", ErrorKind::Unauthorized),
        ("503 Slow Down", ErrorKind::Temporary),
        ("disk quota exceeded", ErrorKind::Unknown),
    ];

    for (message, expected) in cases {
        for _ in 0..3 {
            assert_eq!(Error::from_raw_failure(message, None).kind(), expected, "{}", message);
        }
    }
}

#[test]
fn test_not_found_takes_precedence() {
    let err = Error::from_raw_failure("object not found after timeout", None);
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // network beats temporary, temporary beats unauthorized
    assert_eq!(ErrorKind::classify("503 connection refused"), ErrorKind::Network);
    assert_eq!(ErrorKind::classify("502 unauthorized upstream"), ErrorKind::Temporary);
}

#[test]
fn test_retry_table() {
    let retryable: Vec<ErrorKind> = ErrorKind::ALL
        .into_iter()
        .filter(|kind| kind.is_retryable())
        .collect();
    assert_eq!(
        retryable,
        vec![ErrorKind::Network, ErrorKind::Temporary, ErrorKind::Unknown]
    );
    assert_eq!(ErrorKind::InvalidConfig.category(), ErrorCategory::Configuration);
    assert_eq!(ErrorKind::Network.category(), ErrorCategory::Transient);
}

#[test]
fn test_source_is_preserved() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "connection aborted");
    let err = Error::from_raw_failure("write failed: connection aborted", Some(Box::new(io)));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(std::error::Error::source(&err).is_some());
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::exponential(max_attempts, Duration::from_millis(1), Duration::from_millis(5))
        .with_jitter(false)
}

#[tokio::test]
async fn test_retry_stops_on_non_retriable() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let result: unistore_core::Result<()> = with_retry(&fast_policy(5), "read", || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::from_raw_failure("NoSuchKey: key not found", None))
        }
    })
    .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let value = with_retry(&fast_policy(4), "stat", || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::from_raw_failure("503 Service Unavailable", None))
            } else {
                Ok(42)
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(value, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_returns_last_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let result: unistore_core::Result<()> = with_retry(&fast_policy(3), "write", || {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::from_raw_failure(format!("network unreachable (attempt {})", n + 1), None))
        }
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(err.message().contains("attempt 3"));
}
