use std::time::Duration;
use skillgate_lib::circuit_breaker::{CircuitBreaker, ExponentialBackoff};

#[test]
fn test_circuit_breaker_initial_state() {
    let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
    assert!(!cb.is_open());
    assert_eq!(cb.failure_count(), 0);
}

#[test]
fn test_circuit_breaker_opens_after_threshold() {
    let cb = CircuitBreaker::new(Duration::from_secs(60), 3);

    cb.record_failure();
    assert!(!cb.is_open());

    cb.record_failure();
    assert!(!cb.is_open());

    cb.record_failure();
    assert!(cb.is_open());
}

#[test]
fn test_circuit_breaker_resets_on_success() {
    let cb = CircuitBreaker::new(Duration::from_secs(60), 3);

    cb.record_failure();
    cb.record_failure();
    cb.record_success();

    assert!(!cb.is_open());
    assert_eq!(cb.failure_count(), 0);
}

#[test]
fn test_circuit_breaker_clones_share_state() {
    let cb = CircuitBreaker::new(Duration::from_secs(60), 1);
    let other = cb.clone();
    other.record_failure();
    assert!(cb.is_open());
}

#[test]
fn test_zero_threshold_behaves_like_one() {
    let cb = CircuitBreaker::new(Duration::from_secs(60), 0);
    assert!(!cb.is_open());
    cb.record_failure();
    assert!(cb.is_open());
}

#[test]
fn test_exponential_backoff() {
    let backoff = ExponentialBackoff::new(100, 5000);

    assert_eq!(backoff.base_delay_ms(0), 100);
    assert_eq!(backoff.base_delay_ms(1), 200);
    assert_eq!(backoff.base_delay_ms(2), 400);
    assert_eq!(backoff.base_delay_ms(3), 800);

    // Capped, jitter included
    assert!(backoff.delay_for_attempt(10) <= Duration::from_millis(5000 + 1250));
}
