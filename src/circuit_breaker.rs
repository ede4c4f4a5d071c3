use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use rand::Rng;

/// Guards the advice endpoint. After `failure_threshold` consecutive
/// failures the breaker opens and rejects calls until `cooldown` has passed,
/// then lets one attempt through again.
#[derive(Clone)]
pub struct CircuitBreaker {
    consecutive_failures: Arc<AtomicU64>,
    opened_at: Arc<RwLock<Option<Instant>>>,
    open: Arc<AtomicBool>,
    cooldown: Duration,
    failure_threshold: u64,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u64) -> Self {
        CircuitBreaker {
            consecutive_failures: Arc::new(AtomicU64::new(0)),
            opened_at: Arc::new(RwLock::new(None)),
            open: Arc::new(AtomicBool::new(false)),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// True while calls should be skipped. Moves to half-open once the
    /// cooldown has elapsed.
    pub fn is_open(&self) -> bool {
        if !self.open.load(Ordering::Acquire) {
            return false;
        }
        let opened_at = *self.opened_at.read();
        let cooled = opened_at.map_or(true, |at| at.elapsed() >= self.cooldown);
        if cooled {
            tracing::debug!("Advice breaker half-open, allowing a trial call");
            self.open.store(false, Ordering::Release);
            self.consecutive_failures.store(0, Ordering::Relaxed);
            return false;
        }
        true
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.open.store(false, Ordering::Release);
        *self.opened_at.write() = None;
    }

    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.failure_threshold && !self.open.swap(true, Ordering::AcqRel) {
            *self.opened_at.write() = Some(Instant::now());
            tracing::warn!(failures, cooldown_secs = self.cooldown.as_secs(), "Advice breaker opened");
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}

/// Exponential backoff with up to 25% random jitter added to each delay.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub fn new(initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        ExponentialBackoff {
            initial_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
        }
    }

    /// Base delay for a 0-indexed attempt, before jitter.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        (delay as u64).min(self.max_delay_ms)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms(attempt);
        let jitter = rand::thread_rng().gen_range(0..=base / 4);
        Duration::from_millis(base + jitter)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(200, 5000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_at_threshold_and_resets_on_success() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 2);
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn half_opens_after_cooldown() {
        let breaker = CircuitBreaker::new(Duration::ZERO, 1);
        breaker.record_failure();
        assert!(!breaker.is_open());
    }

    #[test]
    fn backoff_is_capped_and_jitter_bounded() {
        let backoff = ExponentialBackoff::new(100, 1000);
        assert_eq!(backoff.base_delay_ms(0), 100);
        assert_eq!(backoff.base_delay_ms(3), 800);
        assert_eq!(backoff.base_delay_ms(10), 1000);
        for attempt in 0..6 {
            let d = backoff.delay_for_attempt(attempt).as_millis() as u64;
            let base = backoff.base_delay_ms(attempt);
            assert!(d >= base && d <= base + base / 4);
        }
    }
}
