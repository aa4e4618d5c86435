use std::time::{Duration, Instant};

/// Enforces the minimum interval between API requests
///
/// Tracks the next instant a request is allowed to start; each call to
/// [`wait_for_slot`](RateLimiter::wait_for_slot) sleeps out any remaining
/// delay and then claims the next slot. Sleeping is unconditional; success
/// or failure of the subsequent request does not change the pacing.
///
/// The limiter also accumulates how long the loop spent waiting in total,
/// reported at range completion.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_allowed: Option<Instant>,
    total_waited: Duration,
    calls: u64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: None,
            total_waited: Duration::ZERO,
            calls: 0,
        }
    }

    /// Blocks until the next request slot, returning how long it waited
    pub async fn wait_for_slot(&mut self) -> Duration {
        let wait = self.delay_until_slot(Instant::now());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
            self.total_waited += wait;
        }
        self.next_allowed = Some(Instant::now() + self.interval);
        self.calls += 1;
        wait
    }

    /// Remaining delay before a request may start at `now`
    fn delay_until_slot(&self, now: Instant) -> Duration {
        match self.next_allowed {
            Some(at) if at > now => at - now,
            _ => Duration::ZERO,
        }
    }

    /// Total time spent waiting for slots so far
    pub fn total_waited(&self) -> Duration {
        self.total_waited
    }

    /// Number of slots claimed so far
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_slot_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        assert_eq!(limiter.delay_until_slot(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_delay_counts_down() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let now = Instant::now();
        limiter.next_allowed = Some(now + Duration::from_millis(1000));

        assert_eq!(
            limiter.delay_until_slot(now),
            Duration::from_millis(1000)
        );
        assert_eq!(
            limiter.delay_until_slot(now + Duration::from_millis(400)),
            Duration::from_millis(600)
        );
        assert_eq!(
            limiter.delay_until_slot(now + Duration::from_millis(1100)),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn test_wait_for_slot_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));

        let start = Instant::now();
        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;

        // Three calls, two enforced gaps
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(limiter.calls(), 3);
        // Slightly under two full intervals: the slot is claimed a moment
        // after the previous sleep ends
        assert!(limiter.total_waited() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_no_wait_recorded_when_slot_free() {
        let mut limiter = RateLimiter::new(Duration::from_millis(10));
        let waited = limiter.wait_for_slot().await;
        assert_eq!(waited, Duration::ZERO);
        assert_eq!(limiter.total_waited(), Duration::ZERO);
    }
}
