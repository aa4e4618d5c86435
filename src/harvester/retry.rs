//! Unbounded retry with escalating backoff
//!
//! The remote API is assumed eventually available; a hard error here would
//! abort an unattended multi-day harvest. Failures are therefore absorbed:
//! each one bumps the consecutive-failure count, sleeps a delay picked from
//! a fixed ascending table, and tries again. Only log output and elapsed
//! time make failures visible.

use crate::config::ApiConfig;
use crate::harvester::fetcher::fetch_page;
use crate::harvester::limiter::RateLimiter;
use crate::journal::MatchRecord;
use reqwest::Client;
use std::time::Duration;

/// Consecutive-failure tracking for one fetch loop
///
/// Never persisted: a process restart deliberately resets backoff to its
/// initial value.
#[derive(Debug, Default)]
pub struct RetryState {
    consecutive_failures: u32,
    total_failures: u64,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed attempt, returning the new consecutive count
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.total_failures += 1;
        self.consecutive_failures
    }

    /// Resets the consecutive count after a success
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Failures absorbed over the whole run, for the completion report
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }
}

/// Maps a consecutive-failure count to a backoff delay
///
/// `failures` counts the failure that just happened (so it is at least 1).
/// Counts past the end of the table reuse the last, maximum entry; the
/// chosen delay is non-decreasing in the failure count.
pub fn delay_for(schedule: &[Duration], failures: u32) -> Duration {
    debug_assert!(!schedule.is_empty());
    let index = (failures.saturating_sub(1) as usize).min(schedule.len() - 1);
    schedule[index]
}

/// Fetches one page, retrying until it succeeds
///
/// Every attempt first takes a rate-limiter slot, so retries respect the
/// API pacing on top of their own backoff. On success the consecutive
/// failure count resets and the page is returned; this function never
/// reports an error.
pub async fn fetch_with_retry(
    client: &Client,
    api: &ApiConfig,
    limiter: &mut RateLimiter,
    retry: &mut RetryState,
    cursor: u64,
) -> Vec<MatchRecord> {
    loop {
        limiter.wait_for_slot().await;

        match fetch_page(client, api, cursor).await {
            Ok(page) => {
                retry.reset();
                return page;
            }
            Err(e) => {
                let failures = retry.record_failure();
                let delay = delay_for(&api.backoff_schedule, failures);
                if failures > 1 {
                    tracing::warn!("{} consecutive errors", failures);
                }
                tracing::warn!(
                    "fetch at cursor {} failed: {}; sleeping {:?} before retrying",
                    cursor,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                tracing::info!("attempting to continue");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> Vec<Duration> {
        crate::config::DEFAULT_BACKOFF_SECS
            .iter()
            .map(|&s| Duration::from_secs(s))
            .collect()
    }

    #[test]
    fn test_first_failure_uses_first_entry() {
        assert_eq!(delay_for(&schedule(), 1), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_is_non_decreasing() {
        let schedule = schedule();
        let mut previous = Duration::ZERO;
        for failures in 1..=20 {
            let delay = delay_for(&schedule, failures);
            assert!(delay >= previous, "delay regressed at failure {}", failures);
            previous = delay;
        }
    }

    #[test]
    fn test_delay_clamps_at_table_end() {
        let schedule = schedule();
        let max = *schedule.last().unwrap();

        assert_eq!(delay_for(&schedule, schedule.len() as u32), max);
        assert_eq!(delay_for(&schedule, 100), max);
        assert_eq!(delay_for(&schedule, u32::MAX), max);
    }

    #[test]
    fn test_retry_state_counts_and_resets() {
        let mut state = RetryState::new();
        assert_eq!(state.consecutive_failures(), 0);

        assert_eq!(state.record_failure(), 1);
        assert_eq!(state.record_failure(), 2);
        assert_eq!(state.total_failures(), 2);

        state.reset();
        assert_eq!(state.consecutive_failures(), 0);
        // The run-wide total survives a reset
        assert_eq!(state.total_failures(), 2);

        assert_eq!(state.record_failure(), 1);
    }
}
