//! Harvest engine
//!
//! This module contains the crawl loop proper:
//! - Rate limiting against the remote API
//! - Single-attempt page fetching with a structured timeout
//! - Unbounded retry with escalating backoff
//! - The orchestrating state machine that drives a range from recovery to
//!   sealed artifact

mod coordinator;
mod fetcher;
mod limiter;
mod retry;

pub use coordinator::{Coordinator, HarvestOutcome};
pub use fetcher::{build_http_client, fetch_page};
pub use limiter::RateLimiter;
pub use retry::{delay_for, fetch_with_retry, RetryState};

use crate::config::HarvestConfig;
use crate::Result;

/// Runs a complete harvest over the persisted work queue
///
/// This is the main entry point. It will:
/// 1. Load and validate the work queue
/// 2. Build the HTTP client
/// 3. Recover and resume any interrupted range
/// 4. Fetch, journal, and seal each range in order
/// 5. Rewrite the queue as ranges complete
///
/// # Returns
///
/// * `Ok(HarvestOutcome)` - The queue drained, or the API ran out of data
/// * `Err(HarvestError)` - A fatal condition (bad config, unrecoverable
///   journal, conflicting artifact)
pub async fn harvest(config: HarvestConfig) -> Result<HarvestOutcome> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
