//! Harvest coordinator - top-level range orchestration
//!
//! The coordinator drives each pending range through its lifecycle:
//! select the range (refusing to clobber a sealed artifact), recover the
//! resume cursor from any interrupted journal, fetch and append until the
//! range is exhausted, seal the journal into a gzip artifact, and only then
//! rewrite the persisted queue. A crash at any point lands the next run
//! back on the same range with recovery.

use crate::config::{save_queue, HarvestConfig, Range, WorkQueue};
use crate::harvester::fetcher::build_http_client;
use crate::harvester::limiter::RateLimiter;
use crate::harvester::retry::{fetch_with_retry, RetryState};
use crate::journal::{recover, RecordJournal};
use crate::{HarvestError, Result};
use reqwest::Client;
use std::path::PathBuf;

/// Journal name a finished range's temporary file is retired to
const RETIRED_JOURNAL_NAME: &str = "last_incomplete.json";

/// Sequence numbers covered between progress log lines
const LOG_INTERVAL: u64 = 5000;

/// How a harvest run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Every queued range was sealed; the queue file is empty
    Drained,

    /// The API returned an empty page: no data exists yet past `cursor`.
    /// The active range was still sealed and removed from the queue.
    EndOfData { range: Range, cursor: u64 },
}

/// Why the fetch loop stopped for one range
enum RangeStop {
    /// A record at or past `range.end` arrived; the range is full
    Exhausted,

    /// The API returned an empty page at `cursor`
    EndOfData { cursor: u64 },
}

/// Top-level harvest state machine
pub struct Coordinator {
    config: HarvestConfig,
    queue: WorkQueue,
    client: Client,
    limiter: RateLimiter,
    retry: RetryState,
}

impl Coordinator {
    /// Creates a coordinator, loading the persisted queue
    ///
    /// A missing or malformed queue file is fatal here, before any network
    /// activity.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let queue = crate::config::load_queue(&config.queue_path)?;
        std::fs::create_dir_all(&config.output_dir)?;

        let limiter = RateLimiter::new(config.api.request_period);
        let client = build_http_client(&config.api)?;

        Ok(Self {
            config,
            queue,
            client,
            limiter,
            retry: RetryState::new(),
        })
    }

    /// Runs the harvest until the queue drains, the API runs dry, or a
    /// fatal condition is hit
    pub async fn run(&mut self) -> Result<HarvestOutcome> {
        tracing::info!(
            "starting harvest: {} range(s) pending, logging every {} sequence numbers",
            self.queue.ranges.len(),
            LOG_INTERVAL
        );

        loop {
            // SELECTING_RANGE
            let range = match self.queue.ranges.first().copied() {
                Some(range) => range,
                None => {
                    tracing::info!("finished with all ranges in the work queue");
                    return Ok(HarvestOutcome::Drained);
                }
            };
            tracing::info!("downloading range {}", range);

            let artifact_path = self.output_path(&range.artifact_name());
            if artifact_path.exists() {
                // Crash guard: a sealed artifact for a still-queued range
                // means the queue and the output directory disagree.
                return Err(HarvestError::ArtifactExists {
                    path: artifact_path,
                });
            }
            let journal_path = self.output_path(&range.journal_name());

            // RECOVERING
            let resume = if journal_path.exists() {
                recover(&journal_path)?
            } else {
                None
            };
            let mut journal = RecordJournal::open_append(&journal_path)?;

            // FETCHING
            let start_cursor = resume.unwrap_or(range.start);
            let stop = self.fetch_range(range, &mut journal, start_cursor).await?;

            // RANGE_COMPLETE -> SEALING
            tracing::info!("range {} complete, sealing the journal", range);
            let retired_path = self.output_path(RETIRED_JOURNAL_NAME);
            journal.seal(&artifact_path, &retired_path)?;

            // ADVANCING_QUEUE
            self.queue.ranges.remove(0);
            save_queue(&self.config.queue_path, &self.queue)?;
            self.report_stats();

            if let RangeStop::EndOfData { cursor } = stop {
                tracing::info!("no matches found beyond sequence number {}", cursor);
                return Ok(HarvestOutcome::EndOfData { range, cursor });
            }
        }
    }

    /// Fetch loop for one range
    ///
    /// Appends every returned record with a sequence number inside the
    /// range, advancing the cursor past each one only after the append.
    /// A record at or past `range.end` exhausts the range and the rest of
    /// that page is discarded.
    async fn fetch_range(
        &mut self,
        range: Range,
        journal: &mut RecordJournal,
        start_cursor: u64,
    ) -> Result<RangeStop> {
        let mut cursor = start_cursor;
        let mut last_logged = cursor;

        loop {
            if cursor - last_logged > LOG_INTERVAL {
                let done = cursor.saturating_sub(range.start) as f64;
                tracing::info!(
                    "read up to {} on range {} ({:.3} percent done)",
                    cursor,
                    range,
                    100.0 * done / range.len() as f64
                );
                last_logged = cursor;
            }

            let page = fetch_with_retry(
                &self.client,
                &self.config.api,
                &mut self.limiter,
                &mut self.retry,
                cursor,
            )
            .await;

            if page.is_empty() {
                return Ok(RangeStop::EndOfData { cursor });
            }

            for record in page {
                if record.seq() >= range.end {
                    return Ok(RangeStop::Exhausted);
                }
                journal.append(&record)?;
                cursor = record.seq() + 1;
            }
        }
    }

    /// Aggregate API pacing report, logged after each sealed range
    fn report_stats(&self) {
        let calls = self.limiter.calls();
        let waited = self.limiter.total_waited();
        let average = if calls > 0 {
            waited / calls as u32
        } else {
            std::time::Duration::ZERO
        };
        tracing::info!(
            "total API requests: {}, total wait time: {:.1?}, average wait per request: {:.1?}, \
             failures absorbed: {}",
            calls,
            waited,
            average,
            self.retry.total_failures()
        );
    }

    fn output_path(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    /// Remaining ranges, front of the queue first
    pub fn pending_ranges(&self) -> &[Range] {
        &self.queue.ranges
    }
}
