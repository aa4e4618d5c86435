use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default endpoint for the match history API
pub const DEFAULT_BASE_URL: &str =
    "https://api.steampowered.com/IDOTA2Match_570/GetMatchHistoryBySequenceNum/v0001/";

/// Records requested per API call
pub const MATCHES_PER_REQUEST: u32 = 100;

/// Minimum interval between API requests, in milliseconds
pub const REQUEST_PERIOD_MS: u64 = 1000;

/// Upper bound on a single API call before it counts as a failure, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Escalating backoff schedule after consecutive failures, in seconds.
/// Failure counts beyond the end of the table reuse the last entry.
pub const DEFAULT_BACKOFF_SECS: [u64; 8] = [10, 60, 120, 300, 300, 600, 900, 1800];

/// A half-open interval of sequence numbers to harvest
///
/// Serialized in the work-queue file as a two-element array `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct Range {
    /// First sequence number to retrieve. Inclusive.
    pub start: u64,

    /// Sequence number to stop at. Exclusive.
    pub end: u64,
}

impl Range {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of sequence numbers covered by this range
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Base name shared by the in-progress journal and the sealed artifact
    pub fn file_stem(&self) -> String {
        format!("matches_{}-{}", self.start, self.end)
    }

    /// Name of the in-progress journal file
    pub fn journal_name(&self) -> String {
        format!("{}_INCOMPLETE.json", self.file_stem())
    }

    /// Name of the sealed, compressed artifact
    pub fn artifact_name(&self) -> String {
        format!("{}.gz", self.file_stem())
    }
}

impl From<(u64, u64)> for Range {
    fn from((start, end): (u64, u64)) -> Self {
        Self { start, end }
    }
}

impl From<Range> for (u64, u64) {
    fn from(r: Range) -> Self {
        (r.start, r.end)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

/// The persisted work queue: ranges still waiting to be harvested
///
/// This is the sole process-wide persisted state. It is read once at
/// startup and rewritten, with the finished range removed, only after that
/// range's artifact has been fully sealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkQueue {
    pub ranges: Vec<Range>,
}

/// Remote API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the match history endpoint
    pub base_url: String,

    /// API credential, passed as the `key` query parameter
    pub key: String,

    /// Page size requested per call
    pub matches_per_request: u32,

    /// Minimum interval between two requests
    pub request_period: Duration,

    /// Call-level timeout; a call exceeding it is a uniform fetch failure
    pub request_timeout: Duration,

    /// Backoff delays indexed by consecutive failure count, clamped at the
    /// last entry
    pub backoff_schedule: Vec<Duration>,
}

impl ApiConfig {
    /// Builds the default API settings for the given credential
    pub fn new(key: String) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key,
            matches_per_request: MATCHES_PER_REQUEST,
            request_period: Duration::from_millis(REQUEST_PERIOD_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            backoff_schedule: DEFAULT_BACKOFF_SECS
                .iter()
                .map(|&s| Duration::from_secs(s))
                .collect(),
        }
    }
}

/// Everything the coordinator needs for one run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Path of the persisted work-queue file
    pub queue_path: PathBuf,

    /// Directory receiving journals and sealed artifacts
    pub output_dir: PathBuf,

    /// Remote API settings
    pub api: ApiConfig,
}
