//! Match-Harvester: a resumable harvester for ordered match history
//!
//! This crate implements a single-process crawler that pulls match records
//! from a rate-limited HTTP API in strict sequence-number order, appends them
//! to a crash-safe journal, and seals each finished range into a compressed
//! artifact. Interrupted runs resume from the last durably written record.

pub mod config;
pub mod harvester;
pub mod journal;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "journal {path} could not be recovered in {attempts} attempts; \
         the file needs manual inspection"
    )]
    Unrecoverable { path: PathBuf, attempts: u32 },

    #[error(
        "sealed artifact {path} already exists; ensure the work queue and the \
         output directory are consistent before retrying"
    )]
    ArtifactExists { path: PathBuf },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read work queue file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse work queue JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required environment variable {0} (the API credential)")]
    MissingApiKey(&'static str),
}

/// Errors from a single fetch attempt
///
/// The retry controller treats every variant the same way; the split exists
/// only so the failure log can say what actually went wrong.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("bad status code for request: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("record is missing the match_seq_num field")]
    MissingSequence,
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{ApiConfig, HarvestConfig, Range};
pub use harvester::{Coordinator, HarvestOutcome};
pub use journal::{recover, MatchRecord, RecordJournal};
