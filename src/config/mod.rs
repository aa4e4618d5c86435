//! Configuration module for the harvester
//!
//! This module handles the persisted range work-queue file, the API
//! settings, and the credential supplied through the environment.
//!
//! # Example
//!
//! ```no_run
//! use match_harvester::config::load_queue;
//! use std::path::Path;
//!
//! let queue = load_queue(Path::new("config.json")).unwrap();
//! println!("{} ranges pending", queue.ranges.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types and tuning constants
pub use types::{
    ApiConfig, HarvestConfig, Range, WorkQueue, DEFAULT_BACKOFF_SECS, DEFAULT_BASE_URL,
    MATCHES_PER_REQUEST, REQUEST_PERIOD_MS, REQUEST_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{api_key_from_env, load_queue, save_queue, API_KEY_ENV, QUEUE_FORMAT_HINT};

// Re-export validation
pub use validation::validate;
