//! Crash-safe record journal
//!
//! This module owns the on-disk representation of a range in progress:
//! - Appending records one JSON line at a time as they arrive
//! - Sealing a finished journal into a gzip artifact
//! - Recovering the resume cursor from a journal left by an interrupted run

mod record;
mod recovery;
mod writer;

pub use record::{MatchRecord, SEQ_FIELD};
pub use recovery::{recover, MAX_RECOVERY_ATTEMPTS, SEEK_BACK_BYTES};
pub use writer::RecordJournal;
