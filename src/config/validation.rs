use crate::config::types::WorkQueue;
use crate::ConfigError;

/// Validates a loaded work queue
///
/// Every range must be non-empty (`start < end`). An empty queue is valid;
/// the run simply drains immediately.
pub fn validate(queue: &WorkQueue) -> Result<(), ConfigError> {
    for range in &queue.ranges {
        if range.start >= range.end {
            return Err(ConfigError::Validation(format!(
                "range {} is empty or inverted; expected start < end",
                range
            )));
        }
    }
    Ok(())
}
