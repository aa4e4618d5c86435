use crate::config::types::WorkQueue;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "DOTA2_API_KEY";

/// Shown to the operator when the work-queue file is missing or malformed
pub const QUEUE_FORMAT_HINT: &str = r#"Expected a JSON work-queue file of the form:
{
    "ranges": [[1000, 2000], [2000, 3000]]
}"#;

/// Loads and validates the work-queue file from the given path
///
/// A missing or malformed file is fatal at startup; there is no sensible
/// default queue to fall back to.
///
/// # Arguments
///
/// * `path` - Path to the JSON work-queue file
///
/// # Returns
///
/// * `Ok(WorkQueue)` - Successfully loaded and validated queue
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
pub fn load_queue(path: &Path) -> Result<WorkQueue, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let queue: WorkQueue = serde_json::from_str(&content)?;
    validate(&queue)?;
    Ok(queue)
}

/// Rewrites the work-queue file with the ranges still pending
///
/// Called only after a range has been fully sealed, so a crash can never
/// observe a queue inconsistent with the artifacts on disk.
pub fn save_queue(path: &Path, queue: &WorkQueue) -> Result<(), ConfigError> {
    let content = serde_json::to_string(queue)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Reads the API credential from the process environment
///
/// Absence is a fatal startup condition, checked before any network
/// activity.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey(API_KEY_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Range;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_queue(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_queue() {
        let file = create_temp_queue(r#"{"ranges": [[1000, 1300], [1300, 2000]]}"#);
        let queue = load_queue(file.path()).unwrap();

        assert_eq!(queue.ranges.len(), 2);
        assert_eq!(queue.ranges[0], Range::new(1000, 1300));
        assert_eq!(queue.ranges[1], Range::new(1300, 2000));
    }

    #[test]
    fn test_load_empty_queue_is_valid() {
        let file = create_temp_queue(r#"{"ranges": []}"#);
        let queue = load_queue(file.path()).unwrap();
        assert!(queue.ranges.is_empty());
    }

    #[test]
    fn test_load_queue_missing_file() {
        let result = load_queue(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_queue_malformed_json() {
        let file = create_temp_queue("this is not json {{{");
        let result = load_queue(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_queue_inverted_range() {
        let file = create_temp_queue(r#"{"ranges": [[2000, 1000]]}"#);
        let result = load_queue(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let file = create_temp_queue("{}");
        let queue = WorkQueue {
            ranges: vec![Range::new(5, 10)],
        };
        save_queue(file.path(), &queue).unwrap();

        let back = load_queue(file.path()).unwrap();
        assert_eq!(back.ranges, queue.ranges);
    }
}
