use crate::journal::SEQ_FIELD;
use crate::{HarvestError, Result};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// How far back from EOF the scan starts. One serialized record is roughly
/// 10 KB, so this lands comfortably before the final line.
pub const SEEK_BACK_BYTES: u64 = 100_000;

/// Truncation attempts before the journal is declared unrecoverable
pub const MAX_RECOVERY_ATTEMPTS: u32 = 5;

/// Recovers the resume cursor from a journal left by a previous run
///
/// Call this only when a journal file exists at `path`. The scan seeks a
/// bounded distance back from EOF (clamped to the start for short files),
/// walks forward to the true last line, and parses it:
///
/// 1. Empty file → no prior state; the file is reset to zero length.
/// 2. Last line parses → resume cursor is its sequence number plus one; the
///    file is left untouched.
/// 3. Last line is torn (crash mid-write) → truncate it and rescan, up to
///    [`MAX_RECOVERY_ATTEMPTS`] times; exhausting the budget is fatal.
///
/// Running the scan twice in a row yields the same cursor with no further
/// truncation.
///
/// # Returns
///
/// * `Ok(Some(cursor))` - Next sequence number to fetch
/// * `Ok(None)` - The file held no prior state
/// * `Err(HarvestError::Unrecoverable)` - No valid line within the budget
pub fn recover(path: &Path) -> Result<Option<u64>> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    tracing::info!("{} already exists, recovering last sequence number", path.display());

    for attempt in 0..MAX_RECOVERY_ATTEMPTS {
        let len = file.metadata()?.len();
        if len == 0 {
            tracing::info!("journal was empty, treating as no prior state");
            file.set_len(0)?;
            return Ok(None);
        }

        let from = len.saturating_sub(SEEK_BACK_BYTES);
        let (last_start, last_line) = match scan_last_line(&mut file, from)? {
            Some(found) => found,
            None => {
                file.set_len(0)?;
                return Ok(None);
            }
        };

        match parse_seq(&last_line) {
            Some(seq) => {
                tracing::info!("last durable sequence number was {}", seq);
                return Ok(Some(seq + 1));
            }
            None => {
                tracing::warn!(
                    "journal damaged (attempt {}), dropping torn last line at offset {}",
                    attempt + 1,
                    last_start
                );
                file.set_len(last_start)?;
            }
        }
    }

    Err(HarvestError::Unrecoverable {
        path: path.to_path_buf(),
        attempts: MAX_RECOVERY_ATTEMPTS,
    })
}

/// Scans forward from `from`, returning the start offset and bytes of the
/// last line in the file
///
/// When `from` is past the file start it may land mid-line; walking to the
/// last line makes that harmless, because only the final line is inspected.
/// Lines are handled as raw bytes: a torn write can leave invalid UTF-8.
fn scan_last_line(file: &mut std::fs::File, from: u64) -> Result<Option<(u64, Vec<u8>)>> {
    file.seek(SeekFrom::Start(from))?;
    let mut reader = BufReader::new(&mut *file);

    let mut offset = from;
    let mut last: Option<(u64, Vec<u8>)> = None;
    loop {
        let mut line = Vec::new();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        last = Some((offset, line));
        offset += read as u64;
    }
    Ok(last)
}

/// Parses one journal line, returning its sequence number if structurally
/// valid
fn parse_seq(line: &[u8]) -> Option<u64> {
    let value: Value = serde_json::from_slice(line).ok()?;
    value.get(SEQ_FIELD)?.as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_journal(dir: &Path, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join("matches_1000-2000_INCOMPLETE.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn line(seq: u64) -> String {
        format!("{{\"match_id\":{},\"match_seq_num\":{}}}\n", seq * 2, seq)
    }

    #[test]
    fn test_recover_intact_journal() {
        let dir = tempdir().unwrap();
        let content = format!("{}{}{}", line(1000), line(1001), line(1002));
        let path = write_journal(dir.path(), content.as_bytes());

        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, Some(1003));

        // All lines were valid, so nothing was truncated
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after, content);
    }

    #[test]
    fn test_recover_truncates_torn_last_line() {
        let dir = tempdir().unwrap();
        let torn = "{\"match_id\":99,\"match_seq_n";
        let content = format!("{}{}{}", line(1000), line(1001), torn);
        let path = write_journal(dir.path(), content.as_bytes());

        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, Some(1002));

        // Exactly the torn line is gone
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after, format!("{}{}", line(1000), line(1001)));
    }

    #[test]
    fn test_recover_empty_file() {
        let dir = tempdir().unwrap();
        let path = write_journal(dir.path(), b"");

        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, None);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_recover_is_idempotent() {
        let dir = tempdir().unwrap();
        let content = format!("{}{}not json at all", line(500), line(501));
        let path = write_journal(dir.path(), content.as_bytes());

        let first = recover(&path).unwrap();
        let len_after_first = std::fs::metadata(&path).unwrap().len();

        let second = recover(&path).unwrap();
        let len_after_second = std::fs::metadata(&path).unwrap().len();

        assert_eq!(first, second);
        assert_eq!(first, Some(502));
        assert_eq!(len_after_first, len_after_second);
    }

    #[test]
    fn test_recover_all_garbage_becomes_no_prior_state() {
        // Each attempt drops one garbage line; once the file is empty the
        // scan reports no prior state rather than failing.
        let dir = tempdir().unwrap();
        let path = write_journal(dir.path(), b"garbage one\ngarbage two\n");

        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, None);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_recover_exhausts_attempts() {
        let dir = tempdir().unwrap();
        let mut content = String::new();
        for i in 0..10 {
            content.push_str(&format!("garbage line {}\n", i));
        }
        let path = write_journal(dir.path(), content.as_bytes());

        let result = recover(&path);
        assert!(matches!(
            result,
            Err(HarvestError::Unrecoverable { attempts: 5, .. })
        ));
    }

    #[test]
    fn test_recover_handles_invalid_utf8_tail() {
        let dir = tempdir().unwrap();
        let mut content = line(42).into_bytes();
        content.extend_from_slice(&[0xff, 0xfe, 0x80]);
        let path = write_journal(dir.path(), &content);

        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, Some(43));
    }

    #[test]
    fn test_recover_record_without_seq_field_is_torn() {
        let dir = tempdir().unwrap();
        let content = format!("{}{{\"match_id\":5}}\n", line(7));
        let path = write_journal(dir.path(), content.as_bytes());

        // Valid JSON without the sequence field cannot anchor a resume
        // cursor, so it is dropped like a torn line.
        let cursor = recover(&path).unwrap();
        assert_eq!(cursor, Some(8));
    }
}
