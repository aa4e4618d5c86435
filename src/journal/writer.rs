use crate::journal::MatchRecord;
use crate::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append-only journal for one range in progress
///
/// Records are written one compact JSON line at a time, flushed straight to
/// the OS so a crash loses at most the final, unterminated line. The
/// recovery scanner relies on that: everything before the last newline is
/// durable.
pub struct RecordJournal {
    file: File,
    path: PathBuf,
}

impl RecordJournal {
    /// Opens (or creates) the journal at `path` for appending
    pub fn open_append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single terminated line
    pub fn append(&mut self, record: &MatchRecord) -> Result<()> {
        let line = record.to_line()?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }

    /// Seals the journal into a compressed artifact
    ///
    /// Streams the journal from its start through a gzip encoder into
    /// `artifact_path`, finishes the encoder, then renames the now-redundant
    /// journal to `retired_path` (kept for inspection, not further use).
    /// The artifact only appears at its final name once fully written.
    pub fn seal(mut self, artifact_path: &Path, retired_path: &Path) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(&self.file);

        let artifact = File::create(artifact_path)?;
        let mut encoder = GzEncoder::new(artifact, Compression::default());
        std::io::copy(&mut reader, &mut encoder)?;
        let artifact = encoder.finish()?;
        artifact.sync_all()?;
        drop(reader);
        drop(self.file);

        std::fs::rename(&self.path, retired_path)?;
        Ok(())
    }
}
