//! Size-rolling file appender
//!
//! Writes to a fixed path and, when the active file would exceed its size
//! limit, renames it to a timestamped archive, optionally gzip-compresses
//! the archive, prunes the oldest archives past the retention limit and
//! starts a fresh file. The active file carries an advisory exclusive lock
//! so two processes cannot roll the same log.

use crate::core::{Appender, LogEntry, LoggerError, OutputFormat, Result, TimestampFormat};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub struct RollingFileAppender {
    path: PathBuf,
    max_size: u64,
    retained_limit: Option<usize>,
    compress: bool,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl RollingFileAppender {
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let (writer, current_size) = Self::open_active(&path)?;

        Ok(Self {
            path,
            max_size,
            retained_limit: None,
            compress: false,
            writer: Some(writer),
            current_size,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        })
    }

    /// Keep at most `limit` rolled archives, pruning the oldest.
    #[must_use]
    pub fn with_retained_limit(mut self, limit: Option<usize>) -> Self {
        self.retained_limit = limit;
        self
    }

    /// Gzip archives after rolling.
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    fn open_active(path: &Path) -> Result<(BufWriter<File>, u64)> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_lock(path.display().to_string()))?;
        let size = file.metadata()?.len();
        Ok((BufWriter::new(file), size))
    }

    /// Archive path for a roll happening now, e.g. `app.20250108T103045123.log`.
    fn archive_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let extension = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        self.path
            .with_file_name(format!("{}.{}.{}", stem, stamp, extension))
    }

    fn roll(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            // Writer (and its lock) released here so the file can be renamed
            drop(writer);
        }

        let archive = self.archive_path();
        if let Err(e) = fs::rename(&self.path, &archive) {
            // Rename over an archive from the same millisecond
            if archive.exists() {
                let _ = fs::remove_file(&archive);
            }
            fs::rename(&self.path, &archive).map_err(|_| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to archive current log file: {}", e),
                )
            })?;
        }

        if self.compress {
            // A failed compression keeps the plain archive
            if let Err(e) = compress_archive(&archive) {
                eprintln!(
                    "[PIPELOG WARNING] Failed to compress archive {}: {}",
                    archive.display(),
                    e
                );
            }
        }

        self.prune_archives();

        let (writer, current_size) = Self::open_active(&self.path)?;
        self.writer = Some(writer);
        self.current_size = current_size;
        Ok(())
    }

    /// Remove the oldest archives beyond the retention limit. Archive names
    /// embed a UTC timestamp, so lexical order is chronological order.
    fn prune_archives(&self) {
        let Some(limit) = self.retained_limit else {
            return;
        };
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return;
        };
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let active = self.path.file_name().and_then(|n| n.to_str());

        let mut archives: Vec<String> = match fs::read_dir(parent) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .filter(|name| name.starts_with(&format!("{}.", stem)) && Some(name.as_str()) != active)
                .collect(),
            Err(_) => return,
        };

        archives.sort();
        while archives.len() > limit {
            let oldest = archives.remove(0);
            if let Err(e) = fs::remove_file(parent.join(&oldest)) {
                eprintln!(
                    "[PIPELOG WARNING] Failed to remove old archive {}: {}",
                    oldest, e
                );
            }
        }
    }
}

/// Gzip `path` into `path.gz` and remove the original. The original is only
/// deleted after the compressed file is complete.
fn compress_archive(path: &Path) -> Result<()> {
    let gz_path = {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    };

    let input = File::open(path)?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);
    let output = File::create(&gz_path)?;
    let mut encoder =
        flate2::write::GzEncoder::new(BufWriter::new(output), flate2::Compression::default());

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer).inspect_err(|_| {
            let _ = fs::remove_file(&gz_path);
        })?;
        if bytes_read == 0 {
            break;
        }
        encoder.write_all(&buffer[..bytes_read]).inspect_err(|_| {
            let _ = fs::remove_file(&gz_path);
        })?;
    }
    encoder.finish().inspect_err(|_| {
        let _ = fs::remove_file(&gz_path);
    })?;

    fs::remove_file(path)?;
    Ok(())
}

impl Appender for RollingFileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let mut output = self.output_format.format(entry, &self.timestamp_format);
        output.push('\n');

        if self.current_size > 0 && self.current_size + output.len() as u64 > self.max_size {
            self.roll()?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Rolling file writer not initialized"))?;
        writer.write_all(output.as_bytes())?;
        self.current_size += output.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rolling_file"
    }
}

impl Drop for RollingFileAppender {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::TempDir;

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, message.to_string())
    }

    #[test]
    fn test_appends_and_flushes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut appender = RollingFileAppender::new(&path, 1024 * 1024).unwrap();

        appender.append(&entry("first")).unwrap();
        appender.append(&entry("second")).unwrap();
        appender.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("first"));
    }

    #[test]
    fn test_rolls_at_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut appender = RollingFileAppender::new(&path, 256).unwrap();

        for i in 0..20 {
            appender.append(&entry(&format!("message number {}", i))).unwrap();
        }
        appender.flush().unwrap();

        let archives: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().unwrap() != "app.log")
            .collect();
        assert!(!archives.is_empty(), "Expected at least one rolled archive");
        assert!(fs::metadata(&path).unwrap().len() <= 256);
    }

    #[test]
    fn test_retention_prunes_oldest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut appender = RollingFileAppender::new(&path, 64).unwrap().with_retained_limit(Some(2));

        for i in 0..40 {
            appender
                .append(&entry(&format!("filler entry {:04}", i)))
                .unwrap();
        }
        appender.flush().unwrap();

        let archives: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().unwrap() != "app.log")
            .collect();
        assert!(archives.len() <= 2, "Expected retention to prune archives");
    }

    #[test]
    fn test_compressed_archives_end_in_gz() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut appender = RollingFileAppender::new(&path, 64)
            .unwrap()
            .with_compression(true);

        for i in 0..10 {
            appender
                .append(&entry(&format!("compressible entry {:04}", i)))
                .unwrap();
        }
        appender.flush().unwrap();

        let has_gz = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_str().unwrap().ends_with(".log.gz"));
        assert!(has_gz, "Expected at least one gzip-compressed archive");
    }
}
