//! Emergency logger
//!
//! A minimal, independently constructed logger used only when a crash must
//! be recorded. It is built directly over std fs and stderr; nothing here
//! touches the pipeline builder or the extension registries, since those
//! may be exactly what is broken.

use super::options::CrashGuardOptions;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub(crate) struct EmergencyLogger {
    console: bool,
    file: Option<BufWriter<File>>,
}

impl EmergencyLogger {
    /// Build an emergency logger per the configured write conditions, or
    /// `None` when neither destination applies. A file that cannot be
    /// opened degrades to a stderr notice instead of failing the report.
    pub(crate) fn create(
        options: &CrashGuardOptions,
        app_name: &str,
        signal: &str,
        raised_at: &DateTime<Utc>,
        missed_global: bool,
    ) -> Option<Self> {
        let console = options.console.applies(missed_global);
        let wants_file = options.file.applies(missed_global);
        if !console && !wants_file {
            return None;
        }

        let file = if wants_file {
            let path = crash_file_path(options, app_name, signal, raised_at);
            match open_crash_file(&path) {
                Ok(file) => Some(BufWriter::new(file)),
                Err(e) => {
                    eprintln!(
                        "[CRASH] Failed to open crash log file {}: {}",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        if !console && file.is_none() {
            return None;
        }

        Some(Self { console, file })
    }

    /// Write one crash record to every destination this logger holds.
    pub(crate) fn fatal(&mut self, message: &str, failure: &str) {
        let record = format!("[CRASH] {}\n{}\n", message, failure);

        if self.console {
            eprintln!("{}", record.red());
        }

        if let Some(writer) = self.file.as_mut() {
            if let Err(e) = writer
                .write_all(record.as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
                .and_then(|()| writer.flush())
            {
                eprintln!("[CRASH] Failed to write crash log file: {}", e);
            }
        }
    }
}

fn open_crash_file(path: &PathBuf) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn crash_file_path(
    options: &CrashGuardOptions,
    app_name: &str,
    signal: &str,
    raised_at: &DateTime<Utc>,
) -> PathBuf {
    let file_name = format!(
        "{}_{}_{}.log",
        encode_for_path(app_name),
        encode_for_path(signal),
        raised_at.format("%Y-%m-%dT%H%M%S%.3f")
    );
    options.crash_dir.join(file_name)
}

/// Replace characters that cannot appear in a file name with `-`.
pub(crate) fn encode_for_path(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c => c,
        })
        .collect()
}
