//! Crash guard options

use crate::core::error::{LoggerError, Result};
use std::path::PathBuf;

/// When to write a crash record to one of the guard's own destinations.
/// Whatever these say, the record still goes through the global logger
/// whenever that logger accepts Fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    Never,
    Always,
    /// Only when the global logger is absent or rejects Fatal.
    IfGlobalLoggerMissed,
}

impl WriteCondition {
    pub(crate) fn applies(&self, missed_global: bool) -> bool {
        match self {
            WriteCondition::Never => false,
            WriteCondition::Always => true,
            WriteCondition::IfGlobalLoggerMissed => missed_global,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrashGuardOptions {
    /// When to write crash records to the console.
    pub console: WriteCondition,

    /// When to write crash records to a file under [`crash_dir`](Self::crash_dir).
    pub file: WriteCondition,

    /// Directory the crash log files are written to.
    pub crash_dir: PathBuf,
}

impl CrashGuardOptions {
    /// The standard policy: a crash file is always written, the console is
    /// used only when the global logger cannot be relied on.
    pub fn standard() -> Self {
        Self {
            console: WriteCondition::IfGlobalLoggerMissed,
            file: WriteCondition::Always,
            crash_dir: default_crash_dir(),
        }
    }

    /// Standard policy with an explicit crash directory.
    pub fn with_crash_dir(crash_dir: impl Into<PathBuf>) -> Self {
        Self {
            crash_dir: crash_dir.into(),
            ..Self::standard()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.file != WriteCondition::Never {
            let raw = self.crash_dir.as_os_str();
            if raw.is_empty() {
                return Err(LoggerError::config("CrashGuard", "crash directory is empty"));
            }
            if self.crash_dir.to_string_lossy().contains('\0') {
                return Err(LoggerError::config(
                    "CrashGuard",
                    "crash directory contains an invalid character",
                ));
            }
        }
        Ok(())
    }
}

impl Default for CrashGuardOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// `logs/crashes` next to the executable, falling back to the working
/// directory.
fn default_crash_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logs/crashes")
}
