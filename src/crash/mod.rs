//! Last-resort crash reporting
//!
//! The crash guard is armed once at process start and stays armed for the
//! process lifetime. For every unhandled failure it records one crash
//! entry: through the global logger when that logger accepts Fatal, and
//! through an independently built [emergency logger](emergency) per the
//! configured write conditions. Consecutive failures are paired by an
//! atomically exchanged timestamp so crash loops are visible from the log
//! alone. Nothing on this path is allowed to throw: a failure handler that
//! itself fails must not crash the crash handler.

pub mod emergency;
pub mod options;

pub use options::{CrashGuardOptions, WriteCondition};

use crate::core::error::Result;
use crate::core::{LogEntry, LogLevel};
use crate::global::LoggerHandle;
use chrono::{DateTime, Utc};
use emergency::EmergencyLogger;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub struct CrashGuard {
    shared: Arc<GuardShared>,
}

struct GuardShared {
    handle: LoggerHandle,
    options: CrashGuardOptions,
    /// Microseconds since the epoch of the latest report; zero means none.
    previous_raise: AtomicI64,
    app_name: String,
}

impl CrashGuard {
    /// Arm a guard over `handle` without subscribing to any process signal.
    /// Options are validated here, before the first failure can arrive.
    pub fn new(handle: LoggerHandle, options: CrashGuardOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            shared: Arc::new(GuardShared {
                handle,
                options,
                previous_raise: AtomicI64::new(0),
                app_name: detect_app_name(),
            }),
        })
    }

    /// Arm a guard and subscribe it to synchronous unhandled failures (the
    /// panic hook). Call once at process start.
    pub fn install(handle: LoggerHandle, options: CrashGuardOptions) -> Result<Self> {
        let guard = Self::new(handle, options)?;
        guard.install_panic_hook();
        Ok(guard)
    }

    /// Arm with the standard options.
    pub fn install_with_defaults(handle: LoggerHandle) -> Result<Self> {
        Self::install(handle, CrashGuardOptions::standard())
    }

    /// Subscribe to the process panic hook, chaining whatever hook was
    /// installed before.
    pub fn install_panic_hook(&self) {
        let shared = Arc::clone(&self.shared);
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            shared.report("panic", &panic_message(info));
            previous_hook(info);
        }));
    }

    /// Report an unobserved asynchronous failure. Host glue calls this from
    /// wherever its runtime surfaces failures nobody awaited.
    pub fn report_unobserved(&self, failure: impl fmt::Display) {
        self.shared.report("unobserved", &failure.to_string());
    }
}

impl GuardShared {
    /// One failure, one record. Never panics: the whole report runs under
    /// `catch_unwind` and degrades to a stderr notice.
    fn report(&self, signal: &str, failure: &str) {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.report_inner(signal, failure);
        }));
        if outcome.is_err() {
            eprintln!(
                "[CRASH] Crash report itself failed; original failure: {}",
                failure
            );
        }
    }

    fn report_inner(&self, signal: &str, failure: &str) {
        let raised_at = Utc::now();
        let previous_micros = self
            .previous_raise
            .swap(raised_at.timestamp_micros(), Ordering::AcqRel);
        let previous = (previous_micros != 0)
            .then(|| DateTime::<Utc>::from_timestamp_micros(previous_micros))
            .flatten();

        let message = match previous {
            None => format!("Unhandled failure raised at {}.", crash_stamp(&raised_at)),
            Some(previous) => format!(
                "Unhandled failure raised at {}. Previous raise was at {}.",
                crash_stamp(&raised_at),
                crash_stamp(&previous)
            ),
        };

        // Try the global pipeline first; it is never released from here.
        let global = self.handle.get();
        let wrote_global = match &global {
            Some(log) if log.enabled(LogLevel::Fatal) => {
                let mut entry = LogEntry::new(LogLevel::Fatal, message.clone());
                let context = entry.context_mut();
                context.add_field("signal", signal);
                context.add_field("failure", failure);
                log.write(entry);
                let _ = log.flush();
                true
            }
            _ => false,
        };

        let missed_global = !wrote_global;
        if let Some(mut emergency) = EmergencyLogger::create(
            &self.options,
            &self.app_name,
            signal,
            &raised_at,
            missed_global,
        ) {
            emergency.fatal(&message, failure);
            // Dropped right here; the emergency logger lives for one report
        }
    }
}

fn crash_stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn detect_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "app".to_string())
}

fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    match info.location() {
        Some(location) => format!("panicked at {}: {}", location, payload),
        None => format!("panicked: {}", payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Log;
    use parking_lot::Mutex;
    use std::any::Any;
    use tempfile::TempDir;

    struct StubLog {
        min: LogLevel,
        written: Arc<Mutex<Vec<LogEntry>>>,
    }

    impl Log for StubLog {
        fn enabled(&self, level: LogLevel) -> bool {
            level >= self.min
        }

        fn write(&self, entry: LogEntry) {
            self.written.lock().push(entry);
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn file_only_options(dir: &TempDir) -> CrashGuardOptions {
        CrashGuardOptions {
            console: WriteCondition::Never,
            file: WriteCondition::Always,
            crash_dir: dir.path().to_path_buf(),
        }
    }

    fn crash_files(dir: &TempDir) -> Vec<String> {
        let mut contents: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| std::fs::read_to_string(e.path()).unwrap())
            .collect();
        contents.sort();
        contents
    }

    #[test]
    fn test_first_report_has_no_previous_clause() {
        let dir = TempDir::new().unwrap();
        let guard = CrashGuard::new(LoggerHandle::new(), file_only_options(&dir)).unwrap();

        guard.report_unobserved("first failure");

        let records = crash_files(&dir).join("\n");
        assert!(records.contains("Unhandled failure raised at"));
        assert!(!records.contains("Previous raise was at"));
        assert!(records.contains("first failure"));
    }

    #[test]
    fn test_second_report_pairs_with_first() {
        let dir = TempDir::new().unwrap();
        let guard = CrashGuard::new(LoggerHandle::new(), file_only_options(&dir)).unwrap();

        guard.report_unobserved("first failure");
        guard.report_unobserved("second failure");

        let records = crash_files(&dir).join("\n");
        let previous_clauses = records.matches("Previous raise was at").count();
        assert_eq!(previous_clauses, 1);
    }

    #[test]
    fn test_concurrent_reports_pair_without_loss() {
        let dir = TempDir::new().unwrap();
        let guard =
            Arc::new(CrashGuard::new(LoggerHandle::new(), file_only_options(&dir)).unwrap());

        std::thread::scope(|scope| {
            for i in 0..2 {
                let guard = Arc::clone(&guard);
                scope.spawn(move || guard.report_unobserved(format!("failure {}", i)));
            }
        });

        let records = crash_files(&dir).join("\n");
        assert_eq!(records.matches("Unhandled failure raised at").count(), 2);
        // Exactly one report saw an empty previous slot
        assert_eq!(records.matches("Previous raise was at").count(), 1);
    }

    #[test]
    fn test_fatal_accepting_global_logger_is_used() {
        let dir = TempDir::new().unwrap();
        let written = Arc::new(Mutex::new(Vec::new()));
        let handle = LoggerHandle::new();
        handle.install(Arc::new(StubLog {
            min: LogLevel::Info,
            written: Arc::clone(&written),
        }));

        let options = CrashGuardOptions {
            console: WriteCondition::Never,
            file: WriteCondition::IfGlobalLoggerMissed,
            crash_dir: dir.path().to_path_buf(),
        };
        let guard = CrashGuard::new(handle, options).unwrap();
        guard.report_unobserved("handled by pipeline");

        // Record went through the global logger, no emergency file appeared
        let written = written.lock();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].level, LogLevel::Fatal);
        assert!(written[0].message.contains("Unhandled failure raised at"));
        assert!(crash_files(&dir).is_empty());
    }

    #[test]
    fn test_always_condition_writes_file_despite_global_logger() {
        let dir = TempDir::new().unwrap();
        let written = Arc::new(Mutex::new(Vec::new()));
        let handle = LoggerHandle::new();
        handle.install(Arc::new(StubLog {
            min: LogLevel::Trace,
            written: Arc::clone(&written),
        }));

        let guard = CrashGuard::new(handle, file_only_options(&dir)).unwrap();
        guard.report_unobserved("belt and braces");

        assert_eq!(written.lock().len(), 1);
        assert_eq!(crash_files(&dir).len(), 1);
    }

    #[test]
    fn test_fatal_rejecting_global_logger_falls_back() {
        struct RejectAll;
        impl Log for RejectAll {
            fn enabled(&self, _level: LogLevel) -> bool {
                false
            }
            fn write(&self, _entry: LogEntry) {}
            fn flush(&self) -> Result<()> {
                Ok(())
            }
            fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
                self
            }
        }

        let dir = TempDir::new().unwrap();
        let handle = LoggerHandle::new();
        handle.install(Arc::new(RejectAll));

        let options = CrashGuardOptions {
            console: WriteCondition::Never,
            file: WriteCondition::IfGlobalLoggerMissed,
            crash_dir: dir.path().to_path_buf(),
        };
        let guard = CrashGuard::new(handle, options).unwrap();
        guard.report_unobserved("nobody listening");

        assert_eq!(crash_files(&dir).len(), 1);
    }

    #[test]
    fn test_invalid_options_rejected_at_arming() {
        let options = CrashGuardOptions {
            console: WriteCondition::Always,
            file: WriteCondition::Always,
            crash_dir: std::path::PathBuf::new(),
        };
        assert!(CrashGuard::new(LoggerHandle::new(), options).is_err());
    }
}
