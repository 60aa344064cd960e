//! Appender trait for log output destinations
//!
//! An appender owns one concrete destination (console stream, log file, …).
//! Appenders are driven from behind the pipeline's write lock, so `append`
//! and `flush` take `&mut self` and need no internal synchronization.

use super::{error::Result, log_entry::LogEntry};

pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
