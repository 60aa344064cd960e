//! Appender implementations

pub mod async_sink;
pub mod console;
pub mod file;
pub mod rolling_file;

pub use async_sink::{AsyncSink, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use rolling_file::RollingFileAppender;

pub use crate::core::Appender;
