//! Core pipeline types and traits

pub mod appender;
pub mod error;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod metrics;
pub mod output_format;
pub mod pipeline;
pub mod timestamp;

pub use appender::Appender;
pub use error::{ConfigError, ConfigResult, ExtensionKind, LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use metrics::PipelineMetrics;
pub use output_format::OutputFormat;
pub use pipeline::{Enricher, Log, LogFilter, Pipeline};
pub use timestamp::TimestampFormat;
