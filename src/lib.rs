//! # Pipelog
//!
//! A structured-logging pipeline built from declarative configuration, with
//! a crash guard that keeps diagnostics flowing even when the pipeline
//! itself is broken.
//!
//! ## Features
//!
//! - **Configured Pipelines**: destinations, enrichments and filters
//!   resolved by name from a configuration tree, with strict, path-qualified
//!   validation
//! - **Pluggable Extensions**: register profile, enrichment and filter
//!   appliers; conflicting registrations fail before configuration is read
//! - **Lock-Free Current Logger**: an atomically swappable logger slot with
//!   a cached fast facade for the hot path
//! - **Crash Guard**: a last-resort logger for unhandled failures that works
//!   with or without a configured pipeline
//!
//! ## Example
//!
//! ```
//! use pipelog::build::{build_from_value, BuildEnvironment};
//! use pipelog::crash::CrashGuard;
//! use pipelog::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let config = json!({
//!     "logging": {
//!         "minLevels": {"default": "info"},
//!         "profiles": {
//!             "main": {"type": "console", "sync": "true"}
//!         }
//!     }
//! });
//!
//! let handle = LoggerHandle::new();
//! let _guard = CrashGuard::install_with_defaults(handle.clone()).unwrap();
//!
//! let pipeline = build_from_value(&config, &BuildEnvironment::detect()).unwrap();
//! handle.install(Arc::new(pipeline));
//!
//! handle.logger().info("service started");
//! ```

pub mod appenders;
pub mod build;
pub mod config;
pub mod core;
pub mod crash;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, RollingFileAppender};
    pub use crate::build::{
        build_pipeline, BuildEnvironment, EnrichmentApplier, EnrichmentSet, FilterApplier,
        FilterSet, ProfileApplier, ProfileConfig, SinkSet,
    };
    pub use crate::config::{ConfigSection, NumberSigns};
    pub use crate::core::{
        Appender, ConfigError, ConfigResult, Enricher, ExtensionKind, FieldValue, Log, LogContext,
        LogEntry, LogFilter, LogLevel, LoggerError, OutputFormat, Pipeline, PipelineMetrics,
        Result, TimestampFormat,
    };
    pub use crate::crash::{CrashGuard, CrashGuardOptions, WriteCondition};
    pub use crate::global::{ActivationGuard, FastLogger, LoggerHandle};
}

pub use crate::build::{build_from_value, build_pipeline, BuildEnvironment};
pub use crate::config::{ConfigSection, NumberSigns};
pub use crate::core::{
    Appender, ConfigError, ConfigResult, Enricher, ExtensionKind, FieldValue, Log, LogContext,
    LogEntry, LogFilter, LogLevel, LoggerError, OutputFormat, Pipeline, PipelineMetrics, Result,
    TimestampFormat,
};
pub use crate::crash::{CrashGuard, CrashGuardOptions, WriteCondition};
pub use crate::global::{ActivationGuard, FastLogger, LoggerHandle};
