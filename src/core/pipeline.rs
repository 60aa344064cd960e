//! The built logging pipeline and the traits it is assembled from
//!
//! A [`Pipeline`] is the immutable product of one successful build: a
//! minimum-severity gate (default plus per-source overrides), an ordered set
//! of enrichers, an ordered set of filters, and an ordered set of appenders.
//! Reconfiguration means building a new pipeline and swapping it into the
//! [`LoggerHandle`](crate::global::LoggerHandle).

use super::{
    appender::Appender,
    error::Result,
    log_context::FieldValue,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::PipelineMetrics,
};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// The general logging interface.
///
/// [`Pipeline`] is the canonical implementation; test doubles and wrappers
/// implement it too. The fast facade recovers the concrete pipeline from a
/// `dyn Log` through [`Log::as_any_arc`].
pub trait Log: Send + Sync + 'static {
    /// Would an entry of `level` pass this logger's default gate?
    fn enabled(&self, level: LogLevel) -> bool;

    /// Write one entry. Gating, enrichment and filtering happen inside.
    fn write(&self, entry: LogEntry);

    /// Flush buffered output on every destination.
    fn flush(&self) -> Result<()>;

    /// Identity-preserving upcast used for downcasting to a concrete type.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Annotates entries with additional structured fields.
pub trait Enricher: Send + Sync {
    fn enrich(&self, entry: &mut LogEntry);
}

/// Suppresses entries before they reach any destination.
pub trait LogFilter: Send + Sync {
    fn allow(&self, entry: &LogEntry) -> bool;
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("min_level", &self.min_level)
            .field("overrides", &self.overrides)
            .field("enrichers", &self.enrichers.len())
            .field("filters", &self.filters.len())
            .field("appenders", &self.appenders.read().len())
            .finish()
    }
}

pub struct Pipeline {
    min_level: LogLevel,
    /// Per-source overrides, longest matching source prefix wins.
    overrides: Vec<(String, LogLevel)>,
    enrichers: Vec<Box<dyn Enricher>>,
    filters: Vec<Box<dyn LogFilter>>,
    appenders: RwLock<Vec<Box<dyn Appender>>>,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    pub(crate) fn assemble(
        min_level: LogLevel,
        overrides: Vec<(String, LogLevel)>,
        enrichers: Vec<Box<dyn Enricher>>,
        filters: Vec<Box<dyn LogFilter>>,
        appenders: Vec<Box<dyn Appender>>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            min_level,
            overrides,
            enrichers,
            filters,
            appenders: RwLock::new(appenders),
            metrics,
        }
    }

    /// The default minimum level entries must reach.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Whether a sourceless entry of `level` would pass the gate.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Whether an entry of `level` from `source` would pass the gate.
    pub fn enabled_for(&self, level: LogLevel, source: &str) -> bool {
        level >= self.effective_level(Some(source))
    }

    /// Resolve the minimum level for a source: the longest override whose
    /// key is the source itself or a `.`/`:`-separated prefix of it, else
    /// the default.
    fn effective_level(&self, source: Option<&str>) -> LogLevel {
        let Some(source) = source else {
            return self.min_level;
        };
        let mut best: Option<(&str, LogLevel)> = None;
        for (prefix, level) in &self.overrides {
            let covers = source == prefix
                || (source.starts_with(prefix.as_str())
                    && matches!(source.as_bytes().get(prefix.len()), Some(b'.') | Some(b':')));
            if covers && best.is_none_or(|(b, _)| prefix.len() > b.len()) {
                best = Some((prefix, *level));
            }
        }
        best.map_or(self.min_level, |(_, level)| level)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        self.write_entry(LogEntry::new(level, message.into()));
    }

    /// Log with a source that participates in per-source overrides.
    pub fn log_from(&self, source: &str, level: LogLevel, message: impl Into<String>) {
        if level < self.effective_level(Some(source)) {
            return;
        }
        self.write_entry(LogEntry::new(level, message.into()).with_source(source));
    }

    /// Log with a small, fixed set of structured properties.
    ///
    /// The hot path of the fast facade: the level gate runs before any
    /// context is materialized.
    pub fn log_kv(&self, level: LogLevel, message: &str, properties: &[(&str, FieldValue)]) {
        if !self.enabled(level) {
            return;
        }
        let mut entry = LogEntry::new(level, message.to_string());
        if !properties.is_empty() {
            let context = entry.context_mut();
            for (key, value) in properties {
                context.add_field(*key, value.clone());
            }
        }
        self.write_entry(entry);
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Run one entry through gate, enrichers, filters and appenders.
    pub fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.effective_level(entry.source.as_deref()) {
            return;
        }

        for enricher in &self.enrichers {
            enricher.enrich(&mut entry);
        }

        for filter in &self.filters {
            if !filter.allow(&entry) {
                self.metrics.record_filtered();
                return;
            }
        }

        let mut appenders = self.appenders.write();
        Self::dispatch(&mut appenders, &entry, &self.metrics);
    }

    /// Hand an entry to every appender with per-appender panic isolation:
    /// one failing appender must not keep the others from writing.
    fn dispatch(
        appenders: &mut [Box<dyn Appender>],
        entry: &LogEntry,
        metrics: &PipelineMetrics,
    ) -> bool {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let append_result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.append(entry)));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[PIPELOG ERROR] Appender #{} failed: {}", idx, e);
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[PIPELOG CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx, panic_msg
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }
}

impl Log for Pipeline {
    fn enabled(&self, level: LogLevel) -> bool {
        Pipeline::enabled(self, level)
    }

    fn write(&self, entry: LogEntry) {
        self.write_entry(entry);
    }

    fn flush(&self) -> Result<()> {
        Pipeline::flush(self)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
