//! Fast logger facade
//!
//! The facade sits on every log call, so the expensive question ("is the
//! current logger the concrete [`Pipeline`], or just some `dyn Log`?") is
//! answered once per logger swap instead of once per call. It
//! holds the general interface and, when the downcast succeeds, a direct
//! view of the pipeline; small fixed-arity calls go straight through that
//! view, dynamically-shaped calls fall back to the interface with a
//! severity pre-check so no property map is built for an entry that would
//! be filtered anyway.

use super::handle::Slot;
use crate::core::{FieldValue, Log, LogContext, LogEntry, LogLevel, Pipeline, Result};
use std::sync::Arc;

/// Property counts up to this take the fast path directly; the pipeline
/// gates them internally.
const FAST_PATH_MAX_PROPERTIES: usize = 3;

pub struct FastLogger {
    slot: Option<Arc<Slot>>,
    log: Option<Arc<dyn Log>>,
    fast: Option<Arc<Pipeline>>,
}

impl FastLogger {
    pub(crate) fn over(slot: Option<Arc<Slot>>) -> Self {
        let log = slot.as_ref().map(|s| Arc::clone(&s.log));
        let fast = log
            .as_ref()
            .and_then(|l| Arc::clone(l).as_any_arc().downcast::<Pipeline>().ok());
        Self { slot, log, fast }
    }

    /// Whether this facade was built over `live`; identity, not equality.
    pub(crate) fn tracks(&self, live: Option<&Arc<Slot>>) -> bool {
        match (&self.slot, live) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether the underlying logger is the concrete pipeline.
    pub fn is_fast(&self) -> bool {
        self.fast.is_some()
    }

    /// The underlying logger, when one is installed.
    pub fn target(&self) -> Option<Arc<dyn Log>> {
        self.log.clone()
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        match (&self.fast, &self.log) {
            (Some(pipeline), _) => pipeline.enabled(level),
            (None, Some(log)) => log.enabled(level),
            (None, None) => false,
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if let Some(pipeline) = &self.fast {
            pipeline.log(level, message);
            return;
        }
        let Some(log) = &self.log else { return };
        if !log.enabled(level) {
            return;
        }
        log.write(LogEntry::new(level, message.into()));
    }

    /// Log with a small, fixed set of structured properties.
    pub fn log_kv(&self, level: LogLevel, message: &str, properties: &[(&str, FieldValue)]) {
        if let Some(pipeline) = &self.fast {
            if properties.len() <= FAST_PATH_MAX_PROPERTIES {
                pipeline.log_kv(level, message, properties);
                return;
            }
        }
        let Some(log) = &self.log else { return };
        // Gate before materializing the property map
        if !log.enabled(level) {
            return;
        }
        let mut entry = LogEntry::new(level, message.to_string());
        if !properties.is_empty() {
            let context = entry.context_mut();
            for (key, value) in properties {
                context.add_field(*key, value.clone());
            }
        }
        log.write(entry);
    }

    /// Log with a dynamically built context. The builder only runs when the
    /// entry would be accepted.
    pub fn log_with(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        build: impl FnOnce(&mut LogContext),
    ) {
        if !self.enabled(level) {
            return;
        }
        let mut entry = LogEntry::new(level, message.into());
        build(entry.context_mut());
        self.write_entry(entry);
    }

    /// Hand a fully formed entry to the underlying logger.
    pub fn write_entry(&self, entry: LogEntry) {
        if let Some(pipeline) = &self.fast {
            pipeline.write_entry(entry);
            return;
        }
        if let Some(log) = &self.log {
            log.write(entry);
        }
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

    pub fn flush(&self) -> Result<()> {
        match &self.log {
            Some(log) => log.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineMetrics;
    use parking_lot::Mutex;
    use std::any::Any;

    struct RecordingLog {
        min: LogLevel,
        entries: Arc<Mutex<Vec<LogEntry>>>,
        enabled_calls: Arc<Mutex<usize>>,
    }

    impl Log for RecordingLog {
        fn enabled(&self, level: LogLevel) -> bool {
            *self.enabled_calls.lock() += 1;
            level >= self.min
        }

        fn write(&self, entry: LogEntry) {
            self.entries.lock().push(entry);
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn facade_over_stub(min: LogLevel) -> (FastLogger, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let log: Arc<dyn Log> = Arc::new(RecordingLog {
            min,
            entries: Arc::clone(&entries),
            enabled_calls: Arc::new(Mutex::new(0)),
        });
        let facade = FastLogger::over(Some(Arc::new(Slot { log })));
        (facade, entries)
    }

    #[test]
    fn test_general_interface_fallback() {
        let (facade, entries) = facade_over_stub(LogLevel::Info);
        assert!(!facade.is_fast());

        facade.info("through the interface");
        facade.debug("gated away");
        assert_eq!(entries.lock().len(), 1);
    }

    #[test]
    fn test_fast_path_over_pipeline() {
        let pipeline = Arc::new(Pipeline::assemble(
            LogLevel::Info,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Arc::new(PipelineMetrics::new()),
        ));
        let facade = FastLogger::over(Some(Arc::new(Slot { log: pipeline })));
        assert!(facade.is_fast());
        assert!(facade.enabled(LogLevel::Info));
        assert!(!facade.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_log_kv_attaches_properties_via_interface() {
        let (facade, entries) = facade_over_stub(LogLevel::Trace);
        facade.log_kv(
            LogLevel::Info,
            "sized call",
            &[
                ("a", FieldValue::Int(1)),
                ("b", FieldValue::Int(2)),
                ("c", FieldValue::Int(3)),
                ("d", FieldValue::Int(4)),
            ],
        );
        let entries = entries.lock();
        assert_eq!(entries[0].context.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_log_with_skips_builder_when_gated() {
        let (facade, entries) = facade_over_stub(LogLevel::Error);
        let mut built = false;
        facade.log_with(LogLevel::Debug, "never built", |_| built = true);
        assert!(!built);
        assert!(entries.lock().is_empty());
    }

    #[test]
    fn test_empty_facade_is_inert() {
        let facade = FastLogger::over(None);
        assert!(!facade.enabled(LogLevel::Fatal));
        facade.fatal("nowhere to go");
        facade.flush().unwrap();
    }
}
