//! Pipeline metrics for observability
//!
//! Counters for monitoring pipeline health: suppressed entries, entries
//! dropped on queue overflow or appender failure, and critical entries that
//! were force-written past a full queue.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct PipelineMetrics {
    /// Entries handed to every appender without error
    logged: AtomicU64,

    /// Entries lost to queue overflow or appender failure
    dropped: AtomicU64,

    /// Entries suppressed by a configured filter
    filtered: AtomicU64,

    /// Times an asynchronous sink's queue was found full
    queue_full_events: AtomicU64,

    /// Critical entries force-written synchronously past a full queue
    critical_preserved: AtomicU64,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            logged: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            critical_preserved: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn critical_preserved(&self) -> u64 {
        self.critical_preserved.load(Ordering::Relaxed)
    }

    /// Record a successfully written entry
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped entry; returns the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an entry suppressed by a filter
    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a full-queue event
    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a critical entry preserved past a full queue
    #[inline]
    pub fn record_critical_preserved(&self) -> u64 {
        self.critical_preserved.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop rate as a percentage (0.0 - 100.0) of attempted writes.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped() as f64;
        let total = self.logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
