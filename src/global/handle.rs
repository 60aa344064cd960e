//! Process-wide logger slot
//!
//! A [`LoggerHandle`] is a cheaply cloneable handle around the one shared
//! mutable piece of state in the crate: the current logger. Replacement is
//! an atomic swap, reads are lock-free, and a reader can never observe a
//! torn value. Components that need "the current logger" take a handle as
//! an explicit dependency instead of reaching for a global.

use super::facade::FastLogger;
use crate::core::{Log, LogLevel, Result};
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// The installed logger. An extra indirection keeps the slot a thin
/// pointer, which is what the atomic swap needs.
pub(crate) struct Slot {
    pub(crate) log: Arc<dyn Log>,
}

struct HandleShared {
    current: ArcSwapOption<Slot>,
    facade: ArcSwapOption<FastLogger>,
}

#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<HandleShared>,
}

impl LoggerHandle {
    /// A handle with no logger installed.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HandleShared {
                current: ArcSwapOption::from(None),
                facade: ArcSwapOption::from(None),
            }),
        }
    }

    /// Replace the current logger, returning the one that was installed
    /// before. Atomic with respect to concurrent [`get`](Self::get) calls.
    pub fn install(&self, log: Arc<dyn Log>) -> Option<Arc<dyn Log>> {
        let previous = self.inner.current.swap(Some(Arc::new(Slot { log })));
        previous.map(|slot| Arc::clone(&slot.log))
    }

    /// The currently installed logger, if any.
    pub fn get(&self) -> Option<Arc<dyn Log>> {
        self.inner
            .current
            .load_full()
            .map(|slot| Arc::clone(&slot.log))
    }

    /// Whether the current logger would accept an entry of `level`. With no
    /// logger installed nothing is accepted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.inner
            .current
            .load()
            .as_ref()
            .is_some_and(|slot| slot.log.enabled(level))
    }

    /// Install a logger for a scope. Dropping the returned guard puts the
    /// previously installed logger back and flushes the deactivated one.
    pub fn activate(&self, log: Arc<dyn Log>) -> ActivationGuard {
        let previous = self.inner.current.swap(Some(Arc::new(Slot { log })));
        ActivationGuard {
            handle: self.clone(),
            previous,
        }
    }

    /// The cached facade over the current logger.
    ///
    /// While the slot is unchanged this returns the same `Arc` without
    /// allocating. After a swap, the first caller builds a fresh facade and
    /// installs it with a compare-and-swap; a caller that loses the race
    /// retries against the winner, so at most one facade is current at a
    /// time and no thread ever blocks another.
    pub fn logger(&self) -> Arc<FastLogger> {
        loop {
            let live = self.inner.current.load_full();
            let cached = self.inner.facade.load_full();

            if let Some(facade) = cached.as_ref() {
                if facade.tracks(live.as_ref()) {
                    return Arc::clone(facade);
                }
            }

            let fresh = Arc::new(FastLogger::over(live));
            let prior = self
                .inner
                .facade
                .compare_and_swap(&cached, Some(Arc::clone(&fresh)));
            let swapped = match (&*prior, &cached) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            };
            if swapped {
                return fresh;
            }
        }
    }

    /// Flush the current logger's destinations.
    pub fn flush(&self) -> Result<()> {
        match self.get() {
            Some(log) => log.flush(),
            None => Ok(()),
        }
    }

    /// Take the current logger out of the slot and flush it. Flush failures
    /// are reported but never keep the slot from emptying.
    pub fn shutdown(&self) {
        if let Some(slot) = self.inner.current.swap(None) {
            if let Err(e) = slot.log.flush() {
                eprintln!("[PIPELOG WARNING] Failed to flush logger during shutdown: {}", e);
            }
        }
    }
}

impl Default for LoggerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the previously installed logger when dropped.
pub struct ActivationGuard {
    handle: LoggerHandle,
    previous: Option<Arc<Slot>>,
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        let deactivated = self.handle.inner.current.swap(self.previous.take());
        if let Some(slot) = deactivated {
            if let Err(e) = slot.log.flush() {
                eprintln!(
                    "[PIPELOG WARNING] Failed to flush deactivated logger: {}",
                    e
                );
            }
        }
    }
}
