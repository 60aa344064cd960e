//! Enrichment appliers and the enrichers they attach

use super::EnrichmentSet;
use crate::config::ConfigSection;
use crate::core::error::ConfigResult;
use crate::core::{Enricher, LogEntry};
use std::cell::RefCell;

/// Attaches enrichers for one configured enrichment name.
pub trait EnrichmentApplier: Send + Sync {
    /// The enrichment entry key this applier claims, matched
    /// case-insensitively.
    fn name(&self) -> &str;

    /// Human label used in conflict diagnostics.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, enrich: &mut EnrichmentSet, conf: &ConfigSection<'_>) -> ConfigResult<()>;
}

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(format!("{:?}", std::thread::current().id()));
        }
        cache
            .as_ref()
            .expect("thread_id cache initialized in previous line")
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(std::thread::current().name().map(String::from));
        }
        cache
            .as_ref()
            .expect("thread_name cache initialized in previous line")
            .clone()
    })
}

/// Attaches the calling thread's id as `thread_id`.
pub struct ThreadIdEnricher;

impl Enricher for ThreadIdEnricher {
    fn enrich(&self, entry: &mut LogEntry) {
        entry
            .context_mut()
            .add_field_if_absent("thread_id", current_thread_id());
    }
}

/// Attaches the calling thread's name as `thread_name`, when it has one.
pub struct ThreadNameEnricher;

impl Enricher for ThreadNameEnricher {
    fn enrich(&self, entry: &mut LogEntry) {
        if let Some(name) = current_thread_name() {
            entry.context_mut().add_field_if_absent("thread_name", name);
        }
    }
}

/// `thread` enrichment: a boolean leaf; `true` attaches both thread
/// enrichers, `false` (or absence) attaches nothing.
pub struct ThreadEnrichment;

impl EnrichmentApplier for ThreadEnrichment {
    fn name(&self) -> &str {
        "thread"
    }

    fn apply(&self, enrich: &mut EnrichmentSet, conf: &ConfigSection<'_>) -> ConfigResult<()> {
        if conf.read_bool_value(Some(false))? {
            enrich.attach(ThreadIdEnricher);
            enrich.attach(ThreadNameEnricher);
        }
        Ok(())
    }
}
