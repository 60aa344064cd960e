//! Pipeline construction from configuration
//!
//! [`build_pipeline`] turns a `logging` configuration section plus a set of
//! appliers into one immutable [`Pipeline`], in a fixed order: minimum
//! levels, profiles, enrichments, filters, assembly. The first validation
//! failure at any step aborts the whole build; there is no partial pipeline.

pub mod enrichments;
pub mod filters;
pub mod profile;
pub mod profiles;
pub mod registry;

pub use enrichments::{EnrichmentApplier, ThreadEnrichment};
pub use filters::{FilterApplier, SamplingFilterApplier};
pub use profile::ProfileConfig;
pub use profiles::{ConsoleProfile, FileProfile, ProfileApplier};

use crate::appenders::AsyncSink;
use crate::config::ConfigSection;
use crate::core::error::{ConfigError, ConfigResult, Result};
use crate::core::{
    Appender, Enricher, LogEntry, LogFilter, LogLevel, Pipeline, PipelineMetrics,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Facts about the running application that path templates and appliers
/// draw on.
#[derive(Debug, Clone)]
pub struct BuildEnvironment {
    pub app_name: String,
    pub content_root: PathBuf,
    pub launch_timestamp: DateTime<Utc>,
}

impl BuildEnvironment {
    pub fn new(
        app_name: impl Into<String>,
        content_root: impl Into<PathBuf>,
        launch_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            content_root: content_root.into(),
            launch_timestamp,
        }
    }

    /// Derive the environment from the current process: executable stem,
    /// working directory, now.
    pub fn detect() -> Self {
        let app_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "app".to_string());
        let content_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(app_name, content_root, Utc::now())
    }
}

/// Gates one appender on a per-destination minimum level.
struct LevelGate {
    min_level: LogLevel,
    inner: Box<dyn Appender>,
}

impl Appender for LevelGate {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            self.inner.append(entry)
        } else {
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// The write-destination builder handed to profile appliers.
pub struct SinkSet {
    appenders: Vec<Box<dyn Appender>>,
    metrics: Arc<PipelineMetrics>,
}

impl SinkSet {
    fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            appenders: Vec::new(),
            metrics,
        }
    }

    /// Install one sink: `sync = false` wraps it in an asynchronous worker,
    /// and a per-destination minimum level above Trace adds a level gate in
    /// front of the queue so filtered entries are never queued.
    pub fn install(&mut self, min_level: LogLevel, sync: bool, appender: Box<dyn Appender>) {
        let appender: Box<dyn Appender> = if sync {
            appender
        } else {
            Box::new(AsyncSink::new(appender, Arc::clone(&self.metrics)))
        };
        let appender: Box<dyn Appender> = if min_level > LogLevel::Trace {
            Box::new(LevelGate {
                min_level,
                inner: appender,
            })
        } else {
            appender
        };
        self.appenders.push(appender);
    }

    pub fn len(&self) -> usize {
        self.appenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.is_empty()
    }

    fn into_inner(self) -> Vec<Box<dyn Appender>> {
        self.appenders
    }
}

/// The enrichment builder handed to enrichment appliers.
#[derive(Default)]
pub struct EnrichmentSet {
    enrichers: Vec<Box<dyn Enricher>>,
}

impl EnrichmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, enricher: impl Enricher + 'static) {
        self.enrichers.push(Box::new(enricher));
    }

    pub fn len(&self) -> usize {
        self.enrichers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrichers.is_empty()
    }

    fn into_inner(self) -> Vec<Box<dyn Enricher>> {
        self.enrichers
    }
}

/// The filter builder handed to filter appliers.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn LogFilter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, filter: impl LogFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    fn into_inner(self) -> Vec<Box<dyn LogFilter>> {
        self.filters
    }
}

/// The built-in profile appliers: `console` and `file`.
pub fn builtin_profile_appliers(environment: &BuildEnvironment) -> Vec<Arc<dyn ProfileApplier>> {
    vec![
        Arc::new(ConsoleProfile),
        Arc::new(FileProfile::new(environment.clone())),
    ]
}

/// The built-in enrichment appliers: `thread`.
pub fn builtin_enrichment_appliers() -> Vec<Arc<dyn EnrichmentApplier>> {
    vec![Arc::new(ThreadEnrichment)]
}

/// The built-in filter appliers: `sampling`.
pub fn builtin_filter_appliers() -> Vec<Arc<dyn FilterApplier>> {
    vec![Arc::new(SamplingFilterApplier)]
}

/// Build a pipeline from a `logging` section and explicit applier sets.
pub fn build_pipeline(
    conf: &ConfigSection<'_>,
    profile_appliers: &[Arc<dyn ProfileApplier>],
    enrichment_appliers: &[Arc<dyn EnrichmentApplier>],
    filter_appliers: &[Arc<dyn FilterApplier>],
) -> ConfigResult<Pipeline> {
    let profile_map = registry::index_profile_appliers(profile_appliers)?;
    let enrichment_map = registry::index_enrichment_appliers(enrichment_appliers)?;
    let filter_map = registry::index_filter_appliers(filter_appliers)?;

    let min_levels = conf.section("minLevels");
    let default_level = min_levels.read_enum("default", Some(LogLevel::Info))?;
    let mut overrides = Vec::new();
    for (source, override_conf) in min_levels.section("overrides").children() {
        if source.trim().is_empty() {
            return Err(ConfigError::SourceNotSpecified {
                path: override_conf.path().to_string(),
            });
        }
        let level = override_conf.read_enum_value::<LogLevel>(None)?;
        overrides.push((source, level));
    }

    let metrics = Arc::new(PipelineMetrics::new());

    let mut sinks = SinkSet::new(Arc::clone(&metrics));
    for (_, profile_section) in conf.section("profiles").children() {
        let profile_conf = ProfileConfig::new(profile_section)?;
        match profile_map.get(profile_conf.profile_type()) {
            Some(applier) => applier.apply(&mut sinks, &profile_conf)?,
            None => {
                return Err(ConfigError::UnknownProfileType {
                    path: profile_conf.path().to_string(),
                    name: profile_conf.profile_type().to_string(),
                })
            }
        }
    }

    let mut enrichment_set = EnrichmentSet::new();
    for (name, enrichment_conf) in conf.section("enrichments").children() {
        let name = name.to_lowercase();
        match enrichment_map.get(&name) {
            Some(applier) => applier.apply(&mut enrichment_set, &enrichment_conf)?,
            None => {
                return Err(ConfigError::UnknownEnrichment {
                    path: enrichment_conf.path().to_string(),
                    name,
                })
            }
        }
    }

    let mut filter_set = FilterSet::new();
    for (name, filter_conf) in conf.section("filters").children() {
        let name = name.to_lowercase();
        match filter_map.get(&name) {
            Some(applier) => applier.apply(&mut filter_set, &filter_conf)?,
            None => {
                return Err(ConfigError::UnknownFilter {
                    path: filter_conf.path().to_string(),
                    name,
                })
            }
        }
    }

    Ok(Pipeline::assemble(
        default_level,
        overrides,
        enrichment_set.into_inner(),
        filter_set.into_inner(),
        sinks.into_inner(),
        metrics,
    ))
}

/// Build from the root of a configuration tree with the built-in appliers:
/// reads the `logging` section and detects the environment's defaults from
/// `environment`.
pub fn build_from_value(
    root: &serde_json::Value,
    environment: &BuildEnvironment,
) -> ConfigResult<Pipeline> {
    let root_section = ConfigSection::root(root);
    let logging = root_section.section("logging");
    build_pipeline(
        &logging,
        &builtin_profile_appliers(environment),
        &builtin_enrichment_appliers(),
        &builtin_filter_appliers(),
    )
}
