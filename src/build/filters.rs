//! Filter appliers and the filters they install

use super::FilterSet;
use crate::config::{ConfigSection, NumberSigns};
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::{LogEntry, LogFilter};
use rand::Rng;

/// Installs filters for one configured filter name.
pub trait FilterApplier: Send + Sync {
    /// The filter entry key this applier claims, matched case-insensitively.
    fn name(&self) -> &str;

    /// Human label used in conflict diagnostics.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, filters: &mut FilterSet, conf: &ConfigSection<'_>) -> ConfigResult<()>;
}

/// Probabilistic sampling filter.
///
/// Keeps roughly `rate` of non-critical entries; Error and Fatal always
/// pass.
pub struct SamplingFilter {
    rate: f64,
}

impl SamplingFilter {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl LogFilter for SamplingFilter {
    fn allow(&self, entry: &LogEntry) -> bool {
        entry.level.is_critical() || rand::thread_rng().gen::<f64>() < self.rate
    }
}

/// `sampling` filter: the entry's value is a percentage (0-100) of
/// non-critical entries to keep.
pub struct SamplingFilterApplier;

impl FilterApplier for SamplingFilterApplier {
    fn name(&self) -> &str {
        "sampling"
    }

    fn apply(&self, filters: &mut FilterSet, conf: &ConfigSection<'_>) -> ConfigResult<()> {
        let percent = conf.read_i64_value(NumberSigns::ZERO | NumberSigns::POSITIVE, None)?;
        if percent > 100 {
            return Err(ConfigError::out_of_range(conf.path(), percent.to_string()));
        }
        filters.install(SamplingFilter::new(percent as f64 / 100.0));
        Ok(())
    }
}
