//! Name-keyed applier registries
//!
//! Indexing validates the applier set before any configuration is read: each
//! applier claims one case-insensitive name, and a second applier claiming
//! an already-taken name is a conflict naming both sides. The resulting maps
//! are built once per pipeline build and never mutated afterwards.

use super::enrichments::EnrichmentApplier;
use super::filters::FilterApplier;
use super::profiles::ProfileApplier;
use crate::core::error::{ConfigError, ConfigResult, ExtensionKind};
use std::collections::HashMap;
use std::sync::Arc;

fn index_named<A: ?Sized>(
    kind: ExtensionKind,
    appliers: &[Arc<A>],
    name_of: impl Fn(&A) -> String,
    label_of: impl Fn(&A) -> &'static str,
) -> ConfigResult<HashMap<String, Arc<A>>> {
    let mut map: HashMap<String, Arc<A>> = HashMap::new();
    for applier in appliers {
        let name = name_of(applier);
        if let Some(existing) = map.get(&name) {
            return Err(ConfigError::conflicting(
                kind,
                name,
                label_of(existing),
                label_of(applier),
            ));
        }
        map.insert(name, Arc::clone(applier));
    }
    Ok(map)
}

pub fn index_profile_appliers(
    appliers: &[Arc<dyn ProfileApplier>],
) -> ConfigResult<HashMap<String, Arc<dyn ProfileApplier>>> {
    index_named(
        ExtensionKind::Profile,
        appliers,
        |a| a.name().to_lowercase(),
        |a| a.label(),
    )
}

pub fn index_enrichment_appliers(
    appliers: &[Arc<dyn EnrichmentApplier>],
) -> ConfigResult<HashMap<String, Arc<dyn EnrichmentApplier>>> {
    index_named(
        ExtensionKind::Enrichment,
        appliers,
        |a| a.name().to_lowercase(),
        |a| a.label(),
    )
}

pub fn index_filter_appliers(
    appliers: &[Arc<dyn FilterApplier>],
) -> ConfigResult<HashMap<String, Arc<dyn FilterApplier>>> {
    index_named(
        ExtensionKind::Filter,
        appliers,
        |a| a.name().to_lowercase(),
        |a| a.label(),
    )
}
