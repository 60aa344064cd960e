//! Validated view of one profile's configuration

use crate::config::ConfigSection;
use crate::core::error::ConfigResult;
use crate::core::{LogLevel, OutputFormat, TimestampFormat};
use std::ops::Deref;

/// A profile section with its common leaves validated up front.
///
/// `type` is required (and lowercased for applier lookup); `minLevel`
/// defaults to the most verbose level so a destination without one sees
/// everything the pipeline's own gate lets through. The raw section stays
/// reachable (via `Deref`) for profile-specific leaves.
#[derive(Debug)]
pub struct ProfileConfig<'a> {
    section: ConfigSection<'a>,
    min_level: LogLevel,
    profile_type: String,
}

impl<'a> ProfileConfig<'a> {
    pub fn new(section: ConfigSection<'a>) -> ConfigResult<Self> {
        let min_level = section.read_enum("minLevel", Some(LogLevel::Trace))?;
        let profile_type = section.read_string("type")?.to_lowercase();
        Ok(Self {
            section,
            min_level,
            profile_type,
        })
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn profile_type(&self) -> &str {
        &self.profile_type
    }

    /// The profile's required `sync` flag.
    pub fn sync(&self) -> ConfigResult<bool> {
        self.section.read_bool("sync", None)
    }

    /// The profile's `format` leaf, defaulting to text.
    pub fn output_format(&self) -> ConfigResult<OutputFormat> {
        self.section.read_enum("format", Some(OutputFormat::Text))
    }

    /// The profile's `timestamp` leaf, defaulting to ISO 8601.
    pub fn timestamp_format(&self) -> ConfigResult<TimestampFormat> {
        self.section
            .read_enum("timestamp", Some(TimestampFormat::Iso8601))
    }
}

impl<'a> Deref for ProfileConfig<'a> {
    type Target = ConfigSection<'a>;

    fn deref(&self) -> &ConfigSection<'a> {
        &self.section
    }
}
