//! Destination profile appliers
//!
//! A profile applier turns one validated profile section into concrete
//! sinks. The built-ins cover the console and a size-rolling log file; hosts
//! register additional appliers for their own destinations.

use super::profile::ProfileConfig;
use super::{BuildEnvironment, SinkSet};
use crate::appenders::{ConsoleAppender, RollingFileAppender};
use crate::config::NumberSigns;
use crate::core::error::{ConfigError, ConfigResult};
use std::path::Path;

/// Configures sinks for one profile `type`.
pub trait ProfileApplier: Send + Sync {
    /// The profile `type` value this applier claims, matched
    /// case-insensitively.
    fn name(&self) -> &str;

    /// Human label used in conflict diagnostics.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, sinks: &mut SinkSet, conf: &ProfileConfig<'_>) -> ConfigResult<()>;
}

/// `console` profile: colored text (or structured output) on stdout/stderr.
pub struct ConsoleProfile;

impl ProfileApplier for ConsoleProfile {
    fn name(&self) -> &str {
        "console"
    }

    fn apply(&self, sinks: &mut SinkSet, conf: &ProfileConfig<'_>) -> ConfigResult<()> {
        let sync = conf.sync()?;
        let format = conf.output_format()?;
        let timestamp = conf.timestamp_format()?;
        let colors = conf.read_bool("colors", Some(true))?;

        let appender = ConsoleAppender::with_colors(colors)
            .with_output_format(format)
            .with_timestamp_format(timestamp);
        sinks.install(conf.min_level(), sync, Box::new(appender));
        Ok(())
    }
}

/// `file` profile: size-rolling log file with optional retention and
/// compression. The `path` leaf is a template; `{app}` and `{launchUtc}`
/// expand from the build environment.
pub struct FileProfile {
    environment: BuildEnvironment,
}

impl FileProfile {
    pub fn new(environment: BuildEnvironment) -> Self {
        Self { environment }
    }
}

impl ProfileApplier for FileProfile {
    fn name(&self) -> &str {
        "file"
    }

    fn apply(&self, sinks: &mut SinkSet, conf: &ProfileConfig<'_>) -> ConfigResult<()> {
        let sync = conf.sync()?;
        let format = conf.output_format()?;
        let timestamp = conf.timestamp_format()?;

        let template = conf.read_string("path")?;
        let path_key = conf.child_path("path");
        if template.trim().is_empty() {
            return Err(ConfigError::EmptyValue { path: path_key });
        }

        let expanded = expand_path_template(&template, &self.environment);
        if expanded.contains('\0') {
            return Err(ConfigError::invalid_value(path_key, template));
        }

        let full_path = if Path::new(&expanded).is_absolute() {
            expanded.into()
        } else {
            self.environment.content_root.join(expanded)
        };

        let max_size = conf.read_i64("maxSize", NumberSigns::POSITIVE, Some(1 << 30))?;
        let retained = conf.read_i32_if_present("retainedFileCountLimit", NumberSigns::POSITIVE)?;
        let compress = conf.read_bool("compress", Some(false))?;

        let appender = RollingFileAppender::new(full_path, max_size as u64)
            .map_err(|e| ConfigError::destination(conf.path(), e))?
            .with_retained_limit(retained.map(|n| n as usize))
            .with_compression(compress)
            .with_output_format(format)
            .with_timestamp_format(timestamp);
        sinks.install(conf.min_level(), sync, Box::new(appender));
        Ok(())
    }
}

/// Expand `{app}` and `{launchUtc}` (case-insensitive) in a path template.
/// Unrecognized placeholders pass through untouched.
fn expand_path_template(template: &str, environment: &BuildEnvironment) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                let token = &after[1..end];
                match token.to_ascii_lowercase().as_str() {
                    "app" => out.push_str(&environment.app_name),
                    "launchutc" => out.push_str(
                        &environment
                            .launch_timestamp
                            .format("%Y-%m-%dT%H%M%S%.3f")
                            .to_string(),
                    ),
                    _ => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::path::PathBuf;

    fn environment() -> BuildEnvironment {
        BuildEnvironment::new(
            "orders",
            PathBuf::from("/srv/orders"),
            Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap(),
        )
    }

    #[test]
    fn test_expand_path_template() {
        let env = environment();
        assert_eq!(
            expand_path_template("logs/{app}.log", &env),
            "logs/orders.log"
        );
        assert_eq!(
            expand_path_template("logs/{APP}_{LaunchUtc}.log", &env),
            "logs/orders_2025-01-08T103045.000.log"
        );
        assert_eq!(
            expand_path_template("logs/{unknown}.log", &env),
            "logs/{unknown}.log"
        );
        assert_eq!(expand_path_template("logs/open{brace", &env), "logs/open{brace");
    }
}
