//! Output format configuration for log entries
//!
//! Provides different output formats for log entries:
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;
use std::str::FromStr;

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `[2025-01-08T10:30:45.000Z] [INFO ] Request processed`
    #[default]
    Text,

    /// JSON format for machine processing
    Json,

    /// Logfmt format (key=value pairs)
    Logfmt,
}

impl OutputFormat {
    /// Format a log entry according to this output format
    pub fn format(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => Self::format_text(entry, timestamp_format),
            OutputFormat::Json => Self::format_json(entry, timestamp_format),
            OutputFormat::Logfmt => Self::format_logfmt(entry, timestamp_format),
        }
    }

    fn format_text(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let timestamp_str = timestamp_format.format(&entry.timestamp);

        let mut base = match &entry.source {
            Some(source) => format!(
                "[{}] [{:5}] {} - {}",
                timestamp_str,
                entry.level.to_str(),
                source,
                entry.message
            ),
            None => format!(
                "[{}] [{:5}] {}",
                timestamp_str,
                entry.level.to_str(),
                entry.message
            ),
        };

        if let Some(ref context) = entry.context {
            if !context.is_empty() {
                base.push(' ');
                base.push_str(&context.format_fields());
            }
        }

        base
    }

    fn format_json(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            Self::format_timestamp_json(entry, timestamp_format),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(entry.level.to_str().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(entry.message.clone()),
        );

        if let Some(ref source) = entry.source {
            json_obj.insert(
                "source".to_string(),
                serde_json::Value::String(source.clone()),
            );
        }

        if let Some(ref context) = entry.context {
            for (key, value) in context.fields() {
                json_obj.insert(key.clone(), value.to_json_value());
            }
        }

        serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
    }

    fn format_timestamp_json(
        entry: &LogEntry,
        timestamp_format: &TimestampFormat,
    ) -> serde_json::Value {
        match timestamp_format {
            TimestampFormat::Unix => serde_json::Value::Number(entry.timestamp.timestamp().into()),
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(entry.timestamp.timestamp_millis().into())
            }
            _ => serde_json::Value::String(timestamp_format.format(&entry.timestamp)),
        }
    }

    fn format_logfmt(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "timestamp={}",
            Self::escape_logfmt_value(&timestamp_format.format(&entry.timestamp))
        ));
        parts.push(format!("level={}", entry.level.to_str()));
        parts.push(format!(
            "message={}",
            Self::quote_logfmt_value(&entry.message)
        ));

        if let Some(ref source) = entry.source {
            parts.push(format!("source={}", Self::escape_logfmt_value(source)));
        }

        if let Some(ref context) = entry.context {
            for (key, value) in context.fields() {
                parts.push(format!(
                    "{}={}",
                    key,
                    Self::escape_logfmt_value(&value.to_string())
                ));
            }
        }

        parts.join(" ")
    }

    /// Quote a value when it contains characters that break logfmt parsing
    fn escape_logfmt_value(value: &str) -> String {
        if value.contains(' ') || value.contains('"') || value.contains('=') {
            Self::quote_logfmt_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_logfmt_value(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\\\""))
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "logfmt" => Ok(OutputFormat::Logfmt),
            _ => Err(format!("Invalid output format: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::LogContext;
    use crate::core::log_level::LogLevel;

    fn entry() -> LogEntry {
        LogEntry::new(LogLevel::Warn, "disk nearly full".to_string())
            .with_source("storage")
            .with_context(LogContext::new().with_field("free_mb", 128))
    }

    #[test]
    fn test_text_format() {
        let out = OutputFormat::Text.format(&entry(), &TimestampFormat::Unix);
        assert!(out.contains("[WARN ]"));
        assert!(out.contains("storage - disk nearly full"));
        assert!(out.contains("free_mb=128"));
    }

    #[test]
    fn test_json_format_roundtrips() {
        let out = OutputFormat::Json.format(&entry(), &TimestampFormat::Iso8601);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["source"], "storage");
        assert_eq!(value["free_mb"], 128);
    }

    #[test]
    fn test_logfmt_quotes_messages() {
        let out = OutputFormat::Logfmt.format(&entry(), &TimestampFormat::Unix);
        assert!(out.contains("message=\"disk nearly full\""));
        assert!(out.contains("level=WARN"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
