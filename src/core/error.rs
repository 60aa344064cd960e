//! Error types for the logging pipeline
//!
//! Two taxonomies live here. [`ConfigError`] covers everything that can go
//! wrong while turning configuration into a pipeline: it is always fatal to
//! the build that produced it and carries the configuration path of the
//! offending entry. [`LoggerError`] covers runtime write-path failures
//! surfaced by appenders.

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Result of configuration reads and pipeline builds.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which extension map a registration or lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Profile,
    Enrichment,
    Filter,
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExtensionKind::Profile => "profile type",
            ExtensionKind::Enrichment => "enrichment",
            ExtensionKind::Filter => "filter",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required leaf or section is absent
    #[error("Missed '{path}'.")]
    Missing { path: String },

    /// A leaf that must be `true`/`false` held something else
    #[error("Expected '{path}' to be boolean, but accepted '{value}'.")]
    NotBoolean { path: String, value: String },

    /// A leaf failed closed-set (enum) validation
    #[error("'{path}' has invalid value '{value}'.")]
    InvalidValue { path: String, value: String },

    /// A numeric leaf held non-numeric text
    #[error("Expected '{path}' to be a number, but accepted '{value}'.")]
    NotNumber { path: String, value: String },

    /// A numeric leaf parsed but did not fit the target integer width
    #[error("'{path}' = '{value}' is out of range.")]
    OutOfRange { path: String, value: String },

    /// A numeric leaf parsed but failed its sign constraint
    #[error("'{path}' = '{value}' is not {expected}.")]
    SignMismatch {
        path: String,
        value: String,
        expected: String,
    },

    /// A leaf that must be non-empty was empty or blank
    #[error("'{path}' is empty.")]
    EmptyValue { path: String },

    /// A minimum-level override with a blank source key
    #[error("'{path}' -- source to be overridden is not specified.")]
    SourceNotSpecified { path: String },

    /// A profile's `type` matched no registered profile applier
    #[error("Profile type '{name}' of profile '{path}' is not known.")]
    UnknownProfileType { path: String, name: String },

    /// An enrichment entry's key matched no registered enrichment applier
    #[error("Name '{name}' of enrichment '{path}' is not known.")]
    UnknownEnrichment { path: String, name: String },

    /// A filter entry's key matched no registered filter applier
    #[error("Name '{name}' of filter '{path}' is not known.")]
    UnknownFilter { path: String, name: String },

    /// Two appliers of the same kind claimed one name
    #[error("{added} cannot handle {kind} '{name}' because it's already handled by {existing}.")]
    ConflictingExtension {
        kind: ExtensionKind,
        name: String,
        existing: String,
        added: String,
    },

    /// A profile applier failed to open its destination
    #[error("Failed to open destination for '{path}': {message}")]
    Destination { path: String, message: String },
}

impl ConfigError {
    /// Create a missing-entry error
    pub fn missing(path: impl Into<String>) -> Self {
        ConfigError::Missing { path: path.into() }
    }

    /// Create a not-boolean error
    pub fn not_boolean(path: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::NotBoolean {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create an invalid-value error
    pub fn invalid_value(path: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a not-a-number error
    pub fn not_number(path: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::NotNumber {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create an out-of-range error
    pub fn out_of_range(path: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::OutOfRange {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a conflicting-extension error
    pub fn conflicting(
        kind: ExtensionKind,
        name: impl Into<String>,
        existing: impl Into<String>,
        added: impl Into<String>,
    ) -> Self {
        ConfigError::ConflictingExtension {
            kind,
            name: name.into(),
            existing: existing.into(),
            added: added.into(),
        }
    }

    /// Create a destination-open error
    pub fn destination(path: impl Into<String>, message: impl fmt::Display) -> Self {
        ConfigError::Destination {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// The configuration path this error points at
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { path }
            | ConfigError::NotBoolean { path, .. }
            | ConfigError::InvalidValue { path, .. }
            | ConfigError::NotNumber { path, .. }
            | ConfigError::OutOfRange { path, .. }
            | ConfigError::SignMismatch { path, .. }
            | ConfigError::EmptyValue { path }
            | ConfigError::SourceNotSpecified { path }
            | ConfigError::UnknownProfileType { path, .. }
            | ConfigError::UnknownEnrichment { path, .. }
            | ConfigError::UnknownFilter { path, .. }
            | ConfigError::Destination { path, .. } => Some(path),
            ConfigError::ConflictingExtension { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Channel send error
    #[error("Failed to send log entry to async worker")]
    ChannelSendError,

    /// Invalid component setup outside the configuration tree
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::missing("logging:profiles:main:type");
        assert_eq!(err.to_string(), "Missed 'logging:profiles:main:type'.");

        let err = ConfigError::not_boolean("logging:profiles:main:sync", "yes");
        assert_eq!(
            err.to_string(),
            "Expected 'logging:profiles:main:sync' to be boolean, but accepted 'yes'."
        );

        let err = ConfigError::UnknownProfileType {
            path: "logging:profiles:main".into(),
            name: "syslog".into(),
        };
        assert_eq!(
            err.to_string(),
            "Profile type 'syslog' of profile 'logging:profiles:main' is not known."
        );
    }

    #[test]
    fn test_conflict_error_names_both_sides() {
        let err = ConfigError::conflicting(
            ExtensionKind::Profile,
            "console",
            "ConsoleProfile",
            "FancyConsoleProfile",
        );
        let text = err.to_string();
        assert!(text.contains("ConsoleProfile"));
        assert!(text.contains("FancyConsoleProfile"));
        assert!(text.contains("profile type 'console'"));
    }

    #[test]
    fn test_error_path_accessor() {
        let err =
            ConfigError::out_of_range("logging:profiles:main:maxSize", "99999999999999999999");
        assert_eq!(err.path(), Some("logging:profiles:main:maxSize"));

        let err = ConfigError::conflicting(ExtensionKind::Filter, "sampling", "A", "B");
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_logger_error_display() {
        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::config("CrashGuard", "crash directory is empty");
        assert!(err.to_string().contains("CrashGuard"));
    }
}
