//! Integration tests for the configured logging pipeline
//!
//! These tests verify:
//! - Building pipelines from a configuration tree
//! - Extension registration and conflict detection
//! - Per-source minimum-level overrides
//! - The global logger handle and the cached fast facade
//! - Log injection prevention

use pipelog::build::{
    build_from_value, build_pipeline, builtin_enrichment_appliers, builtin_filter_appliers,
    builtin_profile_appliers, BuildEnvironment,
};
use pipelog::prelude::*;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn environment(dir: &TempDir) -> BuildEnvironment {
    BuildEnvironment::new("itest", dir.path(), chrono::Utc::now())
}

#[test]
fn test_full_pipeline_from_configuration() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = json!({
        "logging": {
            "minLevels": {
                "default": "debug",
                "overrides": {"chatty": "error"}
            },
            "profiles": {
                "main": {
                    "type": "file",
                    "sync": "true",
                    "format": "json",
                    "path": "logs/{app}.log"
                }
            },
            "enrichments": {"thread": "true"}
        }
    });

    let pipeline = build_from_value(&config, &environment(&dir)).expect("build failed");

    pipeline.info("plain entry");
    pipeline.log_from("chatty", LogLevel::Warn, "suppressed by override");
    pipeline.log_from("chatty", LogLevel::Error, "kept by override");
    pipeline.flush().expect("flush failed");

    let content = fs::read_to_string(dir.path().join("logs/itest.log")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    // JSON output parses and carries the thread enrichment
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["level"], "INFO");
    assert_eq!(first["message"], "plain entry");
    assert!(first["thread_id"].is_string());

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["source"], "chatty");
    assert_eq!(second["level"], "ERROR");
}

#[test]
fn test_log_injection_prevention() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = json!({
        "logging": {
            "profiles": {
                "main": {"type": "file", "sync": "true", "path": "injection.log"}
            }
        }
    });
    let pipeline = build_from_value(&config, &environment(&dir)).unwrap();

    let malicious = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    pipeline.info(malicious);
    pipeline.flush().unwrap();

    let content = fs::read_to_string(dir.path().join("injection.log")).unwrap();
    assert!(content.contains("\\n"));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
}

#[test]
fn test_custom_profile_applier() {
    struct MemoryProfile {
        entries: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    struct MemoryAppender {
        entries: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    impl Appender for MemoryAppender {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.entries.lock().push(entry.message.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    impl ProfileApplier for MemoryProfile {
        fn name(&self) -> &str {
            "memory"
        }

        fn apply(&self, sinks: &mut SinkSet, conf: &ProfileConfig<'_>) -> ConfigResult<()> {
            let sync = conf.sync()?;
            sinks.install(
                conf.min_level(),
                sync,
                Box::new(MemoryAppender {
                    entries: Arc::clone(&self.entries),
                }),
            );
            Ok(())
        }
    }

    let entries = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let config = json!({
        "profiles": {
            "sink": {"type": "memory", "sync": "true", "minLevel": "warn"}
        }
    });
    let tree_root = ConfigSection::root(&config);

    let appliers: Vec<Arc<dyn ProfileApplier>> = vec![Arc::new(MemoryProfile {
        entries: Arc::clone(&entries),
    })];
    let pipeline = build_pipeline(&tree_root, &appliers, &[], &[]).unwrap();

    pipeline.info("below the profile gate");
    pipeline.warn("over the profile gate");

    let seen = entries.lock();
    assert_eq!(seen.as_slice(), ["over the profile gate"]);
}

#[test]
fn test_conflicting_profile_appliers_fail_before_configuration() {
    struct FirstConsole;
    impl ProfileApplier for FirstConsole {
        fn name(&self) -> &str {
            "console"
        }
        fn label(&self) -> &'static str {
            "FirstConsole"
        }
        fn apply(&self, _sinks: &mut SinkSet, _conf: &ProfileConfig<'_>) -> ConfigResult<()> {
            Ok(())
        }
    }

    struct SecondConsole;
    impl ProfileApplier for SecondConsole {
        fn name(&self) -> &str {
            "Console"
        }
        fn label(&self) -> &'static str {
            "SecondConsole"
        }
        fn apply(&self, _sinks: &mut SinkSet, _conf: &ProfileConfig<'_>) -> ConfigResult<()> {
            Ok(())
        }
    }

    // The configuration is never consulted; conflicts surface first
    let config = json!({"profiles": {"broken": {"missing": "everything"}}});
    let root = ConfigSection::root(&config);

    let appliers: Vec<Arc<dyn ProfileApplier>> =
        vec![Arc::new(FirstConsole), Arc::new(SecondConsole)];
    let err = build_pipeline(&root, &appliers, &[], &[]).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("FirstConsole"));
    assert!(message.contains("SecondConsole"));
    assert!(message.contains("profile type 'console'"));
}

#[test]
fn test_handle_swap_reaches_live_facade_consumers() {
    let dir = TempDir::new().unwrap();
    let handle = LoggerHandle::new();

    let first_config = json!({
        "logging": {
            "profiles": {
                "main": {"type": "file", "sync": "true", "path": "first.log"}
            }
        }
    });
    let second_config = json!({
        "logging": {
            "profiles": {
                "main": {"type": "file", "sync": "true", "path": "second.log"}
            }
        }
    });

    handle.install(Arc::new(
        build_from_value(&first_config, &environment(&dir)).unwrap(),
    ));
    handle.logger().info("goes to the first pipeline");

    // Reconfigure: build a new pipeline and swap it in
    let previous = handle
        .install(Arc::new(
            build_from_value(&second_config, &environment(&dir)).unwrap(),
        ))
        .expect("a pipeline was installed");
    previous.flush().unwrap();

    handle.logger().info("goes to the second pipeline");
    handle.flush().unwrap();

    let first = fs::read_to_string(dir.path().join("first.log")).unwrap();
    let second = fs::read_to_string(dir.path().join("second.log")).unwrap();
    assert!(first.contains("first pipeline"));
    assert!(!first.contains("second pipeline"));
    assert!(second.contains("second pipeline"));
}

#[test]
fn test_activation_guard_restores_and_flushes() {
    let dir = TempDir::new().unwrap();
    let handle = LoggerHandle::new();

    let base_config = json!({
        "logging": {
            "profiles": {
                "main": {"type": "file", "sync": "true", "path": "base.log"}
            }
        }
    });
    let temp_config = json!({
        "logging": {
            "profiles": {
                "main": {"type": "file", "sync": "false", "path": "temporary.log"}
            }
        }
    });

    handle.install(Arc::new(
        build_from_value(&base_config, &environment(&dir)).unwrap(),
    ));

    {
        let temporary = build_from_value(&temp_config, &environment(&dir)).unwrap();
        let _scope = handle.activate(Arc::new(temporary));
        handle.logger().info("captured by the temporary pipeline");
        // Guard drop flushes the async temporary pipeline before restoring
    }

    handle.logger().info("back on the base pipeline");
    handle.flush().unwrap();

    let temporary = fs::read_to_string(dir.path().join("temporary.log")).unwrap();
    assert!(temporary.contains("captured by the temporary pipeline"));
    let base = fs::read_to_string(dir.path().join("base.log")).unwrap();
    assert!(base.contains("back on the base pipeline"));
    assert!(!base.contains("captured"));
}

#[test]
fn test_builtin_appliers_cover_documented_names() {
    let dir = TempDir::new().unwrap();
    let env = environment(&dir);
    let profiles = builtin_profile_appliers(&env);
    let names: Vec<&str> = profiles.iter().map(|a| a.name()).collect();
    assert!(names.contains(&"console"));
    assert!(names.contains(&"file"));

    let enrichments = builtin_enrichment_appliers();
    assert!(enrichments.iter().any(|a| a.name() == "thread"));

    let filters = builtin_filter_appliers();
    assert!(filters.iter().any(|a| a.name() == "sampling"));
}

#[test]
fn test_facade_hot_path_is_allocation_free_on_cached_access() {
    let dir = TempDir::new().unwrap();
    let config = json!({
        "logging": {
            "minLevels": {"default": "warn"},
            "profiles": {
                "main": {"type": "file", "sync": "true", "path": "gated.log"}
            }
        }
    });
    let handle = LoggerHandle::new();
    handle.install(Arc::new(
        build_from_value(&config, &environment(&dir)).unwrap(),
    ));

    let first = handle.logger();
    assert!(first.is_fast());
    for _ in 0..1000 {
        // Gated out before any context is materialized
        first.log_kv(LogLevel::Debug, "hot path", &[("k", FieldValue::Int(1))]);
        let again = handle.logger();
        assert!(Arc::ptr_eq(&first, &again));
    }

    handle.flush().unwrap();
    let content = fs::read_to_string(dir.path().join("gated.log")).unwrap();
    assert!(content.is_empty());
}

#[test]
fn test_configuration_error_paths_are_operator_friendly() {
    let dir = TempDir::new().unwrap();
    let config = json!({
        "logging": {
            "profiles": {
                "main": {
                    "type": "file",
                    "sync": "true",
                    "path": "x.log",
                    "maxSize": "-1"
                }
            }
        }
    });
    let err = build_from_value(&config, &environment(&dir)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("logging:profiles:main:maxSize"));
    assert!(message.contains("-1"));
}
