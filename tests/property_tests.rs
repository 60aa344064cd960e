//! Property-based tests for pipelog using proptest

use pipelog::prelude::*;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// LogLevel Tests
// ============================================================================

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

proptest! {
    /// LogLevel string conversions roundtrip
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let as_str = level.to_str();
        let parsed: LogLevel = as_str.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// LogLevel ordering is consistent with its numeric discriminants
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;
        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }
}

// ============================================================================
// Configuration Reader Tests
// ============================================================================

proptest! {
    /// Any i64 rendered as decimal text reads back exactly
    #[test]
    fn test_i64_roundtrip(number in any::<i64>()) {
        let tree = json!({"value": number.to_string()});
        let section = ConfigSection::root(&tree);
        let read = section.read_i64("value", NumberSigns::ALL, None).unwrap();
        prop_assert_eq!(read, number);
    }

    /// Sign constraints accept exactly the matching numbers
    #[test]
    fn test_sign_constraint_partition(number in any::<i64>()) {
        let tree = json!({"value": number.to_string()});
        let section = ConfigSection::root(&tree);
        let result = section.read_i64("value", NumberSigns::POSITIVE, None);
        if number > 0 {
            prop_assert_eq!(result.unwrap(), number);
        } else {
            prop_assert!(matches!(result.unwrap_err(), ConfigError::SignMismatch { .. }), "expected SignMismatch");
        }
    }

    /// Non-numeric text never parses as a number, and the error names the value
    #[test]
    fn test_non_numeric_text_rejected(text in "[a-zA-Z][a-zA-Z ]{0,20}") {
        let tree = json!({"value": text.clone()});
        let section = ConfigSection::root(&tree);
        match section.read_i64("value", NumberSigns::ALL, None).unwrap_err() {
            ConfigError::NotNumber { value, .. } => prop_assert_eq!(value, text),
            other => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    /// String reads round-trip the exact value
    #[test]
    fn test_string_roundtrip(text in "\\PC*") {
        let tree = json!({"value": text.clone()});
        let section = ConfigSection::root(&tree);
        prop_assert_eq!(section.read_string("value").unwrap(), text);
    }

    /// Booleans accept only true/false in any casing
    #[test]
    fn test_bool_accepts_only_true_false(text in "[a-zA-Z]{1,8}") {
        let tree = json!({"value": text.clone()});
        let section = ConfigSection::root(&tree);
        let result = section.read_bool("value", None);
        match text.to_lowercase().as_str() {
            "true" => prop_assert_eq!(result.unwrap(), true),
            "false" => prop_assert_eq!(result.unwrap(), false),
            _ => prop_assert!(matches!(result.unwrap_err(), ConfigError::NotBoolean { .. }), "expected NotBoolean"),
        }
    }
}

// ============================================================================
// Sanitization Tests
// ============================================================================

proptest! {
    /// Entries never contain raw newlines, whatever the message
    #[test]
    fn test_entry_messages_are_single_line(message in "\\PC*") {
        let entry = LogEntry::new(LogLevel::Info, message);
        prop_assert!(!entry.message.contains('\n'));
        prop_assert!(!entry.message.contains('\r'));
    }
}
