//! Typed, fail-fast configuration reads
//!
//! Every coercion from leaf text to a typed value lives here; the rest of
//! the crate never parses configuration text itself. Each reader either
//! produces a value or a precise [`ConfigError`] naming the offending path
//! (and, for invalid values, the raw text that was rejected).

use super::section::ConfigSection;
use crate::core::error::{ConfigError, ConfigResult};
use std::fmt;
use std::num::IntErrorKind;
use std::ops::BitOr;
use std::str::FromStr;

/// Sign constraint for bounded-integer reads.
///
/// A parsed number must match at least one of the allowed sign classes;
/// failing the constraint is reported separately from failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSigns(u8);

impl NumberSigns {
    pub const ZERO: NumberSigns = NumberSigns(1);
    pub const POSITIVE: NumberSigns = NumberSigns(1 << 1);
    pub const NEGATIVE: NumberSigns = NumberSigns(1 << 2);
    pub const ALL: NumberSigns = NumberSigns(1 | 1 << 1 | 1 << 2);

    pub fn matches(self, number: i64) -> bool {
        let class = match number {
            n if n < 0 => NumberSigns::NEGATIVE,
            0 => NumberSigns::ZERO,
            _ => NumberSigns::POSITIVE,
        };
        self.0 & class.0 != 0
    }
}

impl BitOr for NumberSigns {
    type Output = NumberSigns;

    fn bitor(self, rhs: NumberSigns) -> NumberSigns {
        NumberSigns(self.0 | rhs.0)
    }
}

impl fmt::Display for NumberSigns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.0 & NumberSigns::ZERO.0 != 0 {
            parts.push("zero");
        }
        if self.0 & NumberSigns::POSITIVE.0 != 0 {
            parts.push("positive");
        }
        if self.0 & NumberSigns::NEGATIVE.0 != 0 {
            parts.push("negative");
        }
        write!(f, "{}", parts.join(" or "))
    }
}

impl ConfigSection<'_> {
    /// Required string leaf.
    pub fn read_string(&self, key: &str) -> ConfigResult<String> {
        self.leaf(key)
            .ok_or_else(|| ConfigError::missing(self.child_path(key)))
    }

    /// Boolean leaf; absence returns `default` when one is supplied.
    pub fn read_bool(&self, key: &str, default: Option<bool>) -> ConfigResult<bool> {
        parse_bool(self.leaf(key), self.child_path(key), default)
    }

    /// This section's own scalar as a boolean.
    pub fn read_bool_value(&self, default: Option<bool>) -> ConfigResult<bool> {
        parse_bool(self.scalar(), self.path().to_string(), default)
    }

    /// Closed-set leaf, matched case-insensitively through the target's
    /// `FromStr`; invalid text is fatal, never coerced.
    pub fn read_enum<T: FromStr>(&self, key: &str, default: Option<T>) -> ConfigResult<T> {
        parse_enum(self.leaf(key), self.child_path(key), default)
    }

    /// This section's own scalar as a closed-set value.
    pub fn read_enum_value<T: FromStr>(&self, default: Option<T>) -> ConfigResult<T> {
        parse_enum(self.scalar(), self.path().to_string(), default)
    }

    /// Bounded integer leaf; absence returns `default` when one is supplied.
    pub fn read_i64(
        &self,
        key: &str,
        signs: NumberSigns,
        default: Option<i64>,
    ) -> ConfigResult<i64> {
        match self.leaf(key) {
            Some(value) => parse_i64(&value, self.child_path(key), signs),
            None => default.ok_or_else(|| ConfigError::missing(self.child_path(key))),
        }
    }

    /// This section's own scalar as a bounded integer.
    pub fn read_i64_value(&self, signs: NumberSigns, default: Option<i64>) -> ConfigResult<i64> {
        match self.scalar() {
            Some(value) => parse_i64(&value, self.path().to_string(), signs),
            None => default.ok_or_else(|| ConfigError::missing(self.path())),
        }
    }

    /// Optional bounded `i32` leaf: `None` when absent, validated when
    /// present.
    pub fn read_i32_if_present(
        &self,
        key: &str,
        signs: NumberSigns,
    ) -> ConfigResult<Option<i32>> {
        match self.leaf(key) {
            None => Ok(None),
            Some(value) => {
                let path = self.child_path(key);
                let number: i32 = match value.parse() {
                    Ok(n) => n,
                    Err(e) => return Err(int_parse_error(e, path, &value)),
                };
                if signs.matches(number as i64) {
                    Ok(Some(number))
                } else {
                    Err(sign_mismatch(path, &value, signs))
                }
            }
        }
    }
}

fn parse_bool(
    raw: Option<String>,
    path: impl Into<String>,
    default: Option<bool>,
) -> ConfigResult<bool> {
    match raw {
        Some(value) => match value.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::not_boolean(path, value)),
        },
        None => default.ok_or_else(|| ConfigError::missing(path)),
    }
}

fn parse_enum<T: FromStr>(
    raw: Option<String>,
    path: impl Into<String>,
    default: Option<T>,
) -> ConfigResult<T> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::invalid_value(path, value)),
        None => default.ok_or_else(|| ConfigError::missing(path)),
    }
}

fn parse_i64(value: &str, path: String, signs: NumberSigns) -> ConfigResult<i64> {
    let number: i64 = match value.parse() {
        Ok(n) => n,
        Err(e) => return Err(int_parse_error(e, path, value)),
    };
    if signs.matches(number) {
        Ok(number)
    } else {
        Err(sign_mismatch(path, value, signs))
    }
}

fn int_parse_error(e: std::num::ParseIntError, path: String, value: &str) -> ConfigError {
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConfigError::out_of_range(path, value)
        }
        _ => ConfigError::not_number(path, value),
    }
}

fn sign_mismatch(path: String, value: &str, signs: NumberSigns) -> ConfigError {
    ConfigError::SignMismatch {
        path,
        value: value.to_string(),
        expected: signs.to_string(),
    }
}
