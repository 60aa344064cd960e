//! Hierarchical configuration tree navigation
//!
//! A [`ConfigSection`] borrows a node of a `serde_json::Value` tree and
//! remembers the colon-separated path it was reached by, so every
//! configuration error can name the exact entry that caused it. Sections for
//! absent keys still exist (they just hold no value), which lets callers
//! navigate first and decide about required-ness at read time.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ConfigSection<'a> {
    value: Option<&'a Value>,
    path: String,
}

impl<'a> ConfigSection<'a> {
    /// Section over the root of a configuration tree. The root has an empty
    /// path; child paths start at the first key.
    pub fn root(value: &'a Value) -> Self {
        Self {
            value: Some(value),
            path: String::new(),
        }
    }

    /// The colon-separated path of this section, e.g.
    /// `logging:profiles:main`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment, i.e. the key this section was reached by.
    pub fn key(&self) -> &str {
        self.path.rsplit(':').next().unwrap_or("")
    }

    /// Whether any value (scalar or subtree) is present here.
    pub fn exists(&self) -> bool {
        matches!(self.value, Some(v) if !v.is_null())
    }

    /// Navigate to a child section. Always succeeds; absence is observed at
    /// read time.
    pub fn section(&self, key: &str) -> ConfigSection<'a> {
        ConfigSection {
            value: self
                .value
                .and_then(|v| v.as_object())
                .and_then(|map| map.get(key)),
            path: self.child_path(key),
        }
    }

    /// The named children of this section, in deterministic order.
    pub fn children(&self) -> Vec<(String, ConfigSection<'a>)> {
        match self.value.and_then(|v| v.as_object()) {
            Some(map) => map
                .iter()
                .map(|(key, value)| {
                    (
                        key.clone(),
                        ConfigSection {
                            value: Some(value),
                            path: self.child_path(key),
                        },
                    )
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// This section's own value rendered as leaf text. String, boolean and
    /// numeric scalars render to their text form; null, absent values and
    /// subtrees have no leaf text.
    pub fn scalar(&self) -> Option<String> {
        match self.value? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// Leaf text of a child, [`scalar`](Self::scalar) applied one level down.
    pub fn leaf(&self, key: &str) -> Option<String> {
        self.section(key).scalar()
    }

    pub(crate) fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.path, key)
        }
    }
}
