//! Source rows as read from the spreadsheet datastore.
//!
//! A [`SourceRecord`] keeps the raw JSON field map and exposes typed lookups
//! by column name. Absent columns and columns of the wrong shape both read
//! as `None`; callers apply their own fallbacks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One attachment entry from an attachment-list column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    pub filename: String,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// A single spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl SourceRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Raw JSON value for `column`, if present and not `null`.
    #[must_use]
    pub fn raw(&self, column: &str) -> Option<&Value> {
        self.fields.get(column).filter(|v| !v.is_null())
    }

    /// String value for `column`. Non-string values read as `None`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.raw(column).and_then(Value::as_str)
    }

    /// Numeric value for `column`.
    ///
    /// Accepts JSON numbers and strings that parse as a finite `f64`
    /// (surrounding whitespace ignored).
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        match self.raw(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Attachment list for `column`. Entries missing `url` or `filename` are dropped.
    #[must_use]
    pub fn attachments(&self, column: &str) -> Vec<Attachment> {
        let Some(Value::Array(items)) = self.raw(column) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<Attachment>(item.clone()).ok())
            .collect()
    }
}
