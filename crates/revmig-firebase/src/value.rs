//! Firestore REST typed values.
//!
//! The REST API wants every field wrapped in a one-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Timestamps must be
//! sent as `timestampValue`, which is why documents are built as [`Fields`]
//! rather than serialized straight from serde.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map};

/// Largest integer a double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    /// Numeric value typed the way the Node Admin SDK types JavaScript
    /// numbers: safe integers become `integerValue`, everything else `doubleValue`.
    #[must_use]
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            #[allow(clippy::cast_possible_truncation)]
            Value::Integer(n as i64)
        } else {
            Value::Double(n)
        }
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// REST wire form of this value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::Boolean(b) => json!({ "booleanValue": b }),
            Value::Integer(i) => json!({ "integerValue": i.to_string() }),
            Value::Double(d) => json!({ "doubleValue": d }),
            Value::Timestamp(ts) => {
                json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
            }
            Value::String(s) => json!({ "stringValue": s }),
            Value::Array(items) if items.is_empty() => json!({ "arrayValue": {} }),
            Value::Array(items) => {
                let values: Vec<serde_json::Value> = items.iter().map(Value::to_json).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Map(fields) if fields.is_empty() => json!({ "mapValue": {} }),
            Value::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

/// `fields` object for a document body or map value.
#[must_use]
pub fn encode_fields(fields: &Fields) -> serde_json::Value {
    let map: Map<String, serde_json::Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn integral_numbers_are_integer_values() {
        assert_eq!(Value::number(3.0), Value::Integer(3));
        assert_eq!(Value::number(-2.0), Value::Integer(-2));
        assert_eq!(Value::number(4.5), Value::Double(4.5));
        assert_eq!(Value::number(1e300), Value::Double(1e300));
    }

    #[test]
    fn integer_wire_form_is_a_string() {
        assert_eq!(Value::Integer(42).to_json(), json!({ "integerValue": "42" }));
    }

    #[test]
    fn timestamp_wire_form_is_rfc3339_utc() {
        let ts = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Value::Timestamp(ts).to_json(),
            json!({ "timestampValue": "2021-02-01T00:00:00.000000Z" })
        );
    }

    #[test]
    fn arrays_keep_null_entries() {
        let v = Value::Array(vec![Value::Null, Value::string("a")]);
        assert_eq!(
            v.to_json(),
            json!({ "arrayValue": { "values": [
                { "nullValue": null },
                { "stringValue": "a" }
            ] } })
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(Value::Array(vec![]).to_json(), json!({ "arrayValue": {} }));
        assert_eq!(Value::Map(Fields::new()).to_json(), json!({ "mapValue": {} }));
    }

    #[test]
    fn nested_maps() {
        let mut inner = Fields::new();
        inner.insert("yes".into(), Value::Integer(0));
        let mut outer = Fields::new();
        outer.insert("tally".into(), Value::Map(inner));
        assert_eq!(
            encode_fields(&outer),
            json!({ "tally": { "mapValue": { "fields": { "yes": { "integerValue": "0" } } } } })
        );
    }

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<String>::None.into();
        assert_eq!(v, Value::Null);
    }
}
