use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single column value.
///
/// Covers the SQLite storage classes that survive a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// One table row, keyed by column name.
///
/// `BTreeMap` keeps column order stable, which the snapshot checksum relies on.
pub type Row = BTreeMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Build a [`Row`] from `column => value` pairs.
///
/// ```
/// use tinda_core::{row, Value};
///
/// let r = row! { "product_id" => 1, "name" => "Coke", "unit_price" => 25.0 };
/// assert_eq!(r["name"], Value::Text("Coke".into()));
/// ```
#[macro_export]
macro_rules! row {
    ($($column:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut row = $crate::Row::new();
        $(row.insert($column.to_string(), $crate::Value::from($value));)*
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shapes() {
        let row: Row =
            serde_json::from_str(r#"{"a": null, "b": 25, "c": 2.5, "d": "Coke"}"#).unwrap();
        assert_eq!(row["a"], Value::Null);
        assert_eq!(row["b"], Value::Integer(25));
        assert_eq!(row["c"], Value::Real(2.5));
        assert_eq!(row["d"], Value::Text("Coke".into()));
    }

    #[test]
    fn test_row_macro_converts_literals() {
        let r = row! { "id" => 1i64, "name" => "Chips", "price" => 50.0, "note" => None::<String> };
        assert_eq!(r.len(), 4);
        assert_eq!(r["id"].as_i64(), Some(1));
        assert_eq!(r["name"].as_str(), Some("Chips"));
        assert!(r["note"].is_null());
    }

    #[test]
    fn test_booleans_are_not_values() {
        assert!(serde_json::from_str::<Value>("true").is_err());
    }
}
