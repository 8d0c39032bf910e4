//! Tolerant typed reads from an untyped [`ResponseMap`].
//!
//! Every value coming back from the service passes through here before it
//! lands in a typed field.  A missing key, a `null`, or a value of the wrong
//! JSON type all yield the caller's default; nothing in this module fails.

use crate::skydrive::types::ResponseMap;
use serde_json::Value;

/// Conversion from a JSON value that refuses (rather than coerces) values of
/// the wrong type.
pub trait FromResponseValue: Sized {
    fn from_response_value(value: &Value) -> Option<Self>;
}

impl FromResponseValue for String {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromResponseValue for bool {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromResponseValue for i64 {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromResponseValue for i32 {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|n| i32::try_from(n).ok())
    }
}

impl FromResponseValue for u64 {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromResponseValue for f64 {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromResponseValue for Vec<Value> {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

impl FromResponseValue for ResponseMap {
    fn from_response_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

/// Defaulting getters over a response mapping.
pub trait ResponseMapExt {
    /// Value under `key` as `T`, or `default` when absent, null, or not a `T`.
    fn get_or<T: FromResponseValue>(&self, key: &str, default: T) -> T;

    /// String under `key`, or `""`.
    fn get_string(&self, key: &str) -> String {
        self.get_or(key, String::new())
    }
}

impl ResponseMapExt for ResponseMap {
    fn get_or<T: FromResponseValue>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(T::from_response_value)
            .unwrap_or(default)
    }
}

impl ResponseMapExt for Option<&ResponseMap> {
    fn get_or<T: FromResponseValue>(&self, key: &str, default: T) -> T {
        match self {
            Some(map) => map.get_or(key, default),
            None => default,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResponseMap {
        json!({
            "id": "file.8c8ce076ca27823f.8C8CE076CA27823F!129",
            "name": "notes.txt",
            "size": 1024,
            "is_embeddable": true,
            "description": null,
            "count": "3",
            "ratio": 0.5,
            "huge": 8_000_000_000i64,
            "negative": -4,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_present_values() {
        let m = sample();
        assert_eq!(m.get_string("name"), "notes.txt");
        assert_eq!(m.get_or("size", 0i64), 1024);
        assert!(m.get_or("is_embeddable", false));
        assert_eq!(m.get_or("ratio", 0.0f64), 0.5);
    }

    #[test]
    fn test_missing_key_yields_default() {
        let m = sample();
        assert_eq!(m.get_string("link"), "");
        assert_eq!(m.get_or("count_missing", 7i64), 7);
    }

    #[test]
    fn test_null_yields_default() {
        let m = sample();
        assert_eq!(m.get_string("description"), "");
        assert_eq!(m.get_or("description", "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_type_mismatch_yields_default() {
        let m = sample();
        // A numeric string is not a number.
        assert_eq!(m.get_or("count", 0i64), 0);
        // A number is not a string.
        assert_eq!(m.get_string("size"), "");
        // Out of range for i32.
        assert_eq!(m.get_or("huge", -1i32), -1);
        // Negative is not a u64.
        assert_eq!(m.get_or("negative", 9u64), 9);
        // A float is not an integer.
        assert_eq!(m.get_or("ratio", 2i64), 2);
    }

    #[test]
    fn test_absent_map_yields_default() {
        let none: Option<&ResponseMap> = None;
        assert_eq!(none.get_string("id"), "");
        assert_eq!(none.get_or("size", 12i64), 12);

        let m = sample();
        assert_eq!(Some(&m).get_string("name"), "notes.txt");
    }

    #[test]
    fn test_nested_collections() {
        let m = json!({ "data": [ { "id": "a" }, { "id": "b" } ], "from": { "name": "Ann" } })
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(m.get_or("data", Vec::new()).len(), 2);
        let from = m.get_or("from", ResponseMap::new());
        assert_eq!(from.get_string("name"), "Ann");
        assert!(m.get_or("from", Vec::new()).is_empty());
    }
}
