//! Lenient field decoders
//!
//! The repository stores free-form JSON per profile. These helpers accept the
//! shapes seen in practice (numbers where text is expected, a single id where
//! a list is expected) instead of rejecting the whole fields map.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Scalar JSON value as text; objects, arrays and null yield `None`
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `Option<String>` accepting any scalar
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

/// `Vec<String>` accepting a list of scalars or a single scalar
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(&other).into_iter().collect(),
    })
}

/// `T::default()` when the value is `null`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drop `null` members recursively so that serde defaults apply to them
pub fn strip_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), strip_value(v)))
        .collect()
}

fn strip_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_nulls(map)),
        Value::Array(items) => Value::Array(items.iter().map(strip_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "opt_string")]
        version: Option<String>,
        #[serde(deserialize_with = "string_or_list")]
        ids: Vec<String>,
    }

    #[test]
    fn test_numbers_become_text() {
        let probe: Probe = serde_json::from_value(json!({"version": 3})).unwrap();
        assert_eq!(probe.version.as_deref(), Some("3"));
    }

    #[test]
    fn test_single_id_becomes_list() {
        let probe: Probe = serde_json::from_value(json!({"ids": "c1"})).unwrap();
        assert_eq!(probe.ids, vec!["c1"]);
        let probe: Probe = serde_json::from_value(json!({"ids": ["c1", 2, null]})).unwrap();
        assert_eq!(probe.ids, vec!["c1", "2"]);
    }

    #[test]
    fn test_strip_nulls_is_recursive() {
        let map = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}]});
        let stripped = strip_nulls(map.as_object().unwrap());
        assert_eq!(Value::Object(stripped), json!({"b": {"d": 1}, "e": [{}]}));
    }
}
