//! Conversion between plain JSON and Firestore's typed `Value` encoding.
//!
//! `{"name": "Onyx"}` travels as `{"name": {"stringValue": "Onyx"}}`. Integers are
//! carried as decimal strings and must fit in an i64, arrays and maps nest their own
//! typed values.

use crate::utils::error::{CatalogError, Result};
use serde_json::{json, Map, Value};

pub fn encode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), encode_value(value)?)))
        .collect()
}

pub fn encode_value(value: &Value) -> Result<Value> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if n.is_u64() {
                return Err(CatalogError::Codec {
                    message: format!("integer {} does not fit in a Firestore int64", n),
                });
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        // An empty array is `{}`, the `values` key is omitted
        Value::Array(items) if items.is_empty() => json!({ "arrayValue": {} }),
        Value::Array(items) => json!({
            "arrayValue": {
                "values": items.iter().map(encode_value).collect::<Result<Vec<_>>>()?
            }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields)? } }),
    };
    Ok(encoded)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

pub fn decode_value(value: &Value) -> Result<Value> {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Err(unsupported(value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().ok_or_else(|| unsupported(value))?)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed.map(Value::from).ok_or_else(|| unsupported(value))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities arrive as strings and have no JSON form
            _ => Ok(Value::Null),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" | "geoPointValue" => {
            Ok(inner.clone())
        }
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields").and_then(Value::as_object) {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        _ => Err(unsupported(value)),
    }
}

fn unsupported(value: &Value) -> CatalogError {
    CatalogError::Codec {
        message: format!("unsupported Firestore value: {}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bean_fields() {
        let fields = json!({
            "flavors": ["citrus", "jasmine"],
            "name": "Ethiopia Yirg",
            "roaster": "Blue Bottle",
            "shade": "light"
        });

        let encoded = encode_fields(fields.as_object().unwrap()).unwrap();

        assert_eq!(encoded["name"], json!({ "stringValue": "Ethiopia Yirg" }));
        assert_eq!(
            encoded["flavors"],
            json!({ "arrayValue": { "values": [
                { "stringValue": "citrus" },
                { "stringValue": "jasmine" }
            ] } })
        );
    }

    #[test]
    fn test_empty_array_round_trip() {
        let encoded = encode_value(&json!([])).unwrap();
        assert_eq!(encoded, json!({ "arrayValue": {} }));
        assert_eq!(decode_value(&encoded).unwrap(), json!([]));
    }

    #[test]
    fn test_encode_numbers() {
        assert_eq!(
            encode_value(&json!(i64::MAX)).unwrap(),
            json!({ "integerValue": "9223372036854775807" })
        );
        assert_eq!(encode_value(&json!(-3)).unwrap(), json!({ "integerValue": "-3" }));
        assert_eq!(encode_value(&json!(0.25)).unwrap(), json!({ "doubleValue": 0.25 }));
    }

    #[test]
    fn test_encode_rejects_integers_beyond_int64() {
        let err = encode_value(&json!({ "count": [u64::MAX] })).unwrap_err();
        assert!(matches!(err, CatalogError::Codec { .. }));
        assert!(err.to_string().contains("18446744073709551615"));
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_value(&json!({ "integerValue": "42" })).unwrap(), json!(42));
        assert_eq!(decode_value(&json!({ "doubleValue": 1.5 })).unwrap(), json!(1.5));
        assert_eq!(decode_value(&json!({ "booleanValue": true })).unwrap(), json!(true));
        assert_eq!(decode_value(&json!({ "nullValue": null })).unwrap(), Value::Null);
        assert_eq!(
            decode_value(&json!({ "timestampValue": "2024-01-01T00:00:00Z" })).unwrap(),
            json!("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_decode_nested_map() {
        let encoded = json!({ "mapValue": { "fields": {
            "city": { "stringValue": "Oakland" },
            "founded": { "integerValue": "2002" }
        } } });

        assert_eq!(
            decode_value(&encoded).unwrap(),
            json!({ "city": "Oakland", "founded": 2002 })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_kinds() {
        assert!(decode_value(&json!({ "mysteryValue": 1 })).is_err());
        assert!(decode_value(&json!("bare string")).is_err());
        assert!(decode_value(&json!({ "integerValue": "forty" })).is_err());
    }
}
