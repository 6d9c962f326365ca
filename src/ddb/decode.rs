//! Decoding of `{"Item": {...}}` envelopes into native JSON trees.
//!
//! Numbers never become arbitrary-precision decimals: a literal containing a
//! `.` is read as `f64`, anything else as an integer.

use crate::ddb::attribute_value::{AttributeMap, AttributeValue};
use crate::error::{ReshapeError, ReshapeResult};
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Name of the envelope field carrying the attribute map.
pub const ITEM_FIELD: &str = "Item";

/// Decode an envelope record into a plain map of native values.
pub fn decode_item(envelope: &Value) -> ReshapeResult<Map<String, Value>> {
    let item = envelope
        .get(ITEM_FIELD)
        .ok_or_else(|| ReshapeError::MissingField(ITEM_FIELD.to_string()))?;

    let attributes =
        AttributeMap::deserialize(item).map_err(|e| ReshapeError::Decode(e.to_string()))?;

    decode_attributes(attributes)
}

/// Decode an envelope given as JSON text.
pub fn decode_item_str(json: &str) -> ReshapeResult<Map<String, Value>> {
    let envelope: Value = serde_json::from_str(json)?;
    decode_item(&envelope)
}

/// Decode an already-parsed attribute map (no envelope).
pub fn decode_attributes(attributes: AttributeMap) -> ReshapeResult<Map<String, Value>> {
    let mut out = Map::new();
    for (name, value) in attributes {
        out.insert(name, value.into_native()?);
    }
    Ok(out)
}

impl AttributeValue {
    /// Convert into a native value, applying the numeric policy to `N` and `NS`.
    ///
    /// Binaries stay as their base64 text once it is known to decode, and
    /// sets become lists in wire order.
    pub fn into_native(self) -> ReshapeResult<Value> {
        let value = match self {
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::B(b) => Value::String(check_binary(b)?),
            AttributeValue::N(n) => Value::Number(parse_number(&n)?),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Ss(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            AttributeValue::Bs(items) => Value::Array(
                items
                    .into_iter()
                    .map(|b| check_binary(b).map(Value::String))
                    .collect::<ReshapeResult<_>>()?,
            ),
            AttributeValue::Ns(items) => Value::Array(
                items
                    .iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<ReshapeResult<_>>()?,
            ),
            AttributeValue::L(items) => Value::Array(
                items
                    .into_iter()
                    .map(AttributeValue::into_native)
                    .collect::<ReshapeResult<_>>()?,
            ),
            AttributeValue::M(map) => Value::Object(decode_attributes(map)?),
        };
        Ok(value)
    }
}

fn check_binary(encoded: String) -> ReshapeResult<String> {
    base64::engine::general_purpose::STANDARD
        .decode(&encoded)
        .map_err(|e| ReshapeError::Decode(format!("invalid base64 binary '{encoded}': {e}")))?;
    Ok(encoded)
}

/// Parse a wire number literal: floating point if it contains a `.`,
/// otherwise a signed integer (falling back to unsigned for large positives).
pub fn parse_number(literal: &str) -> ReshapeResult<Number> {
    let malformed = || ReshapeError::NumericFormat {
        literal: literal.to_string(),
    };

    if literal.contains('.') {
        let f: f64 = literal.parse().map_err(|_| malformed())?;
        return Number::from_f64(f).ok_or_else(malformed);
    }

    if let Ok(i) = literal.parse::<i64>() {
        return Ok(Number::from(i));
    }
    literal.parse::<u64>().map(Number::from).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_number() {
        let item = decode_item(&json!({"Item": {"n": {"N": "42"}}})).unwrap();
        assert_eq!(Value::Object(item), json!({"n": 42}));
    }

    #[test]
    fn test_float_number() {
        let item = decode_item(&json!({"Item": {"n": {"N": "4.5"}}})).unwrap();
        let n = item.get("n").unwrap();
        assert!(n.is_f64());
        assert_eq!(n.as_f64(), Some(4.5));
    }

    #[test]
    fn test_integral_float_stays_float() {
        let n = parse_number("10.0").unwrap();
        assert!(n.is_f64());
        assert!(parse_number("-7").unwrap().is_i64());
        assert_eq!(parse_number("18446744073709551615").unwrap().as_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_nested_map() {
        let item = decode_item(&json!({"Item": {"m": {"M": {"a": {"S": "x"}}}}})).unwrap();
        assert_eq!(Value::Object(item), json!({"m": {"a": "x"}}));
    }

    #[test]
    fn test_all_kinds() {
        let envelope = json!({"Item": {
            "s": {"S": "text"},
            "b": {"BOOL": true},
            "z": {"NULL": true},
            "bin": {"B": "AAEC"},
            "ss": {"SS": ["a", "b"]},
            "ns": {"NS": ["1", "2.5"]},
            "l": {"L": [{"N": "1"}, {"S": "two"}, {"M": {"k": {"N": "3"}}}]}
        }});

        let item = decode_item(&envelope).unwrap();
        assert_eq!(
            Value::Object(item),
            json!({
                "s": "text",
                "b": true,
                "z": null,
                "bin": "AAEC",
                "ss": ["a", "b"],
                "ns": [1, 2.5],
                "l": [1, "two", {"k": 3}]
            })
        );
    }

    #[test]
    fn test_output_keeps_wire_order() {
        let item = decode_item_str(r#"{"Item":{"z":{"N":"1"},"a":{"N":"2"},"m":{"N":"3"}}}"#)
            .unwrap();
        let keys: Vec<&String> = item.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_missing_item_field() {
        let err = decode_item(&json!({"Keys": {}})).unwrap_err();
        assert!(matches!(err, ReshapeError::MissingField(ref f) if f == "Item"));
    }

    #[test]
    fn test_malformed_attribute() {
        let err = decode_item(&json!({"Item": {"a": {"Q": "1"}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::Decode(_)));

        let err = decode_item(&json!({"Item": {"a": {"S": "x", "N": "1"}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::Decode(_)));
    }

    #[test]
    fn test_binary_must_be_base64() {
        let item = decode_item(&json!({"Item": {"bs": {"BS": ["AAEC", "/w=="]}}})).unwrap();
        assert_eq!(Value::Object(item), json!({"bs": ["AAEC", "/w=="]}));

        let err = decode_item(&json!({"Item": {"b": {"B": "not base64!"}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::Decode(ref msg) if msg.contains("not base64!")));

        let err = decode_item(&json!({"Item": {"bs": {"BS": ["AAEC", "%%"]}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::Decode(_)));
    }

    #[test]
    fn test_malformed_number() {
        let err = decode_item(&json!({"Item": {"a": {"N": "12abc"}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::NumericFormat { ref literal } if literal == "12abc"));

        let err = decode_item(&json!({"Item": {"a": {"NS": ["1", "x.y"]}}})).unwrap_err();
        assert!(matches!(err, ReshapeError::NumericFormat { .. }));

        assert!(parse_number("1e5").is_err());
        assert!(parse_number("1.0e999").is_err());
    }
}
