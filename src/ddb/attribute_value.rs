//! DynamoDB-style `AttributeValue` wire type.
//!
//! `AttributeValue` is a tagged union where exactly one variant is present.
//! The JSON wire format uses single-key objects like `{"S": "hello"}`; numbers
//! travel as decimal text, binaries as base64 text.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

const TYPE_KEYS: &[&str] = &["S", "N", "B", "SS", "NS", "BS", "BOOL", "NULL", "L", "M"];

/// One typed attribute value as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value, still in its textual form.
    N(String),
    /// Binary value, base64 text.
    B(String),
    /// String set.
    Ss(Vec<String>),
    /// Number set, textual members.
    Ns(Vec<String>),
    /// Binary set, base64 text members.
    Bs(Vec<String>),
    /// Boolean value.
    Bool(bool),
    /// Null marker.
    Null(bool),
    /// List of attribute values.
    L(Vec<AttributeValue>),
    /// Map of attribute values, in wire order.
    M(AttributeMap),
}

impl AttributeValue {
    /// Returns the type descriptor used on the wire (e.g. "S", "N", "BOOL").
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

/// Attribute name to value mapping that keeps the order the entries arrived in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap(pub Vec<(String, AttributeValue)>);

impl IntoIterator for AttributeMap {
    type Item = (String, AttributeValue);
    type IntoIter = std::vec::IntoIter<(String, AttributeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de> Deserialize<'de> for AttributeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeMapVisitor)
    }
}

struct AttributeMapVisitor;

impl<'de> Visitor<'de> for AttributeMapVisitor {
    type Value = AttributeMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of attribute names to AttributeValue objects")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, value)) = map.next_entry::<String, AttributeValue>()? {
            entries.push((name, value));
        }
        Ok(AttributeMap(entries))
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeValueVisitor)
    }
}

struct AttributeValueVisitor;

impl<'de> Visitor<'de> for AttributeValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an AttributeValue object with exactly one type key")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let Some(key) = map.next_key::<String>()? else {
            return Err(de::Error::custom("AttributeValue has no type key"));
        };

        let value = match key.as_str() {
            "S" => AttributeValue::S(map.next_value()?),
            "N" => AttributeValue::N(map.next_value()?),
            "B" => AttributeValue::B(map.next_value()?),
            "SS" => AttributeValue::Ss(map.next_value()?),
            "NS" => AttributeValue::Ns(map.next_value()?),
            "BS" => AttributeValue::Bs(map.next_value()?),
            "BOOL" => AttributeValue::Bool(map.next_value()?),
            "NULL" => AttributeValue::Null(map.next_value()?),
            "L" => AttributeValue::L(map.next_value()?),
            "M" => AttributeValue::M(map.next_value()?),
            other => return Err(de::Error::unknown_field(other, TYPE_KEYS)),
        };

        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "AttributeValue has more than one type key ('{key}' and '{extra}')"
            )));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scalars() {
        let val: AttributeValue = serde_json::from_str(r#"{"S":"hello"}"#).unwrap();
        assert_eq!(val, AttributeValue::S("hello".to_string()));

        let val: AttributeValue = serde_json::from_str(r#"{"N":"4.5"}"#).unwrap();
        assert_eq!(val.type_descriptor(), "N");

        let val: AttributeValue = serde_json::from_str(r#"{"NULL":true}"#).unwrap();
        assert_eq!(val, AttributeValue::Null(true));
    }

    #[test]
    fn test_deserialize_nested_map_keeps_order() {
        let json = r#"{"M":{"z":{"S":"1"},"a":{"L":[{"BOOL":false}]}}}"#;
        let val: AttributeValue = serde_json::from_str(json).unwrap();

        let AttributeValue::M(map) = val else {
            panic!("expected a map");
        };
        let names: Vec<&str> = map.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(
            map.0[1].1,
            AttributeValue::L(vec![AttributeValue::Bool(false)])
        );
    }

    #[test]
    fn test_deserialize_sets() {
        let val: AttributeValue = serde_json::from_str(r#"{"SS":["a","b"]}"#).unwrap();
        assert!(matches!(val, AttributeValue::Ss(ref v) if v.len() == 2));

        let val: AttributeValue = serde_json::from_str(r#"{"NS":["1","2.5"]}"#).unwrap();
        assert!(matches!(val, AttributeValue::Ns(ref v) if v.len() == 2));
    }

    #[test]
    fn test_reject_unknown_type_key() {
        let err = serde_json::from_str::<AttributeValue>(r#"{"X":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("X"));
    }

    #[test]
    fn test_reject_several_type_keys() {
        let err = serde_json::from_str::<AttributeValue>(r#"{"S":"a","N":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("more than one type key"));
    }

    #[test]
    fn test_reject_empty_object() {
        assert!(serde_json::from_str::<AttributeValue>("{}").is_err());
    }

    #[test]
    fn test_reject_wrong_payload_type() {
        assert!(serde_json::from_str::<AttributeValue>(r#"{"BOOL":"yes"}"#).is_err());
    }
}
