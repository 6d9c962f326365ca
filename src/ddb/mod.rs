//! Typed attribute records as emitted by DynamoDB exports and streams.

pub mod attribute_value;
pub mod decode;

pub use attribute_value::{AttributeMap, AttributeValue};
pub use decode::{decode_attributes, decode_item, decode_item_str, parse_number, ITEM_FIELD};
