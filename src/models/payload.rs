//! Value payload encoding
//!
//! Clients send any JSON value; the store holds its serialized text and the
//! API hands the same value back.

use serde_json::Value;

/// Serializes a JSON value into the text kept in the store.
pub fn encode_payload(value: &Value) -> String {
    value.to_string()
}

/// Parses stored text back into a JSON value.
///
/// Text written through the library API need not be JSON; it comes back as a
/// JSON string.
pub fn decode_payload(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
