//! Serialization layer: the store as a single JSON object via serde_json.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    pretty: bool,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::pretty()
    }
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Pretty-printed JSON with 2-space indentation. This is the default.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Encode a snapshot of the store.
    pub fn serialize(&self, data: &Map<String, Value>) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(Error::from)
    }

    /// Decode a whole backing file. Anything but a JSON object is an error.
    pub fn deserialize(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Map<String, Value>, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("b".into(), json!([1, 2]));
        map.insert("a".into(), json!({"nested": true}));
        map
    }

    #[test]
    fn pretty_uses_two_space_indent() {
        let bytes = JsonSerializer::pretty().serialize(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"b\": [\n    1,"));
    }

    #[test]
    fn compact_is_one_line_and_keeps_order() {
        let bytes = JsonSerializer::compact().serialize(&sample()).unwrap();
        assert_eq!(bytes, br#"{"b":[1,2],"a":{"nested":true}}"#.to_vec());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(JsonSerializer::default().deserialize(b"[1, 2, 3]").is_err());
        assert!(JsonSerializer::default().deserialize(b"{\"half\": ").is_err());
    }
}
