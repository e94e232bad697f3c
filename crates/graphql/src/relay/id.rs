//! Opaque global IDs: base64 of `<type name>:<raw id>`.

use std::sync::Arc;

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    schemagen_config::{IdSerializerKind, is_valid_name},
    serde_json::Value,
};

use crate::error::DecodeError;

/// Turns a raw identifier value into the string embedded in a global ID.
pub trait IdSerializer: Send + Sync {
    fn serialize(&self, raw: &Value) -> Result<String, DecodeError>;

    /// Inverse of [`serialize`](Self::serialize), used when a decoded ID is
    /// handed back to domain code.
    fn deserialize(&self, raw: &str) -> Value {
        Value::String(raw.to_string())
    }
}

/// Strings verbatim, numbers and booleans via `to_string`, composites as
/// compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainIdSerializer;

impl IdSerializer for PlainIdSerializer {
    fn serialize(&self, raw: &Value) -> Result<String, DecodeError> {
        match raw {
            Value::Null => Err(DecodeError::unserializable_id("id is null")),
            Value::String(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Array(_) | Value::Object(_) => serde_json::to_string(raw)
                .map_err(|e| DecodeError::unserializable_id(e.to_string())),
        }
    }
}

/// Always compact JSON, so composite keys survive the round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonIdSerializer;

impl IdSerializer for JsonIdSerializer {
    fn serialize(&self, raw: &Value) -> Result<String, DecodeError> {
        if raw.is_null() {
            return Err(DecodeError::unserializable_id("id is null"));
        }
        serde_json::to_string(raw).map_err(|e| DecodeError::unserializable_id(e.to_string()))
    }

    fn deserialize(&self, raw: &str) -> Value {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }
}

/// Encodes and decodes global IDs.
#[derive(Clone)]
pub struct GlobalIdCodec {
    serializer: Arc<dyn IdSerializer>,
}

impl std::fmt::Debug for GlobalIdCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalIdCodec").finish_non_exhaustive()
    }
}

impl Default for GlobalIdCodec {
    fn default() -> Self {
        Self::new(Arc::new(PlainIdSerializer))
    }
}

impl GlobalIdCodec {
    #[must_use]
    pub fn new(serializer: Arc<dyn IdSerializer>) -> Self {
        Self { serializer }
    }

    #[must_use]
    pub fn from_kind(kind: IdSerializerKind) -> Self {
        match kind {
            IdSerializerKind::Plain => Self::new(Arc::new(PlainIdSerializer)),
            IdSerializerKind::Json => Self::new(Arc::new(JsonIdSerializer)),
        }
    }

    #[must_use]
    pub fn encode(&self, type_name: &str, raw_id: &str) -> String {
        STANDARD.encode(format!("{type_name}:{raw_id}"))
    }

    /// Serialize a raw id value, then [`encode`](Self::encode) it.
    pub fn encode_value(&self, type_name: &str, raw: &Value) -> Result<String, DecodeError> {
        let raw_id = self.serializer.serialize(raw)?;
        Ok(self.encode(type_name, &raw_id))
    }

    /// Split a global ID back into its type name and raw id.
    pub fn decode(&self, global_id: &str) -> Result<(String, String), DecodeError> {
        let bytes = STANDARD
            .decode(global_id)
            .map_err(|e| DecodeError::malformed_id(global_id, e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| DecodeError::malformed_id(global_id, "payload is not UTF-8"))?;
        // Type names never contain ':', raw ids may.
        let Some((type_name, raw_id)) = text.split_once(':') else {
            return Err(DecodeError::malformed_id(global_id, "missing type separator"));
        };
        if !is_valid_name(type_name) {
            return Err(DecodeError::malformed_id(global_id, "invalid type name"));
        }
        Ok((type_name.to_string(), raw_id.to_string()))
    }

    /// [`decode`](Self::decode), with the raw id deserialized.
    pub fn decode_value(&self, global_id: &str) -> Result<(String, Value), DecodeError> {
        let (type_name, raw_id) = self.decode(global_id)?;
        Ok((type_name, self.serializer.deserialize(&raw_id)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, proptest::prelude::*, rstest::rstest, serde_json::json};

    #[test]
    fn encodes_type_and_raw_id() {
        let codec = GlobalIdCodec::default();
        let id = codec.encode("User", "42");
        assert_eq!(id, "VXNlcjo0Mg==");
        assert_eq!(codec.decode(&id).unwrap(), ("User".into(), "42".into()));
    }

    #[test]
    fn raw_ids_may_contain_separator() {
        let codec = GlobalIdCodec::default();
        let id = codec.encode("Doc", "a:b:c");
        assert_eq!(codec.decode(&id).unwrap(), ("Doc".into(), "a:b:c".into()));
    }

    #[rstest]
    #[case::not_base64("%%%")]
    #[case::truncated("VXNlcjo0M")]
    #[case::no_separator("VXNlcg==")]
    #[case::empty_type("OjQy")]
    #[case::bad_type_name("MXg6NDI=")]
    #[case::empty("")]
    fn malformed_ids_fail(#[case] input: &str) {
        let err = GlobalIdCodec::default().decode(input).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedGlobalId { .. }), "{err}");
    }

    #[test]
    fn plain_serializer_formats_scalars() {
        let codec = GlobalIdCodec::default();
        let (_, raw) = codec.decode(&codec.encode_value("A", &json!(7)).unwrap()).unwrap();
        assert_eq!(raw, "7");
        let (_, raw) = codec
            .decode(&codec.encode_value("A", &json!([1, "x"])).unwrap())
            .unwrap();
        assert_eq!(raw, r#"[1,"x"]"#);
        assert!(codec.encode_value("A", &Value::Null).is_err());
    }

    #[test]
    fn json_serializer_round_trips_composites() {
        let codec = GlobalIdCodec::from_kind(IdSerializerKind::Json);
        let raw = json!({"tenant": "acme", "seq": 3});
        let id = codec.encode_value("Order", &raw).unwrap();
        assert_eq!(codec.decode_value(&id).unwrap(), ("Order".into(), raw));

        let id = codec.encode_value("Order", &json!("7")).unwrap();
        assert_eq!(codec.decode(&id).unwrap().1, r#""7""#);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(type_name in "[A-Za-z_][A-Za-z0-9_]{0,24}", raw in ".*") {
            let codec = GlobalIdCodec::default();
            let id = codec.encode(&type_name, &raw);
            prop_assert_eq!(codec.decode(&id).unwrap(), (type_name, raw));
        }

        #[test]
        fn foreign_strings_never_decode_silently(input in ".*") {
            let codec = GlobalIdCodec::default();
            // Anything that does decode must be exactly what encode produces.
            if let Ok((type_name, raw)) = codec.decode(&input) {
                prop_assert_eq!(codec.encode(&type_name, &raw), input);
            }
        }
    }
}
