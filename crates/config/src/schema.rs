//! Engine configuration types.
//!
//! Every name the generator synthesizes (root types, relay types, suffixes)
//! comes from here so that hosts can match an existing API's conventions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub schema: SchemaConfig,
    pub relay: RelayConfig,
}

/// Root type names and input-side naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub query_type: String,
    pub mutation_type: String,
    /// Appended to an object's name to form its input object name.
    pub input_suffix: String,
    /// Field naming the concrete type of a value of an abstract type, on
    /// input objects and in resolver results.
    pub discriminator: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            query_type: "Query".into(),
            mutation_type: "Mutation".into(),
            input_suffix: "Input".into(),
            discriminator: "_type".into(),
        }
    }
}

/// Relay global object identification and cursor connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub node_interface: String,
    pub node_field: String,
    pub id_field: String,
    pub connection_suffix: String,
    pub edge_suffix: String,
    pub page_info_type: String,
    pub id_serializer: IdSerializerKind,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            node_interface: "Node".into(),
            node_field: "node".into(),
            id_field: "id".into(),
            connection_suffix: "Connection".into(),
            edge_suffix: "Edge".into(),
            page_info_type: "PageInfo".into(),
            id_serializer: IdSerializerKind::default(),
        }
    }
}

/// How raw identifier values are turned into strings before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSerializerKind {
    /// Strings verbatim, numbers and booleans via `to_string`, composites as
    /// compact JSON.
    #[default]
    Plain,
    /// Always compact JSON.
    Json,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [relay]
            node_interface = "Entity"
            id_serializer = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.relay.node_interface, "Entity");
        assert_eq!(cfg.relay.id_serializer, IdSerializerKind::Json);
        assert_eq!(cfg.relay.edge_suffix, "Edge");
        assert_eq!(cfg.schema, SchemaConfig::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = EngineConfig::default();
        cfg.schema.discriminator = "kind".into();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
