//! Build options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typeshape_core::SchemaType;
use typeshape_core::schema::COMPONENTS_SCHEMA_PREFIX;

pub const DEFAULT_MAX_NESTING: usize = 32;

/// Options of a schema build. Deserializable so hosts can keep them in a
/// configuration file; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Prefix of every `$ref` emitted for a definition
    pub ref_prefix: String,
    /// Upper bound on the number of distinct definitions of one build
    pub max_definitions: Option<usize>,
    /// Deepest type nesting walked before the rest is left opaque
    pub max_nesting: usize,
    /// Extra terminal types, layered over the built-in table
    pub terminals: BTreeMap<String, TerminalSpec>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ref_prefix: COMPONENTS_SCHEMA_PREFIX.to_string(),
            max_definitions: None,
            max_nesting: DEFAULT_MAX_NESTING,
            terminals: BTreeMap::new(),
        }
    }
}

/// Schema of a host-declared terminal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalSpec {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_point_at_components() {
        let options = BuildOptions::default();
        assert_eq!(options.ref_prefix, "#/components/schemas/");
        assert!(options.max_definitions.is_none());
        assert_eq!(options.max_nesting, 32);
        assert!(options.terminals.is_empty());
    }

    #[test]
    fn partial_options_fill_in_defaults() {
        let options: BuildOptions = serde_json::from_value(json!({
            "max_definitions": 10,
            "terminals": { "Money": { "type": "string", "format": "decimal" } }
        }))
        .unwrap();
        assert_eq!(options.ref_prefix, "#/components/schemas/");
        assert_eq!(options.max_definitions, Some(10));
        assert_eq!(
            options.terminals["Money"],
            TerminalSpec {
                schema_type: SchemaType::String,
                format: Some("decimal".to_string())
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_value::<BuildOptions>(json!({ "ref_prefx": "#/x/" }));
        assert!(result.is_err());
    }
}
