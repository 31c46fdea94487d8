//! Minimal OpenAPI document that hosts generated definitions.

use crate::schema::{Components, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.3")]
    V3_0_3,
    #[serde(rename = "3.1.0")]
    #[default]
    V3_1_0,
}

/// The `info` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A security requirement: scheme name to required scopes.
///
/// Schemes without scopes are stored with an empty scope list, whichever
/// way they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement(BTreeMap<String, Vec<String>>);

impl SecurityRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` with no scopes.
    pub fn add_scheme(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_scheme_with_scopes(name, None)
    }

    /// Require `name` with the given scopes; `None` is stored as an empty list.
    pub fn add_scheme_with_scopes(
        &mut self,
        name: impl Into<String>,
        scopes: Option<Vec<String>>,
    ) -> &mut Self {
        self.0.insert(name.into(), scopes.unwrap_or_default());
        self
    }

    pub fn scopes(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Document root. Paths stay empty; only components are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    pub openapi: OpenApiVersion,
    pub info: Info,
    #[serde(default)]
    pub paths: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Document-wide requirements, any one of which must be met
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl OpenApi {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: OpenApiVersion::default(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            paths: BTreeMap::new(),
            components: None,
            security: None,
        }
    }

    /// Attach schema definitions, keeping any already present on conflict.
    pub fn with_schemas(mut self, schemas: BTreeMap<String, Schema>) -> Self {
        self.merge_components(Components::from_schemas(schemas));
        self
    }

    /// Definitions already in the document win over incoming ones.
    pub fn merge_components(&mut self, incoming: Components) {
        let Some(schemas) = incoming.schemas else {
            return;
        };
        let target = self
            .components
            .get_or_insert_with(Components::default)
            .schemas
            .get_or_insert_with(BTreeMap::new);
        for (name, schema) in schemas {
            target.entry(name).or_insert(schema);
        }
    }

    pub fn add_security(&mut self, requirement: SecurityRequirement) {
        self.security.get_or_insert_with(Vec::new).push(requirement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_scheme_variants_store_empty_scope_list() {
        let mut plain = SecurityRequirement::new();
        plain.add_scheme("api_key");
        let mut explicit_none = SecurityRequirement::new();
        explicit_none.add_scheme_with_scopes("api_key", None);

        assert_eq!(plain, explicit_none);
        assert_eq!(plain.scopes("api_key"), Some(&[][..]));
        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            r#"{"api_key":[]}"#
        );
    }

    #[test]
    fn add_scheme_with_scopes_keeps_scopes() {
        let mut requirement = SecurityRequirement::new();
        requirement
            .add_scheme_with_scopes("oauth", Some(vec!["read".into(), "write".into()]))
            .add_scheme("api_key");
        assert_eq!(
            requirement.scopes("oauth").unwrap(),
            &["read".to_string(), "write".to_string()]
        );
        assert!(!requirement.is_empty());
    }

    #[test]
    fn with_schemas_keeps_existing_definitions() {
        let mut first = BTreeMap::new();
        first.insert("User".to_string(), Schema::object());
        let mut second = BTreeMap::new();
        second.insert("User".to_string(), Schema::string());
        second.insert("Address".to_string(), Schema::object());

        let doc = OpenApi::new("api", "1.0.0")
            .with_schemas(first)
            .with_schemas(second);
        let schemas = doc.components.unwrap().schemas.unwrap();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas["User"], Schema::object());
    }

    #[test]
    fn document_serializes_version_and_empty_paths() {
        let doc = OpenApi::new("api", "0.1.0");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["openapi"], "3.1.0");
        assert_eq!(json["paths"], serde_json::json!({}));
        assert!(json.get("components").is_none());
    }
}
