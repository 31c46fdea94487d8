//! JSON Schema nodes and the components section that stores named ones.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default location of named schema definitions inside a document.
pub const COMPONENTS_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// A `$ref` pointer to a named definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Full pointer, e.g. `#/components/schemas/User`
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl Reference {
    #[must_use]
    pub const fn new(ref_path: String) -> Self {
        Self { ref_path }
    }

    /// Pointer below `#/components/schemas/`.
    #[must_use]
    pub fn schema(name: &str) -> Self {
        Self::with_prefix(COMPONENTS_SCHEMA_PREFIX, name)
    }

    /// Pointer below any prefix, e.g. `#/definitions/`.
    #[must_use]
    pub fn with_prefix(prefix: &str, name: &str) -> Self {
        Self::new(format!("{prefix}{name}"))
    }

    /// Last path segment of the reference, i.e. the definition name.
    pub fn name(&self) -> &str {
        self.ref_path
            .rsplit_once('/')
            .map_or(self.ref_path.as_str(), |(_, name)| name)
    }
}

impl From<Reference> for Schema {
    fn from(reference: Reference) -> Self {
        Self {
            ref_path: Some(reference.ref_path),
            ..Self::default()
        }
    }
}

/// Value of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// Writes whole-valued bounds as integers (`0`, not `0.0`).
#[allow(clippy::ref_option)]
fn whole_as_integer<S>(bound: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match *bound {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
            #[allow(clippy::cast_possible_truncation)]
            let whole = n as i64;
            serializer.serialize_some(&whole)
        }
        Some(n) => serializer.serialize_some(&n),
        None => serializer.serialize_none(),
    }
}

/// JSON Schema node.
///
/// A node is either inline (type, attributes, children) or a reference
/// (`$ref` set). Siblings next to `$ref` are allowed and carry member-level
/// overrides such as a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Refinement of `schema_type`, e.g. `int64` or `date-time`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "whole_as_integer")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "whole_as_integer")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "whole_as_integer")]
    pub multiple_of: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the string must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Element schema of an array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Set semantics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    /// Object members in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Value schema of a map-shaped object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<serde_json::Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl Schema {
    /// Node of the given type with no other attribute set.
    #[must_use]
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::new(SchemaType::Integer)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new(SchemaType::Boolean)
    }

    #[must_use]
    pub fn with_format(schema_type: SchemaType, format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::new(schema_type)
        }
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaType::Array)
        }
    }

    /// Object with an empty property map, ready to be filled.
    #[must_use]
    pub fn object() -> Self {
        Self {
            properties: Some(IndexMap::new()),
            ..Self::new(SchemaType::Object)
        }
    }

    /// Object used as a string-keyed map with `values` as value schema.
    #[must_use]
    pub fn map(values: Schema) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::new(SchemaType::Object)
        }
    }

    #[must_use]
    pub fn reference(reference: Reference) -> Self {
        reference.into()
    }

    pub fn is_reference(&self) -> bool {
        self.ref_path.is_some()
    }

    /// Definition name this node points to, if it is a reference.
    pub fn reference_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .map(|path| path.rsplit_once('/').map_or(path, |(_, name)| name))
    }
}

/// The `components` section of a document. Only named schemas are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

impl Components {
    /// `schemas` is left unset when there are no definitions.
    #[must_use]
    pub fn from_schemas(schemas: BTreeMap<String, Schema>) -> Self {
        Self {
            schemas: (!schemas.is_empty()).then_some(schemas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Schema::string(), SchemaType::String)]
    #[case(Schema::integer(), SchemaType::Integer)]
    #[case(Schema::number(), SchemaType::Number)]
    #[case(Schema::boolean(), SchemaType::Boolean)]
    fn primitive_helpers_set_schema_type(#[case] schema: Schema, #[case] expected: SchemaType) {
        assert_eq!(schema.schema_type, Some(expected));
    }

    #[test]
    fn array_helper_sets_type_and_items() {
        let schema = Schema::array(Schema::boolean());

        assert_eq!(schema.schema_type, Some(SchemaType::Array));
        let items = schema.items.expect("items should be set");
        assert_eq!(items.schema_type, Some(SchemaType::Boolean));
    }

    #[test]
    fn object_helper_initializes_properties_only() {
        let schema = Schema::object();

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert!(schema.properties.expect("properties").is_empty());
        assert!(schema.required.is_none());
    }

    #[test]
    fn map_helper_sets_additional_properties() {
        let schema = Schema::map(Schema::integer());
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "object", "additionalProperties": {"type": "integer"}})
        );
    }

    #[rstest]
    #[case(Reference::schema("User"), "#/components/schemas/User", "User")]
    #[case(Reference::with_prefix("#/definitions/", "Node"), "#/definitions/Node", "Node")]
    #[case(Reference::new("Plain".to_string()), "Plain", "Plain")]
    fn reference_paths_and_names(
        #[case] reference: Reference,
        #[case] path: &str,
        #[case] name: &str,
    ) {
        assert_eq!(reference.ref_path, path);
        assert_eq!(reference.name(), name);
        let schema = Schema::reference(reference);
        assert!(schema.is_reference());
        assert_eq!(schema.reference_name(), Some(name));
    }

    #[test]
    fn reference_serializes_as_bare_ref() {
        let schema = Schema::reference(Reference::schema("Address"));
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r##"{"$ref":"#/components/schemas/Address"}"##);
    }

    #[test]
    fn properties_keep_insertion_order() {
        let mut schema = Schema::object();
        let props = schema.properties.as_mut().unwrap();
        props.insert("zeta".to_string(), Schema::string());
        props.insert("alpha".to_string(), Schema::integer());
        let json = serde_json::to_string(&schema).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha, "declaration order lost: {json}");
    }

    #[rstest]
    #[case(Schema { minimum: Some(0.0), ..Schema::integer() }, r#"{"type":"integer","minimum":0}"#)]
    #[case(Schema { maximum: Some(1.5), ..Schema::number() }, r#"{"type":"number","maximum":1.5}"#)]
    #[case(Schema { multiple_of: Some(2.0), ..Schema::integer() }, r#"{"type":"integer","multipleOf":2}"#)]
    #[case(Schema { minimum: Some(-3.0), ..Schema::integer() }, r#"{"type":"integer","minimum":-3}"#)]
    fn whole_bounds_serialize_as_integers(#[case] schema: Schema, #[case] expected: &str) {
        assert_eq!(serde_json::to_string(&schema).unwrap(), expected);
    }

    #[test]
    fn empty_schema_serializes_as_empty_object() {
        let json = serde_json::to_string(&Schema::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn components_from_empty_schemas_omits_field() {
        let components = Components::from_schemas(BTreeMap::new());
        assert!(components.schemas.is_none());
        assert_eq!(serde_json::to_string(&components).unwrap(), "{}");
    }
}
