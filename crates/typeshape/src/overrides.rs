//! Manual schema overrides layered on top of inferred schemas.
//!
//! Overrides are partial: every `Some` field replaces the inferred value,
//! `None` leaves it alone. Values are replaced wholesale, never deep-merged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use typeshape_core::{Schema, SchemaType};

use crate::type_ref::short_name;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOverrides {
    /// Property name to use instead of the member name
    pub rename: Option<String>,
    /// Drop the member from its owner's properties
    pub hidden: bool,
    /// Add the member to its owner's `required` list
    pub required: Option<bool>,
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pattern: Option<String>,
    pub example: Option<serde_json::Value>,
    pub default: Option<serde_json::Value>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<bool>,
    pub exclusive_maximum: Option<bool>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub allowable_values: Option<Vec<serde_json::Value>>,
    pub nullable: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub deprecated: Option<bool>,
}

macro_rules! take_some {
    ($base:ident, $top:ident; $($field:ident),* $(,)?) => {
        $(
            if $top.$field.is_some() {
                $base.$field = $top.$field.clone();
            }
        )*
    };
}

impl SchemaOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `self` with every field set in `top` replaced by `top`'s value.
    #[must_use]
    pub fn merged_with(&self, top: &SchemaOverrides) -> SchemaOverrides {
        let mut merged = self.clone();
        merged.hidden |= top.hidden;
        take_some!(merged, top;
            rename, required, schema_type, format, title, description, pattern,
            example, default, minimum, maximum, exclusive_minimum, exclusive_maximum,
            min_length, max_length, min_items, max_items, allowable_values,
            nullable, read_only, write_only, deprecated,
        );
        merged
    }

    /// Write the schema-level attributes onto `schema`.
    ///
    /// `rename`, `hidden` and `required` concern the owning object and are
    /// handled by the caller. A type override turns a reference into an inline
    /// node of that type.
    pub fn apply(&self, schema: &mut Schema) {
        if let Some(schema_type) = self.schema_type {
            schema.ref_path = None;
            schema.schema_type = Some(schema_type);
        }
        let top = self;
        take_some!(schema, top;
            format, title, description, pattern, example, default, minimum, maximum,
            exclusive_minimum, exclusive_maximum, min_length, max_length, min_items,
            max_items, nullable, read_only, write_only, deprecated,
        );
        if let Some(values) = &self.allowable_values {
            schema.r#enum = Some(values.clone());
        }
    }
}

/// Side channel of overrides supplied by the host, keyed by owner type and
/// member name. Owners are matched by full name first, then by last segment.
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    members: HashMap<(String, String), SchemaOverrides>,
    types: HashMap<String, SchemaOverrides>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_member(
        &mut self,
        owner: impl Into<String>,
        member: impl Into<String>,
        overrides: SchemaOverrides,
    ) {
        self.members
            .insert((owner.into(), member.into()), overrides);
    }

    pub fn insert_type(&mut self, owner: impl Into<String>, overrides: SchemaOverrides) {
        self.types.insert(owner.into(), overrides);
    }

    pub fn member(&self, owner: &str, member: &str) -> Option<&SchemaOverrides> {
        self.members
            .get(&(owner.to_string(), member.to_string()))
            .or_else(|| {
                self.members
                    .get(&(short_name(owner).to_string(), member.to_string()))
            })
    }

    pub fn for_type(&self, owner: &str) -> Option<&SchemaOverrides> {
        self.types
            .get(owner)
            .or_else(|| self.types.get(short_name(owner)))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.types.is_empty()
    }
}
