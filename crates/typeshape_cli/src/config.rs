//! TOML configuration.
//!
//! ```toml
//! [build]
//! ref_prefix = "#/components/schemas/"
//! max_definitions = 500
//! max_nesting = 32
//!
//! [build.terminals.Money]
//! type = "string"
//! format = "decimal"
//!
//! [openapi]
//! title = "Billing"
//! version = "2.1.0"
//!
//! [types.Invoice]
//! description = "An issued invoice"
//!
//! [members.Invoice.number]
//! required = true
//! pattern = "^INV-[0-9]+$"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use typeshape::{BuildOptions, OverrideMap, SchemaOverrides};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub build: BuildOptions,
    pub openapi: OpenApiInfo,
    /// Type-level overrides keyed by type name
    pub types: BTreeMap<String, SchemaOverrides>,
    /// Member overrides keyed by type name, then member name
    pub members: BTreeMap<String, BTreeMap<String, SchemaOverrides>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn override_map(&self) -> OverrideMap {
        let mut map = OverrideMap::new();
        for (owner, overrides) in &self.types {
            map.insert_type(owner.clone(), overrides.clone());
        }
        for (owner, members) in &self.members {
            for (member, overrides) in members {
                map.insert_member(owner.clone(), member.clone(), overrides.clone());
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use typeshape::SchemaType;

    #[test]
    fn loads_full_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("typeshape.toml");
        fs::write(
            &path,
            r##"
[build]
ref_prefix = "#/definitions/"
max_definitions = 10

[build.terminals.Money]
type = "string"
format = "decimal"

[openapi]
title = "Billing"

[types.Invoice]
description = "An issued invoice"

[members.Invoice.number]
required = true
"##,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.build.ref_prefix, "#/definitions/");
        assert_eq!(config.build.max_definitions, Some(10));
        assert_eq!(
            config.build.terminals["Money"].schema_type,
            SchemaType::String
        );
        assert_eq!(config.openapi.title, "Billing");
        assert_eq!(config.openapi.version, "0.1.0");

        let map = config.override_map();
        assert_eq!(
            map.for_type("Invoice").unwrap().description.as_deref(),
            Some("An issued invoice")
        );
        assert_eq!(map.member("Invoice", "number").unwrap().required, Some(true));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.build, BuildOptions::default());
        assert!(config.override_map().is_empty());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("typeshape.toml");
        fs::write(&path, "[paths]\nx = 1\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = Config::load(&temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
