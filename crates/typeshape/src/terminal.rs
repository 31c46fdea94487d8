//! Terminal types: names that map straight to a scalar schema and need no
//! further graph expansion.
//!
//! Integer and float widths use the `format` registry names; unsigned types
//! without a registry format fall back to `minimum: 0`.

use std::collections::{BTreeMap, HashMap};

use typeshape_core::{Schema, SchemaType};

use crate::options::TerminalSpec;
use crate::type_ref::short_name;

#[derive(Debug, Clone)]
pub struct TerminalTypes {
    table: HashMap<String, Schema>,
}

impl Default for TerminalTypes {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TerminalTypes {
    /// Rust primitives plus the common `std`, `chrono`, `time`, `uuid`,
    /// `rust_decimal` and `url` scalar types.
    pub fn builtin() -> Self {
        let mut table = HashMap::new();
        let mut add = |names: &[&str], schema: Schema| {
            for name in names {
                table.insert((*name).to_string(), schema.clone());
            }
        };

        add(&["i8"], Schema::with_format(SchemaType::Integer, "int8"));
        add(&["i16"], Schema::with_format(SchemaType::Integer, "int16"));
        add(&["i32"], Schema::with_format(SchemaType::Integer, "int32"));
        add(&["i64"], Schema::with_format(SchemaType::Integer, "int64"));
        add(&["u8"], Schema::with_format(SchemaType::Integer, "uint8"));
        add(&["u16"], Schema::with_format(SchemaType::Integer, "uint16"));
        add(&["u32"], Schema::with_format(SchemaType::Integer, "uint32"));
        add(&["u64"], Schema::with_format(SchemaType::Integer, "uint64"));
        add(&["i128", "isize"], Schema::integer());
        add(
            &["u128", "usize"],
            Schema {
                minimum: Some(0.0),
                ..Schema::integer()
            },
        );
        add(&["f32"], Schema::with_format(SchemaType::Number, "float"));
        add(&["f64"], Schema::with_format(SchemaType::Number, "double"));
        add(&["Decimal"], Schema::with_format(SchemaType::Number, "decimal"));
        add(&["bool"], Schema::boolean());
        add(&["char"], Schema::with_format(SchemaType::String, "char"));
        add(&["String", "str", "OsString", "PathBuf", "Path"], Schema::string());
        add(&["Uuid"], Schema::with_format(SchemaType::String, "uuid"));
        add(&["Url"], Schema::with_format(SchemaType::String, "uri"));
        add(
            &[
                "DateTime",
                "NaiveDateTime",
                "OffsetDateTime",
                "PrimitiveDateTime",
                "SystemTime",
            ],
            Schema::with_format(SchemaType::String, "date-time"),
        );
        add(
            &["NaiveDate", "Date"],
            Schema::with_format(SchemaType::String, "date"),
        );
        add(
            &["NaiveTime", "Time"],
            Schema::with_format(SchemaType::String, "time"),
        );
        add(
            &["Duration"],
            Schema::with_format(SchemaType::String, "duration"),
        );
        add(
            &["IpAddr", "Ipv4Addr", "Ipv6Addr"],
            Schema::with_format(SchemaType::String, "ip"),
        );
        add(&["()"], Schema::new(SchemaType::Null));

        Self { table }
    }

    /// Builtin table extended (and possibly overridden) by host entries.
    pub fn with_extra(extra: &BTreeMap<String, TerminalSpec>) -> Self {
        let mut terminals = Self::builtin();
        for (name, spec) in extra {
            terminals.insert(name.clone(), spec);
        }
        terminals
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: &TerminalSpec) {
        let schema = Schema {
            format: spec.format.clone(),
            ..Schema::new(spec.schema_type)
        };
        self.table.insert(name.into(), schema);
    }

    /// Scalar schema for `name`, matched exactly and then by last segment.
    pub fn lookup(&self, name: &str) -> Option<&Schema> {
        self.table
            .get(name)
            .or_else(|| self.table.get(short_name(name)))
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
