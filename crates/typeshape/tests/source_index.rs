use std::fs;

use serde_json::json;
use tempfile::TempDir;
use typeshape::{
    BuildOptions, DiagnosticCode, OverrideMap, SchemaBuilder, SchemaOverrides, SourceIndex,
    TypeRef,
};

const MODELS: &str = r#"
/// A person known to the system
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Full name
    #[schema(min_length = 1, required)]
    pub full_name: String,
    pub address: Option<Address>,
    pub tags: BTreeSet<String>,
    pub scores: HashMap<String, f64>,
    #[serde(skip)]
    pub session: Session,
    pub status: Status,
}

pub struct Address {
    pub city: String,
    pub zip: Option<String>,
}

#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Suspended,
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}
"#;

#[test]
fn builds_definitions_from_rust_source() {
    let index = SourceIndex::from_source(MODELS).unwrap();
    let document = SchemaBuilder::new(&index).build(&TypeRef::class("Person"));
    let definitions = serde_json::to_value(&document.definitions).unwrap();

    assert_eq!(
        definitions["Person"],
        json!({
            "type": "object",
            "description": "A person known to the system",
            "properties": {
                "fullName": {"type": "string", "description": "Full name", "minLength": 1},
                "address": {"$ref": "#/components/schemas/Address"},
                "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
                "scores": {
                    "type": "object",
                    "additionalProperties": {"type": "number", "format": "double"}
                },
                "status": {"type": "string", "enum": ["active", "suspended"]}
            },
            "required": ["fullName"]
        })
    );
    assert_eq!(
        definitions["Address"],
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "zip": {"type": "string"}
            }
        })
    );
    assert_eq!(definitions["Status"], json!({"type": "string", "enum": ["active", "suspended"]}));
    assert!(document.warnings().next().is_none());
}

#[test]
fn generic_source_types_instantiate_per_argument() {
    let index = SourceIndex::from_source(MODELS).unwrap();
    let roots: Vec<TypeRef> = ["Page<Address>", "Page<Status>"]
        .iter()
        .map(|src| src.parse().unwrap())
        .collect();
    let set = SchemaBuilder::new(&index).build_many(&roots);
    let definitions = serde_json::to_value(&set.definitions).unwrap();

    assert_eq!(
        definitions["PageAddress"]["properties"]["items"]["items"],
        json!({"$ref": "#/components/schemas/Address"})
    );
    assert_eq!(
        definitions["PageStatus"]["properties"]["items"]["items"],
        json!({"type": "string", "enum": ["active", "suspended"]})
    );
    assert_eq!(
        definitions["PageAddress"]["properties"]["total"],
        json!({"type": "integer", "minimum": 0})
    );
}

#[test]
fn host_overrides_and_options_apply_to_source_types() {
    let index = SourceIndex::from_source(MODELS).unwrap();
    let mut overrides = OverrideMap::new();
    overrides.insert_member(
        "Address",
        "zip",
        SchemaOverrides {
            pattern: Some("^[0-9]{5}$".to_string()),
            required: Some(true),
            ..SchemaOverrides::default()
        },
    );
    let options = BuildOptions {
        ref_prefix: "#/definitions/".to_string(),
        ..BuildOptions::default()
    };
    let document = SchemaBuilder::new(&index)
        .with_options(options)
        .with_overrides(overrides)
        .build(&TypeRef::class("Address"));

    assert_eq!(document.root.ref_path.as_deref(), Some("#/definitions/Address"));
    assert_eq!(
        serde_json::to_value(document.definition("Address").unwrap()).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "zip": {"type": "string", "pattern": "^[0-9]{5}$"}
            },
            "required": ["zip"]
        })
    );
}

#[test]
fn directory_index_reports_unknown_types() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("models")).unwrap();
    fs::write(
        temp_dir.path().join("models/order.rs"),
        "pub struct Order { pub id: uuid::Uuid, pub total: Money, pub lines: Vec<Line> }",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("models/line.rs"),
        "pub struct Line { pub sku: String, pub quantity: u32 }",
    )
    .unwrap();

    let index = SourceIndex::from_dir(temp_dir.path()).unwrap();
    let document = SchemaBuilder::new(&index).build(&TypeRef::class("Order"));
    let definitions = serde_json::to_value(&document.definitions).unwrap();

    assert_eq!(
        definitions["Order"]["properties"]["id"],
        json!({"type": "string", "format": "uuid"})
    );
    assert_eq!(definitions["Order"]["properties"]["total"], json!({"type": "object"}));
    assert_eq!(
        definitions["Line"]["properties"]["quantity"],
        json!({"type": "integer", "format": "uint32"})
    );
    let warnings: Vec<_> = document.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, DiagnosticCode::UnknownType);
}

#[test]
fn same_named_structs_in_different_modules_get_distinct_definitions() {
    let index = SourceIndex::from_source(
        r#"
        mod a { pub struct User { pub id: u64 } }
        mod b { pub struct User { pub email: String } }
        pub struct Pair { pub first: a::User, pub second: b::User }
        "#,
    )
    .unwrap();
    let document = SchemaBuilder::new(&index).build(&TypeRef::class("Pair"));
    let definitions = serde_json::to_value(&document.definitions).unwrap();

    assert_eq!(document.definitions.len(), 3);
    assert_eq!(
        definitions["Pair"]["properties"],
        json!({
            "first": {"$ref": "#/components/schemas/User"},
            "second": {"$ref": "#/components/schemas/User2"}
        })
    );
    assert!(definitions["User"]["properties"].get("id").is_some());
    assert_eq!(definitions["User2"]["properties"]["email"], json!({"type": "string"}));
    assert_eq!(
        document
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::ReferenceNameCollision)
            .count(),
        1
    );
    assert!(document.warnings().next().is_none());
}

#[test]
fn directory_modules_keep_same_named_files_apart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for (module, field) in [("billing", "iban"), ("auth", "login")] {
        fs::create_dir_all(temp_dir.path().join(module)).unwrap();
        fs::write(
            temp_dir.path().join(module).join("account.rs"),
            format!("pub struct Account {{ pub {field}: String }}"),
        )
        .unwrap();
    }
    fs::write(
        temp_dir.path().join("lib.rs"),
        "pub struct Customer { pub billing: crate::billing::account::Account, pub auth: auth::account::Account }",
    )
    .unwrap();

    let index = SourceIndex::from_dir(temp_dir.path()).unwrap();
    let document = SchemaBuilder::new(&index).build(&TypeRef::class("Customer"));

    assert_eq!(document.definitions.len(), 3);
    let billing = serde_json::to_value(document.definition("Account").unwrap()).unwrap();
    let auth = serde_json::to_value(document.definition("Account2").unwrap()).unwrap();
    assert_eq!(billing["properties"]["iban"], json!({"type": "string"}));
    assert_eq!(auth["properties"]["login"], json!({"type": "string"}));
    assert!(document.warnings().next().is_none());
}

#[test]
fn sources_added_per_module_keep_both_declarations() {
    let mut index = SourceIndex::new();
    index
        .add_module_source("a", "pub struct User { pub id: u64 }")
        .unwrap();
    index
        .add_module_source("b", "pub struct User { pub email: String }")
        .unwrap();
    index
        .add_source("pub struct Pair { pub a: a::User, pub b: b::User }")
        .unwrap();
    assert_eq!(index.len(), 3);

    let document = SchemaBuilder::new(&index).build(&TypeRef::class("Pair"));
    let definitions = serde_json::to_value(&document.definitions).unwrap();

    assert_eq!(
        definitions["Pair"]["properties"]["b"],
        json!({"$ref": "#/components/schemas/User2"})
    );
    assert!(definitions["User"]["properties"].get("id").is_some());
    assert!(definitions["User"]["properties"].get("email").is_none());
    assert_eq!(definitions["User2"]["properties"]["email"], json!({"type": "string"}));
}
