//! Type index filled from Rust source code.
//!
//! Structs with named fields and unit-only enums are indexed by their module
//! path, so `models::User` and `admin::User` stay apart. The path comes from
//! the file's location below the indexed directory plus any inline `mod`
//! blocks; items at the crate root keep their bare identifier. Everything
//! else is ignored; references to it degrade at build time like any unknown
//! type.
//!
//! Field types naming a sibling item of the same module, or spelled with
//! `crate::`, `self::` or `super::`, are rewritten to the same module paths.
//! Other paths are kept as written and found by the index's suffix lookup.

mod attrs;
mod collector;
mod decl;
mod types;

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path};

use anyhow::Context;
use tracing::{debug, warn};

pub use attrs::{SerdeAttrs, expr_to_value, extract_doc_comment, extract_schema_overrides, rename_field};
use attrs::strip_raw_prefix;
pub use collector::collect_files;
pub use decl::{class_from_struct, enum_from_item};
pub use types::type_from_syn;

use crate::error::SourceError;
use crate::index::{ClassDecl, InMemoryTypeIndex, Marker, TypeIndex};
use crate::type_ref::TypeRef;

/// [`TypeIndex`] over parsed Rust items, with the standard container and
/// wrapper markers pre-registered.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    inner: InMemoryTypeIndex,
}

impl Default for SourceIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemoryTypeIndex::with_std_markers(),
        }
    }

    pub fn from_source(source: &str) -> Result<Self, SourceError> {
        let mut index = Self::new();
        index.add_source(source)?;
        Ok(index)
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let mut index = Self::new();
        index.add_file(path)?;
        Ok(index)
    }

    pub fn from_dir(path: &Path) -> anyhow::Result<Self> {
        let mut index = Self::new();
        index.add_dir(path)?;
        Ok(index)
    }

    /// Parse a source string as the crate root and index its items. Returns
    /// the number of declarations added.
    pub fn add_source(&mut self, source: &str) -> Result<usize, SourceError> {
        self.add_named_source(source, "", "<source>")
    }

    /// [`Self::add_source`] for the module at `module`, e.g. `models::user`.
    pub fn add_module_source(&mut self, module: &str, source: &str) -> Result<usize, SourceError> {
        self.add_named_source(source, module, "<source>")
    }

    /// Index a single file as the crate root.
    pub fn add_file(&mut self, path: &Path) -> Result<usize, SourceError> {
        self.add_file_as(path, "")
    }

    /// Index every `.rs` file below `path`, each under the module its
    /// location implies: `models/user.rs` and `models/user/mod.rs` are
    /// `models::user`, `lib.rs` and `main.rs` are the root.
    pub fn add_dir(&mut self, path: &Path) -> anyhow::Result<usize> {
        let mut added = 0;
        for file in collect_files(path)? {
            let module = module_path(path, &file);
            added += self
                .add_file_as(&file, &module)
                .with_context(|| format!("Failed to index {}", file.display()))?;
        }
        debug!(dir = %path.display(), added, "indexed source directory");
        Ok(added)
    }

    fn add_file_as(&mut self, path: &Path, module: &str) -> Result<usize, SourceError> {
        let source = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_named_source(&source, module, &path.display().to_string())
    }

    fn add_named_source(
        &mut self,
        source: &str,
        module: &str,
        origin: &str,
    ) -> Result<usize, SourceError> {
        let file = syn::parse_file(source).map_err(|source| SourceError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let added = self.add_items(module, &file.items);
        debug!(origin, module, added, "indexed source");
        Ok(added)
    }

    /// Index the items of `module` (`""` for the crate root), descending into
    /// inline modules.
    pub fn add_items(&mut self, module: &str, items: &[syn::Item]) -> usize {
        let siblings: HashSet<String> = items.iter().filter_map(declared_ident).collect();
        let mut added = 0;
        for item in items {
            let decl = match item {
                syn::Item::Struct(item) => class_from_struct(item),
                syn::Item::Enum(item) => enum_from_item(item),
                syn::Item::Mod(nested) => {
                    if let Some((_, content)) = &nested.content {
                        let ident = nested.ident.to_string();
                        added += self.add_items(&join(module, strip_raw_prefix(&ident)), content);
                    }
                    None
                }
                _ => None,
            };
            if let Some(decl) = decl {
                self.insert(qualified(decl, module, &siblings));
                added += 1;
            }
        }
        added
    }

    pub fn insert(&mut self, decl: ClassDecl) {
        let name = decl.name.clone();
        if self.inner.insert(decl).is_some() {
            warn!(%name, "declared twice, the later declaration wins");
        }
    }

    pub fn add_marker(&mut self, name: impl Into<String>, marker: Marker) {
        self.inner.add_marker(name, marker);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn declarations(&self) -> impl Iterator<Item = &ClassDecl> {
        self.inner.declarations()
    }
}

/// Module of `file` below the indexed directory `root`.
fn module_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let last = segments.last().map(String::as_str);
    if last == Some("mod") || (segments.len() == 1 && matches!(last, Some("lib" | "main"))) {
        segments.pop();
    }
    segments.join("::")
}

fn declared_ident(item: &syn::Item) -> Option<String> {
    let ident = match item {
        syn::Item::Struct(item) => &item.ident,
        syn::Item::Enum(item) => &item.ident,
        _ => return None,
    };
    Some(strip_raw_prefix(&ident.to_string()).to_string())
}

fn join(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}::{name}")
    }
}

/// `decl` keyed under `module`, with its type references rewritten to the
/// same module paths.
fn qualified(mut decl: ClassDecl, module: &str, siblings: &HashSet<String>) -> ClassDecl {
    decl.name = join(module, &decl.name);
    for member in &mut decl.members {
        member.ty = qualify(&member.ty, module, siblings);
    }
    for supertype in &mut decl.supertypes {
        *supertype = qualify(supertype, module, siblings);
    }
    for param in &mut decl.type_params {
        if let Some(bound) = &param.bound {
            param.bound = Some(qualify(bound, module, siblings));
        }
    }
    decl
}

fn qualify(ty: &TypeRef, module: &str, siblings: &HashSet<String>) -> TypeRef {
    match ty {
        TypeRef::Class { name, args } => TypeRef::Class {
            name: qualify_path(name, module, siblings),
            args: args.iter().map(|arg| qualify(arg, module, siblings)).collect(),
        },
        TypeRef::Array { component, dims } => {
            TypeRef::array_of(qualify(component, module, siblings), *dims)
        }
        TypeRef::Wildcard { upper } => {
            TypeRef::wildcard(upper.as_deref().map(|upper| qualify(upper, module, siblings)))
        }
        other => other.clone(),
    }
}

fn qualify_path(name: &str, module: &str, siblings: &HashSet<String>) -> String {
    if let Some(rest) = name.strip_prefix("crate::") {
        return rest.to_string();
    }
    if let Some(rest) = name.strip_prefix("self::") {
        return join(module, rest);
    }
    if name.starts_with("super::") {
        let mut segments: Vec<&str> = module.split("::").filter(|s| !s.is_empty()).collect();
        let mut rest = name;
        while let Some(tail) = rest.strip_prefix("super::") {
            segments.pop();
            rest = tail;
        }
        return join(&segments.join("::"), rest);
    }
    if siblings.contains(name) {
        return join(module, name);
    }
    name.to_string()
}

impl TypeIndex for SourceIndex {
    fn lookup(&self, name: &str) -> Option<&ClassDecl> {
        self.inner.lookup(name)
    }

    fn markers_of(&self, name: &str) -> BTreeSet<Marker> {
        self.inner.markers_of(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn indexes_structs_enums_and_inline_modules() {
        let index = SourceIndex::from_source(
            r#"
            pub struct User { pub id: u64, pub role: Role }
            pub enum Role { Admin, Member }
            pub struct UserId(u64);
            mod audit {
                pub struct Audit { pub created_by: String }
            }
            fn unrelated() {}
            "#,
        )
        .unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.lookup("User").is_some());
        assert!(index.lookup("audit::Audit").is_some());
        assert!(index.is_a("Role", Marker::Enum));
        assert!(index.lookup("UserId").is_none());
        assert!(index.is_a("Vec", Marker::Collection));
    }

    #[test]
    fn same_named_structs_in_inline_modules_stay_apart() {
        let index = SourceIndex::from_source(
            r#"
            mod a {
                pub struct User { pub id: u64 }
                pub struct Account { pub owner: User, pub peer: super::b::User, pub me: self::User }
            }
            mod b {
                pub struct User { pub email: String }
            }
            pub struct Pair { pub a: a::User, pub b: crate::b::User }
            "#,
        )
        .unwrap();

        assert_eq!(index.len(), 4);
        assert!(index.lookup("User").is_none());
        assert_eq!(index.lookup("a::User").unwrap().members[0].name, "id");
        assert_eq!(index.lookup("b::User").unwrap().members[0].name, "email");

        let account = index.lookup("Account").unwrap();
        assert_eq!(account.name, "a::Account");
        let types: Vec<String> = account.members.iter().map(|m| m.ty.to_string()).collect();
        assert_eq!(types, ["a::User", "b::User", "a::User"]);

        let pair = index.lookup("Pair").unwrap();
        assert_eq!(pair.members[1].ty, TypeRef::class("b::User"));
    }

    #[rstest]
    #[case("lib.rs", "")]
    #[case("main.rs", "")]
    #[case("user.rs", "user")]
    #[case("models/mod.rs", "models")]
    #[case("models/user.rs", "models::user")]
    #[case("models/lib.rs", "models::lib")]
    fn module_paths_follow_file_layout(#[case] file: &str, #[case] expected: &str) {
        let root = PathBuf::from("/src");
        assert_eq!(module_path(&root, &root.join(file)), expected);
    }

    #[test]
    fn parse_errors_name_their_origin() {
        let err = SourceIndex::from_source("struct {").unwrap_err();
        assert!(matches!(err, SourceError::Parse { ref origin, .. } if origin == "<source>"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = SourceIndex::from_file(&temp_dir.path().join("nope.rs")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn from_dir_reads_every_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("models")).unwrap();
        fs::write(
            temp_dir.path().join("models/user.rs"),
            "pub struct User { pub name: String }",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("lib.rs"),
            "pub struct Team { pub members: Vec<User> }",
        )
        .unwrap();

        let index = SourceIndex::from_dir(temp_dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.lookup("Team").is_some());
        assert_eq!(index.lookup("User").unwrap().name, "models::user::User");
    }

    #[test]
    fn from_dir_keeps_same_named_files_apart() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for module in ["billing", "auth"] {
            fs::create_dir_all(temp_dir.path().join(module)).unwrap();
            fs::write(
                temp_dir.path().join(module).join("mod.rs"),
                format!("pub struct Account {{ pub {module}_id: String }}"),
            )
            .unwrap();
        }

        let index = SourceIndex::from_dir(temp_dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.lookup("Account").is_none());
        assert_eq!(
            index.lookup("crate::billing::Account").unwrap().members[0].name,
            "billing_id"
        );
        assert_eq!(index.lookup("auth::Account").unwrap().members[0].name, "auth_id");
    }

    #[test]
    fn from_dir_reports_broken_files_with_context() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("broken.rs"), "struct {").unwrap();
        let err = SourceIndex::from_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to index"));
    }
}
