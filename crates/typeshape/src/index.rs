//! Read-only view of the type declarations a build walks over.
//!
//! A [`TypeIndex`] is supplied by the host. [`InMemoryTypeIndex`] is assembled
//! programmatically; [`crate::source::SourceIndex`] is filled from Rust source.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::overrides::SchemaOverrides;
use crate::type_ref::{TypeRef, path_tails_match, short_name};

/// Well-known kinds a type can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Collection,
    Iterable,
    Map,
    Set,
    Enum,
    /// Single argument that may be absent
    Optional,
    /// Single argument wrapper with no schema of its own (`Box`, `Arc`, ...)
    Transparent,
}

/// Generic parameter of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeRef>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded(name: impl Into<String>, bound: TypeRef) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }
}

/// A declared member (field) of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeRef,
    pub overrides: SchemaOverrides,
}

impl MemberDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            overrides: SchemaOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: SchemaOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Enum { values: Vec<String> },
}

/// Declaration of a class or enum as seen by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub kind: DeclKind,
    pub type_params: Vec<TypeParam>,
    pub members: Vec<MemberDecl>,
    pub supertypes: Vec<TypeRef>,
    pub markers: BTreeSet<Marker>,
    /// Type-level overrides, applied to the definition body
    pub overrides: SchemaOverrides,
}

impl ClassDecl {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DeclKind::Class,
            type_params: Vec::new(),
            members: Vec::new(),
            supertypes: Vec::new(),
            markers: BTreeSet::new(),
            overrides: SchemaOverrides::default(),
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: DeclKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
            ..Self::class(name)
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.type_params.push(TypeParam::new(param));
        self
    }

    #[must_use]
    pub fn with_bounded_param(mut self, param: impl Into<String>, bound: TypeRef) -> Self {
        self.type_params.push(TypeParam::bounded(param, bound));
        self
    }

    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.members.push(MemberDecl::new(name, ty));
        self
    }

    #[must_use]
    pub fn with_member_decl(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: TypeRef) -> Self {
        self.supertypes.push(supertype);
        self
    }

    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: SchemaOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, DeclKind::Enum { .. })
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.kind {
            DeclKind::Enum { values } => Some(values),
            DeclKind::Class => None,
        }
    }
}

/// Lookup of type declarations by name.
///
/// Implementations are read-only during a build and may be shared between
/// concurrent builds.
pub trait TypeIndex: Send + Sync {
    /// Declaration of an indexed class or enum.
    fn lookup(&self, name: &str) -> Option<&ClassDecl>;

    /// Markers attached to a name that is not necessarily declared
    /// (e.g. `Vec` is a collection without being indexed).
    fn markers_of(&self, _name: &str) -> BTreeSet<Marker> {
        BTreeSet::new()
    }

    /// Whether `name` is, directly or through its supertypes, of the given kind.
    fn is_a(&self, name: &str, marker: Marker) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![name.to_string()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if self.markers_of(&current).contains(&marker) {
                return true;
            }
            if let Some(decl) = self.lookup(&current) {
                if decl.markers.contains(&marker) || (marker == Marker::Enum && decl.is_enum()) {
                    return true;
                }
                pending.extend(
                    decl.supertypes
                        .iter()
                        .filter_map(TypeRef::base_name)
                        .map(str::to_string),
                );
            }
        }
        false
    }
}

/// Index assembled in memory.
///
/// Names are matched exactly first. Failing that, a declaration whose path
/// agrees with the query on every segment both spell out is used, so
/// `crate::models::User` finds a declaration registered as `User` or
/// `models::User`. When several declarations qualify the lookup fails rather
/// than guess.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypeIndex {
    classes: HashMap<String, ClassDecl>,
    /// Full names per last path segment
    short_names: HashMap<String, Vec<String>>,
    markers: HashMap<String, BTreeSet<Marker>>,
}

impl InMemoryTypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-populated with the standard Rust container and wrapper markers.
    pub fn with_std_markers() -> Self {
        let mut index = Self::new();
        for name in ["Vec", "VecDeque", "LinkedList", "BinaryHeap"] {
            index.add_marker(name, Marker::Collection);
        }
        for name in ["HashSet", "BTreeSet", "IndexSet"] {
            index.add_marker(name, Marker::Collection);
            index.add_marker(name, Marker::Set);
        }
        for name in ["HashMap", "BTreeMap", "IndexMap"] {
            index.add_marker(name, Marker::Map);
        }
        index.add_marker("Option", Marker::Optional);
        for name in ["Box", "Rc", "Arc", "Cow", "RefCell", "Cell", "Mutex", "RwLock"] {
            index.add_marker(name, Marker::Transparent);
        }
        index
    }

    /// Insert or replace a declaration. Returns the previous one, if any.
    pub fn insert(&mut self, decl: ClassDecl) -> Option<ClassDecl> {
        let names = self
            .short_names
            .entry(short_name(&decl.name).to_string())
            .or_default();
        if !names.contains(&decl.name) {
            names.push(decl.name.clone());
        }
        self.classes.insert(decl.name.clone(), decl)
    }

    #[must_use]
    pub fn with(mut self, decl: ClassDecl) -> Self {
        self.insert(decl);
        self
    }

    pub fn add_marker(&mut self, name: impl Into<String>, marker: Marker) {
        self.markers.entry(name.into()).or_default().insert(marker);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn declarations(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }
}

impl TypeIndex for InMemoryTypeIndex {
    fn lookup(&self, name: &str) -> Option<&ClassDecl> {
        if let Some(decl) = self.classes.get(name) {
            return Some(decl);
        }
        let mut candidates = self
            .short_names
            .get(short_name(name))?
            .iter()
            .filter(|full| path_tails_match(full, name));
        let found = candidates.next()?;
        if candidates.next().is_some() {
            return None;
        }
        self.classes.get(found)
    }

    fn markers_of(&self, name: &str) -> BTreeSet<Marker> {
        self.markers
            .get(name)
            .or_else(|| self.markers.get(short_name(name)))
            .cloned()
            .unwrap_or_default()
    }
}
