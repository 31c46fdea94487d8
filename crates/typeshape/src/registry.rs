//! Definition registry.
//!
//! Every concrete instantiation reachable from a build root gets exactly one
//! entry, keyed by its [`CanonicalSignature`]. Asking for an instantiation
//! that is already registered (finished or still pending) returns a `$ref`
//! without walking anything, which is what makes self-referential and mutually
//! referential types terminate.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use typeshape_core::{Reference, Schema, SchemaType};

use crate::context::BuildContext;
use crate::diagnostics::DiagnosticCode;
use crate::expand;
use crate::index::TypeIndex;
use crate::resolver::{PathEntry, resolve_deep};
use crate::type_ref::{CanonicalSignature, TypeRef, capitalize_first, short_name};
use crate::worklist::WorkItem;

/// Position of an entry in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub signature: CanonicalSignature,
    /// Resolved instantiation the entry stands for
    pub ty: TypeRef,
    pub reference_name: String,
    /// Definition whose body first referenced this one
    pub parent: Option<EntryId>,
    /// Set once the body has been fully walked
    pub completed: bool,
    pub body: Schema,
}

/// Arena of definitions of one build.
#[derive(Debug)]
pub struct SchemaRegistry {
    entries: Vec<RegistryEntry>,
    by_signature: HashMap<CanonicalSignature, EntryId>,
    by_name: HashMap<String, EntryId>,
    ref_prefix: String,
}

impl SchemaRegistry {
    pub fn new(ref_prefix: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            by_signature: HashMap::new(),
            by_name: HashMap::new(),
            ref_prefix: ref_prefix.into(),
        }
    }

    pub fn lookup(&self, signature: &CanonicalSignature) -> Option<EntryId> {
        self.by_signature.get(signature).copied()
    }

    /// Entry for `signature`, created with an empty body if it does not
    /// exist yet.
    ///
    /// A new entry is named `base_name`, or `base_name` plus the first free
    /// numeric suffix starting at 2 when another signature already owns it.
    pub fn insert(
        &mut self,
        signature: CanonicalSignature,
        ty: TypeRef,
        base_name: &str,
    ) -> EntryId {
        self.insert_from(signature, ty, base_name, None)
    }

    /// [`Self::insert`], recording `parent` as the definition that referenced
    /// the new entry.
    pub fn insert_from(
        &mut self,
        signature: CanonicalSignature,
        ty: TypeRef,
        base_name: &str,
        parent: Option<EntryId>,
    ) -> EntryId {
        if let Some(id) = self.lookup(&signature) {
            return id;
        }
        let mut reference_name = base_name.to_string();
        let mut suffix = 2;
        while self.by_name.contains_key(&reference_name) {
            reference_name = format!("{base_name}{suffix}");
            suffix += 1;
        }

        let id = EntryId(self.entries.len());
        self.by_signature.insert(signature.clone(), id);
        self.by_name.insert(reference_name.clone(), id);
        self.entries.push(RegistryEntry {
            signature,
            ty,
            reference_name,
            parent,
            completed: false,
            body: Schema::default(),
        });
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&RegistryEntry> {
        self.entries.get(id.0)
    }

    /// First entry on the chain `from`, its parent, its parent's parent...
    /// that instantiates the same generic type as `ty` with shallower
    /// arguments.
    ///
    /// Such an ancestor means expanding `ty` would discover a deeper
    /// instantiation again, forever.
    pub fn growing_ancestor(&self, from: Option<EntryId>, ty: &TypeRef) -> Option<&TypeRef> {
        if !ty.is_parameterized() {
            return None;
        }
        let depth = ty.nesting_depth();
        let mut cursor = from;
        while let Some(entry) = cursor.and_then(|id| self.get(id)) {
            if entry.ty.base_name() == ty.base_name() && entry.ty.nesting_depth() < depth {
                return Some(&entry.ty);
            }
            cursor = entry.parent;
        }
        None
    }

    pub fn by_name(&self, name: &str) -> Option<&RegistryEntry> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// `$ref` schema pointing at the entry.
    pub fn reference(&self, id: EntryId) -> Schema {
        let name = self
            .get(id)
            .map_or("", |entry| entry.reference_name.as_str());
        Schema::reference(Reference::with_prefix(&self.ref_prefix, name))
    }

    pub fn complete(&mut self, id: EntryId, body: Schema) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.body = body;
            entry.completed = true;
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.completed).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All bodies keyed by reference name.
    pub fn into_definitions(self) -> BTreeMap<String, Schema> {
        self.entries
            .into_iter()
            .map(|entry| (entry.reference_name, entry.body))
            .collect()
    }
}

/// Definition name derived from a resolved instantiation.
///
/// The last path segment of the base name followed by the names of the
/// arguments, e.g. `Page<Vec<User>>` -> `PageVecUser`. Array components get an
/// `Array` suffix and unknown types read as `Object`.
pub fn reference_name(ty: &TypeRef) -> String {
    let mut name = String::new();
    push_name_segment(ty, &mut name);
    if name.is_empty() {
        name.push_str("Object");
    }
    name
}

fn push_name_segment(ty: &TypeRef, out: &mut String) {
    match ty {
        TypeRef::Class { name, args } => {
            let ident: String = short_name(name)
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            out.push_str(&capitalize_first(&ident));
            for arg in args {
                push_name_segment(arg, out);
            }
        }
        TypeRef::Array { component, .. } => {
            push_name_segment(component, out);
            out.push_str("Array");
        }
        TypeRef::Variable { name } => out.push_str(&capitalize_first(name)),
        TypeRef::Wildcard { .. } | TypeRef::Any => out.push_str("Object"),
    }
}

/// Rename every indexed class inside `ty` to its declared name, so that
/// `models::User` and `User` share one signature.
fn canonicalize(index: &dyn TypeIndex, ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Class { name, args } => TypeRef::Class {
            name: index
                .lookup(name)
                .map_or_else(|| name.clone(), |decl| decl.name.clone()),
            args: args.iter().map(|arg| canonicalize(index, arg)).collect(),
        },
        TypeRef::Array { component, dims } => {
            TypeRef::array_of(canonicalize(index, component), *dims)
        }
        other => other.clone(),
    }
}

/// `$ref` to the definition of `ty`, registering it on first sight.
///
/// `ty` is resolved against the current path first. A new entry is queued for
/// expansion; an existing one is reused whether or not its body is complete.
///
/// These come back as opaque objects with a diagnostic instead:
/// - types missing from the index
/// - instantiations nested deeper than `max_nesting`
/// - instantiations built from type variables that grow an ancestor
///   definition of the same type, which would never stop expanding
/// - new types past `max_definitions`
pub fn register_reference(ctx: &mut BuildContext<'_>, ty: &TypeRef) -> Schema {
    let index = ctx.index();
    let resolved = canonicalize(index, &resolve_deep(&ctx.path, ty));
    let Some(decl) = resolved.base_name().and_then(|name| index.lookup(name)) else {
        ctx.diagnostics.push(
            DiagnosticCode::UnknownType,
            resolved.to_string(),
            "not found in the type index, emitted as an opaque object",
        );
        return Schema::new(SchemaType::Object);
    };

    let signature = CanonicalSignature::of(&resolved);
    if let Some(id) = ctx.registry.lookup(&signature) {
        debug!(%signature, "reusing registered definition");
        return ctx.registry.reference(id);
    }

    let max_nesting = ctx.options().max_nesting;
    if resolved.nesting_depth() > max_nesting {
        ctx.diagnostics.push(
            DiagnosticCode::NestingLimitReached,
            signature.as_str(),
            format!("nested deeper than {max_nesting} levels, emitted as an opaque object"),
        );
        return Schema::new(SchemaType::Object);
    }

    if ty.contains_variables()
        && let Some(ancestor) = ctx.registry.growing_ancestor(ctx.expanding, &resolved)
    {
        let message = format!(
            "expanding `{ancestor}` keeps producing deeper instantiations, emitted as an opaque object"
        );
        ctx.diagnostics
            .push(DiagnosticCode::GrowingInstantiation, signature.as_str(), message);
        return Schema::new(SchemaType::Object);
    }

    if let Some(limit) = ctx.options().max_definitions
        && ctx.registry.len() >= limit
    {
        ctx.diagnostics.push(
            DiagnosticCode::DefinitionLimitReached,
            signature.as_str(),
            format!("limit of {limit} definitions reached, emitted as an opaque object"),
        );
        return Schema::new(SchemaType::Object);
    }

    let base_name = reference_name(&resolved);
    let id = ctx
        .registry
        .insert_from(signature.clone(), resolved.clone(), &base_name, ctx.expanding);
    if let Some(entry) = ctx.registry.get(id)
        && entry.reference_name != base_name
    {
        let message = format!(
            "`{base_name}` already names another type, registered as `{}`",
            entry.reference_name
        );
        ctx.diagnostics
            .push(DiagnosticCode::ReferenceNameCollision, signature.as_str(), message);
    }
    debug!(%signature, "registered definition");

    let owner = ctx.path.current().and_then(|frame| frame.owner.clone());
    ctx.worklist.push(WorkItem {
        owner,
        path: PathEntry::for_type(&resolved, decl),
        ty: resolved,
        target: id,
    });
    ctx.registry.reference(id)
}

/// Expand queued definitions until the worklist is empty.
pub fn drain(ctx: &mut BuildContext<'_>) {
    while let Some(item) = ctx.worklist.pop() {
        debug!(ty = %item.ty, queued = ctx.worklist.len(), "expanding definition");
        let previous = ctx.expanding.replace(item.target);
        let body = expand::expand(ctx, &item);
        ctx.expanding = previous;
        ctx.registry.complete(item.target, body);
    }
}
