//! Generic type-variable resolution.
//!
//! A [`PathStack`] holds one [`PathEntry`] per generic scope entered during the
//! synchronous part of a member walk. Variables are looked up from the
//! innermost frame outwards.

use indexmap::IndexMap;

use crate::index::ClassDecl;
use crate::type_ref::TypeRef;

/// Generic scope of one class being walked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathEntry {
    /// Instantiation whose members are being walked
    pub owner: Option<TypeRef>,
    /// Member currently being processed
    pub member: Option<String>,
    /// Type parameter name -> bound type, in declaration order
    pub bindings: IndexMap<String, TypeRef>,
}

impl PathEntry {
    /// Frame binding the declared parameters of `decl` to the arguments of
    /// `owner`. Parameters without an argument (raw use) fall back to their
    /// declared bound, else to [`TypeRef::Any`].
    pub fn for_type(owner: &TypeRef, decl: &ClassDecl) -> Self {
        let args = owner.args();
        let bindings = decl
            .type_params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let fallback = || param.bound.clone().unwrap_or(TypeRef::Any);
                let bound = match args.get(i) {
                    Some(TypeRef::Wildcard { upper: None }) | None => fallback(),
                    Some(arg) => arg.clone(),
                };
                (param.name.clone(), bound)
            })
            .collect();
        Self {
            owner: Some(owner.clone()),
            member: None,
            bindings,
        }
    }

    pub fn binding(&self, name: &str) -> Option<&TypeRef> {
        self.bindings.get(name)
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.bindings.insert(name.into(), ty);
    }
}

/// Stack of generic scopes, innermost last.
#[derive(Debug, Clone, Default)]
pub struct PathStack {
    frames: Vec<PathEntry>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh stack seeded with a single frame.
    pub fn seeded(entry: PathEntry) -> Self {
        Self {
            frames: vec![entry],
        }
    }

    pub fn push(&mut self, entry: PathEntry) {
        self.frames.push(entry);
    }

    pub fn pop(&mut self) -> Option<PathEntry> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&PathEntry> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut PathEntry> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[PathEntry] {
        &self.frames
    }
}

/// Resolve the outermost layer of `ty`.
///
/// A variable becomes its innermost binding (itself resolved against the
/// frames outside the one that bound it), or [`TypeRef::Any`] when nothing
/// binds it. A wildcard becomes its upper bound, or `Any`. Other types are
/// returned unchanged.
pub fn resolve(path: &PathStack, ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Variable { name } => resolve_in(path.frames(), name),
        TypeRef::Wildcard { upper: Some(upper) } => resolve_deep(path, upper),
        TypeRef::Wildcard { upper: None } => TypeRef::Any,
        other => other.clone(),
    }
}

/// Resolve every variable and wildcard anywhere inside `ty`.
///
/// The result contains no variables, which makes it usable as the input of
/// a canonical signature.
pub fn resolve_deep(path: &PathStack, ty: &TypeRef) -> TypeRef {
    substitute(path.frames(), ty)
}

fn resolve_in(frames: &[PathEntry], name: &str) -> TypeRef {
    for (depth, frame) in frames.iter().enumerate().rev() {
        if let Some(bound) = frame.binding(name) {
            // Only frames outside the binding one may be consulted, so the
            // slice shrinks on every hop and self-referential bindings end.
            return substitute(&frames[..depth], bound);
        }
    }
    TypeRef::Any
}

fn substitute(frames: &[PathEntry], ty: &TypeRef) -> TypeRef {
    match ty {
        TypeRef::Variable { name } => resolve_in(frames, name),
        TypeRef::Wildcard { upper: Some(upper) } => substitute(frames, upper),
        TypeRef::Wildcard { upper: None } | TypeRef::Any => TypeRef::Any,
        TypeRef::Class { name, args } => TypeRef::Class {
            name: name.clone(),
            args: args.iter().map(|arg| substitute(frames, arg)).collect(),
        },
        TypeRef::Array { component, dims } => {
            TypeRef::array_of(substitute(frames, component), *dims)
        }
    }
}
