//! Per-build state.

use std::collections::BTreeMap;

use typeshape_core::Schema;

use crate::builder::SchemaBuilder;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::index::TypeIndex;
use crate::options::BuildOptions;
use crate::registry::{self, EntryId, SchemaRegistry};
use crate::resolver::{self, PathStack};
use crate::type_ref::TypeRef;
use crate::walker;
use crate::worklist::Worklist;

/// Everything one document build mutates: the registry, the worklist, the
/// generic path stack and the diagnostics.
///
/// Created by [`SchemaBuilder::context`] and consumed by
/// [`crate::build_schema`]. Never shared between builds.
pub struct BuildContext<'a> {
    builder: &'a SchemaBuilder<'a>,
    pub(crate) registry: SchemaRegistry,
    pub(crate) worklist: Worklist,
    pub(crate) path: PathStack,
    pub(crate) diagnostics: Diagnostics,
    /// Nesting of the synchronous descent in [`walker::process`]
    pub(crate) depth: usize,
    /// Definition whose body is being walked
    pub(crate) expanding: Option<EntryId>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(builder: &'a SchemaBuilder<'a>) -> Self {
        Self {
            builder,
            registry: SchemaRegistry::new(builder.options.ref_prefix.clone()),
            worklist: Worklist::new(),
            path: PathStack::new(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            expanding: None,
        }
    }

    pub(crate) fn builder(&self) -> &'a SchemaBuilder<'a> {
        self.builder
    }

    pub fn index(&self) -> &'a dyn TypeIndex {
        self.builder.index
    }

    pub fn options(&self) -> &'a BuildOptions {
        &self.builder.options
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn worklist(&self) -> &Worklist {
        &self.worklist
    }

    pub fn path(&self) -> &PathStack {
        &self.path
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Walk `ty` into `schema`. See [`walker::process`].
    pub fn process(&mut self, ty: &TypeRef, schema: &mut Schema) -> TypeRef {
        walker::process(self, ty, schema)
    }

    pub fn register_reference(&mut self, ty: &TypeRef) -> Schema {
        registry::register_reference(self, ty)
    }

    pub fn drain(&mut self) {
        registry::drain(self);
    }

    /// Resolve the outer layer of `ty` against the current path.
    pub fn resolve(&self, ty: &TypeRef) -> TypeRef {
        resolver::resolve(&self.path, ty)
    }

    pub(crate) fn finish(self) -> (BTreeMap<String, Schema>, Vec<Diagnostic>) {
        (self.registry.into_definitions(), self.diagnostics.into_vec())
    }
}
