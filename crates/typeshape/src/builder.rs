//! Build entry points.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;
use typeshape_core::openapi::OpenApi;
use typeshape_core::{Components, Schema};

use crate::context::BuildContext;
use crate::diagnostics::{Diagnostic, Severity};
use crate::index::TypeIndex;
use crate::options::BuildOptions;
use crate::overrides::OverrideMap;
use crate::plugin::{MemberFilter, TypeConverter};
use crate::registry;
use crate::terminal::TerminalTypes;
use crate::type_ref::TypeRef;
use crate::walker;

/// Immutable build configuration: the index to walk, options, overrides and
/// plugins.
///
/// A builder can run any number of builds, sequentially or from several
/// threads at once; each build gets its own [`BuildContext`].
pub struct SchemaBuilder<'a> {
    pub(crate) index: &'a dyn TypeIndex,
    pub(crate) options: BuildOptions,
    pub(crate) terminals: TerminalTypes,
    pub(crate) overrides: OverrideMap,
    pub(crate) converters: Vec<Box<dyn TypeConverter>>,
    pub(crate) filters: Vec<Box<dyn MemberFilter>>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(index: &'a dyn TypeIndex) -> Self {
        Self {
            index,
            options: BuildOptions::default(),
            terminals: TerminalTypes::builtin(),
            overrides: OverrideMap::default(),
            converters: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.terminals = TerminalTypes::with_extra(&options.terminals);
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: OverrideMap) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_converter(mut self, converter: impl TypeConverter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    #[must_use]
    pub fn with_member_filter(mut self, filter: impl MemberFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Fresh state for one build.
    pub fn context(&self) -> BuildContext<'_> {
        BuildContext::new(self)
    }

    pub fn build(&self, root: &TypeRef) -> SchemaDocument {
        build_schema(self.context(), root)
    }

    /// Build several roots into one shared set of definitions.
    pub fn build_many<'r>(&self, roots: impl IntoIterator<Item = &'r TypeRef>) -> SchemaSet {
        let mut ctx = self.context();
        let roots: Vec<Schema> = roots
            .into_iter()
            .map(|root| {
                let mut schema = Schema::default();
                walker::process(&mut ctx, root, &mut schema);
                registry::drain(&mut ctx);
                schema
            })
            .collect();
        let (definitions, diagnostics) = ctx.finish();
        log_summary(definitions.len(), &diagnostics);
        SchemaSet {
            roots,
            definitions,
            diagnostics,
        }
    }
}

/// Walk `root`, drain the worklist and hand back the root schema together
/// with every definition it reaches.
///
/// The root schema is a `$ref` for class roots and an inline schema for
/// everything else. Consumes `ctx`: a context serves exactly one build.
pub fn build_schema(mut ctx: BuildContext<'_>, root: &TypeRef) -> SchemaDocument {
    let mut root_schema = Schema::default();
    walker::process(&mut ctx, root, &mut root_schema);
    registry::drain(&mut ctx);

    let (definitions, diagnostics) = ctx.finish();
    log_summary(definitions.len(), &diagnostics);
    SchemaDocument {
        root: root_schema,
        definitions,
        diagnostics,
    }
}

fn log_summary(definitions: usize, diagnostics: &[Diagnostic]) {
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Warning)
        .count();
    info!(definitions, warnings, "schema build finished");
}

/// Result of a single-root build.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDocument {
    pub root: Schema,
    /// Every definition reachable from `root`, keyed by reference name
    pub definitions: BTreeMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SchemaDocument {
    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn into_components(self) -> Components {
        Components::from_schemas(self.definitions)
    }

    pub fn into_openapi(self, title: &str, version: &str) -> OpenApi {
        OpenApi::new(title, version).with_schemas(self.definitions)
    }
}

/// Result of a multi-root build.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaSet {
    /// Root schemas in input order
    pub roots: Vec<Schema>,
    pub definitions: BTreeMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SchemaSet {
    pub fn into_components(self) -> Components {
        Components::from_schemas(self.definitions)
    }

    pub fn into_openapi(self, title: &str, version: &str) -> OpenApi {
        OpenApi::new(title, version).with_schemas(self.definitions)
    }
}
