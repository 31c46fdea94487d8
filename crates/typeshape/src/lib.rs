//! Compiles type graphs into reference-safe schema documents.
//!
//! A build starts from a root [`TypeRef`] and a [`TypeIndex`] describing the
//! declarations it may reach. Scalars, containers and wrappers are inlined;
//! every concrete class instantiation becomes exactly one named definition
//! that the rest of the document points to with `$ref`, so generic,
//! recursive and mutually recursive types all terminate.
//!
//! ```
//! use typeshape::{ClassDecl, InMemoryTypeIndex, SchemaBuilder, TypeRef};
//!
//! let index = InMemoryTypeIndex::with_std_markers().with(
//!     ClassDecl::class("Node")
//!         .with_member("value", TypeRef::class("i32"))
//!         .with_member("children", TypeRef::generic("Vec", [TypeRef::class("Node")])),
//! );
//! let document = SchemaBuilder::new(&index).build(&TypeRef::class("Node"));
//! assert_eq!(document.definitions.len(), 1);
//! ```
//!
//! Modules:
//! - [`type_ref`] - type occurrences and canonical signatures
//! - [`index`] - the declaration index consumed by a build
//! - [`source`] - an index parsed from Rust source
//! - [`walker`] - type-kind dispatch
//! - [`registry`] - definition interning and the expansion loop
//! - [`resolver`] - generic variable resolution

pub mod builder;
pub mod context;
pub mod diagnostics;
mod error;
mod expand;
pub mod index;
pub mod options;
pub mod overrides;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod terminal;
pub mod type_ref;
pub mod walker;
pub mod worklist;

pub use builder::{SchemaBuilder, SchemaDocument, SchemaSet, build_schema};
pub use context::BuildContext;
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use error::SourceError;
pub use index::{ClassDecl, DeclKind, InMemoryTypeIndex, Marker, MemberDecl, TypeIndex, TypeParam};
pub use options::{BuildOptions, TerminalSpec};
pub use overrides::{OverrideMap, SchemaOverrides};
pub use plugin::{MemberFilter, TypeConverter};
pub use source::SourceIndex;
pub use type_ref::{CanonicalSignature, TypeRef};
pub use typeshape_core::{Schema, SchemaType};
