//! Host extension points, registered on a [`crate::SchemaBuilder`] before a
//! build starts.

use typeshape_core::Schema;

use crate::index::{ClassDecl, MemberDecl, TypeIndex};
use crate::type_ref::TypeRef;

/// Supplies a schema for a type before the walker's own dispatch runs.
///
/// Returning `Some` short-circuits the walk for that occurrence: nothing is
/// registered or queued on the converter's behalf.
pub trait TypeConverter: Send + Sync {
    fn convert(&self, ty: &TypeRef, index: &dyn TypeIndex) -> Option<Schema>;
}

impl<F> TypeConverter for F
where
    F: Fn(&TypeRef, &dyn TypeIndex) -> Option<Schema> + Send + Sync,
{
    fn convert(&self, ty: &TypeRef, index: &dyn TypeIndex) -> Option<Schema> {
        self(ty, index)
    }
}

/// Decides whether a declared member is part of its owner's schema.
pub trait MemberFilter: Send + Sync {
    fn allow(&self, owner: &ClassDecl, member: &MemberDecl) -> bool;
}

impl<F> MemberFilter for F
where
    F: Fn(&ClassDecl, &MemberDecl) -> bool + Send + Sync,
{
    fn allow(&self, owner: &ClassDecl, member: &MemberDecl) -> bool {
        self(owner, member)
    }
}
