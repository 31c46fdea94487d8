//! `syn::Type` to [`TypeRef`] conversion.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypeParamBound};

use crate::type_ref::TypeRef;

/// Convert a Rust type, treating the identifiers in `params` as type
/// variables.
///
/// - `[T; N]` and `[T]` become arrays, nested arrays collapse
/// - references, pointers and parentheses are see-through
/// - `_`, `impl Trait` and `dyn Trait` become wildcards
/// - the unit type keeps the name `()`
/// - tuples, function pointers and macros become [`TypeRef::Any`]
///
/// Lifetimes and associated-type bindings in angle brackets are ignored.
pub fn type_from_syn(ty: &Type, params: &[String]) -> TypeRef {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            let path = &type_path.path;
            if path.leading_colon.is_none()
                && path.segments.len() == 1
                && let Some(segment) = path.segments.first()
                && segment.arguments.is_none()
            {
                let ident = segment.ident.to_string();
                if params.contains(&ident) {
                    return TypeRef::variable(ident);
                }
            }

            let name = path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");
            let args = path
                .segments
                .last()
                .map(|segment| generic_args(&segment.arguments, params))
                .unwrap_or_default();
            TypeRef::Class { name, args }
        }
        Type::Array(array) => TypeRef::array(type_from_syn(&array.elem, params)),
        Type::Slice(slice) => TypeRef::array(type_from_syn(&slice.elem, params)),
        Type::Reference(reference) => type_from_syn(&reference.elem, params),
        Type::Ptr(pointer) => type_from_syn(&pointer.elem, params),
        Type::Paren(paren) => type_from_syn(&paren.elem, params),
        Type::Group(group) => type_from_syn(&group.elem, params),
        Type::Infer(_) => TypeRef::wildcard(None),
        Type::ImplTrait(impl_trait) => TypeRef::wildcard(first_trait_bound(
            impl_trait.bounds.iter(),
            params,
        )),
        Type::TraitObject(object) => {
            TypeRef::wildcard(first_trait_bound(object.bounds.iter(), params))
        }
        Type::Tuple(tuple) if tuple.elems.is_empty() => TypeRef::class("()"),
        other => {
            tracing::debug!(ty = %other.to_token_stream(), "unsupported type syntax, treated as any");
            TypeRef::Any
        }
    }
}

fn generic_args(arguments: &PathArguments, params: &[String]) -> Vec<TypeRef> {
    match arguments {
        PathArguments::AngleBracketed(angle) => angle
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(type_from_syn(ty, params)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Upper bound of an `impl`/`dyn` type: its first trait bound, if that
/// names an indexable type rather than a marker trait.
fn first_trait_bound<'b>(
    mut bounds: impl Iterator<Item = &'b TypeParamBound>,
    params: &[String],
) -> Option<TypeRef> {
    bounds.find_map(|bound| match bound {
        TypeParamBound::Trait(trait_bound) => {
            let ty = Type::Path(syn::TypePath {
                qself: None,
                path: trait_bound.path.clone(),
            });
            match type_from_syn(&ty, params) {
                TypeRef::Class { name, .. } if is_marker_trait(&name) => None,
                other => Some(other),
            }
        }
        _ => None,
    })
}

fn is_marker_trait(name: &str) -> bool {
    matches!(
        name,
        "Send" | "Sync" | "Sized" | "Unpin" | "Copy" | "Clone" | "Debug" | "Fn" | "FnMut" | "FnOnce"
            | "Iterator" | "IntoIterator" | "Serialize" | "Deserialize"
    )
}
