//! Type-kind dispatch.
//!
//! [`process`] turns one type occurrence into a schema node. Element types
//! of arrays, collections and maps are walked synchronously; classes are
//! never descended into here, they become `$ref`s and their bodies are
//! expanded later from the worklist.

use serde_json::Value;
use tracing::debug;
use typeshape_core::{Schema, SchemaType};

use crate::context::BuildContext;
use crate::diagnostics::DiagnosticCode;
use crate::index::Marker;
use crate::registry::register_reference;
use crate::resolver::{resolve, resolve_deep};
use crate::type_ref::TypeRef;

/// Walk `ty` into `schema` and return the type the schema actually
/// represents.
///
/// Inferred attributes overwrite the matching attributes of `schema`; the
/// rest of `schema` is kept. `Option<T>` comes back as `T`, an enum as
/// `String`, a resolved variable as its binding.
///
/// Dispatch order, first match wins:
/// 1. host converters
/// 2. terminal types
/// 3. wildcards, via their upper bound
/// 4. type variables, via the current path
/// 5. arrays
/// 6. optional and transparent wrappers
/// 7. enums
/// 8. parameterized collections, sets, maps and generic classes
/// 9. raw collections and maps
/// 10. plain classes
///
/// A descent nested deeper than `max_nesting` stops with an opaque object.
pub fn process(ctx: &mut BuildContext<'_>, ty: &TypeRef, schema: &mut Schema) -> TypeRef {
    let limit = ctx.options().max_nesting;
    if ctx.depth >= limit {
        ctx.diagnostics.push(
            DiagnosticCode::NestingLimitReached,
            ty.to_string(),
            format!("nested deeper than {limit} levels, emitted as an opaque object"),
        );
        fill(schema, opaque());
        return TypeRef::Any;
    }
    ctx.depth += 1;
    let represented = dispatch(ctx, ty, schema);
    ctx.depth -= 1;
    represented
}

fn dispatch(ctx: &mut BuildContext<'_>, ty: &TypeRef, schema: &mut Schema) -> TypeRef {
    let builder = ctx.builder();
    let index = ctx.index();

    for converter in &builder.converters {
        if let Some(converted) = converter.convert(ty, index) {
            debug!(%ty, "schema supplied by converter");
            fill(schema, converted);
            return ty.clone();
        }
    }

    match ty {
        TypeRef::Wildcard { upper } => {
            let target = upper
                .as_deref()
                .map_or(TypeRef::Any, |upper| resolve_deep(&ctx.path, upper));
            process(ctx, &target, schema)
        }
        TypeRef::Variable { name } => {
            let resolved = resolve(&ctx.path, ty);
            if resolved == TypeRef::Any {
                let scoped = match ctx.path.current().and_then(|frame| frame.owner.as_ref()) {
                    Some(owner) => format!("{owner}::{name}"),
                    None => name.clone(),
                };
                ctx.diagnostics.push(
                    DiagnosticCode::UnresolvedVariable,
                    scoped,
                    "no binding or bound in scope, emitted as an opaque object",
                );
                fill(schema, opaque());
                return TypeRef::Any;
            }
            process(ctx, &resolved, schema)
        }
        TypeRef::Any => {
            fill(schema, opaque());
            TypeRef::Any
        }
        TypeRef::Array { component, dims } => {
            let mut items = Schema::default();
            let represented = process(ctx, component, &mut items);
            let wrapped = (0..*dims).fold(items, |inner, _| Schema::array(inner));
            fill(schema, wrapped);
            TypeRef::array_of(represented, *dims)
        }
        TypeRef::Class { name, args } => process_class(ctx, ty, name, args, schema),
    }
}

fn process_class(
    ctx: &mut BuildContext<'_>,
    ty: &TypeRef,
    name: &str,
    args: &[TypeRef],
    schema: &mut Schema,
) -> TypeRef {
    let builder = ctx.builder();
    let index = ctx.index();

    if let Some(terminal) = builder.terminals.lookup(name) {
        fill(schema, terminal.clone());
        return ty.clone();
    }

    if index.is_a(name, Marker::Optional) || index.is_a(name, Marker::Transparent) {
        return match args.first() {
            Some(inner) => process(ctx, inner, schema),
            None => {
                fill(schema, opaque());
                TypeRef::Any
            }
        };
    }

    if index.is_a(name, Marker::Enum) {
        let values: Option<Vec<Value>> = index
            .lookup(name)
            .and_then(|decl| decl.enum_values())
            .map(|values| values.iter().cloned().map(Value::String).collect());
        if index.lookup(name).is_some() {
            // The definition carries enum-level overrides; the occurrence is
            // inlined.
            register_reference(ctx, ty);
        }
        fill(
            schema,
            Schema {
                r#enum: values,
                ..Schema::string()
            },
        );
        return TypeRef::class("String");
    }

    let is_collection = index.is_a(name, Marker::Collection) || index.is_a(name, Marker::Iterable);
    let is_map = index.is_a(name, Marker::Map);

    if let Some(first) = args.first() {
        if is_collection {
            let mut items = Schema::default();
            process(ctx, first, &mut items);
            let mut inferred = Schema::array(items);
            if index.is_a(name, Marker::Set) {
                inferred.unique_items = Some(true);
            }
            fill(schema, inferred);
            return resolve_deep(&ctx.path, ty);
        }
        if is_map {
            let mut values = Schema::default();
            if let Some(value_ty) = args.get(1) {
                process(ctx, value_ty, &mut values);
            }
            fill(schema, Schema::map(values));
            return resolve_deep(&ctx.path, ty);
        }
        let reference = register_reference(ctx, ty);
        fill(schema, reference);
        return resolve_deep(&ctx.path, ty);
    }

    if is_collection {
        let mut inferred = Schema::array(Schema::default());
        if index.is_a(name, Marker::Set) {
            inferred.unique_items = Some(true);
        }
        fill(schema, inferred);
        return ty.clone();
    }
    if is_map {
        fill(schema, Schema::map(Schema::default()));
        return ty.clone();
    }

    // Unknown classes are reported by the registry.
    fill(schema, register_reference(ctx, ty));
    ty.clone()
}

fn opaque() -> Schema {
    Schema::new(SchemaType::Object)
}

macro_rules! fill_some {
    ($target:ident, $source:ident; $($field:ident),* $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field;
            }
        )*
    };
}

/// Overwrite the attributes of `target` that `inferred` sets.
fn fill(target: &mut Schema, inferred: Schema) {
    fill_some!(target, inferred;
        ref_path, schema_type, format, title, description, default, example,
        minimum, maximum, exclusive_minimum, exclusive_maximum, multiple_of,
        min_length, max_length, pattern, items, min_items, max_items, unique_items,
        properties, required, additional_properties, r#enum, nullable, read_only,
        write_only, deprecated,
    );
}
