//! Expansion of one queued definition into its body.

use std::collections::HashSet;

use serde_json::Value;
use typeshape_core::{Schema, SchemaType};

use crate::context::BuildContext;
use crate::index::ClassDecl;
use crate::overrides::SchemaOverrides;
use crate::resolver::{PathEntry, PathStack, resolve_deep};
use crate::walker::process;
use crate::worklist::WorkItem;

/// Body of the definition queued as `item`.
///
/// The walk runs on a fresh path stack seeded with the item's own bindings;
/// the caller's stack is restored afterwards.
pub(crate) fn expand(ctx: &mut BuildContext<'_>, item: &WorkItem) -> Schema {
    let index = ctx.index();
    let Some(decl) = item.ty.base_name().and_then(|name| index.lookup(name)) else {
        return Schema::new(SchemaType::Object);
    };

    let saved = std::mem::replace(&mut ctx.path, PathStack::seeded(item.path.clone()));
    let mut body = match decl.enum_values() {
        Some(values) => Schema {
            r#enum: Some(values.iter().cloned().map(Value::String).collect()),
            ..Schema::string()
        },
        None => {
            let mut body = Schema::object();
            let mut required = Vec::new();
            let mut visited = HashSet::from([decl.name.clone()]);
            walk_members(ctx, decl, &mut body, &mut required, &mut visited);
            if !required.is_empty() {
                body.required = Some(required);
            }
            body
        }
    };
    ctx.path = saved;

    layered(&decl.overrides, ctx.builder().overrides.for_type(&decl.name)).apply(&mut body);
    body
}

/// Inherited members first, in supertype order, then the class's own.
/// A member redeclared by a subclass keeps its inherited position.
fn walk_members(
    ctx: &mut BuildContext<'_>,
    decl: &ClassDecl,
    body: &mut Schema,
    required: &mut Vec<String>,
    visited: &mut HashSet<String>,
) {
    let builder = ctx.builder();
    let index = ctx.index();

    for supertype in &decl.supertypes {
        let resolved = resolve_deep(&ctx.path, supertype);
        let Some(parent) = resolved.base_name().and_then(|name| index.lookup(name)) else {
            continue;
        };
        if parent.is_enum() || !visited.insert(parent.name.clone()) {
            continue;
        }
        ctx.path.push(PathEntry::for_type(&resolved, parent));
        walk_members(ctx, parent, body, required, visited);
        ctx.path.pop();
    }

    for member in &decl.members {
        if !builder.filters.iter().all(|filter| filter.allow(decl, member)) {
            continue;
        }
        let overrides = layered(
            &member.overrides,
            builder.overrides.member(&decl.name, &member.name),
        );
        if overrides.hidden {
            continue;
        }

        if let Some(frame) = ctx.path.current_mut() {
            frame.member = Some(member.name.clone());
        }
        let mut schema = Schema::default();
        process(ctx, &member.ty, &mut schema);
        overrides.apply(&mut schema);

        let property = overrides.rename.unwrap_or_else(|| member.name.clone());
        if overrides.required == Some(true) && !required.contains(&property) {
            required.push(property.clone());
        }
        if let Some(properties) = body.properties.as_mut() {
            properties.insert(property, schema);
        }
    }

    if let Some(frame) = ctx.path.current_mut() {
        frame.member = None;
    }
}

fn layered(declared: &SchemaOverrides, side: Option<&SchemaOverrides>) -> SchemaOverrides {
    match side {
        Some(top) => declared.merged_with(top),
        None => declared.clone(),
    }
}
