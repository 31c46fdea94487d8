//! `syn` items to index declarations.

use syn::{Fields, ItemEnum, ItemStruct};

use super::attrs::{
    SerdeAttrs, extract_doc_comment, extract_schema_overrides, rename_field, strip_raw_prefix,
};
use super::types::type_from_syn;
use crate::index::{ClassDecl, MemberDecl, TypeParam};
use crate::overrides::SchemaOverrides;

/// Class declaration of a struct with named fields.
///
/// Generic parameters become type parameters; a parameter default (`T =
/// String`) serves as its bound. `#[serde(flatten)]` fields become
/// supertypes, skipped fields are left out. Tuple and unit structs are not
/// indexed.
pub fn class_from_struct(item: &ItemStruct) -> Option<ClassDecl> {
    let Fields::Named(fields) = &item.fields else {
        return None;
    };
    let name = strip_raw_prefix(&item.ident.to_string()).to_string();
    let params: Vec<String> = item
        .generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect();

    let mut decl = ClassDecl::class(name);
    decl.type_params = item
        .generics
        .type_params()
        .map(|param| TypeParam {
            name: param.ident.to_string(),
            bound: param
                .default
                .as_ref()
                .map(|default| type_from_syn(default, &params)),
        })
        .collect();
    decl.overrides = type_overrides(&item.attrs);

    let container = SerdeAttrs::from_attrs(&item.attrs);
    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        let serde = SerdeAttrs::from_attrs(&field.attrs);
        if serde.skip {
            continue;
        }
        let ty = type_from_syn(&field.ty, &params);
        if serde.flatten {
            decl.supertypes.push(ty);
            continue;
        }

        let field_name = strip_raw_prefix(&ident.to_string()).to_string();
        let property = serde
            .rename
            .unwrap_or_else(|| rename_field(&field_name, container.rename_all.as_deref()));
        let declared = SchemaOverrides {
            rename: (property != field_name).then_some(property),
            description: extract_doc_comment(&field.attrs),
            ..SchemaOverrides::default()
        };
        let overrides = declared.merged_with(&extract_schema_overrides(&field.attrs));
        decl.members
            .push(MemberDecl::new(field_name, ty).with_overrides(overrides));
    }
    Some(decl)
}

/// Enum declaration of a unit-only, externally tagged enum.
///
/// Values follow `#[serde(rename)]` and `#[serde(rename_all)]`; skipped
/// variants are left out. Enums with data or an explicit tagging mode are
/// not indexed.
pub fn enum_from_item(item: &ItemEnum) -> Option<ClassDecl> {
    let container = SerdeAttrs::from_attrs(&item.attrs);
    if container.tagged
        || item
            .variants
            .iter()
            .any(|variant| !matches!(variant.fields, Fields::Unit))
    {
        return None;
    }

    let values: Vec<String> = item
        .variants
        .iter()
        .filter_map(|variant| {
            let serde = SerdeAttrs::from_attrs(&variant.attrs);
            if serde.skip {
                return None;
            }
            let ident = variant.ident.to_string();
            Some(
                serde
                    .rename
                    .unwrap_or_else(|| rename_field(&ident, container.rename_all.as_deref())),
            )
        })
        .collect();

    let name = strip_raw_prefix(&item.ident.to_string()).to_string();
    Some(ClassDecl::enumeration(name, values).with_overrides(type_overrides(&item.attrs)))
}

fn type_overrides(attrs: &[syn::Attribute]) -> SchemaOverrides {
    SchemaOverrides {
        description: extract_doc_comment(attrs),
        ..SchemaOverrides::default()
    }
    .merged_with(&extract_schema_overrides(attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_ref::TypeRef;

    #[test]
    fn struct_fields_become_members() {
        let item: ItemStruct = syn::parse_str(
            r#"
            /// A registered user
            #[serde(rename_all = "camelCase")]
            pub struct User<T = Profile> {
                /// Primary key
                pub user_id: u64,
                #[serde(rename = "mail")]
                #[schema(format = "email", required)]
                pub email: String,
                pub r#type: Option<T>,
                #[serde(skip)]
                pub password_hash: String,
                #[serde(flatten)]
                pub audit: Audit,
            }
            "#,
        )
        .unwrap();
        let decl = class_from_struct(&item).unwrap();

        assert_eq!(decl.name, "User");
        assert_eq!(decl.overrides.description.as_deref(), Some("A registered user"));
        assert_eq!(decl.type_params[0].name, "T");
        assert_eq!(decl.type_params[0].bound, Some(TypeRef::class("Profile")));
        assert_eq!(decl.supertypes, vec![TypeRef::class("Audit")]);

        let names: Vec<_> = decl.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "email", "type"]);

        let user_id = &decl.members[0];
        assert_eq!(user_id.overrides.rename.as_deref(), Some("userId"));
        assert_eq!(user_id.overrides.description.as_deref(), Some("Primary key"));

        let email = &decl.members[1];
        assert_eq!(email.overrides.rename.as_deref(), Some("mail"));
        assert_eq!(email.overrides.format.as_deref(), Some("email"));
        assert_eq!(email.overrides.required, Some(true));

        let kind = &decl.members[2];
        assert!(kind.overrides.rename.is_none());
        assert_eq!(
            kind.ty,
            TypeRef::generic("Option", [TypeRef::variable("T")])
        );
    }

    #[test]
    fn tuple_structs_are_not_indexed() {
        let item: ItemStruct = syn::parse_str("struct UserId(u64);").unwrap();
        assert!(class_from_struct(&item).is_none());
    }

    #[test]
    fn unit_enums_become_enum_declarations() {
        let item: ItemEnum = syn::parse_str(
            r#"
            #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
            enum Status {
                Active,
                OnHold,
                #[serde(rename = "gone")]
                Deleted,
                #[serde(skip)]
                Internal,
            }
            "#,
        )
        .unwrap();
        let decl = enum_from_item(&item).unwrap();
        assert_eq!(
            decl.enum_values().unwrap(),
            &["ACTIVE".to_string(), "ON_HOLD".to_string(), "gone".to_string()]
        );
    }

    #[test]
    fn data_and_tagged_enums_are_not_indexed() {
        let data: ItemEnum = syn::parse_str("enum Shape { Circle(f64), Square { side: f64 } }").unwrap();
        assert!(enum_from_item(&data).is_none());

        let tagged: ItemEnum =
            syn::parse_str(r#"#[serde(tag = "kind")] enum Kind { A, B }"#).unwrap();
        assert!(enum_from_item(&tagged).is_none());
    }
}
