//! Attribute extraction: doc comments, `#[serde(...)]` and `#[schema(...)]`.

use serde_json::Value;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, UnOp};

use crate::overrides::SchemaOverrides;

/// Doc comment lines joined with `\n`, without the space rustdoc inserts.
pub fn extract_doc_comment(attrs: &[Attribute]) -> Option<String> {
    let mut doc_lines = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("doc")
            && let syn::Meta::NameValue(meta_nv) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta_nv.value
        {
            let line = lit_str.value();
            let trimmed = line.strip_prefix(' ').unwrap_or(&line);
            doc_lines.push(trimmed.to_string());
        }
    }

    if doc_lines.is_empty() {
        None
    } else {
        Some(doc_lines.join("\n"))
    }
}

/// Strips the `r#` prefix from raw identifiers.
/// E.g., `r#type` becomes `type`.
pub fn strip_raw_prefix(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// The parts of `#[serde(...)]` that change a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeAttrs {
    pub rename: Option<String>,
    pub rename_all: Option<String>,
    pub skip: bool,
    pub flatten: bool,
    /// `tag`, `content` or `untagged` is present
    pub tagged: bool,
}

impl SerdeAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut serde = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(syn::Token![=]) {
                        serde.rename = Some(string_value(&meta)?);
                    } else {
                        // rename(serialize = "..", deserialize = "..")
                        meta.parse_nested_meta(|nested| {
                            if nested.path.is_ident("serialize") {
                                serde.rename = Some(string_value(&nested)?);
                            } else {
                                skip_value(&nested)?;
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.path.is_ident("rename_all") {
                    if meta.input.peek(syn::Token![=]) {
                        serde.rename_all = Some(string_value(&meta)?);
                    } else {
                        meta.parse_nested_meta(|nested| {
                            if nested.path.is_ident("serialize") {
                                serde.rename_all = Some(string_value(&nested)?);
                            } else {
                                skip_value(&nested)?;
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing")
                {
                    serde.skip = true;
                } else if meta.path.is_ident("flatten") {
                    serde.flatten = true;
                } else if meta.path.is_ident("tag")
                    || meta.path.is_ident("content")
                    || meta.path.is_ident("untagged")
                {
                    serde.tagged = true;
                    skip_value(&meta)?;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
            if let Err(err) = result {
                tracing::debug!(%err, "ignoring malformed serde attribute");
            }
        }
        serde
    }
}

/// Manual overrides from `#[schema(...)]`.
///
/// Recognized keys: `format`, `pattern`, `description`, `title`, `example`,
/// `default`, `minimum`, `maximum`, `min_length`, `max_length`, `min_items`,
/// `max_items`, `rename`, and the flags `required`, `hidden`, `read_only`,
/// `write_only`, `deprecated`, `nullable`. Flags accept an optional `= bool`.
pub fn extract_schema_overrides(attrs: &[Attribute]) -> SchemaOverrides {
    let mut overrides = SchemaOverrides::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("schema")) {
        let result = attr.parse_nested_meta(|meta| {
            let Some(key) = meta.path.get_ident().map(ToString::to_string) else {
                return skip_value(&meta);
            };
            match key.as_str() {
                "format" => overrides.format = Some(string_value(&meta)?),
                "pattern" => overrides.pattern = Some(string_value(&meta)?),
                "description" => overrides.description = Some(string_value(&meta)?),
                "title" => overrides.title = Some(string_value(&meta)?),
                "rename" => overrides.rename = Some(string_value(&meta)?),
                "example" => overrides.example = json_value(&meta)?,
                "default" => overrides.default = json_value(&meta)?,
                "minimum" => overrides.minimum = Some(number_value(&meta)?),
                "maximum" => overrides.maximum = Some(number_value(&meta)?),
                "min_length" => overrides.min_length = Some(usize_value(&meta)?),
                "max_length" => overrides.max_length = Some(usize_value(&meta)?),
                "min_items" => overrides.min_items = Some(usize_value(&meta)?),
                "max_items" => overrides.max_items = Some(usize_value(&meta)?),
                "required" => overrides.required = Some(flag_value(&meta)?),
                "hidden" => overrides.hidden = flag_value(&meta)?,
                "read_only" => overrides.read_only = Some(flag_value(&meta)?),
                "write_only" => overrides.write_only = Some(flag_value(&meta)?),
                "deprecated" => overrides.deprecated = Some(flag_value(&meta)?),
                "nullable" => overrides.nullable = Some(flag_value(&meta)?),
                _ => return Err(meta.error(format!("unsupported schema attribute `{key}`"))),
            }
            Ok(())
        });
        if let Err(err) = result {
            tracing::warn!(%err, "ignoring invalid #[schema] attribute");
        }
    }
    overrides
}

/// Consume whatever follows a nested meta key we do not interpret.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn flag_value(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(syn::Token![=]) {
        let lit: syn::LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

fn number_value(meta: &ParseNestedMeta) -> syn::Result<f64> {
    let expr: Expr = meta.value()?.parse()?;
    match expr_to_value(&expr).as_ref().and_then(Value::as_f64) {
        Some(number) => Ok(number),
        None => Err(meta.error("expected a number")),
    }
}

fn usize_value(meta: &ParseNestedMeta) -> syn::Result<usize> {
    let lit: syn::LitInt = meta.value()?.parse()?;
    lit.base10_parse()
}

fn json_value(meta: &ParseNestedMeta) -> syn::Result<Option<Value>> {
    let expr: Expr = meta.value()?.parse()?;
    Ok(expr_to_value(&expr))
}

/// JSON value of a literal expression: strings, numbers (optionally
/// negated), booleans, and arrays of those.
pub fn expr_to_value(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Some(Value::String(s.value())),
            Lit::Int(i) => i.base10_parse::<i64>().ok().map(Value::from),
            Lit::Float(f) => f
                .base10_parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            Lit::Bool(b) => Some(Value::Bool(b.value)),
            _ => None,
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match expr_to_value(expr)? {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::from(-i))
                } else {
                    n.as_f64()
                        .and_then(|f| serde_json::Number::from_f64(-f))
                        .map(Value::Number)
                }
            }
            _ => None,
        },
        Expr::Array(array) => array
            .elems
            .iter()
            .map(expr_to_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expr::Paren(paren) => expr_to_value(&paren.expr),
        Expr::Group(group) => expr_to_value(&group.expr),
        _ => None,
    }
}

/// Apply a serde `rename_all` rule to a field or variant name.
pub fn rename_field(field_name: &str, rename_all: Option<&str>) -> String {
    match rename_all {
        Some("camelCase") => {
            let pascal = to_pascal(field_name);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        Some("PascalCase") => to_pascal(field_name),
        Some("snake_case") => words(field_name).join("_"),
        Some("kebab-case") => words(field_name).join("-"),
        Some("SCREAMING_SNAKE_CASE") => words(field_name).join("_").to_uppercase(),
        Some("SCREAMING-KEBAB-CASE") => words(field_name).join("-").to_uppercase(),
        Some("lowercase") => field_name.to_lowercase(),
        Some("UPPERCASE") => field_name.to_uppercase(),
        _ => field_name.to_string(),
    }
}

fn to_pascal(name: &str) -> String {
    words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Lowercase words of a snake_case, kebab-case, camelCase or PascalCase name.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev_lower = chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit();
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let prev_upper = chars[i - 1].is_uppercase();
            // "fooBar" splits before B, "XMLParser" splits before P
            if prev_lower || (prev_upper && next_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn field_attrs(src: &str) -> Vec<Attribute> {
        let item: syn::ItemStruct = syn::parse_str(&format!("{src}\nstruct S;")).unwrap();
        item.attrs
    }

    #[test]
    fn doc_comments_join_lines() {
        let attrs = field_attrs("/// First line\n/// second line");
        assert_eq!(
            extract_doc_comment(&attrs).as_deref(),
            Some("First line\nsecond line")
        );
        assert!(extract_doc_comment(&field_attrs("#[derive(Debug)]")).is_none());
    }

    #[rstest]
    #[case(r#"#[serde(rename = "id")]"#, Some("id"), None, false)]
    #[case(r#"#[serde(rename_all = "camelCase")]"#, None, Some("camelCase"), false)]
    #[case(r#"#[serde(default, skip_serializing_if = "Option::is_none")]"#, None, None, false)]
    #[case(r#"#[serde(skip)]"#, None, None, true)]
    #[case(
        r#"#[serde(rename(serialize = "out", deserialize = "in"), with = "x")]"#,
        Some("out"),
        None,
        false
    )]
    fn serde_attributes(
        #[case] src: &str,
        #[case] rename: Option<&str>,
        #[case] rename_all: Option<&str>,
        #[case] skip: bool,
    ) {
        let serde = SerdeAttrs::from_attrs(&field_attrs(src));
        assert_eq!(serde.rename.as_deref(), rename);
        assert_eq!(serde.rename_all.as_deref(), rename_all);
        assert_eq!(serde.skip, skip);
    }

    #[test]
    fn serde_flatten_and_tagging() {
        assert!(SerdeAttrs::from_attrs(&field_attrs("#[serde(flatten)]")).flatten);
        assert!(SerdeAttrs::from_attrs(&field_attrs(r#"#[serde(tag = "type")]"#)).tagged);
        assert!(SerdeAttrs::from_attrs(&field_attrs("#[serde(untagged)]")).tagged);
    }

    #[test]
    fn schema_attributes_become_overrides() {
        let attrs = field_attrs(
            r#"#[schema(format = "email", min_length = 3, minimum = -1.5, example = "a@b.c", required, read_only = false)]"#,
        );
        let overrides = extract_schema_overrides(&attrs);
        assert_eq!(overrides.format.as_deref(), Some("email"));
        assert_eq!(overrides.min_length, Some(3));
        assert_eq!(overrides.minimum, Some(-1.5));
        assert_eq!(overrides.example, Some(json!("a@b.c")));
        assert_eq!(overrides.required, Some(true));
        assert_eq!(overrides.read_only, Some(false));
        assert!(!overrides.hidden);
    }

    #[test]
    fn unknown_schema_keys_are_ignored() {
        let overrides = extract_schema_overrides(&field_attrs("#[schema(bogus = 1)]"));
        assert!(overrides.is_empty());
    }

    #[rstest]
    #[case("\"x\"", Some(json!("x")))]
    #[case("42", Some(json!(42)))]
    #[case("-7", Some(json!(-7)))]
    #[case("2.5", Some(json!(2.5)))]
    #[case("true", Some(json!(true)))]
    #[case("[1, 2]", Some(json!([1, 2])))]
    #[case("foo()", None)]
    fn literal_expressions(#[case] src: &str, #[case] expected: Option<Value>) {
        let expr: Expr = syn::parse_str(src).unwrap();
        assert_eq!(expr_to_value(&expr), expected);
    }

    #[rstest]
    #[case("user_name", Some("camelCase"), "userName")]
    #[case("user_name", Some("PascalCase"), "UserName")]
    #[case("userName", Some("snake_case"), "user_name")]
    #[case("user_name", Some("kebab-case"), "user-name")]
    #[case("user_name", Some("SCREAMING_SNAKE_CASE"), "USER_NAME")]
    #[case("HttpStatus", Some("SCREAMING-KEBAB-CASE"), "HTTP-STATUS")]
    #[case("XMLParser", Some("snake_case"), "xml_parser")]
    #[case("Active", Some("lowercase"), "active")]
    #[case("Active", Some("UPPERCASE"), "ACTIVE")]
    #[case("user_name", None, "user_name")]
    fn rename_rules(#[case] name: &str, #[case] rule: Option<&str>, #[case] expected: &str) {
        assert_eq!(rename_field(name, rule), expected);
    }

    #[test]
    fn raw_prefix_is_stripped() {
        assert_eq!(strip_raw_prefix("r#type"), "type");
        assert_eq!(strip_raw_prefix("kind"), "kind");
    }
}
