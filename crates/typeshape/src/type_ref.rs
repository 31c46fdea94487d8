//! Type occurrences and their canonical signatures.

use std::fmt;
use std::str::FromStr;

use crate::error::SourceError;

/// Identity of one occurrence of a type: base name, generic arguments, array
/// depth, or a variable/wildcard standing in for a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    /// A named type, possibly instantiated with generic arguments
    Class { name: String, args: Vec<TypeRef> },
    /// `dims`-dimensional array of `component` (component is never an array)
    Array { component: Box<TypeRef>, dims: usize },
    /// A generic type variable such as `T`
    Variable { name: String },
    /// An unnamed type with an optional upper bound
    Wildcard { upper: Option<Box<TypeRef>> },
    /// Nothing is known about the type
    Any,
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self::Class {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// One-dimensional array of `component`. Arrays of arrays collapse into a
    /// single `Array` with a higher dimension count.
    pub fn array(component: TypeRef) -> Self {
        Self::array_of(component, 1)
    }

    pub fn array_of(component: TypeRef, dims: usize) -> Self {
        if dims == 0 {
            return component;
        }
        match component {
            Self::Array {
                component,
                dims: inner,
            } => Self::Array {
                component,
                dims: inner + dims,
            },
            other => Self::Array {
                component: Box::new(other),
                dims,
            },
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    pub fn wildcard(upper: Option<TypeRef>) -> Self {
        Self::Wildcard {
            upper: upper.map(Box::new),
        }
    }

    /// Full base name of a class type, e.g. `std::vec::Vec`.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Last path segment of a class type's name, e.g. `Vec`.
    pub fn short_name(&self) -> Option<&str> {
        self.base_name().map(short_name)
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Class { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_parameterized(&self) -> bool {
        !self.args().is_empty()
    }

    /// Whether a type variable occurs anywhere inside this type.
    pub fn contains_variables(&self) -> bool {
        match self {
            Self::Variable { .. } => true,
            Self::Class { args, .. } => args.iter().any(Self::contains_variables),
            Self::Array { component, .. } => component.contains_variables(),
            Self::Wildcard { upper } => upper.as_deref().is_some_and(Self::contains_variables),
            Self::Any => false,
        }
    }

    /// Deepest nesting of generic arguments and array dimensions. A plain
    /// class, variable or wildcard is 0; `Vec<i32>` is 1; `Page<Vec<i32>>` is 2.
    pub fn nesting_depth(&self) -> usize {
        match self {
            Self::Class { args, .. } if !args.is_empty() => {
                1 + args.iter().map(Self::nesting_depth).max().unwrap_or(0)
            }
            Self::Array { component, dims } => dims + component.nesting_depth(),
            _ => 0,
        }
    }

    /// Parse Rust type syntax, treating the listed identifiers as type variables.
    pub fn parse_with_params(src: &str, params: &[&str]) -> Result<Self, SourceError> {
        let ty = syn::parse_str::<syn::Type>(src).map_err(|source| SourceError::Parse {
            origin: src.to_string(),
            source,
        })?;
        let params: Vec<String> = params.iter().map(|p| (*p).to_string()).collect();
        Ok(crate::source::type_from_syn(&ty, &params))
    }
}

impl FromStr for TypeRef {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_params(s, &[])
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array { component, dims } => {
                write!(f, "{component}")?;
                for _ in 0..*dims {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            Self::Variable { name } => f.write_str(name),
            Self::Wildcard { upper: None } => f.write_str("?"),
            Self::Wildcard { upper: Some(upper) } => write!(f, "?: {upper}"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Deduplication key of a concrete type instantiation.
///
/// Built from a type whose variables have already been resolved, so
/// `Wrapper<String>` and `Wrapper<i32>` differ while two occurrences of the
/// same instantiation compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalSignature(String);

impl CanonicalSignature {
    pub fn of(resolved: &TypeRef) -> Self {
        Self(resolved.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last `::` segment of a path.
pub fn short_name(name: &str) -> &str {
    name.rsplit_once("::").map_or(name, |(_, last)| last)
}

/// Whether two paths name the same item as far as both spell it out: the
/// shorter one, ignoring `crate`/`self`/`super`, is a segment-wise suffix of
/// the longer one. `crate::a::User` matches `a::User` and `User`, not `b::User`.
pub(crate) fn path_tails_match(a: &str, b: &str) -> bool {
    let segments = |path: &str| -> Vec<String> {
        path.split("::")
            .filter(|segment| !matches!(*segment, "" | "crate" | "self" | "super"))
            .map(str::to_string)
            .collect()
    };
    let (a, b) = (segments(a), segments(b));
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    longer.ends_with(&shorter)
}

/// Capitalizes the first character of a string.
/// E.g., `user` -> `User`, `USER` -> `USER`, `` -> ``
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
