use crate::router::PathTemplate;
use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Where a declared parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Cookie,
}

impl ParameterLocation {
    /// Lowercase name used as the first element of a validation `loc`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved declared type.
///
/// Enum and model variants carry the declared name; their definitions live in
/// the [`TypeRegistry`] so that models may refer to each other (and to
/// themselves) without ownership cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    Uuid,
    DateTime,
    Time,
    Duration,
    Url,
    Enum(String),
    Model(String),
    List(Box<ParamType>),
    Dict(Box<ParamType>, Box<ParamType>),
    Optional(Box<ParamType>),
}

impl ParamType {
    /// The type with any `optional[...]` wrappers removed.
    #[must_use]
    pub fn inner(&self) -> &ParamType {
        match self {
            ParamType::Optional(inner) => inner.inner(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, ParamType::Optional(_))
    }

    /// Structured records, collections and mappings.
    ///
    /// Unannotated parameters of these types are read from the request body.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(
            self.inner(),
            ParamType::Model(_) | ParamType::List(_) | ParamType::Dict(_, _)
        )
    }

    /// True for types that can be parsed from a single string token.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !self.is_composite()
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.inner(), ParamType::Int | ParamType::Float)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Str => f.write_str("str"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Uuid => f.write_str("uuid"),
            ParamType::DateTime => f.write_str("datetime"),
            ParamType::Time => f.write_str("time"),
            ParamType::Duration => f.write_str("timedelta"),
            ParamType::Url => f.write_str("url"),
            ParamType::Enum(name) | ParamType::Model(name) => f.write_str(name),
            ParamType::List(item) => write!(f, "list[{item}]"),
            ParamType::Dict(key, value) => write!(f, "dict[{key}, {value}]"),
            ParamType::Optional(inner) => write!(f, "optional[{inner}]"),
        }
    }
}

/// A compiled `pattern` constraint.
#[derive(Debug, Clone)]
pub struct Pattern(pub Regex);

impl Pattern {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Validation constraints attached to a parameter or model field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub gt: Option<f64>,
    pub ge: Option<f64>,
    pub lt: Option<f64>,
    pub le: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

impl Constraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Metadata that only feeds documentation; it never changes binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub examples: Vec<Value>,
}

/// A fully resolved declaration shared by parameters and model fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    pub name: String,
    pub ty: ParamType,
    pub alias: Option<String>,
    /// Already coerced to `ty` at registration.
    pub default: Option<Value>,
    /// Effective presence rule: explicit `required`, else "has no default and
    /// is not `optional[...]`".
    pub required: bool,
    pub constraints: Constraints,
    pub docs: DocMeta,
}

impl FieldMeta {
    /// The key looked up in the request (alias wins over the name).
    #[must_use]
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMeta {
    pub field: FieldMeta,
    /// Origin after classification.
    pub location: ParameterLocation,
    /// Whether the origin came from an explicit `in:` annotation.
    pub explicit: bool,
    pub embed: bool,
}

impl ParameterMeta {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field.name
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.field.key()
    }
}

/// How the JSON body maps onto the body parameters of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLayout {
    /// The route reads nothing from the body.
    None,
    /// A single, non-embedded body parameter receives the whole body.
    Direct,
    /// The body is an object keyed by each body parameter's alias or name.
    Embedded,
}

#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: Method,
    pub path_pattern: String,
    pub template: PathTemplate,
    pub handler_name: String,
    pub parameters: Vec<ParameterMeta>,
    pub body_layout: BodyLayout,
    pub summary: Option<String>,
}

impl RouteMeta {
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterMeta> + '_ {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDef {
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// `'a', 'b' or 'c'`
    #[must_use]
    pub fn expected(&self) -> String {
        let quoted: Vec<String> = self.values.iter().map(|v| format!("'{v}'")).collect();
        match quoted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    pub name: String,
    pub fields: Vec<FieldMeta>,
    pub example: Option<Value>,
    pub description: Option<String>,
}

/// Enum and model definitions referenced by name from [`ParamType`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    pub(crate) enums: HashMap<String, EnumDef>,
    pub(crate) models: HashMap<String, ModelDef>,
}

impl TypeRegistry {
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    #[must_use]
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.models.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }
}

/// The immutable output of registration: routes in registration order plus
/// the types they reference.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub title: String,
    pub routes: Vec<RouteMeta>,
    pub types: TypeRegistry,
}
