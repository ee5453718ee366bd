//! Serializable route declarations.
//!
//! A [`Manifest`] is what a route file deserializes into, and what the
//! builder methods below assemble in code. Nothing here is validated; that is
//! the job of [`build_routes`](super::build_routes).

use super::types::ParameterLocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub title: String,
    /// Enum name to its closed, ordered set of string values.
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelDecl>,
    /// Tried in this order when matching.
    #[serde(default)]
    pub routes: Vec<RouteDecl>,
}

impl Manifest {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn enumeration<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn model(mut self, name: impl Into<String>, model: ModelDecl) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    #[must_use]
    pub fn route(mut self, route: RouteDecl) -> Self {
        self.routes.push(route);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDecl {
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelDecl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One model field, or the shared part of a parameter declaration.
///
/// `default: null` in a file reads the same as no default. An omitted
/// `optional[T]` value without a default binds as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(flatten)]
    pub constraints: ConstraintDecl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    #[must_use]
    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    #[must_use]
    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    #[must_use]
    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    #[serde(flatten)]
    pub field: FieldDecl,
    /// Explicit origin annotation; wins over every inference rule.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    #[serde(default)]
    pub embed: bool,
}

impl From<FieldDecl> for ParamDecl {
    fn from(field: FieldDecl) -> Self {
        Self {
            field,
            location: None,
            embed: false,
        }
    }
}

impl ParamDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        FieldDecl::new(name, ty).into()
    }

    #[must_use]
    pub fn path(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty).located(ParameterLocation::Path)
    }

    #[must_use]
    pub fn query(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty).located(ParameterLocation::Query)
    }

    #[must_use]
    pub fn body(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty).located(ParameterLocation::Body)
    }

    #[must_use]
    pub fn cookie(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ty).located(ParameterLocation::Cookie)
    }

    #[must_use]
    pub fn located(mut self, location: ParameterLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embed = true;
        self
    }

    /// Apply a [`FieldDecl`] builder step to the shared declaration.
    #[must_use]
    pub fn with(mut self, f: impl FnOnce(FieldDecl) -> FieldDecl) -> Self {
        self.field = f(self.field);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDecl {
    pub method: String,
    pub path: String,
    pub handler: String,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl RouteDecl {
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler: handler.into(),
            parameters: Vec::new(),
            summary: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new("GET", path, handler)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new("POST", path, handler)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new("PUT", path, handler)
    }

    #[must_use]
    pub fn param(mut self, param: impl Into<ParamDecl>) -> Self {
        self.parameters.push(param.into());
        self
    }
}
