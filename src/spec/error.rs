use crate::router::TemplateError;
use crate::spec::ParameterLocation;
use thiserror::Error;

/// A configuration fault found while building the route table.
///
/// These are fatal at startup: a table that fails to build never serves a
/// request.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("route {method} {path}: malformed template: {source}")]
    MalformedTemplate {
        method: String,
        path: String,
        #[source]
        source: TemplateError,
    },

    #[error("route {path}: unsupported HTTP method '{method}'")]
    UnknownMethod { method: String, path: String },

    #[error("{context}: no coercion rule for type '{ty}'")]
    UnhandledType { ty: String, context: String },

    #[error("{context}: invalid type expression '{expr}': {reason}")]
    InvalidTypeExpression {
        expr: String,
        context: String,
        reason: String,
    },

    #[error("type name '{name}' is declared more than once")]
    DuplicateType { name: String },

    #[error("enum '{name}' declares no values")]
    EmptyEnum { name: String },

    #[error("{context}: '{name}' is declared more than once")]
    DuplicateField { name: String, context: String },

    #[error("{context}: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        context: String,
        #[source]
        source: regex::Error,
    },

    #[error("{context}: parameter '{name}' is declared in path but the template has no such placeholder")]
    UnknownPathParameter { name: String, context: String },

    #[error("{context}: parameter '{name}' is a path placeholder but is annotated as {location}")]
    ConflictingLocation {
        name: String,
        location: ParameterLocation,
        context: String,
    },

    #[error("{context}: parameter '{name}' of type {ty} cannot be read from {location}")]
    UnsupportedLocation {
        name: String,
        ty: String,
        location: ParameterLocation,
        context: String,
    },

    #[error("{context}: default for '{name}' does not satisfy its declaration: {reason}")]
    InvalidDefault {
        name: String,
        context: String,
        reason: String,
    },
}
