use super::error::RegistrationError;
use super::manifest::{FieldDecl, Manifest, RouteDecl};
use super::types::{
    Constraints, DocMeta, EnumDef, FieldMeta, ModelDef, ParamType, ParameterLocation,
    ParameterMeta, Pattern, RouteMeta, RouteTable, TypeRegistry,
};
use crate::binding::{body_layout, classify_parameter, coerce_default};
use crate::router::PathTemplate;
use http::Method;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Keywords of the type expression language; user types may not reuse them.
const BUILTIN_TYPES: [&str; 20] = [
    "str", "string", "int", "integer", "float", "number", "bool", "boolean", "uuid",
    "datetime", "time", "timedelta", "duration", "url", "http_url", "list", "dict",
    "optional", "None", "null",
];

/// Validate a [`Manifest`] and compile it into an immutable [`RouteTable`].
///
/// Every template is parsed, every type expression resolved, every pattern
/// compiled, every parameter classified and every default coerced here, so
/// that per-request work never meets a configuration fault.
///
/// # Errors
///
/// Returns the first [`RegistrationError`] encountered.
pub fn build_routes(manifest: &Manifest) -> Result<RouteTable, RegistrationError> {
    let mut types = TypeRegistry::default();

    for (name, values) in &manifest.enums {
        if BUILTIN_TYPES.contains(&name.as_str()) {
            return Err(RegistrationError::DuplicateType { name: name.clone() });
        }
        if values.is_empty() {
            return Err(RegistrationError::EmptyEnum { name: name.clone() });
        }
        types.enums.insert(
            name.clone(),
            EnumDef {
                name: name.clone(),
                values: values.clone(),
            },
        );
    }

    for (name, decl) in &manifest.models {
        if BUILTIN_TYPES.contains(&name.as_str()) || manifest.enums.contains_key(name) {
            return Err(RegistrationError::DuplicateType { name: name.clone() });
        }
        let context = format!("model {name}");
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(RegistrationError::DuplicateField {
                    name: field.name.clone(),
                    context,
                });
            }
            fields.push(resolve_field(field, manifest, &context)?);
        }
        types.models.insert(
            name.clone(),
            ModelDef {
                name: name.clone(),
                fields,
                example: decl.example.clone(),
                description: decl.description.clone(),
            },
        );
    }

    coerce_model_defaults(&mut types)?;

    let mut routes = Vec::with_capacity(manifest.routes.len());
    for decl in &manifest.routes {
        routes.push(build_route(decl, manifest, &types)?);
    }

    report_unreachable(&routes);

    info!(
        title = %manifest.title,
        routes_count = routes.len(),
        models_count = types.models.len(),
        enums_count = types.enums.len(),
        "Route table built"
    );

    Ok(RouteTable {
        title: manifest.title.clone(),
        routes,
        types,
    })
}


/// Coerce every model field default against the registry.
///
/// A default may embed another model whose own fields fall back to their
/// defaults, so each round coerces the raw declarations against the previous
/// round's results. Nesting depth is bounded by the number of models; a
/// default that keeps growing past that nests its own model forever.
fn coerce_model_defaults(types: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let raw: Vec<(String, usize, FieldMeta)> = types
        .models
        .values()
        .flat_map(|model| {
            model
                .fields
                .iter()
                .enumerate()
                .filter(|(_, field)| field.default.is_some())
                .map(|(idx, field)| (model.name.clone(), idx, field.clone()))
        })
        .collect();

    for _ in 0..=types.models.len() {
        let mut coerced = Vec::with_capacity(raw.len());
        for (model, idx, field) in &raw {
            let value = coerce_default(field, types).map_err(|reason| {
                RegistrationError::InvalidDefault {
                    name: field.name.clone(),
                    context: format!("model {model}"),
                    reason,
                }
            })?;
            coerced.push((model, *idx, value));
        }

        let mut changed = false;
        for (model, idx, value) in coerced {
            if let Some(field) = types
                .models
                .get_mut(model)
                .and_then(|m| m.fields.get_mut(idx))
            {
                if field.default.as_ref() != Some(&value) {
                    field.default = Some(value);
                    changed = true;
                }
            }
        }
        if !changed {
            return Ok(());
        }
    }

    match raw.first() {
        Some((model, _, field)) => Err(RegistrationError::InvalidDefault {
            name: field.name.clone(),
            context: format!("model {model}"),
            reason: "default nests its own model without end".to_string(),
        }),
        None => Ok(()),
    }
}


fn build_route(
    decl: &RouteDecl,
    manifest: &Manifest,
    types: &TypeRegistry,
) -> Result<RouteMeta, RegistrationError> {
    let method = parse_method(&decl.method).ok_or_else(|| RegistrationError::UnknownMethod {
        method: decl.method.clone(),
        path: decl.path.clone(),
    })?;
    let template =
        PathTemplate::parse(&decl.path).map_err(|source| RegistrationError::MalformedTemplate {
            method: decl.method.clone(),
            path: decl.path.clone(),
            source,
        })?;
    let context = format!("route {method} {}", decl.path);
    let placeholders: Vec<&str> = template.placeholders().collect();

    let mut seen = HashSet::new();
    let mut parameters = Vec::with_capacity(decl.parameters.len() + placeholders.len());
    for param in &decl.parameters {
        if !seen.insert(param.field.name.as_str()) {
            return Err(RegistrationError::DuplicateField {
                name: param.field.name.clone(),
                context,
            });
        }
        let mut field = resolve_field(&param.field, manifest, &context)?;
        let location = classify_parameter(param, &field.ty, &placeholders, &context)?;
        if location == ParameterLocation::Path {
            field.required = true;
        }
        if field.default.is_some() {
            let value = coerce_default(&field, types).map_err(|reason| {
                RegistrationError::InvalidDefault {
                    name: field.name.clone(),
                    context: context.clone(),
                    reason,
                }
            })?;
            field.default = Some(value);
        }
        parameters.push(ParameterMeta {
            field,
            location,
            explicit: param.location.is_some(),
            embed: param.embed,
        });
    }

    for name in &placeholders {
        if !seen.contains(name) {
            debug!(route = %context, param = %name, "Binding undeclared placeholder as str");
            parameters.push(ParameterMeta {
                field: FieldMeta {
                    name: (*name).to_string(),
                    ty: ParamType::Str,
                    alias: None,
                    default: None,
                    required: true,
                    constraints: Constraints::default(),
                    docs: DocMeta::default(),
                },
                location: ParameterLocation::Path,
                explicit: false,
                embed: false,
            });
        }
    }

    let body_layout = body_layout(&parameters);

    Ok(RouteMeta {
        method,
        path_pattern: decl.path.clone(),
        template,
        handler_name: decl.handler.clone(),
        parameters,
        body_layout,
        summary: decl.summary.clone(),
    })
}

fn parse_method(raw: &str) -> Option<Method> {
    let method = Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes()).ok()?;
    let supported = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
        Method::HEAD,
        Method::TRACE,
    ];
    supported.contains(&method).then_some(method)
}

fn resolve_field(
    decl: &FieldDecl,
    manifest: &Manifest,
    context: &str,
) -> Result<FieldMeta, RegistrationError> {
    let field_context = format!("{context}, field '{}'", decl.name);
    let ty = resolve_type(&decl.ty, manifest, &field_context)?;

    let pattern = match &decl.constraints.pattern {
        Some(raw) => Some(Pattern(Regex::new(raw).map_err(|source| {
            RegistrationError::InvalidPattern {
                pattern: raw.clone(),
                context: field_context.clone(),
                source,
            }
        })?)),
        None => None,
    };
    let required = decl
        .required
        .unwrap_or(decl.default.is_none() && !ty.is_optional());

    Ok(FieldMeta {
        name: decl.name.clone(),
        ty,
        alias: decl.alias.clone(),
        default: decl.default.clone(),
        required,
        constraints: Constraints {
            gt: decl.constraints.gt,
            ge: decl.constraints.ge,
            lt: decl.constraints.lt,
            le: decl.constraints.le,
            min_length: decl.constraints.min_length,
            max_length: decl.constraints.max_length,
            pattern,
        },
        docs: DocMeta {
            title: decl.title.clone(),
            description: decl.description.clone(),
            deprecated: decl.deprecated,
            examples: decl.examples.clone(),
        },
    })
}

/// Resolve a type expression such as `list[str]` or `dict[int, HeightLabel]`.
///
/// # Errors
///
/// [`RegistrationError::UnhandledType`] for names that are neither builtin
/// nor declared, [`RegistrationError::InvalidTypeExpression`] for syntax
/// errors.
pub fn resolve_type(
    expr: &str,
    manifest: &Manifest,
    context: &str,
) -> Result<ParamType, RegistrationError> {
    let expr = expr.trim();
    let invalid = |reason: &str| RegistrationError::InvalidTypeExpression {
        expr: expr.to_string(),
        context: context.to_string(),
        reason: reason.to_string(),
    };

    if let Some(args) = generic_args(expr, "list") {
        return Ok(ParamType::List(Box::new(resolve_type(
            args, manifest, context,
        )?)));
    }
    if let Some(args) = generic_args(expr, "optional") {
        let inner = resolve_type(args, manifest, context)?;
        // optional[optional[T]] is just optional[T]
        return Ok(match inner {
            ParamType::Optional(_) => inner,
            other => ParamType::Optional(Box::new(other)),
        });
    }
    if let Some(args) = generic_args(expr, "dict") {
        let (key, value) = split_top_level(args).ok_or_else(|| invalid("expected dict[K, V]"))?;
        let key = resolve_type(key, manifest, context)?;
        if !key.is_scalar() || key.is_optional() {
            return Err(invalid("dict keys must be a non-optional scalar type"));
        }
        let value = resolve_type(value, manifest, context)?;
        return Ok(ParamType::Dict(Box::new(key), Box::new(value)));
    }
    if expr.is_empty() || expr.contains(['[', ']', ',']) {
        return Err(invalid("unbalanced or unknown generic"));
    }

    let ty = match expr {
        "str" | "string" => ParamType::Str,
        "int" | "integer" => ParamType::Int,
        "float" | "number" => ParamType::Float,
        "bool" | "boolean" => ParamType::Bool,
        "uuid" => ParamType::Uuid,
        "datetime" => ParamType::DateTime,
        "time" => ParamType::Time,
        "timedelta" | "duration" => ParamType::Duration,
        "url" | "http_url" => ParamType::Url,
        name if manifest.enums.contains_key(name) => ParamType::Enum(name.to_string()),
        name if manifest.models.contains_key(name) => ParamType::Model(name.to_string()),
        other => {
            return Err(RegistrationError::UnhandledType {
                ty: other.to_string(),
                context: context.to_string(),
            })
        }
    };
    Ok(ty)
}

fn generic_args<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .trim_start()
        .strip_prefix('[')?
        .strip_suffix(']')
}

/// Split `K, V` at the single comma that is not nested inside brackets.
fn split_top_level(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut split = None;
    for (idx, ch) in args.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                if split.is_some() {
                    return None;
                }
                split = Some(idx);
            }
            _ => {}
        }
    }
    let idx = split?;
    Some((&args[..idx], &args[idx + 1..]))
}

/// Warn about routes that can never be selected under first-match order.
///
/// The routes stay registered; only the operator is told.
fn report_unreachable(routes: &[RouteMeta]) {
    for (idx, route) in routes.iter().enumerate() {
        let earlier = routes[..idx].iter().find(|prior| {
            prior.method == route.method
                && (prior.path_pattern == route.path_pattern
                    || (route.template.is_literal()
                        && prior.template.matches(&route.path_pattern).is_some()))
        });
        if let Some(prior) = earlier {
            warn!(
                method = %route.method,
                route_pattern = %route.path_pattern,
                handler_name = %route.handler_name,
                shadowed_by = %prior.path_pattern,
                shadowing_handler = %prior.handler_name,
                "Route is unreachable: an earlier template matches first"
            );
        }
    }
}
