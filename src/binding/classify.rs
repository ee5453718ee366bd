use crate::spec::{
    BodyLayout, ParamDecl, ParamType, ParameterLocation, ParameterMeta, RegistrationError,
};

/// Decide where a declared parameter is read from.
///
/// A template placeholder is always path; otherwise an explicit `in` wins;
/// otherwise composite types (models, lists, dicts, seen through `optional`)
/// go to the body and everything else to the query string.
///
/// # Errors
///
/// Annotations that contradict the template, and types that the chosen origin
/// cannot carry (a model in the query string, a list in a cookie).
pub fn classify_parameter(
    param: &ParamDecl,
    ty: &ParamType,
    placeholders: &[&str],
    context: &str,
) -> Result<ParameterLocation, RegistrationError> {
    let name = param.field.name.as_str();
    let is_placeholder = placeholders.contains(&name);

    let location = match param.location {
        Some(ParameterLocation::Path) if !is_placeholder => {
            return Err(RegistrationError::UnknownPathParameter {
                name: name.to_string(),
                context: context.to_string(),
            })
        }
        Some(location) if is_placeholder && location != ParameterLocation::Path => {
            return Err(RegistrationError::ConflictingLocation {
                name: name.to_string(),
                location,
                context: context.to_string(),
            })
        }
        Some(location) => location,
        None if is_placeholder => ParameterLocation::Path,
        None if ty.is_composite() => ParameterLocation::Body,
        None => ParameterLocation::Query,
    };

    if !location_carries(location, ty) {
        return Err(RegistrationError::UnsupportedLocation {
            name: name.to_string(),
            ty: ty.to_string(),
            location,
            context: context.to_string(),
        });
    }
    Ok(location)
}

/// Path segments and cookies hold one token; the query string may repeat a
/// key, so it also carries lists of scalars.
fn location_carries(location: ParameterLocation, ty: &ParamType) -> bool {
    match location {
        ParameterLocation::Body => true,
        ParameterLocation::Path | ParameterLocation::Cookie => ty.is_scalar(),
        ParameterLocation::Query => match ty.inner() {
            ParamType::List(item) => item.is_scalar(),
            other => other.is_scalar(),
        },
    }
}

/// A lone, non-embedded body parameter receives the whole body; two or more
/// (or any embedded one) read members of a body object.
#[must_use]
pub fn body_layout(parameters: &[ParameterMeta]) -> BodyLayout {
    let mut body = parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Body);
    match (body.next(), body.next()) {
        (None, _) => BodyLayout::None,
        (Some(only), None) if !only.embed => BodyLayout::Direct,
        _ => BodyLayout::Embedded,
    }
}
