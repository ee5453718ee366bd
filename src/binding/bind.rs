use super::coerce::Coercer;
use crate::ids::RequestId;
use crate::router::RouteMatch;
use crate::server::ParsedRequest;
use crate::spec::{BodyLayout, ParamType, ParameterLocation, RouteMeta, TypeRegistry};
use crate::validator::{IssueKind, LocSegment, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

/// The declared parameters of one request, coerced and validated.
#[derive(Debug, Clone)]
pub struct BoundRequest {
    pub request_id: RequestId,
    pub route: Arc<RouteMeta>,
    /// Parameter name to coerced value; absent optional parameters are `null`.
    pub values: Map<String, Value>,
}

impl BoundRequest {
    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.route.handler_name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// All bound values as one JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Deserialize the bound values into a typed struct.
    ///
    /// # Errors
    ///
    /// When the struct's shape disagrees with the declared parameters.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

enum BodyInput {
    Absent,
    Present(Value),
    /// Malformed JSON; already reported once at `["body"]`.
    Invalid,
}

fn read_body(body: Option<&[u8]>, coercer: &mut Coercer<'_>) -> BodyInput {
    let Some(bytes) = body.filter(|b| !b.iter().all(u8::is_ascii_whitespace)) else {
        return BodyInput::Absent;
    };
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => BodyInput::Present(value),
        Err(e) => {
            let raw = Value::String(String::from_utf8_lossy(bytes).into_owned());
            coercer.report(
                &[LocSegment::from("body")],
                IssueKind::JsonInvalid,
                format!("JSON decode error: {e}"),
                &raw,
            );
            BodyInput::Invalid
        }
    }
}

/// Bind every declared parameter of the matched route from the request.
///
/// Path, query, cookie and body parameters are all attempted even after a
/// failure, so the returned [`ValidationError`] lists every issue of the
/// request at once.
///
/// # Errors
///
/// [`ValidationError`] with one issue per failing field.
pub fn bind(
    types: &TypeRegistry,
    route_match: &RouteMatch,
    request: &ParsedRequest,
    request_id: RequestId,
) -> Result<BoundRequest, ValidationError> {
    let route = &route_match.route;
    let mut coercer = Coercer::new(types);
    let mut values = Map::with_capacity(route.parameters.len());
    let mut loc: Vec<LocSegment> = Vec::with_capacity(4);

    let body = if route.body_layout == BodyLayout::None {
        BodyInput::Absent
    } else {
        read_body(request.body.as_deref(), &mut coercer)
    };
    let mut body_shape_reported = false;

    for param in &route.parameters {
        let key = param.key();
        loc.clear();
        loc.push(LocSegment::from(param.location.as_str()));

        let raw: Option<Cow<'_, Value>> = match param.location {
            ParameterLocation::Path => {
                loc.push(LocSegment::from(key));
                route_match
                    .get_path_param(param.name())
                    .map(|v| Cow::Owned(Value::String(v.to_string())))
            }
            ParameterLocation::Query => {
                loc.push(LocSegment::from(key));
                if matches!(param.field.ty.inner(), ParamType::List(_)) {
                    let all: Vec<Value> = request
                        .query_values(key)
                        .map(|v| Value::String(v.to_string()))
                        .collect();
                    (!all.is_empty()).then(|| Cow::Owned(Value::Array(all)))
                } else {
                    request
                        .query_last(key)
                        .map(|v| Cow::Owned(Value::String(v.to_string())))
                }
            }
            ParameterLocation::Cookie => {
                loc.push(LocSegment::from(key));
                request
                    .cookie(key)
                    .map(|v| Cow::Owned(Value::String(v.to_string())))
            }
            ParameterLocation::Body => match (&body, route.body_layout) {
                (BodyInput::Invalid, _) => continue,
                (BodyInput::Present(value), BodyLayout::Direct) => Some(Cow::Borrowed(value)),
                (BodyInput::Absent, BodyLayout::Direct) => None,
                (BodyInput::Present(Value::Object(members)), _) => {
                    loc.push(LocSegment::from(key));
                    members.get(key).map(Cow::Borrowed)
                }
                (BodyInput::Present(other), _) => {
                    if !body_shape_reported {
                        coercer.report(
                            &loc,
                            IssueKind::ModelAttributesType,
                            "Input should be a valid dictionary or object to extract fields from",
                            other,
                        );
                        body_shape_reported = true;
                    }
                    continue;
                }
                (BodyInput::Absent, _) => {
                    loc.push(LocSegment::from(key));
                    None
                }
            },
        };

        if let Some(value) = coercer.field(&param.field, raw.as_deref(), &mut loc) {
            values.insert(param.name().to_string(), value);
        }
    }

    let issues = coercer.into_issues();
    if !issues.is_empty() {
        info!(
            request_id = %request_id,
            handler_name = %route.handler_name,
            issue_count = issues.len(),
            locations = ?issues.iter().map(|i| i.location()).collect::<Vec<_>>(),
            "Request rejected"
        );
        return Err(ValidationError::new(issues));
    }

    debug!(
        request_id = %request_id,
        handler_name = %route.handler_name,
        bound = values.len(),
        "Request bound"
    );
    Ok(BoundRequest {
        request_id,
        route: Arc::clone(route),
        values,
    })
}
