//! Lax coercion of raw request values into their declared types.
//!
//! Inputs are JSON values: strings for path, query and cookie tokens, and
//! whatever the client sent for body members. Every failure becomes a
//! [`ValidationIssue`] at the current `loc`; coercion keeps going so that all
//! failures of a request are reported together.

use super::constraints::check_constraints;
use super::temporal::{
    datetime_from_timestamp, duration_from_seconds, format_datetime, format_duration,
    format_time, parse_datetime, parse_duration, parse_time,
};
use crate::spec::{FieldMeta, ParamType, TypeRegistry};
use crate::validator::{IssueKind, LocSegment, ValidationIssue};
use serde_json::{json, Map, Number, Value};
use url::Url;

pub(crate) struct Coercer<'a> {
    types: &'a TypeRegistry,
    issues: Vec<ValidationIssue>,
}

impl<'a> Coercer<'a> {
    pub(crate) fn new(types: &'a TypeRegistry) -> Self {
        Self {
            types,
            issues: Vec::new(),
        }
    }

    pub(crate) fn report(
        &mut self,
        loc: &[LocSegment],
        kind: IssueKind,
        msg: impl Into<String>,
        input: &Value,
    ) {
        self.issues
            .push(ValidationIssue::new(loc.to_vec(), kind, msg, input.clone()));
    }

    pub(crate) fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    /// Apply the presence rule, then coerce and check constraints.
    ///
    /// `None` means the field failed and issues were recorded.
    pub(crate) fn field(
        &mut self,
        field: &FieldMeta,
        raw: Option<&Value>,
        loc: &mut Vec<LocSegment>,
    ) -> Option<Value> {
        match raw {
            Some(input) => self.checked(field, input, loc),
            None => match &field.default {
                Some(default) => Some(default.clone()),
                None if field.required => {
                    self.report(loc, IssueKind::Missing, "Field required", &Value::Null);
                    None
                }
                None => Some(Value::Null),
            },
        }
    }

    pub(crate) fn checked(
        &mut self,
        field: &FieldMeta,
        input: &Value,
        loc: &mut Vec<LocSegment>,
    ) -> Option<Value> {
        let value = self.value(&field.ty, input, loc)?;
        let before = self.issues.len();
        check_constraints(&value, &field.ty, &field.constraints, input, loc, &mut self.issues);
        (self.issues.len() == before).then_some(value)
    }

    pub(crate) fn value(
        &mut self,
        ty: &ParamType,
        input: &Value,
        loc: &mut Vec<LocSegment>,
    ) -> Option<Value> {
        match ty {
            ParamType::Optional(inner) => {
                if input.is_null() {
                    Some(Value::Null)
                } else {
                    self.value(inner, input, loc)
                }
            }
            ParamType::Str => match input {
                Value::String(_) => Some(input.clone()),
                _ => self.fail(loc, IssueKind::StringType, "Input should be a valid string", input),
            },
            ParamType::Int => self.int(input, loc),
            ParamType::Float => self.float(input, loc),
            ParamType::Bool => self.bool(input, loc),
            ParamType::Uuid => match input.as_str().and_then(|s| uuid::Uuid::parse_str(s).ok()) {
                Some(id) => Some(Value::String(id.hyphenated().to_string())),
                None => self.fail(loc, IssueKind::UuidParsing, "Input should be a valid UUID", input),
            },
            ParamType::DateTime => {
                let parsed = match input {
                    Value::String(s) => parse_datetime(s),
                    Value::Number(n) => n.as_f64().and_then(datetime_from_timestamp),
                    _ => None,
                };
                match parsed {
                    Some(dt) => Some(Value::String(format_datetime(&dt))),
                    None => self.fail(
                        loc,
                        IssueKind::DatetimeParsing,
                        "Input should be a valid datetime",
                        input,
                    ),
                }
            }
            ParamType::Time => match input.as_str().and_then(parse_time) {
                Some(t) => Some(Value::String(format_time(&t))),
                None => self.fail(loc, IssueKind::TimeParsing, "Input should be a valid time", input),
            },
            ParamType::Duration => {
                let parsed = match input {
                    Value::String(s) => parse_duration(s),
                    Value::Number(n) => n.as_f64().and_then(duration_from_seconds),
                    _ => None,
                };
                match parsed {
                    Some(d) => Some(Value::String(format_duration(&d))),
                    None => self.fail(
                        loc,
                        IssueKind::TimeDeltaParsing,
                        "Input should be a valid timedelta",
                        input,
                    ),
                }
            }
            ParamType::Url => self.url(input, loc),
            ParamType::Enum(name) => self.enumeration(name, input, loc),
            ParamType::Model(name) => self.model(name, input, loc),
            ParamType::List(item) => self.list(item, input, loc),
            ParamType::Dict(key, value) => self.dict(key, value, input, loc),
        }
    }

    fn fail(
        &mut self,
        loc: &[LocSegment],
        kind: IssueKind,
        msg: &str,
        input: &Value,
    ) -> Option<Value> {
        self.report(loc, kind, msg, input);
        None
    }

    fn int(&mut self, input: &Value, loc: &[LocSegment]) -> Option<Value> {
        match input {
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    return Some(input.clone());
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Some(Value::from(f as i64))
                    }
                    _ => self.fail(
                        loc,
                        IssueKind::IntFromFloat,
                        "Input should be a valid integer, got a number with a fractional part",
                        input,
                    ),
                }
            }
            Value::String(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    Some(Value::from(i))
                } else if let Ok(u) = s.parse::<u64>() {
                    Some(Value::from(u))
                } else {
                    self.fail(
                        loc,
                        IssueKind::IntParsing,
                        "Input should be a valid integer, unable to parse string as an integer",
                        input,
                    )
                }
            }
            _ => self.fail(loc, IssueKind::IntParsing, "Input should be a valid integer", input),
        }
    }

    fn float(&mut self, input: &Value, loc: &[LocSegment]) -> Option<Value> {
        let parsed = match input {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        match parsed.and_then(Number::from_f64) {
            Some(n) => Some(Value::Number(n)),
            None => self.fail(
                loc,
                IssueKind::FloatParsing,
                "Input should be a valid number, unable to parse string as a number",
                input,
            ),
        }
    }

    fn bool(&mut self, input: &Value, loc: &[LocSegment]) -> Option<Value> {
        match input {
            Value::Bool(_) => Some(input.clone()),
            Value::String(s) => Some(Value::Bool(parse_lax_bool(s))),
            Value::Number(n) if n.as_i64() == Some(0) => Some(Value::Bool(false)),
            Value::Number(n) if n.as_i64() == Some(1) => Some(Value::Bool(true)),
            _ => self.fail(loc, IssueKind::BoolParsing, "Input should be a valid boolean", input),
        }
    }

    fn url(&mut self, input: &Value, loc: &[LocSegment]) -> Option<Value> {
        let Some(raw) = input.as_str() else {
            return self.fail(loc, IssueKind::UrlParsing, "URL input should be a string or URL", input);
        };
        match Url::parse(raw) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                self.report(
                    loc,
                    IssueKind::UrlScheme,
                    "URL scheme should be 'http' or 'https'",
                    input,
                );
                None
            }
            Ok(url) if url.host_str().map_or(true, str::is_empty) => self.fail(
                loc,
                IssueKind::UrlParsing,
                "Input should be a valid URL, empty host",
                input,
            ),
            Ok(url) => Some(Value::String(url.to_string())),
            Err(e) => {
                let msg = format!("Input should be a valid URL, {e}");
                self.fail(loc, IssueKind::UrlParsing, &msg, input)
            }
        }
    }

    fn enumeration(&mut self, name: &str, input: &Value, loc: &[LocSegment]) -> Option<Value> {
        let types = self.types;
        let Some(def) = types.get_enum(name) else {
            let msg = format!("Unknown enumeration '{name}'");
            return self.fail(loc, IssueKind::Enum, &msg, input);
        };
        match input {
            Value::String(s) if def.contains(s) => Some(input.clone()),
            _ => {
                self.issues.push(
                    ValidationIssue::new(
                        loc.to_vec(),
                        IssueKind::Enum,
                        format!("Input should be {}", def.expected()),
                        input.clone(),
                    )
                    .with_ctx(json!({ "expected": def.expected() })),
                );
                None
            }
        }
    }

    /// Output is keyed by field name and lists every field, absent optional
    /// ones as their default or `null`.
    fn model(&mut self, name: &str, input: &Value, loc: &mut Vec<LocSegment>) -> Option<Value> {
        let types = self.types;
        let Some(def) = types.get_model(name) else {
            let msg = format!("Unknown model '{name}'");
            return self.fail(loc, IssueKind::ModelAttributesType, &msg, input);
        };
        let Value::Object(members) = input else {
            return self.fail(
                loc,
                IssueKind::ModelAttributesType,
                "Input should be a valid dictionary or object to extract fields from",
                input,
            );
        };

        let mut out = Map::with_capacity(def.fields.len());
        let mut ok = true;
        for field in &def.fields {
            loc.push(LocSegment::from(field.key()));
            match self.field(field, members.get(field.key()), loc) {
                Some(value) => {
                    out.insert(field.name.clone(), value);
                }
                None => ok = false,
            }
            loc.pop();
        }
        ok.then_some(Value::Object(out))
    }

    fn list(&mut self, item: &ParamType, input: &Value, loc: &mut Vec<LocSegment>) -> Option<Value> {
        let Value::Array(elements) = input else {
            return self.fail(loc, IssueKind::ListType, "Input should be a valid list", input);
        };
        let mut out = Vec::with_capacity(elements.len());
        let mut ok = true;
        for (idx, element) in elements.iter().enumerate() {
            loc.push(LocSegment::Index(idx));
            match self.value(item, element, loc) {
                Some(value) => out.push(value),
                None => ok = false,
            }
            loc.pop();
        }
        ok.then_some(Value::Array(out))
    }

    /// JSON object keys are strings; they are coerced through the key type and
    /// written back in canonical textual form (`"01"` becomes `"1"` for ints).
    fn dict(
        &mut self,
        key_ty: &ParamType,
        value_ty: &ParamType,
        input: &Value,
        loc: &mut Vec<LocSegment>,
    ) -> Option<Value> {
        let Value::Object(entries) = input else {
            return self.fail(loc, IssueKind::DictType, "Input should be a valid dictionary", input);
        };
        let mut out = Map::with_capacity(entries.len());
        let mut ok = true;
        for (raw_key, raw_value) in entries {
            loc.push(LocSegment::from(raw_key.as_str()));
            let key = self.value(key_ty, &Value::String(raw_key.clone()), loc);
            let value = self.value(value_ty, raw_value, loc);
            match (key, value) {
                (Some(key), Some(value)) => {
                    out.insert(key_text(key), value);
                }
                _ => ok = false,
            }
            loc.pop();
        }
        ok.then_some(Value::Object(out))
    }
}

/// `"false"`, `"0"` and `""` (any case) are false; every other string is true.
#[must_use]
pub fn parse_lax_bool(raw: &str) -> bool {
    !(raw.is_empty() || raw == "0" || raw.eq_ignore_ascii_case("false"))
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Coerce and validate a declared default once, at registration.
///
/// # Errors
///
/// The joined issue messages when the default does not satisfy the field's
/// own type or constraints.
pub fn coerce_default(field: &FieldMeta, types: &TypeRegistry) -> Result<Value, String> {
    let Some(default) = &field.default else {
        return Ok(Value::Null);
    };
    let mut coercer = Coercer::new(types);
    let mut loc = vec![LocSegment::from("default")];
    match coercer.checked(field, default, &mut loc) {
        Some(value) => Ok(value),
        None => Err(coercer
            .into_issues()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")),
    }
}
