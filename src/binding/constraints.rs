use crate::spec::{Constraints, ParamType};
use crate::validator::{IssueKind, LocSegment, ValidationIssue};
use serde_json::{json, Value};

/// Check numeric bounds, lengths and pattern against an already coerced
/// value. Every violated constraint yields its own issue.
pub(crate) fn check_constraints(
    value: &Value,
    ty: &ParamType,
    constraints: &Constraints,
    input: &Value,
    loc: &[LocSegment],
    issues: &mut Vec<ValidationIssue>,
) {
    if value.is_null() || constraints.is_empty() {
        return;
    }
    let mut push = |kind: IssueKind, msg: String, ctx: Value| {
        issues.push(ValidationIssue::new(loc.to_vec(), kind, msg, input.clone()).with_ctx(ctx));
    };

    if ty.is_numeric() {
        if let Some(n) = value.as_f64() {
            if let Some(gt) = constraints.gt.filter(|gt| n <= *gt) {
                push(
                    IssueKind::GreaterThan,
                    format!("Input should be greater than {gt}"),
                    json!({ "gt": gt }),
                );
            }
            if let Some(ge) = constraints.ge.filter(|ge| n < *ge) {
                push(
                    IssueKind::GreaterThanEqual,
                    format!("Input should be greater than or equal to {ge}"),
                    json!({ "ge": ge }),
                );
            }
            if let Some(lt) = constraints.lt.filter(|lt| n >= *lt) {
                push(
                    IssueKind::LessThan,
                    format!("Input should be less than {lt}"),
                    json!({ "lt": lt }),
                );
            }
            if let Some(le) = constraints.le.filter(|le| n > *le) {
                push(
                    IssueKind::LessThanEqual,
                    format!("Input should be less than or equal to {le}"),
                    json!({ "le": le }),
                );
            }
        }
    }

    let (len, noun, too_short, too_long) = match value {
        Value::String(s) => (
            s.chars().count(),
            "character",
            IssueKind::StringTooShort,
            IssueKind::StringTooLong,
        ),
        Value::Array(items) => (items.len(), "item", IssueKind::TooShort, IssueKind::TooLong),
        _ => return,
    };
    let subject = if matches!(value, Value::String(_)) { "String" } else { "List" };
    if let Some(min) = constraints.min_length.filter(|min| len < *min) {
        push(
            too_short,
            format!("{subject} should have at least {min} {noun}{}", plural(min)),
            json!({ "min_length": min }),
        );
    }
    if let Some(max) = constraints.max_length.filter(|max| len > *max) {
        push(
            too_long,
            format!("{subject} should have at most {max} {noun}{}", plural(max)),
            json!({ "max_length": max }),
        );
    }

    if let (Some(pattern), Value::String(s)) = (&constraints.pattern, value) {
        if !pattern.is_match(s) {
            push(
                IssueKind::StringPatternMismatch,
                format!("String should match pattern '{}'", pattern.as_str()),
                json!({ "pattern": pattern.as_str() }),
            );
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
