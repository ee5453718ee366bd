use super::core::ParamVec;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

/// Why a path template was rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template must start with '/'")]
    MissingLeadingSlash,
    #[error("segment '{0}' mixes literal text and a placeholder")]
    PartialPlaceholder(String),
    #[error("placeholder '{0}' has an invalid name")]
    InvalidName(String),
    #[error("placeholder '{0}' uses unknown converter '{1}'")]
    UnknownConverter(String, String),
    #[error("placeholder '{0}' appears more than once")]
    DuplicateName(String),
    #[error("rest-of-path placeholder '{0}' must be the last segment")]
    RestNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment byte for byte.
    Literal(String),
    /// `{name}`: any single non-empty segment.
    Param(Arc<str>),
    /// `{name:path}` or `{name*}`: the non-empty remainder, slashes included.
    Rest(Arc<str>),
}

/// A parsed route path such as `/users/{user_id}/items/{item_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    ///
    /// `/` is the root template; a trailing slash is a literal empty segment,
    /// so `/query-item/` and `/query-item` are different templates.
    ///
    /// # Errors
    ///
    /// See [`TemplateError`].
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let body = raw
            .strip_prefix('/')
            .ok_or(TemplateError::MissingLeadingSlash)?;
        if body.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let parts: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();
        for (idx, part) in parts.iter().enumerate() {
            let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
                if part.contains(['{', '}']) {
                    return Err(TemplateError::PartialPlaceholder((*part).to_string()));
                }
                segments.push(Segment::Literal((*part).to_string()));
                continue;
            };

            let (name, rest) = if let Some(name) = inner.strip_suffix('*') {
                (name, true)
            } else if let Some((name, converter)) = inner.split_once(':') {
                if converter != "path" {
                    return Err(TemplateError::UnknownConverter(
                        name.to_string(),
                        converter.to_string(),
                    ));
                }
                (name, true)
            } else {
                (inner, false)
            };

            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !name.starts_with(|c: char| c.is_ascii_digit());
            if !valid {
                return Err(TemplateError::InvalidName(inner.to_string()));
            }
            if names.contains(&name) {
                return Err(TemplateError::DuplicateName(name.to_string()));
            }
            names.push(name);

            if rest {
                if idx + 1 != parts.len() {
                    return Err(TemplateError::RestNotLast(name.to_string()));
                }
                segments.push(Segment::Rest(Arc::from(name)));
            } else {
                segments.push(Segment::Param(Arc::from(name)));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Rest(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }

    /// True when the template has no placeholders.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Structural match of a request path (no query string).
    ///
    /// Returns the captured, percent-decoded placeholder values in template
    /// order, or `None` when the path does not fit. A failed match never
    /// leaks partial captures.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamVec> {
        let mut rest = path.strip_prefix('/')?;
        if self.segments.is_empty() {
            return rest.is_empty().then(ParamVec::new);
        }

        let mut params = ParamVec::new();
        let last = self.segments.len() - 1;
        for (idx, segment) in self.segments.iter().enumerate() {
            if let Segment::Rest(name) = segment {
                if rest.is_empty() {
                    return None;
                }
                params.push((Arc::clone(name), decode(rest)));
                return Some(params);
            }

            let (part, tail) = match rest.split_once('/') {
                Some((part, tail)) => (part, Some(tail)),
                None => (rest, None),
            };
            match segment {
                Segment::Literal(literal) if part != literal.as_str() => return None,
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), decode(part)));
                }
                _ => {}
            }

            match tail {
                Some(tail) => rest = tail,
                None if idx == last => return Some(params),
                None => return None,
            }
        }

        // Template exhausted while the path still has segments left.
        None
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .unwrap_or(Cow::Borrowed(raw))
        .into_owned()
}
