use super::error::RequestError;
use http::Method;
use std::collections::HashMap;
use tracing::debug;

/// Request data as seen by routing and binding.
///
/// Built from raw parts (method, request target, headers, body bytes) so any
/// HTTP front end can feed it. The path is kept percent-encoded; captures are
/// decoded by the matcher.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRequest {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    /// Query pairs in arrival order, duplicates preserved
    pub query: Vec<(String, String)>,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Parsed cookies from the Cookie header
    pub cookies: HashMap<String, String>,
    /// Raw body bytes, if any were sent
    pub body: Option<Vec<u8>>,
}

/// Split a `Cookie` header (`a=b; c=d`) into name/value pairs.
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .get("cookie")
        .map(|c| parse_cookie_header(c))
        .unwrap_or_default()
}

fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((name.to_string(), value))
        })
        .collect()
}

/// Parse the query string of a request target.
///
/// Everything after the first `?` is form-urlencoded; order and repeated keys
/// are preserved (`?q=foo&q=bar` yields two pairs).
pub fn parse_query_params(target: &str) -> Vec<(String, String)> {
    match target.split_once('?') {
        Some((_, query_str)) => url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

impl ParsedRequest {
    /// A request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let path = target
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            method,
            path,
            query: parse_query_params(target),
            ..Default::default()
        }
    }

    /// Build a request from what an HTTP front end hands over.
    ///
    /// # Errors
    ///
    /// [`RequestError::BadRequest`] when the method is not a valid token.
    pub fn from_parts<I, K, V>(
        method: &str,
        target: &str,
        headers: I,
        body: Option<Vec<u8>>,
    ) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| RequestError::BadRequest(format!("invalid method '{method}'")))?;
        let mut request = Self::new(method, target);
        for (name, value) in headers {
            request = request.with_header(name.as_ref(), value);
        }
        request.body = body;

        debug!(
            method = %request.method,
            path = %request.path,
            header_count = request.headers.len(),
            cookie_count = request.cookies.len(),
            param_count = request.query.len(),
            body_size_bytes = request.body.as_ref().map_or(0, Vec::len),
            "HTTP request parsed"
        );
        Ok(request)
    }

    /// Add a header; a `Cookie` header also refreshes the cookie map.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "cookie" {
            self.cookies.extend(parse_cookie_header(&value));
        }
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Last value sent for a query key.
    #[must_use]
    pub fn query_last(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value sent for a query key, in order.
    pub fn query_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}
