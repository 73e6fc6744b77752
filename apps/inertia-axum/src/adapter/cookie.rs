//! # Cookies
//!
//! Just enough cookie handling for the clear-history flag and the session id:
//! parsing the request `Cookie` header and serializing `Set-Cookie` values.

use axum::http::{HeaderMap, HeaderValue, header};
use std::collections::BTreeMap;

/// Parse every `Cookie` header into name → value.
///
/// HTTP/2 clients may split cookies across several headers, so all of them
/// are read. Later duplicates win.
pub fn parse_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for raw in headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
    {
        for part in raw.split(';') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, value) = trimmed
                .split_once('=')
                .map(|(n, v)| (n.trim(), v.trim()))
                .unwrap_or((trimmed, ""));
            if !name.is_empty() {
                out.insert(name.to_string(), value.to_string());
            }
        }
    }
    out
}

/// Value of a single request cookie.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    parse_cookies(headers).remove(name)
}

// =============================================================================
// SET-COOKIE
// =============================================================================

/// A `Set-Cookie` header under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    path: Option<String>,
    http_only: bool,
    same_site: Option<&'static str>,
    max_age: Option<i64>,
}

impl SetCookie {
    /// A session cookie with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            http_only: false,
            same_site: None,
            max_age: None,
        }
    }

    /// A cookie that tells the browser to drop `name` right away.
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").max_age(0)
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    #[must_use]
    pub fn same_site_lax(mut self) -> Self {
        self.same_site = Some("Lax");
        self
    }

    #[must_use]
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Serialize to the header line value.
    pub fn to_header_string(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str(&format!("; Path={}", path));
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if let Some(same_site) = self.same_site {
            out.push_str(&format!("; SameSite={}", same_site));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }

    /// Serialize to a header value; `None` if the name or value holds bytes
    /// a header cannot carry.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.to_header_string()).ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b = 2"));
        headers.append(header::COOKIE, HeaderValue::from_static("c=3;;flag"));

        let cookies = parse_cookies(&headers);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
        assert_eq!(cookies["c"], "3");
        assert_eq!(cookies["flag"], "");
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn serializes_attributes() {
        let cookie = SetCookie::new("inertia_clear_history", "true")
            .path("/")
            .http_only();
        assert_eq!(
            cookie.to_header_string(),
            "inertia_clear_history=true; Path=/; HttpOnly"
        );
    }

    #[test]
    fn removal_expires_immediately() {
        let cookie = SetCookie::removal("sid").path("/").http_only();
        assert_eq!(cookie.to_header_string(), "sid=; Path=/; Max-Age=0; HttpOnly");
    }

    #[test]
    fn rejects_unencodable_values() {
        assert!(SetCookie::new("bad", "line\nbreak").to_header_value().is_none());
    }
}
