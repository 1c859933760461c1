//! Cookies sent back to the client.
//!
//! The response builder treats a cookie as opaque: it needs its name to key
//! it, two setters to expire it, and the encoded `Set-Cookie` value.
//! [`SetCookie`] is the stock implementation.

use std::fmt;

/// Contract between the response builder and a cookie implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Cookie {
    fn name(&self) -> &str;

    fn set_value(&mut self, value: String);

    /// Lifetime in seconds, zero or negative expires the cookie immediately.
    fn set_max_age(&mut self, max_age: i64);

    /// The value of a `Set-Cookie` header carrying this cookie and all its
    /// attributes.
    fn header_string(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// A cookie rendered as `name=value` followed by its attributes.
///
/// Values and attributes are written as given, encoding them is left to the
/// caller. `HttpOnly` is on unless disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    max_age: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

impl Cookie for SetCookie {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
    }

    fn set_max_age(&mut self, max_age: i64) {
        self.max_age = Some(max_age);
    }

    fn header_string(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={max_age}"));
        }
        if let Some(domain) = &self.domain {
            parts.push(format!("Domain={domain}"));
        }
        if let Some(path) = &self.path {
            parts.push(format!("Path={path}"));
        }
        if self.secure {
            parts.push("Secure".to_owned());
        }
        if self.http_only {
            parts.push("HttpOnly".to_owned());
        }
        if let Some(same_site) = self.same_site {
            parts.push(format!("SameSite={same_site}"));
        }

        parts.join("; ")
    }
}
