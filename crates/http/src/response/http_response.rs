use std::fmt;

use tracing::{debug, trace};

use crate::cookie::Cookie;
use crate::response::{Response, status};

/// Protocol version written in the status line.
pub const HTTP_VERSION: &str = "1.1";

/// Max-age given to deleted cookies so the client drops them at once.
const EXPIRED_MAX_AGE: i64 = -1;

/// The response builder handed to application code once per request.
///
/// Header names are kept exactly as given and matched case-sensitively;
/// serialization follows the order in which names were first added.
pub struct HttpResponse {
    status_code: u16,
    status_text: String,
    headers: Vec<(String, Vec<String>)>,
    cookies: Vec<Box<dyn Cookie + Send>>,
    content: String,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values stored for the header `name`.
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.iter().find(|(header_name, _)| header_name == name).map(|(_, values)| values.as_slice())
    }

    /// Names of all headers, in serialization order.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }

    fn status_line(&self) -> String {
        let line = format!("HTTP/{HTTP_VERSION} {} {}", self.status_code, self.status_text);
        line.trim_end().to_owned()
    }

    fn header_values_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.headers.iter_mut().find(|(header_name, _)| header_name == name).map(|(_, values)| values)
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            status_text: "OK".to_owned(),
            headers: Vec::new(),
            cookies: Vec::new(),
            content: String::new(),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status_code", &self.status_code)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .field("cookies", &self.cookies.iter().map(|cookie| cookie.name()).collect::<Vec<_>>())
            .field("content_len", &self.content.len())
            .finish()
    }
}

impl Response for HttpResponse {
    fn set_status_code(&mut self, status_code: u16) {
        let status_text = status::canonical_reason(status_code).unwrap_or_else(|| {
            debug!(status_code, "no canonical reason phrase, using an empty one");
            ""
        });
        self.set_status_code_with_text(status_code, status_text);
    }

    fn set_status_code_with_text(&mut self, status_code: u16, status_text: &str) {
        self.status_code = status_code;
        self.status_text = status_text.to_owned();
    }

    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    fn add_header(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.header_values_mut(name) {
            Some(values) => values.push(value),
            None => self.headers.push((name.to_owned(), vec![value])),
        }
    }

    fn set_header(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.header_values_mut(name) {
            Some(values) => *values = vec![value],
            None => self.headers.push((name.to_owned(), vec![value])),
        }
    }

    fn headers(&self) -> Vec<String> {
        let value_count: usize = self.headers.iter().map(|(_, values)| values.len()).sum();
        let mut lines = Vec::with_capacity(1 + value_count + self.cookies.len());

        lines.push(self.status_line());
        for (name, values) in &self.headers {
            lines.extend(values.iter().map(|value| format!("{name}: {value}")));
        }
        lines.extend(self.cookies.iter().map(|cookie| format!("Set-Cookie: {}", cookie.header_string())));

        lines
    }

    fn add_cookie<C>(&mut self, cookie: C)
    where
        C: Cookie + Send + 'static,
    {
        match self.cookies.iter_mut().find(|stored| stored.name() == cookie.name()) {
            Some(stored) => {
                trace!(name = cookie.name(), "replacing cookie");
                *stored = Box::new(cookie);
            }
            None => self.cookies.push(Box::new(cookie)),
        }
    }

    fn delete_cookie<C>(&mut self, mut cookie: C)
    where
        C: Cookie + Send + 'static,
    {
        cookie.set_value(String::new());
        cookie.set_max_age(EXPIRED_MAX_AGE);
        self.add_cookie(cookie);
    }

    fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn redirect(&mut self, url: &str, permanent: bool) {
        self.set_header("Location", url);
        self.set_status_code(if permanent { 301 } else { 302 });
    }
}
