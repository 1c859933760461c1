//! Transport metadata key conventions.
//!
//! The host describes every request as a flat map of string keys in the CGI
//! tradition. Headers are surfaced under [`HEADER_PREFIX`] followed by the
//! upper-cased header name with dashes turned into underscores, e.g.
//! `X-Forwarded-For` becomes `HTTP_X_FORWARDED_FOR`.

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const REQUEST_URI: &str = "REQUEST_URI";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
pub const REMOTE_PORT: &str = "REMOTE_PORT";
pub const HTTPS: &str = "HTTPS";
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";

/// Prefix shared by every header key.
pub const HEADER_PREFIX: &str = "HTTP_";

/// Value of [`HTTPS`] that explicitly marks TLS as inactive.
pub const HTTPS_OFF: &str = "off";

/// Builds the metadata key a header named `name` is stored under.
pub fn header_key(name: &str) -> String {
    let mut key = String::with_capacity(HEADER_PREFIX.len() + name.len());
    key.push_str(HEADER_PREFIX);
    key.extend(name.chars().map(|c| match c {
        '-' => '_',
        c => c.to_ascii_uppercase(),
    }));
    key
}
