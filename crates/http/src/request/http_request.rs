use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::MissingMetadataError;
use crate::request::metadata::{self, header_key};
use crate::request::{Files, Parameters, Request, UploadedFile};

/// Headers consulted for the client address, most preferred first.
const IP_HEADERS: [&str; 2] = ["Client-Ip", "X-Forwarded-For"];

/// The request view built by the host once per inbound request.
///
/// All value sources are fixed at construction and never mutated. A view
/// belongs to exactly one request and must not be reused for another.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    query_parameters: Parameters,
    body_parameters: Parameters,
    cookies: Parameters,
    files: Files,
    metadata: HashMap<String, String>,
    raw_body: Bytes,
}

impl HttpRequest {
    /// Creates a view with an empty raw body. No validation is done, every
    /// map may be empty.
    pub fn new(
        query_parameters: Parameters,
        body_parameters: Parameters,
        cookies: Parameters,
        files: Files,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self { query_parameters, body_parameters, cookies, files, metadata, raw_body: Bytes::new() }
    }

    /// Attaches the unparsed request body.
    pub fn with_raw_body(mut self, raw_body: impl Into<Bytes>) -> Self {
        self.raw_body = raw_body.into();
        self
    }

    /// Returns the transport metadata variable `key`, if the host set it.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    fn require_metadata(&self, key: &str) -> Result<&str, MissingMetadataError> {
        self.metadata(key).ok_or_else(|| {
            trace!(key, "missing request meta variable");
            MissingMetadataError::new(key)
        })
    }
}

impl Request for HttpRequest {
    fn parameter(&self, key: &str) -> Option<&str> {
        self.body_parameter(key).or_else(|| self.query_parameter(key))
    }

    fn query_parameter(&self, key: &str) -> Option<&str> {
        self.query_parameters.get(key).map(String::as_str)
    }

    fn body_parameter(&self, key: &str) -> Option<&str> {
        self.body_parameters.get(key).map(String::as_str)
    }

    fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key)
    }

    fn cookie(&self, key: &str) -> Option<&str> {
        self.cookies.get(key).map(String::as_str)
    }

    fn parameters(&self) -> Parameters {
        let mut parameters = self.query_parameters.clone();
        parameters.extend(self.body_parameters.iter().map(|(key, value)| (key.clone(), value.clone())));
        parameters
    }

    fn query_parameters(&self) -> &Parameters {
        &self.query_parameters
    }

    fn body_parameters(&self) -> &Parameters {
        &self.body_parameters
    }

    fn cookies(&self) -> &Parameters {
        &self.cookies
    }

    fn files(&self) -> &Files {
        &self.files
    }

    fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    fn uri(&self) -> Result<&str, MissingMetadataError> {
        self.require_metadata(metadata::REQUEST_URI)
    }

    fn path(&self) -> Result<&str, MissingMetadataError> {
        let uri = self.uri()?;
        Ok(uri.split('?').next().unwrap_or(uri))
    }

    fn relative_path(&self) -> Result<&str, MissingMetadataError> {
        let script_name = self.require_metadata(metadata::SCRIPT_NAME)?;
        let prefix_len = script_dir(script_name).trim_end_matches('/').len();
        let path = self.path()?;

        // strips by length only, a path shorter than the prefix leaves nothing
        Ok(path.get(prefix_len..).unwrap_or(""))
    }

    fn method(&self) -> Result<&str, MissingMetadataError> {
        self.require_metadata(metadata::REQUEST_METHOD)
    }

    fn query_string(&self) -> Result<&str, MissingMetadataError> {
        self.require_metadata(metadata::QUERY_STRING)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.metadata(&header_key(name))
    }

    fn ip_address(&self) -> Result<&str, MissingMetadataError> {
        for name in IP_HEADERS {
            let Some(value) = self.header(name) else {
                continue;
            };

            if value.parse::<IpAddr>().is_ok() {
                debug!(header = name, ip = value, "resolved ip address from header");
                return Ok(value);
            }
            trace!(header = name, value, "header is not an ip address, skipped");
        }

        self.require_metadata(metadata::REMOTE_ADDR)
    }

    fn is_secure(&self) -> bool {
        if self.metadata(metadata::HTTPS).is_some_and(|https| https != metadata::HTTPS_OFF) {
            return true;
        }

        self.header("X-Forwarded-Proto") == Some("https")
    }
}

/// Directory part of a script path, `""` when the script sits at the root or
/// carries no directory at all.
fn script_dir(script_name: &str) -> &str {
    let trimmed = script_name.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(index) => trimmed[..index].trim_end_matches('/'),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn with_metadata(pairs: &[(&str, &str)]) -> HttpRequest {
        HttpRequest::new(Parameters::new(), Parameters::new(), Parameters::new(), Files::new(), map(pairs))
    }

    #[test]
    fn test_parameter() {
        let request = HttpRequest::new(
            map(&[("key1", "value1")]),
            map(&[("key2", "value2")]),
            Parameters::new(),
            Files::new(),
            HashMap::new(),
        );

        assert_eq!(request.parameter("key1"), Some("value1"));
        assert_eq!(request.parameter_or("key1", "defaultValue"), "value1");
        assert_eq!(request.parameter("key2"), Some("value2"));
        assert_eq!(request.parameter_or("key3", "defaultValue"), "defaultValue");
        assert_eq!(request.parameter("key3"), None);
    }

    #[test]
    fn test_parameter_prefers_body() {
        let request = HttpRequest::new(
            map(&[("page", "1"), ("sort", "asc")]),
            map(&[("page", "7")]),
            Parameters::new(),
            Files::new(),
            HashMap::new(),
        );

        assert_eq!(request.parameter("page"), Some("7"));
        assert_eq!(request.parameter("sort"), Some("asc"));
        assert_eq!(request.query_parameter("page"), Some("1"));
    }

    #[test]
    fn test_query_parameter() {
        let request =
            HttpRequest::new(map(&[("key1", "value1")]), Parameters::new(), Parameters::new(), Files::new(), HashMap::new());

        assert_eq!(request.query_parameter("key1"), Some("value1"));
        assert_eq!(request.query_parameter_or("key1", "defaultValue"), "value1");
        assert_eq!(request.query_parameter_or("key3", "defaultValue"), "defaultValue");
        assert_eq!(request.query_parameter("key3"), None);
        assert_eq!(request.body_parameter("key1"), None);
    }

    #[test]
    fn test_body_parameter() {
        let request =
            HttpRequest::new(Parameters::new(), map(&[("key1", "value1")]), Parameters::new(), Files::new(), HashMap::new());

        assert_eq!(request.body_parameter("key1"), Some("value1"));
        assert_eq!(request.body_parameter_or("key1", "defaultValue"), "value1");
        assert_eq!(request.body_parameter_or("key3", "defaultValue"), "defaultValue");
        assert_eq!(request.body_parameter("key3"), None);
        assert_eq!(request.query_parameter("key1"), None);
    }

    #[test]
    fn test_parameters_overlay_body_on_query() {
        let request = HttpRequest::new(
            map(&[("a", "query"), ("b", "query")]),
            map(&[("b", "body"), ("c", "body")]),
            Parameters::new(),
            Files::new(),
            HashMap::new(),
        );

        assert_eq!(request.parameters(), map(&[("a", "query"), ("b", "body"), ("c", "body")]));
        assert_eq!(request.query_parameters(), &map(&[("a", "query"), ("b", "query")]));
        assert_eq!(request.body_parameters(), &map(&[("b", "body"), ("c", "body")]));
    }

    #[test]
    fn test_parameters_only_query() {
        let query = map(&[("key1", "value1")]);
        let request = HttpRequest::new(query.clone(), Parameters::new(), Parameters::new(), Files::new(), HashMap::new());

        assert_eq!(request.parameters(), query);
    }

    #[test]
    fn test_raw_body() {
        let body = "{'key1' => 'value1'}";
        let request = with_metadata(&[]).with_raw_body(body);

        assert_eq!(request.raw_body().as_ref(), body.as_bytes());
        assert!(with_metadata(&[]).raw_body().is_empty());
    }

    #[test]
    fn test_cookie() {
        let cookies = map(&[("key1", "value1"), ("key2", "value2")]);
        let request = HttpRequest::new(Parameters::new(), Parameters::new(), cookies.clone(), Files::new(), HashMap::new());

        assert_eq!(request.cookie("key1"), Some("value1"));
        assert_eq!(request.cookie_or("key1", "defaultValue"), "value1");
        assert_eq!(request.cookie("key2"), Some("value2"));
        assert_eq!(request.cookie_or("key3", "defaultValue"), "defaultValue");
        assert_eq!(request.cookie("key3"), None);
        assert_eq!(request.cookies(), &cookies);
    }

    #[test]
    fn test_file() {
        let avatar = UploadedFile::new("me.png", "/tmp/upload-1", 2048).with_content_type("image/png");
        let files: Files = [("avatar".to_string(), avatar.clone())].into_iter().collect();
        let request = HttpRequest::new(Parameters::new(), Parameters::new(), Parameters::new(), files.clone(), HashMap::new());

        let fallback = UploadedFile::default();
        assert_eq!(request.file("avatar"), Some(&avatar));
        assert_eq!(request.file_or("avatar", &fallback), &avatar);
        assert_eq!(request.file_or("missing", &fallback), &fallback);
        assert_eq!(request.file("missing"), None);
        assert_eq!(request.files(), &files);
    }

    #[test]
    fn test_method() {
        let request = with_metadata(&[("REQUEST_METHOD", "POST")]);
        assert_eq!(request.method(), Ok("POST"));
    }

    #[test]
    fn test_missing_metadata() {
        let request = with_metadata(&[]);

        assert_eq!(request.method(), Err(MissingMetadataError::new("REQUEST_METHOD")));
        assert_eq!(request.uri(), Err(MissingMetadataError::new("REQUEST_URI")));
        assert_eq!(request.path(), Err(MissingMetadataError::new("REQUEST_URI")));
        assert_eq!(request.query_string(), Err(MissingMetadataError::new("QUERY_STRING")));
        assert_eq!(request.relative_path(), Err(MissingMetadataError::new("SCRIPT_NAME")));
    }

    #[test]
    fn test_header() {
        let request = with_metadata(&[("HTTP_HOST", "example.com"), ("HTTP_X_REQUEST_ID", "abc")]);

        assert_eq!(request.header("Host"), Some("example.com"));
        assert_eq!(request.header("host"), Some("example.com"));
        assert_eq!(request.header("x-request-id"), Some("abc"));
        assert_eq!(request.header("Unknown"), None);
    }

    #[test]
    fn test_uri_and_path() {
        let request = with_metadata(&[("REQUEST_URI", "/test?abc=def")]);
        assert_eq!(request.uri(), Ok("/test?abc=def"));
        assert_eq!(request.path(), Ok("/test"));

        let request = with_metadata(&[("REQUEST_URI", "/test")]);
        assert_eq!(request.uri(), Ok("/test"));
        assert_eq!(request.path(), Ok("/test"));
    }

    #[test]
    fn test_relative_path() {
        let request =
            with_metadata(&[("REQUEST_URI", "/path/to/myapp/imprint"), ("SCRIPT_NAME", "/path/to/myapp/app")]);
        assert_eq!(request.relative_path(), Ok("/imprint"));
    }

    #[test]
    fn test_relative_path_for_root() {
        let request = with_metadata(&[("REQUEST_URI", "/imprint"), ("SCRIPT_NAME", "/app")]);
        assert_eq!(request.relative_path(), Ok("/imprint"));
    }

    #[test]
    fn test_relative_path_drops_query() {
        let request = with_metadata(&[("REQUEST_URI", "/shop/cart?item=3"), ("SCRIPT_NAME", "/shop/index")]);
        assert_eq!(request.relative_path(), Ok("/cart"));
    }

    #[test]
    fn test_relative_path_without_directory() {
        let request = with_metadata(&[("REQUEST_URI", "/imprint"), ("SCRIPT_NAME", "app")]);
        assert_eq!(request.relative_path(), Ok("/imprint"));

        let request = with_metadata(&[("REQUEST_URI", "/a"), ("SCRIPT_NAME", "/very/long/dir/app")]);
        assert_eq!(request.relative_path(), Ok(""));
    }

    #[test]
    fn test_script_dir() {
        assert_eq!(script_dir("/path/to/myapp/app"), "/path/to/myapp");
        assert_eq!(script_dir("/path/to/myapp/"), "/path/to");
        assert_eq!(script_dir("/app"), "");
        assert_eq!(script_dir("/"), "");
        assert_eq!(script_dir("app"), "");
        assert_eq!(script_dir(""), "");
    }

    #[test]
    fn test_http_accept() {
        let request = with_metadata(&[("HTTP_ACCEPT", "audio/*; q=0.2, audio/basic")]);
        assert_eq!(request.http_accept(), Some("audio/*; q=0.2, audio/basic"));
    }

    #[test]
    fn test_referer() {
        let request = with_metadata(&[("HTTP_REFERER", "http://www.example.com/abc?s=a&b=c")]);
        assert_eq!(request.referer(), Some("http://www.example.com/abc?s=a&b=c"));

        let request = with_metadata(&[("HTTP_REFERRER", "http://www.example.com/")]);
        assert_eq!(request.referer(), Some("http://www.example.com/"));

        let request =
            with_metadata(&[("HTTP_REFERER", "http://legacy.example.com/"), ("HTTP_REFERRER", "http://www.example.com/")]);
        assert_eq!(request.referer(), Some("http://legacy.example.com/"));

        assert_eq!(with_metadata(&[]).referer(), None);
    }

    #[test]
    fn test_user_agent() {
        let agent = "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:30.0) Gecko/20100101 Firefox/30.0";
        let request = with_metadata(&[("HTTP_USER_AGENT", agent)]);
        assert_eq!(request.user_agent(), Some(agent));
    }

    #[test]
    fn test_ip_address() {
        let request = with_metadata(&[("REMOTE_ADDR", "127.0.0.1")]);
        assert_eq!(request.ip_address(), Ok("127.0.0.1"));
    }

    #[test]
    fn test_ip_address_from_x_forwarded_for() {
        let request = with_metadata(&[("REMOTE_ADDR", "127.0.0.1"), ("HTTP_X_FORWARDED_FOR", "8.8.8.8")]);
        assert_eq!(request.ip_address(), Ok("8.8.8.8"));
    }

    #[test]
    fn test_ip_address_from_client_ip() {
        let request = with_metadata(&[
            ("REMOTE_ADDR", "127.0.0.1"),
            ("HTTP_CLIENT_IP", "2001:db8::1"),
            ("HTTP_X_FORWARDED_FOR", "8.8.8.8"),
        ]);
        assert_eq!(request.ip_address(), Ok("2001:db8::1"));
    }

    #[test]
    fn test_ip_address_skips_invalid_headers() {
        let request = with_metadata(&[
            ("REMOTE_ADDR", "127.0.0.1"),
            ("HTTP_CLIENT_IP", "unknown"),
            ("HTTP_X_FORWARDED_FOR", "8.8.8.8, 10.0.0.1"),
        ]);
        assert_eq!(request.ip_address(), Ok("127.0.0.1"));

        let request = with_metadata(&[("HTTP_CLIENT_IP", "not-an-ip"), ("HTTP_X_FORWARDED_FOR", "10.0.0.1")]);
        assert_eq!(request.ip_address(), Ok("10.0.0.1"));
    }

    #[test]
    fn test_ip_address_missing() {
        let request = with_metadata(&[]);
        assert_eq!(request.ip_address(), Err(MissingMetadataError::new("REMOTE_ADDR")));
    }

    #[test]
    fn test_is_secure() {
        assert!(!with_metadata(&[]).is_secure());
        assert!(!with_metadata(&[("HTTPS", "off")]).is_secure());
        assert!(!with_metadata(&[("HTTPS", "off"), ("HTTP_X_FORWARDED_PROTO", "http")]).is_secure());
        assert!(with_metadata(&[("HTTPS", "on")]).is_secure());
        assert!(with_metadata(&[("HTTPS", "off"), ("HTTP_X_FORWARDED_PROTO", "https")]).is_secure());
        assert!(with_metadata(&[("HTTP_X_FORWARDED_PROTO", "https")]).is_secure());
        assert!(!with_metadata(&[("HTTP_X_FORWARDED_PROTO", "HTTPS")]).is_secure());
    }

    #[test]
    fn test_is_secure_with_empty_https_flag() {
        assert!(with_metadata(&[("HTTPS", "")]).is_secure());
        assert_eq!(with_metadata(&[("HTTPS", "")]).scheme(), "https");
    }

    #[test]
    fn test_scheme() {
        assert_eq!(with_metadata(&[("HTTPS", "on")]).scheme(), "https");
        assert_eq!(with_metadata(&[("HTTPS", "off")]).scheme(), "http");
    }

    #[test]
    fn test_query_string() {
        let request = with_metadata(&[("QUERY_STRING", "name=ferret&color=purple")]);
        assert_eq!(request.query_string(), Ok("name=ferret&color=purple"));
    }
}
