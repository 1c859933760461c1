use crate::error::MissingMetadataError;
use crate::request::{Files, Parameters, UploadedFile};
use bytes::Bytes;

/// Read-only view over one inbound request.
///
/// Lookups of application values (parameters, cookies, files) never fail: a
/// missing key yields `None`, or the supplied default for the `*_or`
/// variants. Accessors derived from transport metadata return
/// [`MissingMetadataError`] when the host did not provide the variable they
/// need, except header lookups which treat a missing header as `None`.
pub trait Request {
    /// Returns the body parameter named `key`, falling back to the query
    /// parameter of the same name.
    fn parameter(&self, key: &str) -> Option<&str>;

    fn query_parameter(&self, key: &str) -> Option<&str>;

    fn body_parameter(&self, key: &str) -> Option<&str>;

    fn file(&self, key: &str) -> Option<&UploadedFile>;

    fn cookie(&self, key: &str) -> Option<&str>;

    fn parameter_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.parameter(key).unwrap_or(default)
    }

    fn query_parameter_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.query_parameter(key).unwrap_or(default)
    }

    fn body_parameter_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.body_parameter(key).unwrap_or(default)
    }

    fn file_or<'a>(&'a self, key: &str, default: &'a UploadedFile) -> &'a UploadedFile {
        self.file(key).unwrap_or(default)
    }

    fn cookie_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.cookie(key).unwrap_or(default)
    }

    /// Query parameters overlaid by body parameters, the body wins on a
    /// shared key.
    fn parameters(&self) -> Parameters;

    fn query_parameters(&self) -> &Parameters;

    fn body_parameters(&self) -> &Parameters;

    fn cookies(&self) -> &Parameters;

    fn files(&self) -> &Files;

    /// The request body exactly as the host read it.
    fn raw_body(&self) -> &Bytes;

    /// The URI which was given in order to access this page, query included.
    fn uri(&self) -> Result<&str, MissingMetadataError>;

    /// The URI without its query string.
    fn path(&self) -> Result<&str, MissingMetadataError>;

    /// The path with the directory of the executing script stripped, so an
    /// application mounted below `/path/to/app/` sees `/imprint` for
    /// `/path/to/app/imprint`.
    fn relative_path(&self) -> Result<&str, MissingMetadataError>;

    /// Request method, i.e. `GET`, `HEAD`, `POST`, `PUT`.
    fn method(&self) -> Result<&str, MissingMetadataError>;

    fn query_string(&self) -> Result<&str, MissingMetadataError>;

    /// Looks up a request header by its wire name, case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    fn http_accept(&self) -> Option<&str> {
        self.header("Accept")
    }

    /// The page which referred the user agent here. The legacy `Referer`
    /// spelling is tried first, then `Referrer`.
    fn referer(&self) -> Option<&str> {
        self.header("Referer").filter(|value| !value.is_empty()).or_else(|| self.header("Referrer"))
    }

    fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    /// Client address, taken from `Client-Ip`, then `X-Forwarded-For`, then
    /// the transport's remote address.
    ///
    /// The two headers are client-controlled and only trustworthy behind a
    /// proxy that overwrites them.
    fn ip_address(&self) -> Result<&str, MissingMetadataError>;

    /// Whether the request arrived over TLS, directly or as reported by a
    /// proxy through `X-Forwarded-Proto`.
    fn is_secure(&self) -> bool;

    fn scheme(&self) -> &'static str {
        if self.is_secure() { "https" } else { "http" }
    }
}
