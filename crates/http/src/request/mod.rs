//! Inbound request view.
//!
//! [`HttpRequest`] wraps the per-request data the host collected (query and
//! body parameters, cookies, uploaded files, transport metadata and the raw
//! body) and derives path, scheme, client address and headers from it. The
//! [`Request`] trait is the contract applications code against.

mod file;
mod http_request;
#[allow(clippy::module_inception, reason = "trait named after the module, as the response side")]
mod request;

pub mod metadata;

use std::collections::HashMap;

pub use file::UploadedFile;
pub use http_request::HttpRequest;
pub use request::Request;

/// String-keyed values such as parameters and cookies.
pub type Parameters = HashMap<String, String>;

/// Uploaded files keyed by form field name.
pub type Files = HashMap<String, UploadedFile>;
