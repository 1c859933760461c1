//! Outbound response builder.
//!
//! [`HttpResponse`] collects the status, headers, cookies and body an
//! application produces and serializes them into header lines through
//! [`Response::headers`]. Writing those lines to a connection is the host's
//! job.

mod http_response;
#[allow(clippy::module_inception, reason = "trait named after the module, as the request side")]
mod response;

pub mod status;

pub use http_response::{HTTP_VERSION, HttpResponse};
pub use response::Response;
