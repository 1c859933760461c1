//! Request and response abstractions for applications served by a host web
//! server.
//!
//! The host collects everything it knows about an inbound request (query and
//! body parameters, cookies, uploaded files, the raw body and a flat map of
//! transport metadata in the CGI tradition) and wraps it in a
//! [`request::HttpRequest`]. The application reads from that view, writes into
//! a fresh [`response::HttpResponse`], and the host serializes the builder's
//! header lines and content onto the connection.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use micro_exchange::request::{HttpRequest, Request};
//! use micro_exchange::response::{HttpResponse, Response};
//!
//! let metadata: HashMap<String, String> = [
//!     ("REQUEST_METHOD", "GET"),
//!     ("REQUEST_URI", "/hello?name=world"),
//!     ("REMOTE_ADDR", "127.0.0.1"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_owned(), v.to_owned()))
//! .collect();
//! let query = HashMap::from([("name".to_owned(), "world".to_owned())]);
//!
//! let request = HttpRequest::new(query, HashMap::new(), HashMap::new(), HashMap::new(), metadata);
//! let mut response = HttpResponse::new();
//!
//! response.set_header("Content-Type", "text/plain");
//! response.set_content(format!("hello {}", request.parameter_or("name", "stranger")));
//!
//! assert_eq!(request.path().unwrap(), "/hello");
//! assert_eq!(response.headers(), vec!["HTTP/1.1 200 OK", "Content-Type: text/plain"]);
//! ```
//!
//! # Architecture
//!
//! - [`request`]: the read-only inbound view and its metadata key conventions
//! - [`response`]: the outbound builder and the canonical status phrase table
//! - [`cookie`]: the contract the builder uses to emit `Set-Cookie` lines
//! - [`error`]: [`error::MissingMetadataError`], the only failure in this crate
//!
//! # Trusting client headers
//!
//! [`request::Request::ip_address`] and [`request::Request::is_secure`] honor
//! `Client-Ip`, `X-Forwarded-For` and `X-Forwarded-Proto` ahead of what the
//! transport reports. That is what a deployment behind a proxy expects, but a
//! server exposed directly to clients must not rely on either answer.

pub mod cookie;
pub mod error;
pub mod request;
pub mod response;
