//! A small host serving `micro-exchange` applications over HTTP/1.x.
//!
//! The host owns everything around the request view and response builder:
//! it reads requests off TCP connections, derives the transport metadata and
//! value sources the view is built from, runs the application's [`Handler`]
//! and writes the finished response back.
//!
//! # Example
//!
//! ```no_run
//! use micro_exchange::request::{HttpRequest, Request};
//! use micro_exchange::response::{HttpResponse, Response};
//! use micro_exchange_web::Server;
//!
//! fn hello(request: &HttpRequest, response: &mut HttpResponse) {
//!     response.set_header("Content-Type", "text/plain; charset=utf-8");
//!     response.set_content(format!("hello {}\r\n", request.parameter_or("name", "world")));
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder().address("127.0.0.1:3000").handler(hello).build().unwrap().start().await;
//! }
//! ```
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only, no TLS (use a reverse proxy for HTTPS)
//! - Request bodies need a `Content-Length`, chunked uploads are rejected
//! - Only form-encoded bodies become body parameters, multipart is not parsed

pub mod codec;
pub mod environment;
pub mod params;

mod error;
mod handler;
mod server;
mod utils;

pub use environment::{ConnectionInfo, build_request};
pub use error::{HttpError, ParseError, SendError};
pub use handler::Handler;
pub use server::{Server, ServerBuildError, ServerBuilder, serve_connection};
