//! Transport metadata of one request and assembly of the request view.
//!
//! The metadata map follows the CGI naming the request view expects, see
//! `micro_exchange::request::metadata`. Header names containing `_` are
//! dropped, they would share a key with the same name spelled with `-`.

use std::collections::HashMap;
use std::net::SocketAddr;

use http::header;
use http::request::Parts;
use micro_exchange::request::metadata::{self, header_key};
use micro_exchange::request::{Files, HttpRequest};
use tracing::{debug, warn};

use crate::codec::RawRequest;
use crate::error::ParseError;
use crate::params;

/// What the host knows about the connection a request arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    remote_addr: SocketAddr,
    secure: bool,
    script_name: String,
}

impl ConnectionInfo {
    pub fn new(remote_addr: SocketAddr, secure: bool, script_name: impl Into<String>) -> Self {
        Self { remote_addr, secure, script_name: script_name.into() }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Whether the connection itself is TLS protected.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Path of the entry point the application is mounted under.
    pub fn script_name(&self) -> &str {
        &self.script_name
    }
}

/// Builds the transport metadata map for a request head.
pub fn transport_metadata(head: &Parts, connection: &ConnectionInfo) -> HashMap<String, String> {
    let mut variables = HashMap::with_capacity(head.headers.keys_len() + 10);

    let request_uri = head.uri.path_and_query().map_or("/", |path_and_query| path_and_query.as_str());
    variables.insert(metadata::REQUEST_METHOD.to_owned(), head.method.as_str().to_owned());
    variables.insert(metadata::REQUEST_URI.to_owned(), request_uri.to_owned());
    variables.insert(metadata::QUERY_STRING.to_owned(), head.uri.query().unwrap_or_default().to_owned());
    variables.insert(metadata::SERVER_PROTOCOL.to_owned(), format!("{:?}", head.version));
    variables.insert(metadata::REMOTE_ADDR.to_owned(), connection.remote_addr.ip().to_string());
    variables.insert(metadata::REMOTE_PORT.to_owned(), connection.remote_addr.port().to_string());
    variables.insert(metadata::SCRIPT_NAME.to_owned(), connection.script_name.clone());
    if connection.secure {
        variables.insert(metadata::HTTPS.to_owned(), "on".to_owned());
    }

    for name in head.headers.keys() {
        if name.as_str().contains('_') {
            debug!(header = %name, "skipping header whose name contains an underscore");
            continue;
        }

        let mut values = Vec::new();
        for value in head.headers.get_all(name) {
            match value.to_str() {
                Ok(value) => values.push(value),
                Err(e) => warn!(header = %name, cause = %e, "skipping header value that is not visible ascii"),
            }
        }
        if values.is_empty() {
            continue;
        }

        let separator = if *name == header::COOKIE { "; " } else { ", " };
        let value = values.join(separator);

        if *name == header::CONTENT_TYPE {
            variables.insert(metadata::CONTENT_TYPE.to_owned(), value.clone());
        } else if *name == header::CONTENT_LENGTH {
            variables.insert(metadata::CONTENT_LENGTH.to_owned(), value.clone());
        }
        variables.insert(header_key(name.as_str()), value);
    }

    variables
}

/// Builds the request view for a decoded request.
pub fn build_request(raw: RawRequest, connection: &ConnectionInfo) -> Result<HttpRequest, ParseError> {
    let RawRequest { head, body } = raw;

    let query_parameters = params::query_parameters(&head)?;
    let body_parameters = params::body_parameters(&head, &body)?;
    let cookies = params::cookies(&head);
    let metadata = transport_metadata(&head, connection);

    let request = HttpRequest::new(query_parameters, body_parameters, cookies, Files::new(), metadata);
    Ok(request.with_raw_body(body))
}
