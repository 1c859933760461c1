//! Decoder turning raw connection bytes into complete requests.
//!
//! The head is parsed with `httparse`, then the body is buffered until the
//! number of bytes announced by `Content-Length` has arrived. Applications
//! behind this host only ever see fully-read requests, so streaming and
//! chunked bodies are not supported.
//!
//! A head carrying `Expect: 100-continue` whose body has not arrived yet is
//! reported with [`Message::ExpectContinue`] first, so the connection can
//! invite the client to send it.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Maximum body size: 2MB
//! - Only HTTP/1.0 and HTTP/1.1

use bytes::{Buf, Bytes, BytesMut};
use http::request::Parts;
use http::{HeaderName, HeaderValue, Method, Request, Uri, Version, header};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::error::ParseError;
use crate::utils::ensure;

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum size in bytes allowed for a request body
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A request whose head is parsed and whose body is fully buffered.
#[derive(Debug)]
pub struct RawRequest {
    pub head: Parts,
    pub body: Bytes,
}

/// One item produced by [`RequestDecoder`].
#[derive(Debug)]
pub enum Message {
    /// The client waits for `100 Continue` before sending the body.
    ExpectContinue,
    Request(RawRequest),
}

/// Decoder for complete HTTP requests implementing the [`Decoder`] trait.
///
/// Between calls it remembers a head that was parsed while its body is still
/// arriving.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    pending: Option<(Parts, usize)>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message;
    type Error = ParseError;

    /// Attempts to decode one request from the provided buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::ExpectContinue))` once the head of a request asking
    ///   for `100 Continue` is parsed and its body is missing
    /// - `Ok(Some(Message::Request(request)))` once head and body are both
    ///   complete
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the head is malformed or exceeds a limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (head, length) = match self.pending.take() {
            Some(pending) => pending,
            None => match decode_head(src)? {
                Some((head, length)) if src.len() < length && expects_continue(&head) => {
                    trace!(method = %head.method, uri = %head.uri, "request expects 100-continue");
                    self.pending = Some((head, length));
                    return Ok(Some(Message::ExpectContinue));
                }
                Some(parsed) => parsed,
                None => return Ok(None),
            },
        };

        if src.len() < length {
            src.reserve(length - src.len());
            self.pending = Some((head, length));
            return Ok(None);
        }

        let body = src.split_to(length).freeze();
        trace!(method = %head.method, uri = %head.uri, body_size = length, "decoded request");
        Ok(Some(Message::Request(RawRequest { head, body })))
    }
}

/// Parses the request head and consumes it from `src`, returning it with the
/// announced body length.
fn decode_head(src: &mut BytesMut) -> Result<Option<(Parts, usize)>, ParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
    let mut req = httparse::Request::new(&mut headers);

    let status = req.parse(src).map_err(|e| match e {
        httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        e => ParseError::invalid_header(e.to_string()),
    })?;

    let body_offset = match status {
        Status::Complete(body_offset) => body_offset,
        Status::Partial => {
            ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
            return Ok(None);
        }
    };
    ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

    let version = match req.version {
        Some(0) => Version::HTTP_10,
        Some(1) => Version::HTTP_11,
        // http2 and http3 are never spoken by this host
        v => return Err(ParseError::InvalidVersion(v)),
    };
    let method = req
        .method
        .and_then(|method| Method::from_bytes(method.as_bytes()).ok())
        .ok_or(ParseError::InvalidMethod)?;
    let uri = req.path.and_then(|path| path.parse::<Uri>().ok()).ok_or(ParseError::InvalidUri)?;

    let mut request = Request::new(());
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.version_mut() = version;

    let header_map = request.headers_mut();
    header_map.reserve(req.headers.len());
    for parsed in req.headers.iter() {
        let name = HeaderName::from_bytes(parsed.name.as_bytes()).map_err(ParseError::invalid_header)?;
        let value = HeaderValue::from_bytes(parsed.value).map_err(ParseError::invalid_header)?;
        header_map.append(name, value);
    }

    let (head, ()) = request.into_parts();
    let length = body_length(&head)?;

    src.advance(body_offset);
    Ok(Some((head, length)))
}

fn expects_continue(head: &Parts) -> bool {
    head.headers.get(header::EXPECT).is_some_and(|value| value.as_bytes().starts_with(b"100-"))
}

/// Reads the body length announced by the head, zero when there is none.
fn body_length(head: &Parts) -> Result<usize, ParseError> {
    ensure!(!head.headers.contains_key(header::TRANSFER_ENCODING), ParseError::UnsupportedTransferEncoding);

    let Some(value) = head.headers.get(header::CONTENT_LENGTH) else {
        return Ok(0);
    };

    let value = value.to_str().map_err(ParseError::invalid_content_length)?;
    let length = value
        .trim()
        .parse::<usize>()
        .map_err(|e| ParseError::invalid_content_length(format!("value {value} is not usize: {e}")))?;

    ensure!(length <= MAX_BODY_BYTES, ParseError::too_large_body(length, MAX_BODY_BYTES));
    Ok(length)
}
