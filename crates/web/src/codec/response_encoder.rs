//! Encoder writing a finished [`HttpResponse`] onto the wire.
//!
//! The builder's serialized header lines are written as they are, each
//! followed by CRLF. A `Content-Length` line is appended unless the
//! application set one, then the blank line and the content.
//!
//! `1xx`, `204` and `304` responses never carry content or an added
//! `Content-Length`. The answer to a `HEAD` request announces the length of
//! its content but leaves the content itself off the wire.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::{Method, header};
use micro_exchange::response::{HttpResponse, Response};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, error};

use crate::error::SendError;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for [`HttpResponse`] implementing the [`Encoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder {
    head_request: bool,
}

impl ResponseEncoder {
    /// Encoder for responses whose request is unknown, for example because
    /// it could not be decoded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder for the response to a request made with `method`.
    pub fn for_method(method: &Method) -> Self {
        Self { head_request: *method == Method::HEAD }
    }

    /// Serializes `response` and writes it to `writer`, flushing afterwards.
    ///
    /// The response is consumed, it is meant to be sent exactly once.
    pub async fn send<W>(mut self, response: HttpResponse, writer: &mut W) -> Result<(), SendError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut buffer = BytesMut::new();
        self.encode(response, &mut buffer)?;

        writer.write_all(&buffer).await?;
        Ok(writer.flush().await?)
    }
}

impl Encoder<HttpResponse> for ResponseEncoder {
    type Error = SendError;

    /// Serializes the response into `dst`.
    ///
    /// # Errors
    ///
    /// Returns `SendError::InvalidHeader` if a header line contains a CR or
    /// LF, which would let it inject further header lines.
    fn encode(&mut self, response: HttpResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let content = response.content().as_bytes();
        dst.reserve(INIT_HEADER_SIZE + content.len());

        for line in response.headers() {
            if line.contains(['\r', '\n']) {
                error!(line = %line.escape_debug(), "header line contains a line break");
                return Err(SendError::invalid_header(line.escape_debug()));
            }
            dst.put_slice(line.as_bytes());
            dst.put_slice(b"\r\n");
        }

        let status_code = response.status_code();
        let bodiless_status = is_bodiless_status(status_code);
        let has_content_length =
            response.header_names().any(|name| name.eq_ignore_ascii_case(header::CONTENT_LENGTH.as_str()));
        if !bodiless_status && !has_content_length {
            write!(FastWrite(dst), "Content-Length: {}\r\n", content.len())?;
        }
        dst.put_slice(b"\r\n");

        if bodiless_status || self.head_request {
            if !content.is_empty() {
                debug!(status_code, head_request = self.head_request, "dropping response content");
            }
            return Ok(());
        }

        dst.put_slice(content);
        Ok(())
    }
}

/// Informational, `204 No Content` and `304 Not Modified` responses end
/// with their header section.
fn is_bodiless_status(status_code: u16) -> bool {
    (100..200).contains(&status_code) || status_code == 204 || status_code == 304
}

/// Writer appending to a `BytesMut` that was already reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_exchange::cookie::SetCookie;
    use tokio::io::AsyncReadExt;

    fn encode(response: HttpResponse) -> String {
        let mut buffer = BytesMut::new();
        ResponseEncoder::new().encode(response, &mut buffer).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    #[test]
    fn adds_content_length() {
        let mut response = HttpResponse::new();
        response.set_header("Content-Type", "text/plain");
        response.set_content("hello");

        assert_eq!(encode(response), "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello");
    }

    #[test]
    fn keeps_explicit_content_length() {
        let mut response = HttpResponse::new();
        response.set_header("content-length", 0);
        response.set_status_code(204);

        assert_eq!(encode(response), "HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n");
    }

    #[test]
    fn writes_cookies_after_headers() {
        let mut response = HttpResponse::new();
        response.add_cookie(SetCookie::new("session", "abc").with_path("/"));
        response.redirect("/home", false);

        assert_eq!(
            encode(response),
            "HTTP/1.1 302 Found\r\nLocation: /home\r\nSet-Cookie: session=abc; Path=/; HttpOnly\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[test]
    fn rejects_header_injection() {
        let mut response = HttpResponse::new();
        response.set_header("X-Name", "evil\r\nSet-Cookie: admin=1");

        let mut buffer = BytesMut::new();
        let result = ResponseEncoder::new().encode(response, &mut buffer);
        assert!(matches!(result, Err(SendError::InvalidHeader { .. })));
    }

    #[test]
    fn head_response_keeps_length_without_content() {
        let mut response = HttpResponse::new();
        response.set_content("hello");

        let mut buffer = BytesMut::new();
        ResponseEncoder::for_method(&Method::HEAD).encode(response, &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
    }

    #[test]
    fn get_response_keeps_content() {
        let mut response = HttpResponse::new();
        response.set_content("hello");

        let mut buffer = BytesMut::new();
        ResponseEncoder::for_method(&Method::GET).encode(response, &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
    }

    #[test]
    fn bodiless_statuses_drop_content() {
        let mut response = HttpResponse::new();
        response.set_status_code(204);
        response.set_content("ignored");
        assert_eq!(encode(response), "HTTP/1.1 204 No Content\r\n\r\n");

        let mut response = HttpResponse::new();
        response.set_status_code(304);
        response.set_header("ETag", "\"v1\"");
        response.set_content("ignored");
        assert_eq!(encode(response), "HTTP/1.1 304 Not Modified\r\nETag: \"v1\"\r\n\r\n");

        let mut response = HttpResponse::new();
        response.set_status_code(100);
        assert_eq!(encode(response), "HTTP/1.1 100 Continue\r\n\r\n");
    }

    #[tokio::test]
    async fn send_writes_everything() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        let mut response = HttpResponse::new();
        response.set_status_code(404);
        response.set_content("missing");
        ResponseEncoder::new().send(response, &mut server).await.unwrap();
        drop(server);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\n\r\nmissing");
    }
}
