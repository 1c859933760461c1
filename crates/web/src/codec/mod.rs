//! Wire codec of the host.
//!
//! - [`RequestDecoder`]: raw bytes into complete [`RawRequest`]s, announcing
//!   requests that wait for `100 Continue` on the way
//! - [`ResponseEncoder`]: a finished `HttpResponse` into raw bytes, written
//!   to any `AsyncWrite` by [`ResponseEncoder::send`]

mod request_decoder;
mod response_encoder;

pub use request_decoder::Message;
pub use request_decoder::RawRequest;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
