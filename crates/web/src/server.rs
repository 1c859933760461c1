use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use futures::StreamExt;
use http::request::Parts;
use http::{Version, header};
use micro_exchange::response::{HttpResponse, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::codec::{Message, RequestDecoder, ResponseEncoder};
use crate::environment::{ConnectionInfo, build_request};
use crate::error::{HttpError, SendError};
use crate::handler::Handler;

/// Script path used when none is configured, the application owns the root.
const DEFAULT_SCRIPT_NAME: &str = "/";

/// Interim response inviting a client that sent `Expect: 100-continue` to
/// send its body.
const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    script_name: String,
    secure: bool,
    handler: Option<Arc<dyn Handler>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, script_name: DEFAULT_SCRIPT_NAME.to_owned(), secure: false, handler: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// Path of the entry point the application is mounted under, reported
    /// as `SCRIPT_NAME` and stripped by `relative_path`.
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    /// Reports every connection as TLS protected, for a listener that only
    /// receives traffic from a TLS-terminating front.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::from)?;
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        Ok(Server { address, script_name: self.script_name, secure: self.secure, handler })
    }
}

pub struct Server {
    address: Vec<SocketAddr>,
    script_name: String,
    secure: bool,
    handler: Arc<dyn Handler>,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
    #[error("handler must be set")]
    MissingHandler,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Installs the log subscriber, binds the configured address and serves
    /// until the process ends.
    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            warn!(cause = %e, "tracing subscriber already installed");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        self.serve(tcp_listener).await;
    }

    /// Accepts connections from an already bound listener, one task each.
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let connection = ConnectionInfo::new(remote_addr, self.secure, self.script_name.clone());

            tokio::spawn(async move {
                match serve_connection(tcp_stream, connection, handler).await {
                    Ok(()) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

/// Serves requests from one connection until the client closes it or asks
/// for it to be closed.
///
/// Every request gets its own request view and response builder. A request
/// that cannot be decoded or assembled is answered with `400 Bad Request`
/// and ends the connection.
pub async fn serve_connection<S>(stream: S, connection: ConnectionInfo, handler: Arc<dyn Handler>) -> Result<(), HttpError>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut requests = FramedRead::new(reader, RequestDecoder::new());

    while let Some(decoded) = requests.next().await {
        let raw = match decoded {
            Ok(Message::Request(raw)) => raw,
            Ok(Message::ExpectContinue) => {
                writer.write_all(CONTINUE).await.map_err(SendError::from)?;
                writer.flush().await.map_err(SendError::from)?;
                info!("receive expect request header, sent continue response");
                continue;
            }
            Err(e) => {
                warn!(cause = %e, "failed to decode request");
                ResponseEncoder::new().send(bad_request(), &mut writer).await?;
                return Err(e.into());
            }
        };

        let keep_alive = is_keep_alive(&raw.head);
        let encoder = ResponseEncoder::for_method(&raw.head.method);
        let request = match build_request(raw, &connection) {
            Ok(request) => request,
            Err(e) => {
                warn!(cause = %e, "failed to assemble request");
                encoder.send(bad_request(), &mut writer).await?;
                return Err(e.into());
            }
        };

        let mut response = HttpResponse::new();
        handler.handle(&request, &mut response);

        encoder.send(response, &mut writer).await?;
        if !keep_alive {
            break;
        }
    }

    Ok(())
}

fn bad_request() -> HttpResponse {
    let mut response = HttpResponse::new();
    response.set_status_code(400);
    response.set_header("Connection", "close");
    response
}

/// HTTP/1.1 keeps the connection unless told to close it, HTTP/1.0 closes it
/// unless told to keep it.
fn is_keep_alive(head: &Parts) -> bool {
    let connection = head.headers.get(header::CONNECTION).and_then(|value| value.to_str().ok());
    match head.version {
        Version::HTTP_11 => !connection.is_some_and(|value| value.eq_ignore_ascii_case("close")),
        _ => connection.is_some_and(|value| value.eq_ignore_ascii_case("keep-alive")),
    }
}
