//! WebSocket dialers backed by tokio-tungstenite
//!
//! # Verbose dialing
//!
//! The verbose variant resolves and connects the TCP stream itself so that
//! every step can be timed and logged:
//!
//! ```text
//! lookup_host ──ok──> TcpStream::connect ──ok──> TLS (wss) ──> upgrade
//!      │                      │
//!      │ err                  │ err
//!      v                      v
//! probe 8.8.8.8:53       log network, address,
//! once, log both,        error and elapsed time,
//! give up                give up
//! ```
//!
//! The fallback probe is a single best-effort attempt. It only tells
//! "the resolver is broken" apart from "the service is down" in the logs.

use crate::traits::*;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::client_async_tls_with_config;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::{Request, Response};
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, error, info, warn};

/// Resolver probed once when name resolution fails
pub const FALLBACK_RESOLVER: &str = "8.8.8.8:53";

/// Upper bound for each DNS step
const DNS_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound for the TCP connect of the verbose dialer
const DIAL_TIMEOUT: Duration = Duration::from_secs(3);

/// Factory for dialers using tokio-tungstenite
///
/// Stateless: every call to `create_dialer` returns a dialer that owns
/// a copy of the settings and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteDialerFactory {
    verbose: bool,
}

impl TungsteniteDialerFactory {
    /// Plain dialer, connects without additional logging
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Dialer that logs DNS and connect timing and probes the fallback
    /// resolver on lookup failures
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl DialerFactory for TungsteniteDialerFactory {
    fn create_dialer(&self, settings: DialSettings) -> Box<dyn Dialer> {
        Box::new(TungsteniteDialer {
            settings,
            verbose: self.verbose,
        })
    }
}

/// Dialer created by [`TungsteniteDialerFactory`]
pub struct TungsteniteDialer {
    settings: DialSettings,
    verbose: bool,
}

impl TungsteniteDialer {
    fn websocket_config(&self) -> WebSocketConfig {
        // tungstenite 0.24 sizes its read buffer internally; only the
        // write side is configurable
        let mut config = WebSocketConfig::default();
        config.write_buffer_size = self.settings.write_buffer_size;
        config
    }
}

#[async_trait]
impl Dialer for TungsteniteDialer {
    async fn dial(
        &self,
        url: &str,
        headers: &Headers,
    ) -> std::result::Result<(Connection, HandshakeResponse), DialError> {
        let request = build_request(url, headers)?;
        let (host, port) = target(&request)?;
        let config = self.websocket_config();

        let handshake = async {
            let stream = if self.verbose {
                verbose_connect(&host, port).await?
            } else {
                TcpStream::connect(format!("{}:{}", host, port))
                    .await
                    .map_err(|e| DialError::new(format!("dialing tcp {}:{}", host, port), e))?
            };

            client_async_tls_with_config(request, stream, Some(config), None)
                .await
                .map_err(|e| handshake_error(url, e))
        };

        match timeout(self.settings.handshake_timeout, handshake).await {
            Ok(Ok((ws_stream, response))) => {
                debug!("Handshake with {} completed", url);
                Ok((Connection::from_websocket(ws_stream), to_handshake_response(&response)))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DialError::new(
                format!("websocket handshake with {}", url),
                format!("timed out after {:?}", self.settings.handshake_timeout),
            )),
        }
    }
}

/// Build the upgrade request and apply the headers
///
/// Invalid header names or values are skipped with a warning.
fn build_request(url: &str, headers: &Headers) -> std::result::Result<Request, DialError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| DialError::new(format!("building request for '{}'", url), e))?;

    for (key, value) in headers {
        match key.parse::<http::header::HeaderName>() {
            Ok(header_name) => match value.parse::<http::header::HeaderValue>() {
                Ok(header_value) => {
                    request.headers_mut().insert(header_name, header_value);
                }
                Err(_) => {
                    warn!("Invalid header value for key '{}': {}", key, value);
                }
            },
            Err(_) => {
                warn!("Invalid header name: {}", key);
            }
        }
    }

    Ok(request)
}

/// Host and port the TCP connection has to go to
fn target(request: &Request) -> std::result::Result<(String, u16), DialError> {
    let uri = request.uri();
    let host = uri
        .host()
        .ok_or_else(|| DialError::new("parsing endpoint", format!("no host in '{}'", uri)))?;
    let port = uri.port_u16().unwrap_or(match uri.scheme_str() {
        Some("wss") => 443,
        _ => 80,
    });
    Ok((host.to_string(), port))
}

async fn verbose_connect(host: &str, port: u16) -> std::result::Result<TcpStream, DialError> {
    let address = format!("{}:{}", host, port);

    let lookup_start = Instant::now();
    let resolved: std::result::Result<Vec<SocketAddr>, String> =
        match timeout(DNS_TIMEOUT, lookup_host(address.as_str())).await {
            Ok(Ok(addrs)) => Ok(addrs.collect()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {:?}", DNS_TIMEOUT)),
        };

    let addrs = match resolved {
        Ok(addrs) if !addrs.is_empty() => {
            info!("DNS lookup {} took {:?}", address, lookup_start.elapsed());
            addrs
        }
        Ok(_) => {
            return Err(reresolve(&address, "no addresses found".into(), lookup_start).await)
        }
        Err(cause) => return Err(reresolve(&address, cause, lookup_start).await),
    };

    let dial_start = Instant::now();
    let outcome = match timeout(DIAL_TIMEOUT, TcpStream::connect(&addrs[..])).await {
        Ok(Ok(stream)) => return Ok(stream),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {:?}", DIAL_TIMEOUT),
    };

    warn!(
        network = "tcp",
        address = %address,
        error = %outcome,
        elapsed = ?dial_start.elapsed(),
        "Dialing failed"
    );
    Err(DialError::new(format!("dialing tcp {}", address), outcome))
}

/// Log the failed lookup, probe the fallback resolver once and give up
async fn reresolve(address: &str, cause: String, started: Instant) -> DialError {
    error!(
        "DNS lookup {} failed: {} after {:?}",
        address,
        cause,
        started.elapsed()
    );

    let retry_start = Instant::now();
    let probe = match timeout(DNS_TIMEOUT, TcpStream::connect(FALLBACK_RESOLVER)).await {
        Ok(Ok(_)) => "reachable".to_string(),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {:?}", DNS_TIMEOUT),
    };
    error!(
        "Retry DNS lookup via {} ({}) took {:?}",
        FALLBACK_RESOLVER,
        probe,
        retry_start.elapsed()
    );

    DialError::new(
        "connecting to dns during reresolve",
        format!("resolving {}: {}", address, cause),
    )
}

fn to_handshake_response(response: &Response) -> HandshakeResponse {
    HandshakeResponse {
        status: response.status().as_u16(),
        reason: response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
        body: response.body().clone(),
    }
}

fn handshake_error(url: &str, err: WsError) -> DialError {
    match err {
        WsError::Http(response) => {
            let response = to_handshake_response(&response);
            DialError::new(
                format!("websocket handshake with {}", url),
                format!("unexpected response {}", response.status_line()),
            )
            .with_response(response)
        }
        other => DialError::new(format!("websocket handshake with {}", url), other),
    }
}
