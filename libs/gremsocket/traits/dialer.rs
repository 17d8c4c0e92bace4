//! Dialer abstractions
//!
//! A [`DialerFactory`] turns the session's buffer and timeout settings into a
//! [`Dialer`]; the dialer performs one handshake per call and hands back the
//! split connection. The session only ever talks to these traits, which is
//! what lets tests swap the network for in-memory sinks and streams.

use crate::traits::headers::Headers;
use async_trait::async_trait;
use futures::{Sink, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;

/// Write half of a connection
pub type FrameSink = Pin<Box<dyn Sink<Message, Error = WsError> + Send>>;

/// Read half of a connection
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Message, WsError>> + Send>>;

/// An established, framed connection
///
/// Kept as two halves so that the read and the write path can be
/// locked independently.
pub struct Connection {
    pub(crate) sink: FrameSink,
    pub(crate) stream: FrameStream,
}

impl Connection {
    /// Build a connection from any sink/stream pair
    pub fn new<Si, St>(sink: Si, stream: St) -> Self
    where
        Si: Sink<Message, Error = WsError> + Send + 'static,
        St: Stream<Item = Result<Message, WsError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }

    /// Split an upgraded WebSocket stream into a connection
    pub fn from_websocket<S>(ws_stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, stream) = ws_stream.split();
        Self::new(sink, stream)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// HTTP response the peer sent during the upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// Status code, 101 on a successful upgrade
    pub status: u16,
    /// Canonical reason phrase of the status
    pub reason: String,
    /// Body, only present on refused upgrades
    pub body: Option<Vec<u8>>,
}

impl HandshakeResponse {
    /// Status line, e.g. `404 Not Found`
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    /// Status line followed by the body, if the body is non-empty
    pub fn details(&self) -> String {
        match self.body.as_deref().map(String::from_utf8_lossy) {
            Some(body) if !body.is_empty() => format!("{}: {}", self.status_line(), body),
            _ => self.status_line(),
        }
    }
}

/// Failure of a single dial attempt
#[derive(Debug, Error)]
#[error("{context}: {cause}")]
pub struct DialError {
    /// What the dialer was doing
    pub context: String,
    /// Underlying cause
    pub cause: String,
    /// The peer's response, if it answered over HTTP
    pub response: Option<HandshakeResponse>,
}

impl DialError {
    pub fn new(context: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            context: context.into(),
            cause: cause.to_string(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: HandshakeResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// Settings handed to a [`DialerFactory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialSettings {
    pub write_buffer_size: usize,
    pub read_buffer_size: usize,
    pub handshake_timeout: Duration,
}

/// Performs the transport handshake against an endpoint
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Dial `url`, sending `headers` with the upgrade request
    async fn dial(
        &self,
        url: &str,
        headers: &Headers,
    ) -> Result<(Connection, HandshakeResponse), DialError>;
}

/// Creates dialers
///
/// Implementations must not share mutable state between the dialers
/// they hand out.
pub trait DialerFactory: Send + Sync {
    fn create_dialer(&self, settings: DialSettings) -> Box<dyn Dialer>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_details() {
        let mut response = HandshakeResponse {
            status: 404,
            reason: "Not Found".into(),
            body: None,
        };
        assert_eq!(response.details(), "404 Not Found");

        response.body = Some(Vec::new());
        assert_eq!(response.details(), "404 Not Found");

        response.body = Some(b"no such path".to_vec());
        assert_eq!(response.details(), "404 Not Found: no such path");
    }

    #[test]
    fn test_dial_error_display() {
        let err = DialError::new("dialing tcp localhost:8182", "connection refused");
        assert_eq!(err.to_string(), "dialing tcp localhost:8182: connection refused");
        assert!(err.response.is_none());
    }
}
