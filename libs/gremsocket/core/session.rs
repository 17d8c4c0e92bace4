//! Connection session
//!
//! # Locking
//!
//! ```text
//!              write lock                    read lock
//!   write() ──────┐                  read() ──────┐
//!   ping()  ──────┼──> FrameSink                  └──> FrameStream
//!   close() ──────┘
//!
//!   install/teardown: write lock, then read lock, then swap both halves
//!                     and store `connected`
//! ```
//!
//! The read and the write path never wait for each other. Only a state
//! change holds both locks. A read blocked on the old stream is woken
//! before the read lock is taken, so a teardown never waits out the
//! read deadline.

use crate::core::config::SessionConfig;
use crate::core::metrics::{AtomicMetrics, SessionMetrics};
use crate::traits::message::from_tungstenite;
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, warn};

/// A WebSocket session to a Gremlin endpoint
///
/// Starts disconnected. `connect` must succeed before frames can be
/// written or read. The session is `Send + Sync`; share it with an `Arc`
/// between a writer task, a reader task and a heartbeat.
pub struct WebSocketSession {
    host: String,
    config: SessionConfig,
    dialer_factory: Arc<dyn DialerFactory>,
    /// Written only while both locks are held
    connected: AtomicBool,
    writer: Mutex<Option<FrameSink>>,
    reader: Mutex<Option<FrameStream>>,
    /// Set while a new handle is being installed
    tearing_down: AtomicBool,
    teardown: Notify,
    metrics: AtomicMetrics,
}

impl WebSocketSession {
    /// Create a session for `host`
    ///
    /// Fails without touching the network if the host lacks a `ws://` or
    /// `wss://` scheme, a buffer size is zero, or no dialer factory is set.
    pub fn new(host: impl Into<String>, config: SessionConfig) -> Result<Self> {
        let host = host.into();
        let dialer_factory = config.validate(&host)?;

        Ok(Self {
            host,
            config,
            dialer_factory,
            connected: AtomicBool::new(false),
            writer: Mutex::new(None),
            reader: Mutex::new(None),
            tearing_down: AtomicBool::new(false),
            teardown: Notify::new(),
            metrics: AtomicMetrics::new(),
        })
    }

    /// Create a session with the default configuration
    pub fn with_defaults(host: impl Into<String>) -> Result<Self> {
        Self::new(host, SessionConfig::default())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dial the peer and install the connection
    ///
    /// Safe to call again after a failure. A failed attempt leaves the
    /// session disconnected with no handle installed.
    pub async fn connect(&self) -> Result<()> {
        let dialer = self.dialer_factory.create_dialer(self.config.dial_settings());
        let headers = match &self.config.headers {
            Some(provider) => provider.get_headers().await,
            None => Headers::new(),
        };

        debug!("Dialing {}", self.host);
        match dialer.dial(&self.host, &headers).await {
            Ok((connection, response)) => {
                self.config.pong_handler.on_connected();
                let writer = self.writer.lock().await;
                self.install(writer, Some(connection)).await;
                self.metrics.increment_connects();
                info!("Connected to {} ({})", self.host, response.status_line());
                Ok(())
            }
            Err(e) => {
                let writer = self.writer.lock().await;
                self.install(writer, None).await;

                let mut message = format!(
                    "dialing '{}' failed with {}. Probably '/gremlin' has to be added to the used hostname.",
                    self.host, e
                );
                if let Some(response) = &e.response {
                    message.push_str(&format!(" Details: {}", response.details()));
                }
                error!("{}", message);

                Err(GremSocketError::Handshake {
                    host: self.host.clone(),
                    message,
                })
            }
        }
    }

    /// Whether a connection is installed; never blocks
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Write one binary frame
    pub async fn write(&self, data: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(GremSocketError::NotConnected);
        }

        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(GremSocketError::NotConnected)?;

        let wait = self.config.write_wait;
        match timeout(wait, sink.send(Message::Binary(data.to_vec()))).await {
            Ok(Ok(())) => {
                self.metrics.increment_sent();
                Ok(())
            }
            Ok(Err(e)) => Err(transport_error(e)),
            Err(_) => Err(GremSocketError::Timeout(format!(
                "write did not complete within {:?}",
                wait
            ))),
        }
    }

    /// Read exactly one frame
    ///
    /// Control frames are returned as well; PONG frames are handed to the
    /// configured pong handler first.
    pub async fn read(&self) -> Result<WsMessage> {
        if !self.is_connected() {
            return Err(GremSocketError::NotConnected);
        }

        let mut reader = self.reader.lock().await;

        let notified = self.teardown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.tearing_down.load(Ordering::Acquire) {
            return Err(GremSocketError::ConnectionClosed(
                "connection is being replaced".into(),
            ));
        }

        let stream = reader.as_mut().ok_or(GremSocketError::NotConnected)?;
        let wait = self.config.read_wait;

        let next = tokio::select! {
            next = timeout(wait, stream.next()) => next,
            _ = &mut notified => {
                return Err(GremSocketError::ConnectionClosed(
                    "connection torn down while reading".into(),
                ));
            }
        };

        match next {
            Err(_) => Err(GremSocketError::Timeout(format!(
                "no frame received within {:?}",
                wait
            ))),
            Ok(None) => Err(GremSocketError::ConnectionClosed("stream ended".into())),
            Ok(Some(Err(e))) => Err(transport_error(e)),
            Ok(Some(Ok(message))) => {
                self.metrics.increment_received();
                match from_tungstenite(message) {
                    Some(WsMessage::Pong(payload)) => {
                        self.config.pong_handler.on_pong(&payload);
                        Ok(WsMessage::Pong(payload))
                    }
                    Some(message) => Ok(message),
                    None => Err(GremSocketError::WebSocket("unexpected raw frame".into())),
                }
            }
        }
    }

    /// Send a PING control frame
    ///
    /// A failed write means the peer is gone: the session disconnects
    /// itself and a connectivity error is returned.
    pub async fn ping(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(GremSocketError::NotConnected);
        }

        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(GremSocketError::NotConnected)?;

        let wait = self.config.write_wait;
        let cause = match timeout(wait, sink.send(Message::Ping(Vec::new()))).await {
            Ok(Ok(())) => {
                self.metrics.increment_pings();
                self.config.pong_handler.on_ping_sent();
                debug!("Heartbeat sent to {}", self.host);
                return Ok(());
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("ping not sent within {:?}", wait),
        };

        warn!("Heartbeat to {} failed: {}", self.host, cause);
        // Tear down under the same guard so a concurrent connect is never undone
        self.install(writer, None).await;
        Err(GremSocketError::Connectivity(cause))
    }

    /// Close the connection
    ///
    /// Returns immediately if already disconnected. The handle is torn
    /// down even if the close frame could not be sent.
    pub async fn close(&self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        let mut writer = self.writer.lock().await;
        let wait = self.config.write_wait;
        let result = match writer.as_mut() {
            Some(sink) => match timeout(wait, sink.send(WsMessage::normal_close().into())).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(transport_error(e)),
                Err(_) => Err(GremSocketError::Timeout(format!(
                    "close frame not sent within {:?}",
                    wait
                ))),
            },
            None => Ok(()),
        };

        self.install(writer, None).await;
        info!("Closed connection to {}", self.host);
        result
    }

    /// Current metrics snapshot
    pub fn metrics(&self) -> SessionMetrics {
        SessionMetrics {
            frames_sent: self.metrics.frames_sent(),
            frames_received: self.metrics.frames_received(),
            pings_sent: self.metrics.pings_sent(),
            connects: self.metrics.connects(),
            connected: self.is_connected(),
        }
    }

    /// Replace the socket handle
    ///
    /// Takes the held write lock, wakes a blocked reader, takes the read
    /// lock, swaps both halves and stores the flag. The write lock is
    /// released last. Dropped before the read lock is acquired, nothing
    /// changes and the session keeps its current handle.
    async fn install(
        &self,
        mut writer: MutexGuard<'_, Option<FrameSink>>,
        connection: Option<Connection>,
    ) {
        self.tearing_down.store(true, Ordering::Release);
        // Cleared on every exit, including a caller dropping this future
        let reset = TeardownFlag(&self.tearing_down);
        self.teardown.notify_waiters();

        let mut reader = self.reader.lock().await;
        let connected = connection.is_some();
        match connection {
            Some(connection) => {
                *writer = Some(connection.sink);
                *reader = Some(connection.stream);
            }
            None => {
                *writer = None;
                *reader = None;
            }
        }
        self.connected.store(connected, Ordering::Release);
        drop(reset);

        drop(reader);
        drop(writer);
    }
}

/// Resets the teardown flag when dropped
struct TeardownFlag<'a>(&'a AtomicBool);

impl Drop for TeardownFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn transport_error(err: WsError) -> GremSocketError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            GremSocketError::ConnectionClosed(err.to_string())
        }
        other => GremSocketError::WebSocket(other.to_string()),
    }
}
