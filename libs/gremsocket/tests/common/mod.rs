//! Common test utilities for gremsocket integration tests
//!
//! Real TCP servers on 127.0.0.1 that speak just enough WebSocket to
//! exercise the tokio-tungstenite dialer end to end.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// How the mock server answers a connection
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Echo data frames, answer PING with PONG
    Echo,
    /// Like `Echo`, but wait before echoing each data frame
    SlowEcho(Duration),
    /// Never upgrade, answer the handshake with a plain HTTP 404
    NotFound,
    /// Accept TCP and never answer
    Silent,
}

/// A mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Start an echoing server
    pub async fn start() -> Self {
        Self::start_with(Behavior::Echo).await
    }

    pub async fn start_with(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, behavior, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self { addr, shutdown }
    }

    async fn handle_connection(
        mut stream: tokio::net::TcpStream,
        behavior: Behavior,
        shutdown: Arc<Notify>,
    ) {
        let delay = match behavior {
            Behavior::NotFound => {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request).await;
                let body = "no such endpoint";
                let response = format!(
                    "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
                return;
            }
            Behavior::Silent => {
                shutdown.notified().await;
                return;
            }
            Behavior::Echo => None,
            Behavior::SlowEcho(delay) => Some(delay),
        };

        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                if let Some(delay) = delay {
                                    tokio::time::sleep(delay).await;
                                }
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_ping() {
                                let pong = Message::Pong(msg.into_data());
                                if write.send(pong).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/gremlin", self.addr)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A local address nothing listens on
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
