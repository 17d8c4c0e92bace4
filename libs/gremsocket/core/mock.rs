//! In-memory dialers and connections for tests
//!
//! [`MockDialerFactory`] hands out scripted dial outcomes in order and counts
//! every dial, so tests can assert that no network interaction happened.
//! [`loopback`] builds a connection whose other end is a [`MockPeer`].

use crate::traits::message::from_tungstenite;
use crate::traits::*;
use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

type Outcome = std::result::Result<Connection, DialError>;

/// Dialer factory returning scripted outcomes
///
/// Clones share the script and the counters.
#[derive(Clone, Default)]
pub struct MockDialerFactory {
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    dials: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl MockDialerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful dial
    pub fn push_connection(&self, connection: Connection) {
        self.outcomes.lock().push_back(Ok(connection));
    }

    /// Queue a failed dial
    pub fn push_failure(&self, error: DialError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Number of dial attempts so far
    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    /// Number of dialers created so far
    pub fn dialers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl DialerFactory for MockDialerFactory {
    fn create_dialer(&self, _settings: DialSettings) -> Box<dyn Dialer> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockDialer {
            outcomes: Arc::clone(&self.outcomes),
            dials: Arc::clone(&self.dials),
        })
    }
}

struct MockDialer {
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    dials: Arc<AtomicUsize>,
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(
        &self,
        url: &str,
        _headers: &Headers,
    ) -> std::result::Result<(Connection, HandshakeResponse), DialError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        let next = self.outcomes.lock().pop_front();
        match next {
            Some(Ok(connection)) => Ok((
                connection,
                HandshakeResponse {
                    status: 101,
                    reason: "Switching Protocols".into(),
                    body: None,
                },
            )),
            Some(Err(e)) => Err(e),
            None => Err(DialError::new(
                format!("dialing {}", url),
                "no scripted connection left",
            )),
        }
    }
}

/// The remote end of a [`loopback`] connection
pub struct MockPeer {
    from_client: UnboundedReceiver<Message>,
    to_client: UnboundedSender<std::result::Result<Message, WsError>>,
}

impl MockPeer {
    /// Deliver a frame to the client's read path
    pub fn send(&self, message: WsMessage) {
        let _ = self.to_client.unbounded_send(Ok(message.into()));
    }

    /// Deliver an error to the client's read path
    pub fn send_error(&self, error: WsError) {
        let _ = self.to_client.unbounded_send(Err(error));
    }

    /// Next frame written by the client
    pub async fn recv(&mut self) -> Option<WsMessage> {
        self.from_client.next().await.and_then(from_tungstenite)
    }

    /// Frame written by the client, if one is already queued
    pub fn try_recv(&mut self) -> Option<WsMessage> {
        self.from_client.try_recv().ok().and_then(from_tungstenite)
    }

    /// Drop both directions; client writes fail and reads hit end of stream
    pub fn hang_up(self) {}
}

/// A connection wired to an in-memory peer
pub fn loopback() -> (Connection, MockPeer) {
    let (client_tx, from_client) = unbounded::<Message>();
    let (to_client, client_rx) = unbounded();

    let sink = client_tx.sink_map_err(|_| WsError::ConnectionClosed);
    let connection = Connection::new(sink, client_rx);

    (connection, MockPeer { from_client, to_client })
}

/// Like [`loopback`], but every client write stalls for `write_delay`
pub fn slow_loopback(write_delay: Duration) -> (Connection, MockPeer) {
    let (client_tx, from_client) = unbounded::<Message>();
    let (to_client, client_rx) = unbounded();

    let sink = client_tx
        .sink_map_err(|_| WsError::ConnectionClosed)
        .with(move |message: Message| async move {
            tokio::time::sleep(write_delay).await;
            Ok::<_, WsError>(message)
        });
    let connection = Connection::new(sink, client_rx);

    (connection, MockPeer { from_client, to_client })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DialSettings {
        DialSettings {
            write_buffer_size: 1,
            read_buffer_size: 1,
            handshake_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let factory = MockDialerFactory::new();
        let (connection, _peer) = loopback();
        factory.push_failure(DialError::new("dial", "refused"));
        factory.push_connection(connection);

        let dialer = factory.create_dialer(settings());
        let headers = Headers::new();
        assert!(dialer.dial("ws://mock", &headers).await.is_err());
        let (_, response) = dialer.dial("ws://mock", &headers).await.unwrap();
        assert_eq!(response.status, 101);
        assert!(dialer.dial("ws://mock", &headers).await.is_err());

        assert_eq!(factory.dial_count(), 3);
        assert_eq!(factory.dialers_created(), 1);
    }

    #[tokio::test]
    async fn test_loopback_roundtrip() {
        let (mut connection, mut peer) = loopback();

        connection.sink.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        assert_eq!(peer.recv().await, Some(WsMessage::Binary(vec![1, 2, 3])));

        peer.send(WsMessage::Text("result".into()));
        let received = connection.stream.next().await.unwrap().unwrap();
        assert_eq!(received, Message::Text("result".into()));

        assert_eq!(peer.try_recv(), None);
        peer.hang_up();
        assert!(connection.sink.send(Message::Ping(Vec::new())).await.is_err());
        assert!(connection.stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_slow_loopback_delays_writes_only() {
        let (mut connection, mut peer) = slow_loopback(Duration::from_millis(50));

        peer.send(WsMessage::Text("early".into()));
        let received = connection.stream.next().await.unwrap().unwrap();
        assert_eq!(received, Message::Text("early".into()));

        let started = std::time::Instant::now();
        connection.sink.send(Message::Text("late".into())).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(peer.try_recv(), Some(WsMessage::Text("late".into())));
    }
}
