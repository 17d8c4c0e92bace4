//! PONG tracking
//!
//! A [`PongHandler`] that remembers when the last PING went out and the
//! last PONG came back. Install it on the session config and poll
//! `is_healthy` from the heartbeat owner to spot a peer that stopped
//! answering while the socket still accepts writes.

use crate::traits::PongHandler;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free PING/PONG timestamps
///
/// Timestamps are milliseconds since an internal epoch, offset by one so
/// that zero always means "never".
pub struct PongTracker {
    epoch: Instant,
    last_ping_sent_ms: AtomicU64,
    last_pong_received_ms: AtomicU64,
    pongs_received: AtomicU64,
    /// A PING without an answer older than this marks the peer unhealthy
    timeout: Duration,
}

impl PongTracker {
    /// `timeout` should be a few heartbeat intervals
    pub fn new(timeout: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            last_ping_sent_ms: AtomicU64::new(0),
            last_pong_received_ms: AtomicU64::new(0),
            pongs_received: AtomicU64::new(0),
            timeout,
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64 + 1
    }

    pub fn record_ping_sent(&self) {
        self.last_ping_sent_ms.store(self.now_ms(), Ordering::Release);
    }

    pub fn record_pong_received(&self) {
        self.last_pong_received_ms.store(self.now_ms(), Ordering::Release);
        self.pongs_received.fetch_add(1, Ordering::Relaxed);
    }

    /// False once a PING has gone unanswered for longer than the timeout
    pub fn is_healthy(&self) -> bool {
        let ping_ms = self.last_ping_sent_ms.load(Ordering::Acquire);
        let pong_ms = self.last_pong_received_ms.load(Ordering::Acquire);

        if ping_ms == 0 || pong_ms >= ping_ms {
            return true;
        }

        let since_ping_ms = self.now_ms().saturating_sub(ping_ms);
        since_ping_ms < self.timeout.as_millis() as u64
    }

    pub fn pongs_received(&self) -> u64 {
        self.pongs_received.load(Ordering::Relaxed)
    }

    /// None if no PONG has been received since the last reset
    pub fn time_since_last_pong(&self) -> Option<Duration> {
        let pong_ms = self.last_pong_received_ms.load(Ordering::Acquire);
        if pong_ms == 0 {
            return None;
        }
        Some(Duration::from_millis(self.now_ms().saturating_sub(pong_ms)))
    }

    pub fn time_since_last_ping(&self) -> Option<Duration> {
        let ping_ms = self.last_ping_sent_ms.load(Ordering::Acquire);
        if ping_ms == 0 {
            return None;
        }
        Some(Duration::from_millis(self.now_ms().saturating_sub(ping_ms)))
    }

    pub fn reset(&self) {
        self.last_ping_sent_ms.store(0, Ordering::Release);
        self.last_pong_received_ms.store(0, Ordering::Release);
    }
}

impl PongHandler for PongTracker {
    fn on_pong(&self, _payload: &[u8]) {
        self.record_pong_received();
    }

    fn on_ping_sent(&self) {
        self.record_ping_sent();
    }

    fn on_connected(&self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SessionConfig;
    use crate::core::mock::{loopback, MockDialerFactory};
    use crate::core::session::WebSocketSession;
    use crate::traits::WsMessage;
    use std::sync::Arc;
    use std::thread::sleep;

    #[test]
    fn test_healthy_before_first_ping() {
        let tracker = PongTracker::new(Duration::from_secs(15));
        assert!(tracker.is_healthy());
        assert!(tracker.time_since_last_ping().is_none());
    }

    #[test]
    fn test_unhealthy_after_timeout() {
        let tracker = PongTracker::new(Duration::from_millis(50));
        tracker.record_ping_sent();
        assert!(tracker.is_healthy());

        sleep(Duration::from_millis(60));
        assert!(!tracker.is_healthy());

        tracker.record_pong_received();
        assert!(tracker.is_healthy());
    }

    #[test]
    fn test_reset_on_connect() {
        let tracker = PongTracker::new(Duration::from_millis(10));
        tracker.on_ping_sent();
        sleep(Duration::from_millis(20));
        assert!(!tracker.is_healthy());

        tracker.on_connected();
        assert!(tracker.is_healthy());
        assert!(tracker.time_since_last_pong().is_none());
    }

    #[tokio::test]
    async fn test_session_reports_pongs() {
        let tracker = Arc::new(PongTracker::new(Duration::from_secs(5)));
        let factory = MockDialerFactory::new();
        let (connection, peer) = loopback();
        factory.push_connection(connection);

        let config = SessionConfig::default()
            .with_dialer_factory(Arc::new(factory))
            .with_pong_handler(tracker.clone());
        let session = WebSocketSession::new("ws://localhost:8182/gremlin", config).unwrap();
        session.connect().await.unwrap();

        session.ping().await.unwrap();
        assert!(tracker.time_since_last_ping().is_some());

        peer.send(WsMessage::Pong(b"hb".to_vec()));
        assert_eq!(session.read().await.unwrap(), WsMessage::Pong(b"hb".to_vec()));
        assert_eq!(tracker.pongs_received(), 1);
        assert!(tracker.is_healthy());
    }
}
