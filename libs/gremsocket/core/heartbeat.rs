//! Heartbeat helper for sessions
//!
//! The session never pings on its own. Callers either drive `ping()`
//! themselves or spawn this task, which pings on a fixed interval:
//!
//! ```text
//! ┌─────────────────────┐
//! │  Heartbeat Task     │
//! │  (Tokio spawn)      │
//! │                     │
//! │  Every interval:    │
//! │  1. Wait for tick   │
//! │  2. session.ping() ─┼──> HeartbeatEvent ──> crossbeam channel ──> caller
//! │  3. Repeat          │
//! └─────────────────────┘
//! ```
//!
//! The interval has to be shorter than the peer's idle timeout. The task
//! exits after the first connectivity error; reconnecting is up to the
//! caller, who spawns a new heartbeat afterwards.

use crate::core::session::WebSocketSession;
use crate::traits::*;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Outcome of one heartbeat tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatEvent {
    /// PING written
    Pinged,
    /// The session had no connection at tick time
    NotConnected,
    /// PING failed, the session disconnected itself; the task exits
    Failed(String),
}

/// Heartbeat loop
///
/// 1. Waits for the first interval (the immediate first tick is skipped)
/// 2. Pings on each tick and reports the outcome
/// 3. Runs until shutdown, a closed event channel or a connectivity error
///
/// `wake` interrupts the wait for the next tick so a shutdown is seen
/// without waiting out the interval. A ping in flight always completes.
pub async fn heartbeat_task(
    session: Arc<WebSocketSession>,
    interval: Duration,
    event_tx: Sender<HeartbeatEvent>,
    shutdown_rx: Receiver<()>,
    wake: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    // If we miss ticks due to slow pings, skip them rather than bursting
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    debug!("Heartbeat task started with interval: {:?}", interval);

    loop {
        match shutdown_rx.try_recv() {
            Ok(_) | Err(crossbeam_channel::TryRecvError::Disconnected) => {
                debug!("Heartbeat task received shutdown signal");
                break;
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {}
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = wake.notified() => continue,
        }

        let (event, stop) = match session.ping().await {
            Ok(()) => (HeartbeatEvent::Pinged, false),
            Err(GremSocketError::NotConnected) => (HeartbeatEvent::NotConnected, false),
            Err(e) => {
                warn!("Heartbeat to {} failed: {}", session.host(), e);
                (HeartbeatEvent::Failed(e.to_string()), e.is_connectivity())
            }
        };

        if event_tx.send(event).is_err() {
            debug!("Heartbeat event channel closed, shutting down heartbeat task");
            break;
        }
        if stop {
            break;
        }
    }

    debug!("Heartbeat task exiting");
}

/// Handle to a spawned heartbeat
pub struct HeartbeatHandle {
    handle: tokio::task::JoinHandle<()>,
    shutdown_tx: Sender<()>,
    wake: Arc<Notify>,
    events: Receiver<HeartbeatEvent>,
}

impl HeartbeatHandle {
    /// Events emitted by the heartbeat
    pub fn events(&self) -> &Receiver<HeartbeatEvent> {
        &self.events
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<HeartbeatEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the heartbeat and wait for the task to end
    ///
    /// Never aborts the task: a failing ping finishes tearing the
    /// session down before the task exits.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.wake.notify_one();
        let _ = self.handle.await;
    }
}

/// Spawn a heartbeat pinging `session` every `interval`
pub fn spawn_heartbeat(session: Arc<WebSocketSession>, interval: Duration) -> HeartbeatHandle {
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let (event_tx, events) = crossbeam_channel::unbounded();
    let wake = Arc::new(Notify::new());

    let handle = tokio::spawn({
        let wake = Arc::clone(&wake);
        async move {
            heartbeat_task(session, interval, event_tx, shutdown_rx, wake).await;
        }
    });

    HeartbeatHandle {
        handle,
        shutdown_tx,
        wake,
        events,
    }
}
