//! # Session core
//!
//! - [`session`]: the connection session and its two locks
//! - [`dialer`]: tokio-tungstenite dialers, plain and verbose
//! - [`config`]: session options and their validation
//! - [`builder`]: type-state builder over the config
//! - [`heartbeat`]: optional background pinger
//! - [`pong_tracker`]: PONG bookkeeping for health checks
//! - [`mock`]: in-memory dialers and peers for tests

pub mod builder;
pub mod config;
pub mod dialer;
pub mod heartbeat;
pub mod metrics;
pub mod mock;
pub mod pong_tracker;
pub mod session;

// Re-export main types
pub use builder::{states, SessionBuilder};
pub use config::SessionConfig;
pub use dialer::{TungsteniteDialer, TungsteniteDialerFactory};
pub use heartbeat::{spawn_heartbeat, HeartbeatEvent, HeartbeatHandle};
pub use metrics::{AtomicMetrics, SessionMetrics};
pub use pong_tracker::PongTracker;
pub use session::WebSocketSession;

/// Create a new session builder
///
/// # Example
/// ```ignore
/// let session = gremsocket::builder()
///     .host("ws://localhost:8182/gremlin")
///     .handshake_timeout(Duration::from_secs(2))
///     .build()?;
/// ```
pub fn builder() -> SessionBuilder<builder::states::NoHost> {
    SessionBuilder::new()
}
