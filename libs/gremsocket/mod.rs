//! # Gremsocket
//!
//! WebSocket session layer for Gremlin servers.
//!
//! ## Features
//!
//! - **Split locking**: reads and writes use separate locks and never wait for each other
//! - **Lock-free state**: `is_connected` is a single atomic load
//! - **Pluggable dialing**: the transport handshake sits behind a factory trait
//! - **Categorized errors**: configuration, handshake, connectivity, deadline and transport
//! - **Explicit heartbeats**: the session pings only when asked to

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core session functionality
pub use self::core::{
    builder, config, dialer, heartbeat, metrics, mock, pong_tracker, session,
    builder::{states, SessionBuilder},
    config::SessionConfig,
    dialer::TungsteniteDialerFactory,
    heartbeat::{spawn_heartbeat, HeartbeatEvent, HeartbeatHandle},
    metrics::SessionMetrics,
    pong_tracker::PongTracker,
    session::WebSocketSession,
};

// Convenience function
pub use self::core::builder as session_builder;
