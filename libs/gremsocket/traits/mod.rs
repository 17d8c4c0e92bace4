//! # Gremsocket Traits
//!
//! Seams of the session layer:
//!
//! - **Dialer / DialerFactory**: perform the transport handshake
//! - **HeaderProvider**: headers for the upgrade request
//! - **PongHandler**: observe heartbeat answers drained by the read path
//! - **WsMessage**: the frames exchanged over the connection
//! - **GremSocketError**: the error taxonomy and its categories

pub mod dialer;
pub mod error;
pub mod headers;
pub mod message;
pub mod pong;

// Re-export commonly used types
pub use dialer::{
    Connection, DialError, DialSettings, Dialer, DialerFactory, FrameSink, FrameStream,
    HandshakeResponse,
};
pub use error::{ErrorCategory, GremSocketError, Result};
pub use headers::{HeaderProvider, Headers, NoHeaders, StaticHeaders};
pub use message::{CloseReason, MessageType, WsMessage, CLOSE_NORMAL};
pub use pong::{NoOpPongHandler, PongHandler};
