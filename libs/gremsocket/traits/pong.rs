//! PONG Handling Trait
//!
//! Heartbeats are the session's PING frames plus the peer's PONG answers.
//! The read path hands every PONG it drains to the installed handler.

/// Trait invoked by the read path for every PONG frame
///
/// # Example
///
/// ```rust,ignore
/// use gremsocket::traits::PongHandler;
///
/// struct LogPong;
///
/// impl PongHandler for LogPong {
///     fn on_pong(&self, payload: &[u8]) {
///         tracing::debug!("pong ({} bytes)", payload.len());
///     }
/// }
/// ```
pub trait PongHandler: Send + Sync {
    /// Called after a PONG frame was read from the connection
    fn on_pong(&self, payload: &[u8]);

    /// Called after a PING frame was written successfully
    fn on_ping_sent(&self) {}

    /// Called when a new connection has been installed
    fn on_connected(&self) {}
}

/// PONG handler that does nothing
///
/// Installed by default: the frame still has to be read off the socket,
/// nothing else needs to happen.
pub struct NoOpPongHandler;

impl PongHandler for NoOpPongHandler {
    fn on_pong(&self, _payload: &[u8]) {}
}
