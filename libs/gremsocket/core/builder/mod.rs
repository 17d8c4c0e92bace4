pub mod states;

use crate::core::config::SessionConfig;
use crate::core::session::WebSocketSession;
use crate::traits::*;
use states::*;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`WebSocketSession`]
///
/// `build` only exists once `host` has been set. Everything else falls
/// back to the [`SessionConfig`] defaults.
///
/// ```rust,ignore
/// let session = gremsocket::builder()
///     .host("ws://localhost:8182/gremlin")
///     .read_wait(Duration::from_secs(5))
///     .build()?;
/// session.connect().await?;
/// ```
pub struct SessionBuilder<H: HostState> {
    _state: PhantomData<H>,
    host: Option<String>,
    config: SessionConfig,
}

impl SessionBuilder<NoHost> {
    pub fn new() -> Self {
        Self {
            _state: PhantomData,
            host: None,
            config: SessionConfig::default(),
        }
    }

    pub fn host(self, host: impl Into<String>) -> SessionBuilder<HasHost> {
        SessionBuilder {
            _state: PhantomData,
            host: Some(host.into()),
            config: self.config,
        }
    }
}

impl Default for SessionBuilder<NoHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostState> SessionBuilder<H> {
    /// Start from an existing configuration instead of the defaults
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_handshake_timeout(timeout);
        self
    }

    pub fn write_wait(mut self, wait: Duration) -> Self {
        self.config = self.config.with_write_wait(wait);
        self
    }

    pub fn read_wait(mut self, wait: Duration) -> Self {
        self.config = self.config.with_read_wait(wait);
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config = self.config.with_read_buffer_size(size);
        self
    }

    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config = self.config.with_write_buffer_size(size);
        self
    }

    pub fn dialer_factory(mut self, factory: impl DialerFactory + 'static) -> Self {
        self.config = self.config.with_dialer_factory(Arc::new(factory));
        self
    }

    pub fn headers(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.config = self.config.with_headers(Arc::new(provider));
        self
    }

    /// Set the handler for PONG frames drained by `read`
    ///
    /// Takes an `Arc` so the caller can keep a handle, e.g. to a
    /// [`PongTracker`](crate::core::pong_tracker::PongTracker).
    pub fn pong_handler(mut self, handler: Arc<dyn PongHandler>) -> Self {
        self.config = self.config.with_pong_handler(handler);
        self
    }
}

impl SessionBuilder<HasHost> {
    /// Validate the configuration and create a disconnected session
    ///
    /// Does no network I/O.
    pub fn build(self) -> Result<WebSocketSession> {
        let host = self.host.ok_or_else(|| {
            GremSocketError::Configuration("Host is missing".into())
        })?;
        WebSocketSession::new(host, self.config)
    }

    /// Build and connect in one step
    pub async fn connect(self) -> Result<WebSocketSession> {
        let session = self.build()?;
        session.connect().await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{loopback, MockDialerFactory};

    #[test]
    fn test_build_applies_options() {
        let session = SessionBuilder::new()
            .host("ws://localhost:8182/gremlin")
            .read_wait(Duration::from_secs(3))
            .write_buffer_size(4096)
            .headers(StaticHeaders::new(Headers::new()))
            .build()
            .unwrap();

        assert_eq!(session.host(), "ws://localhost:8182/gremlin");
        assert_eq!(session.config().read_wait(), Duration::from_secs(3));
        assert_eq!(session.config().write_buffer_size(), 4096);
        assert!(session.config().has_headers());
        assert!(!session.is_connected());
    }

    #[test]
    fn test_build_rejects_bad_host() {
        let err = SessionBuilder::new().host("localhost:8182").build().err().unwrap();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[tokio::test]
    async fn test_connect_through_builder() {
        let factory = MockDialerFactory::new();
        let (connection, _peer) = loopback();
        factory.push_connection(connection);

        let session = SessionBuilder::default()
            .dialer_factory(factory.clone())
            .host("wss://graph.example:443/gremlin")
            .connect()
            .await
            .unwrap();

        assert!(session.is_connected());
        assert_eq!(factory.dial_count(), 1);
    }
}
