use crate::core::dialer::TungsteniteDialerFactory;
use crate::traits::*;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for the initial handshake
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default maximum time a write may take
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(15);
/// Default maximum time a read waits for a frame
pub const DEFAULT_READ_WAIT: Duration = Duration::from_secs(15);
/// Default read and write buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Configuration for a [`WebSocketSession`](crate::core::session::WebSocketSession)
///
/// Created once and never changed after the session has been built.
/// Options are applied with the `with_*` methods.
#[derive(Clone)]
pub struct SessionConfig {
    /// Timeout for the initial handshake
    pub(crate) handshake_timeout: Duration,

    /// Maximum time a write operation may take before it fails
    pub(crate) write_wait: Duration,

    /// Maximum time a read operation waits for a frame before it fails
    pub(crate) read_wait: Duration,

    pub(crate) read_buffer_size: usize,
    pub(crate) write_buffer_size: usize,

    /// Factory for the dialers used by `connect`
    pub(crate) dialer_factory: Option<Arc<dyn DialerFactory>>,

    /// Optional provider for upgrade request headers
    pub(crate) headers: Option<Arc<dyn HeaderProvider>>,

    /// Handler for PONG frames drained by the read path
    pub(crate) pong_handler: Arc<dyn PongHandler>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            write_wait: DEFAULT_WRITE_WAIT,
            read_wait: DEFAULT_READ_WAIT,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
            dialer_factory: Some(Arc::new(TungsteniteDialerFactory::verbose())),
            headers: None,
            pong_handler: Arc::new(NoOpPongHandler),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_write_wait(mut self, wait: Duration) -> Self {
        self.write_wait = wait;
        self
    }

    pub fn with_read_wait(mut self, wait: Duration) -> Self {
        self.read_wait = wait;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Replace the dialer factory, e.g. with an in-memory one for tests
    pub fn with_dialer_factory(mut self, factory: Arc<dyn DialerFactory>) -> Self {
        self.dialer_factory = Some(factory);
        self
    }

    /// Remove the dialer factory
    ///
    /// A session built from such a config is rejected; this exists so that
    /// layered configuration can express "no factory" explicitly.
    pub fn without_dialer_factory(mut self) -> Self {
        self.dialer_factory = None;
        self
    }

    pub fn with_headers(mut self, headers: Arc<dyn HeaderProvider>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_pong_handler(mut self, handler: Arc<dyn PongHandler>) -> Self {
        self.pong_handler = handler;
        self
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    pub fn write_wait(&self) -> Duration {
        self.write_wait
    }

    pub fn read_wait(&self) -> Duration {
        self.read_wait
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    /// Check if a header provider is configured
    pub fn has_headers(&self) -> bool {
        self.headers.is_some()
    }

    /// Settings handed to the dialer factory on every `connect`
    pub fn dial_settings(&self) -> DialSettings {
        DialSettings {
            write_buffer_size: self.write_buffer_size,
            read_buffer_size: self.read_buffer_size,
            handshake_timeout: self.handshake_timeout,
        }
    }

    /// Validate the configuration together with the endpoint
    ///
    /// Runs before any network I/O. Returns the dialer factory on success.
    pub(crate) fn validate(&self, host: &str) -> Result<Arc<dyn DialerFactory>> {
        if !host.starts_with("ws://") && !host.starts_with("wss://") {
            return Err(GremSocketError::Configuration(format!(
                "Host '{}' is invalid, expected protocol 'ws://' or 'wss://' missing",
                host
            )));
        }

        if self.read_buffer_size == 0 {
            return Err(GremSocketError::Configuration(format!(
                "Invalid size for read buffer: {}",
                self.read_buffer_size
            )));
        }

        if self.write_buffer_size == 0 {
            return Err(GremSocketError::Configuration(format!(
                "Invalid size for write buffer: {}",
                self.write_buffer_size
            )));
        }

        self.dialer_factory.clone().ok_or_else(|| {
            GremSocketError::Configuration("The factory for websocket dialers is missing".into())
        })
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("handshake_timeout", &self.handshake_timeout)
            .field("write_wait", &self.write_wait)
            .field("read_wait", &self.read_wait)
            .field("read_buffer_size", &self.read_buffer_size)
            .field("write_buffer_size", &self.write_buffer_size)
            .field("has_dialer_factory", &self.dialer_factory.is_some())
            .field("has_headers", &self.headers.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.handshake_timeout(), Duration::from_secs(1));
        assert_eq!(config.write_wait(), Duration::from_secs(15));
        assert_eq!(config.read_wait(), Duration::from_secs(15));
        assert_eq!(config.read_buffer_size(), 8192);
        assert_eq!(config.write_buffer_size(), 8192);
        assert!(!config.has_headers());
        assert!(config.validate("ws://localhost:8182/gremlin").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        let config = SessionConfig::default();
        for host in ["localhost:8182", "http://localhost", "tcp://x", "WS://x", "", "ws:/x"] {
            let err = config.validate(host).err().expect("host must be rejected");
            assert_eq!(err.category(), ErrorCategory::Configuration, "{}", host);
        }
        assert!(config.validate("wss://db.gremlin.cosmos.azure.com:443/").is_ok());
    }

    #[test]
    fn test_zero_buffers_rejected() {
        let err = SessionConfig::default()
            .with_read_buffer_size(0)
            .validate("ws://localhost")
            .err()
            .unwrap();
        assert!(err.to_string().contains("read buffer"));

        let err = SessionConfig::default()
            .with_write_buffer_size(0)
            .validate("ws://localhost")
            .err()
            .unwrap();
        assert!(err.to_string().contains("write buffer"));
    }

    #[test]
    fn test_missing_factory_rejected() {
        let err = SessionConfig::default()
            .without_dialer_factory()
            .validate("ws://localhost")
            .err()
            .unwrap();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_dial_settings() {
        let settings = SessionConfig::default()
            .with_read_buffer_size(1024)
            .with_write_buffer_size(2048)
            .with_handshake_timeout(Duration::from_millis(250))
            .dial_settings();
        assert_eq!(settings.read_buffer_size, 1024);
        assert_eq!(settings.write_buffer_size, 2048);
        assert_eq!(settings.handshake_timeout, Duration::from_millis(250));
    }
}
