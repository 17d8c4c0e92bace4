use thiserror::Error;

/// Coarse classification of a [`GremSocketError`]
///
/// Callers should branch on the category rather than on the variant:
/// `Connectivity` is the signal to reconnect, `Deadline` and `Transport`
/// are failures of a single operation and leave the connection state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid setup, detected before any network I/O
    Configuration,
    /// The transport handshake failed
    Handshake,
    /// The operation was invoked while disconnected
    NotConnected,
    /// A heartbeat failed, the peer is presumed gone
    Connectivity,
    /// A read or write did not complete within its wait window
    Deadline,
    /// Any other frame-level failure
    Transport,
}

/// Main error type for gremsocket
#[derive(Error, Debug)]
pub enum GremSocketError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Dialing the peer failed
    ///
    /// The message already carries the endpoint, the cause and the
    /// details of the peer's HTTP response if there was one.
    #[error("{message}")]
    Handshake { host: String, message: String },

    /// Operation invoked on a session without a connection
    #[error("no connection available")]
    NotConnected,

    /// Heartbeat write failed
    #[error("Connectivity lost: {0}")]
    Connectivity(String),

    /// Read or write deadline elapsed
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Connection closed by the peer or torn down locally
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// WebSocket protocol or I/O error
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl GremSocketError {
    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            GremSocketError::Configuration(_) => ErrorCategory::Configuration,
            GremSocketError::Handshake { .. } => ErrorCategory::Handshake,
            GremSocketError::NotConnected => ErrorCategory::NotConnected,
            GremSocketError::Connectivity(_) => ErrorCategory::Connectivity,
            GremSocketError::Timeout(_) => ErrorCategory::Deadline,
            GremSocketError::ConnectionClosed(_) | GremSocketError::WebSocket(_) => {
                ErrorCategory::Transport
            }
        }
    }

    /// Whether the caller should treat the peer as gone and reconnect
    pub fn is_connectivity(&self) -> bool {
        self.category() == ErrorCategory::Connectivity
    }
}

/// Result type for gremsocket operations
pub type Result<T> = std::result::Result<T, GremSocketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            GremSocketError::Configuration("x".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(GremSocketError::NotConnected.category(), ErrorCategory::NotConnected);
        assert_eq!(
            GremSocketError::Timeout("write".into()).category(),
            ErrorCategory::Deadline
        );
        assert_eq!(
            GremSocketError::ConnectionClosed("eof".into()).category(),
            ErrorCategory::Transport
        );
        assert!(GremSocketError::Connectivity("ping".into()).is_connectivity());
        assert!(!GremSocketError::Timeout("read".into()).is_connectivity());
    }

    #[test]
    fn test_handshake_message_is_verbatim() {
        let err = GremSocketError::Handshake {
            host: "ws://localhost:8182".into(),
            message: "dialing 'ws://localhost:8182' failed".into(),
        };
        assert_eq!(err.to_string(), "dialing 'ws://localhost:8182' failed");
        assert_eq!(err.category(), ErrorCategory::Handshake);
    }
}
