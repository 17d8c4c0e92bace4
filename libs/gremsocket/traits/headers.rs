use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP headers to send with the WebSocket upgrade request
pub type Headers = HashMap<String, String>;

/// Trait for providing HTTP headers dynamically
///
/// Called on every `connect`, so each handshake can carry fresh
/// values (tokens, request ids, timestamps).
///
/// # Example
/// ```ignore
/// struct ApiKeyHeaders {
///     api_key: String,
/// }
///
/// #[async_trait::async_trait]
/// impl HeaderProvider for ApiKeyHeaders {
///     async fn get_headers(&self) -> Headers {
///         let mut headers = HashMap::new();
///         headers.insert("X-API-Key".to_string(), self.api_key.clone());
///         headers
///     }
/// }
/// ```
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    /// Generate headers for the next handshake
    async fn get_headers(&self) -> Headers;
}

/// A header provider that doesn't add any headers
pub struct NoHeaders;

#[async_trait]
impl HeaderProvider for NoHeaders {
    async fn get_headers(&self) -> Headers {
        HashMap::new()
    }
}

/// A fixed set of headers, sent unchanged with every handshake
pub struct StaticHeaders(Headers);

impl StaticHeaders {
    pub fn new(headers: Headers) -> Self {
        Self(headers)
    }
}

#[async_trait]
impl HeaderProvider for StaticHeaders {
    async fn get_headers(&self) -> Headers {
        self.0.clone()
    }
}
