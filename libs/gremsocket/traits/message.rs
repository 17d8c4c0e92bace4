use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Close code for a normal closure (RFC 6455, 7.4.1)
pub const CLOSE_NORMAL: u16 = 1000;

/// Kind of a WebSocket frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

/// Close frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub reason: String,
}

/// One WebSocket frame as seen by the session
///
/// Data frames carry the query responses, control frames are part
/// of the heartbeat and shutdown handshakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close(Option<CloseReason>),
}

impl WsMessage {
    /// Frame kind
    pub fn message_type(&self) -> MessageType {
        match self {
            WsMessage::Text(_) => MessageType::Text,
            WsMessage::Binary(_) => MessageType::Binary,
            WsMessage::Ping(_) => MessageType::Ping,
            WsMessage::Pong(_) => MessageType::Pong,
            WsMessage::Close(_) => MessageType::Close,
        }
    }

    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Raw payload of the frame
    ///
    /// Text is returned as its UTF-8 bytes, a close frame as its reason.
    pub fn payload(&self) -> &[u8] {
        match self {
            WsMessage::Text(s) => s.as_bytes(),
            WsMessage::Binary(b) | WsMessage::Ping(b) | WsMessage::Pong(b) => b,
            WsMessage::Close(Some(close)) => close.reason.as_bytes(),
            WsMessage::Close(None) => &[],
        }
    }

    /// Consume the frame and return its payload
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            WsMessage::Text(s) => s.into_bytes(),
            WsMessage::Binary(b) | WsMessage::Ping(b) | WsMessage::Pong(b) => b,
            WsMessage::Close(Some(close)) => close.reason.into_bytes(),
            WsMessage::Close(None) => Vec::new(),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, WsMessage::Text(_) | WsMessage::Binary(_))
    }

    pub fn is_control(&self) -> bool {
        !self.is_data()
    }

    /// A normal-closure close frame with an empty reason
    pub fn normal_close() -> Self {
        WsMessage::Close(Some(CloseReason {
            code: CLOSE_NORMAL,
            reason: String::new(),
        }))
    }
}

impl From<WsMessage> for Message {
    fn from(msg: WsMessage) -> Self {
        match msg {
            WsMessage::Text(text) => Message::Text(text),
            WsMessage::Binary(data) => Message::Binary(data),
            WsMessage::Ping(data) => Message::Ping(data),
            WsMessage::Pong(data) => Message::Pong(data),
            WsMessage::Close(close) => Message::Close(close.map(|c| CloseFrame {
                code: CloseCode::from(c.code),
                reason: c.reason.into(),
            })),
        }
    }
}

/// Convert a tungstenite message into a frame
///
/// Returns `None` for raw frames, which tungstenite only produces on the
/// sending side.
pub(crate) fn from_tungstenite(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(data) => Some(WsMessage::Ping(data)),
        Message::Pong(data) => Some(WsMessage::Pong(data)),
        Message::Close(frame) => Some(WsMessage::Close(frame.map(|f| CloseReason {
            code: u16::from(f.code),
            reason: f.reason.into_owned(),
        }))),
        Message::Frame(_) => None,
    }
}
