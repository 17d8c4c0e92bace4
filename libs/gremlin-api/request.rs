//! Gremlin server request and response envelopes
//!
//! Requests travel as binary frames: one byte holding the length of the
//! mime type, the mime type itself, then the JSON body. Responses come
//! back as plain JSON, possibly spread over several frames for one
//! request (status 206 until the last one).

use crate::error::{ApiError, Result};
use crate::query::QueryBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Mime type announced in front of every request
pub const MIME_TYPE: &str = "application/json";

const OP_EVAL: &str = "eval";
const LANGUAGE: &str = "gremlin-groovy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GremlinRequest {
    pub request_id: Uuid,
    pub op: String,
    #[serde(default)]
    pub processor: String,
    pub args: RequestArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArgs {
    pub gremlin: String,
    pub language: String,
    #[serde(default)]
    pub bindings: Map<String, Value>,
}

impl GremlinRequest {
    /// Script evaluation request with a fresh request id
    pub fn eval(query: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            op: OP_EVAL.to_string(),
            processor: String::new(),
            args: RequestArgs {
                gremlin: query.into(),
                language: LANGUAGE.to_string(),
                bindings: Map::new(),
            },
        }
    }

    pub fn from_query(query: &dyn QueryBuilder) -> Self {
        Self::eval(query.to_string())
    }

    /// Bind a script parameter
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.args.bindings.insert(name.into(), value);
        self
    }

    /// Frame the request for the wire
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(self)?;
        let mut frame = Vec::with_capacity(1 + MIME_TYPE.len() + body.len());
        frame.push(MIME_TYPE.len() as u8);
        frame.extend_from_slice(MIME_TYPE.as_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Parse a framed request; the mime type has to be JSON
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let (&len, rest) = frame
            .split_first()
            .ok_or_else(|| ApiError::Frame("empty frame".into()))?;
        let len = len as usize;
        if rest.len() < len {
            return Err(ApiError::Frame(format!(
                "mime type of {} bytes announced, {} bytes left",
                len,
                rest.len()
            )));
        }

        let (mime, body) = rest.split_at(len);
        if mime != MIME_TYPE.as_bytes() {
            return Err(ApiError::Frame(format!(
                "unsupported mime type '{}'",
                String::from_utf8_lossy(mime)
            )));
        }
        Ok(serde_json::from_slice(body)?)
    }
}

/// Status block of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attributes: Value,
}

impl ResponseStatus {
    pub const SUCCESS: u16 = 200;
    pub const NO_CONTENT: u16 = 204;
    pub const PARTIAL_CONTENT: u16 = 206;

    pub fn is_success(&self) -> bool {
        matches!(
            self.code,
            Self::SUCCESS | Self::NO_CONTENT | Self::PARTIAL_CONTENT
        )
    }

    /// More frames for the same request follow
    pub fn is_partial(&self) -> bool {
        self.code == Self::PARTIAL_CONTENT
    }

    pub fn description(&self) -> &'static str {
        match self.code {
            200 => "success",
            204 => "no content",
            206 => "partial content",
            401 => "unauthorized",
            407 => "authenticate",
            498 => "malformed request",
            499 => "invalid request arguments",
            500 => "server error",
            597 => "script evaluation error",
            598 => "server timeout",
            599 => "server serialization error",
            _ => "unknown status",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description())?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseResult {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GremlinResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    pub status: ResponseStatus,
    #[serde(default)]
    pub result: ResponseResult,
}

impl GremlinResponse {
    pub fn decode(frame: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(frame)?)
    }

    /// Whether this response answers `request`
    pub fn answers(&self, request: &GremlinRequest) -> bool {
        self.request_id
            .as_deref()
            .map(|id| id.eq_ignore_ascii_case(&request.request_id.to_string()))
            .unwrap_or(false)
    }

    pub fn data(&self) -> &Value {
        &self.result.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Graph;
    use crate::types::to_values;
    use serde_json::json;

    #[test]
    fn test_encode_frame_layout() {
        let request = GremlinRequest::from_query(&Graph::new("g").v().count());
        let frame = request.encode().unwrap();

        assert_eq!(frame[0], 16);
        assert_eq!(&frame[1..17], b"application/json");

        let body: Value = serde_json::from_slice(&frame[17..]).unwrap();
        assert_eq!(body["op"], "eval");
        assert_eq!(body["args"]["gremlin"], "g.V().count()");
        assert_eq!(body["args"]["language"], "gremlin-groovy");
        assert_eq!(body["requestId"], request.request_id.to_string());
    }

    #[test]
    fn test_decode_roundtrip_with_bindings() {
        let request = GremlinRequest::eval("g.V(vid)").bind("vid", json!("abc"));
        let decoded = GremlinRequest::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.args.bindings["vid"], json!("abc"));
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        assert!(matches!(GremlinRequest::decode(&[]), Err(ApiError::Frame(_))));
        assert!(matches!(GremlinRequest::decode(&[20, b'a']), Err(ApiError::Frame(_))));

        let mut frame = vec![4];
        frame.extend_from_slice(b"text{}");
        assert!(matches!(GremlinRequest::decode(&frame), Err(ApiError::Frame(_))));
    }

    #[test]
    fn test_response_decode() {
        let request = GremlinRequest::eval("g.V().count()");
        let raw = json!({
            "requestId": request.request_id.to_string().to_uppercase(),
            "status": {"code": 200, "message": "", "attributes": {}},
            "result": {"data": [3], "meta": {}}
        });

        let response = GremlinResponse::decode(raw.to_string().as_bytes()).unwrap();
        assert!(response.answers(&request));
        assert!(response.status.is_success());
        assert!(!response.status.is_partial());
        assert_eq!(to_values(response.data()).unwrap()[0].as_i32(), 3);
    }

    #[test]
    fn test_error_status_display() {
        let raw = br#"{"requestId":null,"status":{"code":597,"message":"No such property"}}"#;
        let response = GremlinResponse::decode(raw).unwrap();

        assert!(!response.status.is_success());
        assert_eq!(
            response.status.to_string(),
            "597 script evaluation error: No such property"
        );
        assert!(response.data().is_null());
    }
}
