//! Inbound requests and the uniform response envelope.

use crate::error::RouterError;
use crate::resource::ResourceError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Message used when request bytes are not valid JSON.
pub const JSON_DECODE_ERROR: &str =
    "JSON decode error: the parameters provided were not valid JSON.";

/// Request body as handed over by the boundary layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Raw bytes, parsed as JSON before the handler is called.
    Bytes(Vec<u8>),
}

impl RequestBody {
    /// Normalizes to an optional JSON value. Empty byte bodies count as absent.
    pub fn into_json(self) -> Result<Option<Value>, ResourceError> {
        match self {
            RequestBody::Empty => Ok(None),
            RequestBody::Json(value) => Ok(Some(value)),
            RequestBody::Bytes(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            RequestBody::Bytes(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|_| ResourceError::Validation(JSON_DECODE_ERROR.to_string())),
        }
    }
}

/// An inbound request: `dispatch(method, path, body, query)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: RequestBody,
    pub query: HashMap<String, String>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new("POST", path).json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new("PUT", path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Bytes(body.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// A successful dispatch: the handler payload and its status.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub payload: Value,
}

/// Failure body: `{error_kind, message}`, plus the accepted verbs on a 405.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error_kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl From<&RouterError> for ErrorBody {
    fn from(error: &RouterError) -> Self {
        let allowed = match error {
            RouterError::MethodNotAllowed { allowed, .. } => {
                Some(allowed.iter().map(|m| m.as_str().to_string()).collect())
            }
            _ => None,
        };
        Self {
            error_kind: error.kind().to_string(),
            message: error.to_string(),
            allowed,
        }
    }
}

/// What the boundary layer turns into an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `error_kind` of a failure envelope.
    pub fn error_kind(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        self.body.get("error_kind").and_then(Value::as_str)
    }
}

impl From<Reply> for Response {
    fn from(reply: Reply) -> Self {
        Self {
            status: reply.status,
            body: reply.payload,
        }
    }
}

impl From<RouterError> for Response {
    fn from(error: RouterError) -> Self {
        let body = serde_json::to_value(ErrorBody::from(&error)).unwrap_or(Value::Null);
        Self {
            status: error.status(),
            body,
        }
    }
}

impl From<Result<Reply, RouterError>> for Response {
    fn from(result: Result<Reply, RouterError>) -> Self {
        match result {
            Ok(reply) => reply.into(),
            Err(error) => error.into(),
        }
    }
}
