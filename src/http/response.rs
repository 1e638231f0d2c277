//! HTTP/1.1 response builder.
//!
//! Provides a fluent builder API for constructing HTTP responses and
//! serializing them to a byte buffer for transmission over TCP.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::json;

use super::{Headers, StatusCode};

const JSON: &str = "application/json";

/// An HTTP/1.1 response, ready to be serialized and sent.
///
/// # Examples
///
/// ```
/// use economy_api::http::{Response, StatusCode};
///
/// let response = Response::error(StatusCode::BadRequest, "Invalid season parameter");
/// assert_eq!(response.content(), br#"{"error":{"message":"Invalid season parameter"}}"#);
///
/// let bytes = response.into_bytes();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
/// assert!(text.contains("Content-Type: application/json\r\n"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
    keep_alive: bool,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
            keep_alive: true,
        }
    }

    /// Serializes `payload` as the JSON body.
    ///
    /// Serialization of the service's own payload types cannot fail; if a
    /// foreign type does fail, a 500 error body is produced instead.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self::json_bytes(status, body),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Self::error(StatusCode::InternalServerError, "Internal server error")
            }
        }
    }

    /// Uses already-serialized JSON bytes as the body, unchanged.
    pub fn json_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status).header("Content-Type", JSON).body_bytes(body)
    }

    /// Builds the uniform error body `{"error":{"message": ...}}`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let body = json!({ "error": { "message": message.into() } });
        Self::json_bytes(status, body.to_string())
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body from a string.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Bytes::from(body.into());
        self
    }

    /// Sets the response body from raw bytes without copying `Bytes` inputs.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Controls whether `Connection: keep-alive` or `Connection: close` is written.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body bytes as they will be written on the wire.
    pub fn content(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response into HTTP/1.1 wire format.
    ///
    /// Adds `Content-Type: text/plain; charset=utf-8` for untyped non-empty
    /// bodies, and always writes `Connection` and `Content-Length`.
    pub fn into_bytes(mut self) -> BytesMut {
        let content_length = self.body.len();

        if !self.body.is_empty() && !self.headers.contains("content-type") {
            self.headers
                .insert("Content-Type", "text/plain; charset=utf-8");
        }

        let connection = if self.keep_alive {
            "keep-alive"
        } else {
            "close"
        };
        self.headers.set("Connection", connection);

        let estimated_size = 128 + self.headers.len() * 64 + content_length;
        let mut buf = BytesMut::with_capacity(estimated_size);

        buf.put(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason()
            )
            .as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());
        buf.put(&b"\r\n"[..]);
        buf.put(self.body);

        buf
    }
}
