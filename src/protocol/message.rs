//! Messages exchanged between the adapter and a hosted application.

use bytes::Bytes;

/// Ordered `(name, value)` header pairs as they travel through the protocol.
pub type Headers = Vec<(Bytes, Bytes)>;

/// One unit of the streaming handshake.
///
/// A single enum covers both channels; each channel accepts only its own
/// subset and treats everything else as a protocol violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Request body. `more_body == false` marks the final chunk.
    HttpRequest { body: Bytes, more_body: bool },
    /// No further input will ever be produced for this invocation.
    HttpDisconnect,
    /// Response status line and headers. Must precede any body chunk.
    HttpResponseStart { status: u16, headers: Headers },
    /// Response body. `more_body == false` completes the response.
    HttpResponseBody { body: Bytes, more_body: bool },

    LifespanStartup,
    LifespanShutdown,
    LifespanStartupComplete,
    LifespanStartupFailed { message: String },
    LifespanShutdownComplete,
    LifespanShutdownFailed { message: String },
}

impl Message {
    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::HttpRequest { .. } => "http.request",
            Message::HttpDisconnect => "http.disconnect",
            Message::HttpResponseStart { .. } => "http.response.start",
            Message::HttpResponseBody { .. } => "http.response.body",
            Message::LifespanStartup => "lifespan.startup",
            Message::LifespanShutdown => "lifespan.shutdown",
            Message::LifespanStartupComplete => "lifespan.startup.complete",
            Message::LifespanStartupFailed { .. } => "lifespan.startup.failed",
            Message::LifespanShutdownComplete => "lifespan.shutdown.complete",
            Message::LifespanShutdownFailed { .. } => "lifespan.shutdown.failed",
        }
    }

    /// Final request body chunk.
    pub fn request(body: impl Into<Bytes>) -> Self {
        Message::HttpRequest {
            body: body.into(),
            more_body: false,
        }
    }

    /// Response start with string headers.
    pub fn response_start<K, V>(status: u16, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Bytes>,
        V: Into<Bytes>,
    {
        Message::HttpResponseStart {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Response body chunk.
    pub fn response_body(body: impl Into<Bytes>, more_body: bool) -> Self {
        Message::HttpResponseBody {
            body: body.into(),
            more_body,
        }
    }
}
