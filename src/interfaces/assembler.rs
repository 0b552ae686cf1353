//! Response assembly shared by every event shape.
//!
//! # Responsibilities
//! - Enforce output ordering: one start, then body chunks, then nothing
//! - Accumulate body bytes across chunks
//! - Hand headers to the shape-specific splitter
//!
//! # Design Decisions
//! - Body bytes are buffered raw and decoded once at the end, so a UTF-8
//!   sequence split across two chunks still decodes
//! - Anything other than start/body is a protocol violation

use bytes::{Bytes, BytesMut};

use crate::error::{LynaraError, LynaraResult};
use crate::protocol::Headers;

/// Shape-specific half of response assembly.
pub trait ResponseAssembler: Default + Send + 'static {
    /// Finished response object.
    type Response: Send;

    /// Record status and headers from `http.response.start`.
    fn on_start(&mut self, status: u16, headers: Vec<(String, String)>);

    /// Build the response around the decoded body text.
    fn finish(self, body: String) -> Self::Response;
}

/// Where the output side of an invocation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseState {
    #[default]
    AwaitingStart,
    Streaming,
    Complete,
}

/// Ordering checks and body accumulation around a [`ResponseAssembler`].
#[derive(Debug, Default)]
pub struct ResponseBuilder<A> {
    assembler: A,
    body: BytesMut,
    state: ResponseState,
}

impl<A: ResponseAssembler> ResponseBuilder<A> {
    pub fn new() -> Self {
        Self {
            assembler: A::default(),
            body: BytesMut::new(),
            state: ResponseState::AwaitingStart,
        }
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Apply `http.response.start`.
    pub fn start(&mut self, status: u16, headers: Headers) -> LynaraResult<()> {
        if self.state() != ResponseState::AwaitingStart {
            return Err(LynaraError::Protocol(
                "Response already started".to_string(),
            ));
        }
        let headers = headers
            .into_iter()
            .map(|(k, v)| -> LynaraResult<(String, String)> {
                Ok((decode_text(k, "header name")?, decode_text(v, "header value")?))
            })
            .collect::<LynaraResult<Vec<_>>>()?;

        self.assembler.on_start(status, headers);
        self.state = ResponseState::Streaming;
        Ok(())
    }

    /// Apply `http.response.body`. Returns true when this chunk completes the response.
    pub fn body(&mut self, chunk: &[u8], more_body: bool) -> LynaraResult<bool> {
        match self.state() {
            ResponseState::AwaitingStart => Err(LynaraError::Protocol(
                "Response body sent before response start".to_string(),
            )),
            ResponseState::Complete => Err(LynaraError::Protocol(
                "Response body sent after the response completed".to_string(),
            )),
            ResponseState::Streaming => {
                self.body.extend_from_slice(chunk);
                if !more_body {
                    self.state = ResponseState::Complete;
                }
                Ok(!more_body)
            }
        }
    }

    /// Produce the finished response. Fails unless the final body chunk was seen.
    pub fn finish(self) -> LynaraResult<A::Response> {
        if self.state() != ResponseState::Complete {
            return Err(LynaraError::Protocol(
                "Application returned before completing the response".to_string(),
            ));
        }
        let body = decode_text(self.body.freeze(), "response body")?;
        Ok(self.assembler.finish(body))
    }
}

fn decode_text(raw: Bytes, what: &str) -> LynaraResult<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| LynaraError::Protocol(format!("{} is not valid UTF-8", what)))
}
