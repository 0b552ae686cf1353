//! Per-invocation adapter between one event and the application.
//!
//! # Responsibilities
//! - Decode the event and enqueue the single request body before the
//!   application can observe the queue
//! - Route the application's output into the shape's response assembler
//! - Enqueue `http.disconnect` once the final body chunk is assembled
//!
//! # Design Decisions
//! - Single use: `call` consumes the adapter
//! - The queue has one producer at a time (decode, then the assembler),
//!   so an unbounded mpsc channel is enough
//! - A protocol violation is remembered even if the application swallows
//!   the error returned by `send`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{DecodeError, LynaraError, LynaraResult};
use crate::interfaces::assembler::{ResponseAssembler, ResponseBuilder, ResponseState};
use crate::interfaces::HttpInterface;
use crate::protocol::{Application, Emit, HttpScope, Message, Receive, Scope};

/// Finished response type for an interface.
pub type ResponseOf<I> = <<I as HttpInterface>::Assembler as ResponseAssembler>::Response;

/// Input side of an invocation.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<Message>,
    disconnected: bool,
}

#[async_trait]
impl Receive for Inbox {
    async fn receive(&mut self) -> LynaraResult<Message> {
        if self.disconnected {
            return Err(LynaraError::Receive(
                "No input after http.disconnect".to_string(),
            ));
        }
        match self.rx.recv().await {
            Some(message) => {
                self.disconnected = message == Message::HttpDisconnect;
                Ok(message)
            }
            None => Err(LynaraError::Receive("Input queue closed".to_string())),
        }
    }
}

/// Output side of an invocation.
#[derive(Debug)]
pub struct Outbox<A> {
    queue: mpsc::UnboundedSender<Message>,
    response: ResponseBuilder<A>,
    violation: Option<String>,
}

impl<A: ResponseAssembler> Outbox<A> {
    fn apply(&mut self, message: Message) -> LynaraResult<()> {
        match message {
            Message::HttpResponseStart { status, headers } => self.response.start(status, headers),
            Message::HttpResponseBody { body, more_body } => {
                if self.response.body(&body, more_body)? {
                    // Receiver lives as long as the adapter.
                    let _ = self.queue.send(Message::HttpDisconnect);
                }
                Ok(())
            }
            other => Err(LynaraError::Protocol(format!(
                "Unknown message type: {}",
                other.kind()
            ))),
        }
    }
}

#[async_trait]
impl<A: ResponseAssembler> Emit for Outbox<A> {
    async fn send(&mut self, message: Message) -> LynaraResult<()> {
        let result = self.apply(message);
        if let Err(LynaraError::Protocol(reason)) = &result {
            self.violation.get_or_insert_with(|| reason.clone());
        }
        result
    }
}

/// Drives one application call for one decoded event.
pub struct HttpAdapter<I: HttpInterface> {
    app: Arc<dyn Application>,
    scope: HttpScope,
    context: Option<Value>,
    inbox: Inbox,
    outbox: Outbox<I::Assembler>,
}

impl<I: HttpInterface> HttpAdapter<I> {
    /// Decode `event` and queue its body.
    pub fn new(
        app: Arc<dyn Application>,
        event: &Value,
        context: Option<Value>,
        base_path: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let decoded = I::decode(event, base_path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Message::request(decoded.body));

        tracing::debug!(
            shape = I::NAME,
            method = %decoded.scope.method,
            path = %decoded.scope.path,
            "Event decoded"
        );

        Ok(Self {
            app,
            scope: decoded.scope,
            context,
            inbox: Inbox {
                rx,
                disconnected: false,
            },
            outbox: Outbox {
                queue: tx,
                response: ResponseBuilder::new(),
                violation: None,
            },
        })
    }

    /// Connection descriptor that will be handed to the application.
    pub fn scope(&self) -> &HttpScope {
        &self.scope
    }

    /// Opaque invocation context supplied by the runtime.
    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    /// Where response assembly stands.
    pub fn response_state(&self) -> ResponseState {
        self.outbox.response.state()
    }

    /// Pull the next input chunk, as the application would.
    pub async fn receive(&mut self) -> LynaraResult<Message> {
        self.inbox.receive().await
    }

    /// Push an output chunk, as the application would.
    pub async fn send(&mut self, message: Message) -> LynaraResult<()> {
        self.outbox.send(message).await
    }

    /// Run the application once and return the assembled response.
    pub async fn call(self) -> LynaraResult<ResponseOf<I>> {
        let HttpAdapter {
            app,
            scope,
            mut inbox,
            mut outbox,
            ..
        } = self;

        let result = app.call(Scope::Http(scope), &mut inbox, &mut outbox).await;

        if let Some(reason) = outbox.violation.take() {
            tracing::error!(shape = I::NAME, reason = %reason, "Application broke the HTTP protocol");
            return Err(LynaraError::Protocol(reason));
        }
        result.map_err(LynaraError::from_app)?;
        outbox.response.finish()
    }
}
