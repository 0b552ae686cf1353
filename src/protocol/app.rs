//! The calling convention a hosted application implements.

use async_trait::async_trait;

use crate::error::{AppError, LynaraResult};
use crate::protocol::message::Message;
use crate::protocol::scope::Scope;

/// Source of input chunks for one conversation.
#[async_trait]
pub trait Receive: Send {
    /// Wait for the next input chunk.
    async fn receive(&mut self) -> LynaraResult<Message>;
}

/// Sink for output chunks for one conversation.
#[async_trait]
pub trait Emit: Send {
    /// Hand one output chunk to the adapter.
    async fn send(&mut self, message: Message) -> LynaraResult<()>;
}

/// An application driven once per conversation.
///
/// The same application value serves both HTTP invocations and the
/// lifecycle handshake; it tells them apart by the scope variant.
#[async_trait]
pub trait Application: Send + Sync + 'static {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError>;
}

#[async_trait]
impl<A: Application + ?Sized> Application for std::sync::Arc<A> {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError> {
        (**self).call(scope, receive, send).await
    }
}
