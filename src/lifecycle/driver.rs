//! Background task that runs the application's lifespan conversation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::{LynaraError, LynaraResult};
use crate::protocol::{Application, Emit, LifespanScope, Message, Receive, Scope};

/// Value a latch resolves with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Latch {
    Complete,
    Failed(String),
}

struct ControlInbox {
    rx: mpsc::UnboundedReceiver<Message>,
}

#[async_trait]
impl Receive for ControlInbox {
    async fn receive(&mut self) -> LynaraResult<Message> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| LynaraError::Receive("Lifecycle queue closed".to_string()))
    }
}

/// Holds both latches; dropping it releases whoever still waits on them.
struct LatchOutbox {
    startup: Option<oneshot::Sender<Latch>>,
    shutdown: Option<oneshot::Sender<Latch>>,
    violation: Option<String>,
}

impl LatchOutbox {
    fn fire(latch: &mut Option<oneshot::Sender<Latch>>, value: Latch) {
        if let Some(tx) = latch.take() {
            let _ = tx.send(value);
        }
    }

    fn apply(&mut self, message: Message) -> LynaraResult<()> {
        match message {
            Message::LifespanStartupComplete => {
                Self::fire(&mut self.startup, Latch::Complete);
                Ok(())
            }
            Message::LifespanStartupFailed { message } => {
                Self::fire(&mut self.startup, Latch::Failed(message.clone()));
                Err(LynaraError::LifecycleFailure(format!(
                    "Startup failed {}",
                    message
                )))
            }
            Message::LifespanShutdownComplete => {
                Self::fire(&mut self.shutdown, Latch::Complete);
                Ok(())
            }
            Message::LifespanShutdownFailed { message } => {
                Self::fire(&mut self.shutdown, Latch::Failed(message.clone()));
                Err(LynaraError::LifecycleFailure(format!(
                    "Shutdown failed {}",
                    message
                )))
            }
            other => Err(LynaraError::Protocol(format!(
                "Invalid lifespan message type {}",
                other.kind()
            ))),
        }
    }
}

#[async_trait]
impl Emit for LatchOutbox {
    async fn send(&mut self, message: Message) -> LynaraResult<()> {
        let result = self.apply(message);
        if let Err(LynaraError::Protocol(reason)) = &result {
            self.violation.get_or_insert_with(|| reason.clone());
        }
        result
    }
}

/// Run the lifespan conversation to completion.
///
/// A recorded protocol violation takes precedence over whatever the
/// application returned.
pub async fn run(
    app: Arc<dyn Application>,
    rx: mpsc::UnboundedReceiver<Message>,
    startup: oneshot::Sender<Latch>,
    shutdown: oneshot::Sender<Latch>,
) -> LynaraResult<()> {
    let mut inbox = ControlInbox { rx };
    let mut outbox = LatchOutbox {
        startup: Some(startup),
        shutdown: Some(shutdown),
        violation: None,
    };

    let result = app
        .call(
            Scope::Lifespan(LifespanScope::default()),
            &mut inbox,
            &mut outbox,
        )
        .await;

    if let Some(reason) = outbox.violation.take() {
        return Err(LynaraError::Protocol(reason));
    }
    result.map_err(LynaraError::from_app)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbox() -> (LatchOutbox, oneshot::Receiver<Latch>, oneshot::Receiver<Latch>) {
        let (startup_tx, startup_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let outbox = LatchOutbox {
            startup: Some(startup_tx),
            shutdown: Some(shutdown_tx),
            violation: None,
        };
        (outbox, startup_rx, shutdown_rx)
    }

    #[tokio::test]
    async fn test_complete_messages_fire_latches() {
        let (mut outbox, startup_rx, shutdown_rx) = outbox();
        outbox.send(Message::LifespanStartupComplete).await.unwrap();
        outbox.send(Message::LifespanShutdownComplete).await.unwrap();
        assert_eq!(startup_rx.await.unwrap(), Latch::Complete);
        assert_eq!(shutdown_rx.await.unwrap(), Latch::Complete);
    }

    #[tokio::test]
    async fn test_failed_message_fires_latch_and_errors() {
        let (mut outbox, startup_rx, _shutdown_rx) = outbox();
        let err = outbox
            .send(Message::LifespanStartupFailed {
                message: "db down".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Lifecycle failure: Startup failed db down");
        assert_eq!(startup_rx.await.unwrap(), Latch::Failed("db down".into()));
    }

    #[tokio::test]
    async fn test_unknown_message_is_protocol_error() {
        let (mut outbox, _startup_rx, _shutdown_rx) = outbox();
        let err = outbox.send(Message::HttpDisconnect).await.unwrap_err();
        assert!(matches!(err, LynaraError::Protocol(_)));
        assert!(outbox.violation.is_some());
    }

    #[tokio::test]
    async fn test_dropping_outbox_releases_waiters() {
        let (outbox, startup_rx, shutdown_rx) = outbox();
        drop(outbox);
        assert!(startup_rx.await.is_err());
        assert!(shutdown_rx.await.is_err());
    }
}
