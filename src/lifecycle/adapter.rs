//! Startup/shutdown handshake against the application.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{LynaraError, LynaraResult};
use crate::lifecycle::driver::{self, Latch};
use crate::lifecycle::{LifecycleMode, LifecyclePhase, LifecycleState};
use crate::observability::metrics;
use crate::protocol::{Application, Message};

/// Drives the application through `lifespan.startup` and `lifespan.shutdown`.
///
/// Callers must run [`shutdown`](Self::shutdown) on every exit path once
/// [`startup`](Self::startup) succeeded. Dropping a started adapter still
/// queues the shutdown message, but nothing waits for it.
pub struct LifecycleAdapter {
    app: Arc<dyn Application>,
    mode: LifecycleMode,
    state: LifecycleState,
    queue: Option<mpsc::UnboundedSender<Message>>,
    shutdown_latch: Option<oneshot::Receiver<Latch>>,
    task: Option<JoinHandle<LynaraResult<()>>>,
}

impl LifecycleAdapter {
    /// Create an adapter. Fails immediately when `mode` is `Off`.
    pub fn new(app: Arc<dyn Application>, mode: LifecycleMode) -> LynaraResult<Self> {
        if mode == LifecycleMode::Off {
            return Err(LynaraError::Misconfiguration(
                "Lifespan mode is off, but lifespan interface is used".to_string(),
            ));
        }
        Ok(Self {
            app,
            mode,
            state: LifecycleState::default(),
            queue: None,
            shutdown_latch: None,
            task: None,
        })
    }

    pub fn mode(&self) -> LifecycleMode {
        self.mode
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Spawn the lifespan task and wait until startup resolves.
    pub async fn startup(&mut self) -> LynaraResult<()> {
        if self.state.phase != LifecyclePhase::NotStarted {
            return Err(LynaraError::Misconfiguration(
                "Lifecycle startup can only run once".to_string(),
            ));
        }
        self.state.phase = LifecyclePhase::Starting;

        let (tx, rx) = mpsc::unbounded_channel();
        let (startup_tx, startup_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        self.task = Some(tokio::spawn(driver::run(
            self.app.clone(),
            rx,
            startup_tx,
            shutdown_tx,
        )));
        let _ = tx.send(Message::LifespanStartup);
        self.queue = Some(tx);
        self.shutdown_latch = Some(shutdown_rx);

        tracing::debug!(mode = %self.mode, "Waiting for startup");
        match startup_rx.await {
            Ok(Latch::Complete) => {
                self.state.phase = LifecyclePhase::Started;
                metrics::record_lifecycle_event("startup_complete");
                tracing::debug!("Startup complete");
                Ok(())
            }
            Ok(Latch::Failed(message)) => {
                self.state.startup_failed = true;
                self.state.phase = LifecyclePhase::Stopped;
                metrics::record_lifecycle_event("startup_failed");
                tracing::error!(reason = %message, "Application startup failed. Exiting.");
                Err(LynaraError::LifecycleFailure(format!(
                    "Startup failed {}",
                    message
                )))
            }
            Err(_) => self.driver_exited(LifecyclePhase::Starting).await,
        }
    }

    /// Ask the application to shut down and wait until it answers.
    ///
    /// A no-op unless startup completed.
    pub async fn shutdown(&mut self) -> LynaraResult<()> {
        if self.state.phase != LifecyclePhase::Started {
            tracing::debug!(phase = ?self.state.phase, "Skipping shutdown");
            return Ok(());
        }
        self.state.phase = LifecyclePhase::ShuttingDown;

        if let Some(queue) = &self.queue {
            let _ = queue.send(Message::LifespanShutdown);
        }

        tracing::debug!("Waiting for shutdown");
        let latch = match self.shutdown_latch.take() {
            Some(latch) => latch.await,
            None => {
                return Err(LynaraError::Misconfiguration(
                    "Shutdown latch already consumed".to_string(),
                ))
            }
        };

        match latch {
            Ok(Latch::Complete) => {
                self.state.phase = LifecyclePhase::Stopped;
                metrics::record_lifecycle_event("shutdown_complete");
                tracing::debug!("Shutdown complete");
                Ok(())
            }
            Ok(Latch::Failed(message)) => {
                self.state.shutdown_failed = true;
                self.state.phase = LifecyclePhase::Stopped;
                metrics::record_lifecycle_event("shutdown_failed");
                tracing::error!(reason = %message, "Application shutdown failed");
                Err(LynaraError::LifecycleFailure(format!(
                    "Shutdown failed {}",
                    message
                )))
            }
            Err(_) => self.driver_exited(LifecyclePhase::ShuttingDown).await,
        }
    }

    /// The driver ended before resolving the latch for `during`.
    async fn driver_exited(&mut self, during: LifecyclePhase) -> LynaraResult<()> {
        self.state.phase = LifecyclePhase::Stopped;
        self.queue = None;

        let outcome = match self.task.take() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(LynaraError::LifecycleFailure(format!(
                    "Lifecycle task failed: {}",
                    join_err
                ))),
            },
            None => Ok(()),
        };

        match (outcome, self.mode, during) {
            (Err(LynaraError::Protocol(reason)), _, _) => {
                self.state.error_occurred = true;
                metrics::record_lifecycle_event("protocol_error");
                tracing::error!(reason = %reason, "Application broke the lifespan protocol");
                Err(LynaraError::Protocol(reason))
            }
            (Err(err), LifecycleMode::Auto, LifecyclePhase::Starting) => {
                self.state.error_occurred = true;
                metrics::record_lifecycle_event("unsupported");
                tracing::info!(error = %err, "Lifespan protocol appears to be unsupported, skipping.");
                Ok(())
            }
            (Err(err), LifecycleMode::Auto, _) => {
                self.state.error_occurred = true;
                tracing::warn!(error = %err, "Lifespan task failed during shutdown");
                Ok(())
            }
            (Err(err), _, _) => {
                self.state.error_occurred = true;
                metrics::record_lifecycle_event("error");
                tracing::error!(error = %err, "Error in lifespan interface, does the app support lifespan?");
                Err(err)
            }
            (Ok(()), LifecycleMode::On, LifecyclePhase::Starting) => {
                tracing::error!("Application returned before completing startup");
                Err(LynaraError::LifecycleFailure(
                    "Application returned before completing startup".to_string(),
                ))
            }
            (Ok(()), _, LifecyclePhase::Starting) => {
                metrics::record_lifecycle_event("unsupported");
                tracing::info!("Lifespan protocol appears to be unsupported, skipping.");
                Ok(())
            }
            (Ok(()), _, _) => {
                tracing::debug!("Lifespan task ended without confirming shutdown");
                Ok(())
            }
        }
    }
}

impl Drop for LifecycleAdapter {
    fn drop(&mut self) {
        if self.state.phase == LifecyclePhase::Started {
            if let Some(queue) = &self.queue {
                tracing::warn!("Lifecycle adapter dropped before shutdown; sending shutdown without waiting");
                let _ = queue.send(Message::LifespanShutdown);
            }
        }
    }
}
