//! Per-invocation orchestration.
//!
//! # Responsibilities
//! - Resolve the event shape and build the invocation adapter
//! - Scope the lifecycle handshake around the application call
//! - Report total and interface-only timing
//!
//! # Design Decisions
//! - Decoding happens before startup, so a malformed event never wakes the
//!   application
//! - Shutdown runs whenever startup succeeded, including when the call failed;
//!   the call's own error wins over a shutdown error

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::Instrument;

use crate::config::LynaraConfig;
use crate::error::LynaraResult;
use crate::interfaces::{EventShape, InvocationAdapter, LambdaResponse, ShapeSelection};
use crate::lifecycle::{LifecycleAdapter, LifecycleMode};
use crate::observability::{logging, metrics};
use crate::protocol::Application;

/// Entry point the function handler calls once per event.
#[derive(Clone)]
pub struct Lynara {
    app: Arc<dyn Application>,
    lifecycle_mode: LifecycleMode,
    base_path: Option<String>,
    shape: ShapeSelection,
}

impl Lynara {
    /// Wrap `app` with default settings: lifecycle `Auto`, shape auto-detected.
    pub fn new<A: Application>(app: A) -> Self {
        Self::from_arc(Arc::new(app))
    }

    pub fn from_arc(app: Arc<dyn Application>) -> Self {
        Self {
            app,
            lifecycle_mode: LifecycleMode::default(),
            base_path: None,
            shape: ShapeSelection::default(),
        }
    }

    /// Build from a loaded configuration.
    pub fn from_config(app: Arc<dyn Application>, config: &LynaraConfig) -> Self {
        Self {
            app,
            lifecycle_mode: config.lifecycle,
            base_path: config.base_path.clone(),
            shape: config.shape,
        }
    }

    pub fn with_lifecycle_mode(mut self, mode: LifecycleMode) -> Self {
        self.lifecycle_mode = mode;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<ShapeSelection>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn lifecycle_mode(&self) -> LifecycleMode {
        self.lifecycle_mode
    }

    /// Handle one event with the configured shape selection.
    pub async fn run(&self, event: &Value, context: Option<Value>) -> LynaraResult<LambdaResponse> {
        let shape = self.shape.resolve(event)?;
        self.run_as(shape, event, context).await
    }

    /// Handle one event as an explicitly chosen shape.
    pub async fn run_as(
        &self,
        shape: EventShape,
        event: &Value,
        context: Option<Value>,
    ) -> LynaraResult<LambdaResponse> {
        let start = Instant::now();
        let span = tracing::info_span!(
            "invocation",
            request_id = %logging::request_id(context.as_ref()),
            shape = %shape,
        );

        let (result, interface_elapsed) = self
            .invoke(shape, event, context)
            .instrument(span.clone())
            .await;

        let total = start.elapsed();
        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::record_invocation(shape.name(), outcome, total, interface_elapsed);

        span.in_scope(|| match interface_elapsed {
            Some(interface) => tracing::info!(
                "Lynara execution time: {:.5} s, out of which interface time: {:.5} s",
                total.as_secs_f64(),
                interface.as_secs_f64()
            ),
            None => tracing::info!(
                "Lynara execution time: {:.5} s, interface not reached",
                total.as_secs_f64()
            ),
        });

        result
    }

    async fn invoke(
        &self,
        shape: EventShape,
        event: &Value,
        context: Option<Value>,
    ) -> (LynaraResult<LambdaResponse>, Option<Duration>) {
        let adapter = match InvocationAdapter::new(
            shape,
            self.app.clone(),
            event,
            context,
            self.base_path.as_deref(),
        ) {
            Ok(adapter) => adapter,
            Err(err) => {
                tracing::warn!(error = %err, "Event could not be decoded");
                return (Err(err.into()), None);
            }
        };

        let mut lifecycle = match self.lifecycle_mode {
            LifecycleMode::Off => None,
            mode => match LifecycleAdapter::new(self.app.clone(), mode) {
                Ok(lifecycle) => Some(lifecycle),
                Err(err) => return (Err(err), None),
            },
        };

        if let Some(lifecycle) = lifecycle.as_mut() {
            if let Err(err) = lifecycle.startup().await {
                return (Err(err), None);
            }
        }

        let interface_start = Instant::now();
        let result = adapter.call().await;
        let interface_elapsed = interface_start.elapsed();

        let shutdown = match lifecycle.as_mut() {
            Some(lifecycle) => lifecycle.shutdown().await,
            None => Ok(()),
        };

        if let Err(err) = &result {
            tracing::error!(error = %err, "Invocation failed");
        }
        let result = result.and_then(|response| shutdown.map(|()| response));
        (result, Some(interface_elapsed))
    }
}
