//! Shared fixtures and scripted applications for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use tracing::subscriber::DefaultGuard;

use lynara::{AppError, Application, Emit, Message, Receive, Scope};

pub fn v1_event() -> Value {
    serde_json::from_str(include_str!("../fixtures/api_gw_v1.json")).unwrap()
}

pub fn v2_event() -> Value {
    serde_json::from_str(include_str!("../fixtures/api_gw_v2.json")).unwrap()
}

/// Answers 200 with the request body; rejects the lifespan scope.
pub struct EchoApp;

#[async_trait]
impl Application for EchoApp {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError> {
        if let Scope::Lifespan(_) = scope {
            return Err("lifespan not supported".into());
        }
        let body = match receive.receive().await? {
            Message::HttpRequest { body, .. } => body,
            other => return Err(format!("unexpected {}", other.kind()).into()),
        };
        send.send(Message::response_start(200, [("content-type", "text/plain")]))
            .await?;
        send.send(Message::response_body(body, false)).await?;
        Ok(())
    }
}

/// What a [`LifespanApp`] answers to each handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Complete,
    Fail,
    /// Return from the call without answering.
    Return,
}

/// Implements both scopes and records every step it takes.
#[derive(Clone)]
pub struct LifespanApp {
    pub startup: Answer,
    pub shutdown: Answer,
    pub journal: Arc<Mutex<Vec<String>>>,
}

impl LifespanApp {
    pub fn new(startup: Answer, shutdown: Answer) -> Self {
        Self {
            startup,
            shutdown,
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    fn record(&self, entry: &str) {
        self.journal.lock().unwrap().push(entry.to_string());
    }
}

#[async_trait]
impl Application for LifespanApp {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError> {
        if let Scope::Http(_) = scope {
            receive.receive().await?;
            self.record("http");
            send.send(Message::response_start(204, Vec::<(&str, &str)>::new()))
                .await?;
            send.send(Message::response_body("", false)).await?;
            return Ok(());
        }

        loop {
            match receive.receive().await? {
                Message::LifespanStartup => {
                    self.record("startup");
                    match self.startup {
                        Answer::Complete => send.send(Message::LifespanStartupComplete).await?,
                        Answer::Fail => {
                            send.send(Message::LifespanStartupFailed {
                                message: "database unreachable".to_string(),
                            })
                            .await?
                        }
                        Answer::Return => return Ok(()),
                    }
                }
                Message::LifespanShutdown => {
                    self.record("shutdown");
                    match self.shutdown {
                        Answer::Complete => send.send(Message::LifespanShutdownComplete).await?,
                        Answer::Fail => {
                            send.send(Message::LifespanShutdownFailed {
                                message: "flush failed".to_string(),
                            })
                            .await?
                        }
                        Answer::Return => {}
                    }
                    return Ok(());
                }
                other => return Err(format!("unexpected {}", other.kind()).into()),
            }
        }
    }
}

/// Sends a fixed list of messages, ignoring every send error.
pub struct ScriptedApp {
    pub messages: Vec<Message>,
}

#[async_trait]
impl Application for ScriptedApp {
    async fn call(
        &self,
        _scope: Scope,
        _receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError> {
        for message in &self.messages {
            let _ = send.send(message.clone()).await;
        }
        Ok(())
    }
}

/// Log sink installed as the thread's default subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Capture INFO and above on the current thread until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
