//! Lynara: run HTTP applications behind API Gateway function events.

pub mod config;
pub mod error;
pub mod http;
pub mod interfaces;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod runner;

pub use config::LynaraConfig;
pub use error::{AppError, DecodeError, LynaraError, LynaraResult};
pub use http::TowerApplication;
pub use interfaces::{EventShape, LambdaResponse, ShapeSelection};
pub use lifecycle::LifecycleMode;
pub use protocol::{Application, Emit, HttpScope, Message, Receive, Scope};
pub use runner::Lynara;
