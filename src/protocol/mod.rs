//! Application calling convention.
//!
//! # Data Flow
//! ```text
//! adapter                          application
//!   scope ───────────────────────▶ call(scope, receive, send)
//!   queue ── receive() ──────────▶ input chunks
//!   assembler ◀──────── send() ─── output chunks
//! ```
//!
//! # Design Decisions
//! - One closed message enum for both channels; each channel rejects the
//!   variants it does not own
//! - Receive/Emit are borrowed for the duration of the call, so the adapter
//!   keeps ownership of its queue and response state

pub mod app;
pub mod message;
pub mod scope;

pub use app::{Application, Emit, Receive};
pub use message::{Headers, Message};
pub use scope::{HttpScope, LifespanScope, ProtocolVersion, Scope};
