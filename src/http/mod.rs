//! Hosting `tower` services (including `axum::Router`) as applications.
//!
//! # Data Flow
//! ```text
//! HttpScope + received body
//!     → request.rs (rebuild an http::Request, scope attached as extension)
//!     → service.rs (ServiceExt::oneshot on a clone of the service)
//!     → response.rs (collect body, emit start + one final body chunk)
//! ```
//!
//! # Design Decisions
//! - Responses are buffered in full; the event model returns one body anyway
//! - The lifespan scope is rejected, so `Auto` mode skips the handshake

pub mod echo;
pub mod request;
pub mod response;
pub mod service;

pub use echo::echo_router;
pub use service::TowerApplication;
