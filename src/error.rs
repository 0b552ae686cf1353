//! Error taxonomy for the adapter.
//!
//! # Design Decisions
//! - Decoding failures are kept in their own enum so callers can tell a
//!   malformed event apart from a misbehaving application
//! - Nothing is retried; every variant is fatal to the current invocation
//!   except the tolerated `Auto`-mode lifecycle case, which never surfaces

use thiserror::Error;

/// Opaque error returned by a hosted application.
pub type AppError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while turning a raw event into a scope and request body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The event does not deserialize into the selected shape (missing or
    /// mistyped fields).
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body was flagged base64 but does not decode.
    #[error("Invalid base64 body: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// A port in the `host` or `x-forwarded-port` header is not a number.
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// No known shape matches the event.
    #[error("Event does not match any supported shape")]
    UnrecognizedEvent,

    /// More than one shape matches the event.
    #[error("Event matches more than one shape: {0:?}")]
    AmbiguousEvent(Vec<&'static str>),
}

/// Top-level error for an invocation or lifecycle phase.
#[derive(Debug, Error)]
pub enum LynaraError {
    /// The raw event could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The application emitted a message the current channel does not accept.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The application signalled startup/shutdown failure or broke the handshake.
    #[error("Lifecycle failure: {0}")]
    LifecycleFailure(String),

    /// The adapter was used in a way the configuration forbids.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// The receive side was drained after the invocation ended.
    #[error("Receive error: {0}")]
    Receive(String),

    /// The hosted application returned an error.
    #[error("Application error: {0}")]
    Application(#[source] AppError),
}

/// Result type for adapter operations.
pub type LynaraResult<T> = Result<T, LynaraError>;

impl LynaraError {
    /// Recover a `LynaraError` that travelled through an application as an `AppError`.
    ///
    /// Applications usually propagate `receive`/`send` failures with `?`,
    /// which boxes them; unboxing keeps protocol violations recognisable.
    pub fn from_app(err: AppError) -> Self {
        match err.downcast::<LynaraError>() {
            Ok(inner) => *inner,
            Err(other) => LynaraError::Application(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LynaraError::Protocol("Unknown message type: lifespan.startup".into());
        assert_eq!(
            err.to_string(),
            "Protocol error: Unknown message type: lifespan.startup"
        );

        let err = LynaraError::from(DecodeError::InvalidPort("http".into()));
        assert_eq!(err.to_string(), "Invalid port: http");
    }

    #[test]
    fn test_from_app_unboxes_adapter_errors() {
        let boxed: AppError = Box::new(LynaraError::Protocol("bad".into()));
        assert!(matches!(LynaraError::from_app(boxed), LynaraError::Protocol(_)));

        let boxed: AppError = "boom".into();
        match LynaraError::from_app(boxed) {
            LynaraError::Application(inner) => assert_eq!(inner.to_string(), "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
