//! Event shapes and per-invocation adapters.
//!
//! # Data Flow
//! ```text
//! raw event (serde_json::Value)
//!     → EventShape (explicit, or detected by the matchers)
//!     → api_gateway_v*.rs decode → HttpScope + request body
//!     → adapter.rs drives the application
//!     → assembler.rs + shape assembler → LambdaResponse
//! ```
//!
//! # Design Decisions
//! - The set of shapes is closed: a new shape is a new `EventShape` variant
//!   with its own decoder/assembler pair
//! - Matchers are pure and never fail; malformed input simply does not match

pub mod adapter;
pub mod api_gateway_v1;
pub mod api_gateway_v2;
pub mod assembler;
pub mod utils;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, LynaraResult};
use crate::protocol::{Application, HttpScope};

pub use adapter::HttpAdapter;
pub use api_gateway_v1::{ApiGatewayV1, ApiGatewayV1Response};
pub use api_gateway_v2::{ApiGatewayV2, ApiGatewayV2Response};
pub use assembler::{ResponseAssembler, ResponseState};

/// Output of a decoder: the descriptor plus the one complete body.
#[derive(Debug, Clone)]
pub struct DecodedRequest {
    pub scope: HttpScope,
    pub body: Bytes,
}

/// A decoder/assembler pair for one event shape.
pub trait HttpInterface: Send + 'static {
    /// Stable identifier used in logs and metrics.
    const NAME: &'static str;

    type Assembler: ResponseAssembler;

    /// Whether `event` has this shape. Never fails.
    fn matches(event: &Value) -> bool;

    /// Build the connection descriptor and request body.
    fn decode(event: &Value, base_path: Option<&str>) -> Result<DecodedRequest, DecodeError>;
}

/// The supported event shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventShape {
    /// REST API proxy integration, payload format 1.0.
    ApiGatewayV1,
    /// HTTP API, payload format 2.0.
    ApiGatewayV2,
}

impl EventShape {
    pub const ALL: [EventShape; 2] = [EventShape::ApiGatewayV1, EventShape::ApiGatewayV2];

    pub fn name(self) -> &'static str {
        match self {
            EventShape::ApiGatewayV1 => ApiGatewayV1::NAME,
            EventShape::ApiGatewayV2 => ApiGatewayV2::NAME,
        }
    }

    pub fn matches(self, event: &Value) -> bool {
        match self {
            EventShape::ApiGatewayV1 => ApiGatewayV1::matches(event),
            EventShape::ApiGatewayV2 => ApiGatewayV2::matches(event),
        }
    }

    /// Run every matcher; exactly one must accept the event.
    pub fn detect(event: &Value) -> Result<EventShape, DecodeError> {
        let matched: Vec<EventShape> = Self::ALL
            .into_iter()
            .filter(|shape| shape.matches(event))
            .collect();

        match matched.as_slice() {
            [shape] => Ok(*shape),
            [] => Err(DecodeError::UnrecognizedEvent),
            many => Err(DecodeError::AmbiguousEvent(
                many.iter().map(|shape| shape.name()).collect(),
            )),
        }
    }
}

impl fmt::Display for EventShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the orchestrator picks the shape for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSelection {
    /// Run the matchers and fail on zero or several matches.
    #[default]
    Auto,
    ApiGatewayV1,
    ApiGatewayV2,
}

impl ShapeSelection {
    /// Resolve to a concrete shape for `event`.
    pub fn resolve(self, event: &Value) -> Result<EventShape, DecodeError> {
        match self {
            ShapeSelection::Auto => EventShape::detect(event),
            ShapeSelection::ApiGatewayV1 => Ok(EventShape::ApiGatewayV1),
            ShapeSelection::ApiGatewayV2 => Ok(EventShape::ApiGatewayV2),
        }
    }
}

impl From<EventShape> for ShapeSelection {
    fn from(shape: EventShape) -> Self {
        match shape {
            EventShape::ApiGatewayV1 => ShapeSelection::ApiGatewayV1,
            EventShape::ApiGatewayV2 => ShapeSelection::ApiGatewayV2,
        }
    }
}

impl FromStr for ShapeSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ShapeSelection::Auto),
            "api_gateway_v1" | "v1" => Ok(ShapeSelection::ApiGatewayV1),
            "api_gateway_v2" | "v2" => Ok(ShapeSelection::ApiGatewayV2),
            other => Err(format!("unknown event shape: {}", other)),
        }
    }
}

/// Response object returned to the cloud runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LambdaResponse {
    V1(ApiGatewayV1Response),
    V2(ApiGatewayV2Response),
}

impl LambdaResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            LambdaResponse::V1(r) => r.status_code,
            LambdaResponse::V2(r) => r.status_code,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            LambdaResponse::V1(r) => &r.body,
            LambdaResponse::V2(r) => &r.body,
        }
    }
}

/// A constructed, not yet run, adapter for one of the known shapes.
pub enum InvocationAdapter {
    ApiGatewayV1(HttpAdapter<ApiGatewayV1>),
    ApiGatewayV2(HttpAdapter<ApiGatewayV2>),
}

impl InvocationAdapter {
    /// Decode `event` as `shape`.
    pub fn new(
        shape: EventShape,
        app: Arc<dyn Application>,
        event: &Value,
        context: Option<Value>,
        base_path: Option<&str>,
    ) -> Result<Self, DecodeError> {
        Ok(match shape {
            EventShape::ApiGatewayV1 => {
                InvocationAdapter::ApiGatewayV1(HttpAdapter::new(app, event, context, base_path)?)
            }
            EventShape::ApiGatewayV2 => {
                InvocationAdapter::ApiGatewayV2(HttpAdapter::new(app, event, context, base_path)?)
            }
        })
    }

    pub fn shape(&self) -> EventShape {
        match self {
            InvocationAdapter::ApiGatewayV1(_) => EventShape::ApiGatewayV1,
            InvocationAdapter::ApiGatewayV2(_) => EventShape::ApiGatewayV2,
        }
    }

    pub fn scope(&self) -> &HttpScope {
        match self {
            InvocationAdapter::ApiGatewayV1(a) => a.scope(),
            InvocationAdapter::ApiGatewayV2(a) => a.scope(),
        }
    }

    pub fn context(&self) -> Option<&Value> {
        match self {
            InvocationAdapter::ApiGatewayV1(a) => a.context(),
            InvocationAdapter::ApiGatewayV2(a) => a.context(),
        }
    }

    /// Run the application and wrap the shape's response.
    pub async fn call(self) -> LynaraResult<LambdaResponse> {
        match self {
            InvocationAdapter::ApiGatewayV1(a) => a.call().await.map(LambdaResponse::V1),
            InvocationAdapter::ApiGatewayV2(a) => a.call().await.map(LambdaResponse::V2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect() {
        let v2 = json!({"version": "2.0", "requestContext": {}});
        let v1 = json!({"resource": "/", "requestContext": {}});
        assert_eq!(EventShape::detect(&v2).unwrap(), EventShape::ApiGatewayV2);
        assert_eq!(EventShape::detect(&v1).unwrap(), EventShape::ApiGatewayV1);
    }

    #[test]
    fn test_detect_rejects_unmatched_and_ambiguous() {
        assert!(matches!(
            EventShape::detect(&json!({"requestContext": {}})),
            Err(DecodeError::UnrecognizedEvent)
        ));
        let both = json!({"version": "2.0", "resource": "/", "requestContext": {}});
        match EventShape::detect(&both) {
            Err(DecodeError::AmbiguousEvent(names)) => {
                assert_eq!(names, vec!["api_gateway_v1", "api_gateway_v2"])
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_selection_is_not_second_guessed() {
        let v2 = json!({"version": "2.0", "requestContext": {}});
        assert_eq!(
            ShapeSelection::ApiGatewayV1.resolve(&v2).unwrap(),
            EventShape::ApiGatewayV1
        );
    }

    #[test]
    fn test_shape_selection_from_str() {
        assert_eq!("auto".parse::<ShapeSelection>().unwrap(), ShapeSelection::Auto);
        assert_eq!("V2".parse::<ShapeSelection>().unwrap(), ShapeSelection::ApiGatewayV2);
        assert!("v3".parse::<ShapeSelection>().is_err());
    }
}
