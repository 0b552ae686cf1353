//! `Application` implementation over a `tower::Service`.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use tower::{Service, ServiceExt};

use crate::error::AppError;
use crate::http::request::{build_request, read_body};
use crate::http::response::emit_response;
use crate::protocol::{Application, Emit, Receive, Scope};

/// Runs an HTTP service for each `http` scope.
///
/// Every invocation works on a fresh clone of the service, matching how
/// `axum::serve` hands a router to each connection.
#[derive(Debug, Clone)]
pub struct TowerApplication<S> {
    service: S,
}

impl<S> TowerApplication<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn into_inner(self) -> S {
        self.service
    }
}

#[async_trait]
impl<S> Application for TowerApplication<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<AppError>,
    S::Future: Send,
{
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn Receive,
        send: &mut dyn Emit,
    ) -> Result<(), AppError> {
        let scope = match scope {
            Scope::Http(scope) => scope,
            other => {
                return Err(format!("{} scope is not supported", other.kind()).into());
            }
        };

        let body = read_body(receive).await?;
        let request = build_request(&scope, body)?;
        tracing::debug!(method = %request.method(), uri = %request.uri(), "Dispatching to service");

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(Into::<AppError>::into)?;

        emit_response(response, send).await
    }
}
