//! Built-in echo service used by the invoke CLI.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::protocol::HttpScope;

/// A router that answers every request with a JSON description of it.
pub fn echo_router() -> Router {
    Router::new()
        .route("/", any(echo_handler))
        .route("/{*path}", any(echo_handler))
}

async fn echo_handler(
    Extension(scope): Extension<HttpScope>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": scope.path,
        "query": uri.query().unwrap_or_default(),
        "headers": headers,
        "client": scope.client.0,
        "server": { "host": scope.server.0, "port": scope.server.1 },
        "body": String::from_utf8_lossy(&body),
    }))
}
