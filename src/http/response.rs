//! Turning an `http::Response` into outgoing messages.

use axum::body::Body;
use axum::http::Response;
use bytes::Bytes;

use crate::error::AppError;
use crate::protocol::{Emit, Headers, Message};

fn headers(response: &Response<Body>) -> Headers {
    response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                Bytes::copy_from_slice(name.as_str().as_bytes()),
                Bytes::copy_from_slice(value.as_bytes()),
            )
        })
        .collect()
}

/// Emit the start message and the whole body as one final chunk.
pub async fn emit_response(response: Response<Body>, send: &mut dyn Emit) -> Result<(), AppError> {
    let status = response.status().as_u16();
    let headers = headers(&response);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

    send.send(Message::HttpResponseStart { status, headers }).await?;
    send.send(Message::response_body(body, false)).await?;
    Ok(())
}
