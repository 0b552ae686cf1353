//! Rebuilding an `http::Request` from the connection descriptor.

use axum::body::Body;
use axum::http::{Request, Version};
use bytes::{Bytes, BytesMut};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{AppError, LynaraError};
use crate::protocol::{HttpScope, Message, Receive};

/// Characters that cannot appear raw in a URI path.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Drain request chunks until the final one or a disconnect.
pub async fn read_body(receive: &mut dyn Receive) -> Result<Bytes, AppError> {
    let mut body = BytesMut::new();
    loop {
        match receive.receive().await? {
            Message::HttpRequest {
                body: chunk,
                more_body,
            } => {
                body.extend_from_slice(&chunk);
                if !more_body {
                    break;
                }
            }
            Message::HttpDisconnect => break,
            other => {
                return Err(LynaraError::Protocol(format!(
                    "Unexpected message while reading request: {}",
                    other.kind()
                ))
                .into())
            }
        }
    }
    Ok(body.freeze())
}

/// Request target: re-encoded path plus the raw query string.
pub fn request_uri(scope: &HttpScope) -> Result<String, AppError> {
    let mut uri = utf8_percent_encode(&scope.path, PATH).to_string();
    if !scope.query_string.is_empty() {
        uri.push('?');
        uri.push_str(std::str::from_utf8(&scope.query_string)?);
    }
    Ok(uri)
}

fn version(scope: &HttpScope) -> Version {
    match scope.http_version {
        "1.0" => Version::HTTP_10,
        "2" | "2.0" => Version::HTTP_2,
        _ => Version::HTTP_11,
    }
}

/// Build the request the service sees. The scope rides along as an extension.
pub fn build_request(scope: &HttpScope, body: Bytes) -> Result<Request<Body>, AppError> {
    let mut builder = Request::builder()
        .method(scope.method.as_str())
        .uri(request_uri(scope)?)
        .version(version(scope));

    for (name, value) in &scope.headers {
        builder = builder.header(&name[..], &value[..]);
    }

    let mut request = builder.body(Body::from(body))?;
    request.extensions_mut().insert(scope.clone());
    Ok(request)
}
