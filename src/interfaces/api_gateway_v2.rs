//! API Gateway HTTP API (payload format 2.0).
//!
//! Request: `requestContext.http` carries method, path and source IP; the
//! query string arrives pre-encoded in `rawQueryString`.
//!
//! Response: `set-cookie` headers move into a separate `cookies` list, every
//! other header lands in a flat single-valued map.

use std::collections::BTreeMap;

use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::interfaces::assembler::ResponseAssembler;
use crate::interfaces::utils::{
    decode_body, get_scheme, get_server, lowercase_headers, strip_base_path, to_header_pairs,
};
use crate::interfaces::{DecodedRequest, HttpInterface};
use crate::protocol::{HttpScope, ProtocolVersion};

/// Marker type for the 2.0 payload format.
#[derive(Debug, Clone, Copy)]
pub struct ApiGatewayV2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayV2Event {
    #[serde(default)]
    raw_query_string: Option<String>,
    #[serde(default)]
    cookies: Option<Vec<String>>,
    #[serde(default)]
    headers: Option<IndexMap<String, String>>,
    request_context: RequestContext,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RequestContext {
    http: HttpContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpContext {
    method: String,
    path: String,
    source_ip: String,
}

/// Response object for the 2.0 payload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Response {
    pub cookies: Vec<String>,
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpInterface for ApiGatewayV2 {
    const NAME: &'static str = "api_gateway_v2";

    type Assembler = ApiGatewayV2Assembler;

    fn matches(event: &Value) -> bool {
        event.get("version").and_then(Value::as_str) == Some("2.0")
            && event.get("requestContext").is_some_and(Value::is_object)
    }

    fn decode(event: &Value, base_path: Option<&str>) -> Result<DecodedRequest, DecodeError> {
        let event: ApiGatewayV2Event = serde_json::from_value(event.clone())?;

        let mut headers = lowercase_headers(event.headers.iter().flatten());
        if let Some(cookies) = event.cookies.filter(|c| !c.is_empty()) {
            headers
                .entry("cookie".to_string())
                .or_insert_with(|| cookies.join("; "));
        }

        let http = event.request_context.http;
        let body = decode_body(
            event.body.as_deref(),
            event.is_base64_encoded.unwrap_or(false),
        )?;

        let scope = HttpScope {
            protocol: ProtocolVersion::HTTP,
            http_version: "1.1",
            method: http.method,
            scheme: get_scheme(&headers),
            path: strip_base_path(&http.path, base_path),
            query_string: Bytes::from(event.raw_query_string.unwrap_or_default()),
            root_path: String::new(),
            headers: to_header_pairs(&headers),
            client: (Some(http.source_ip), 0),
            server: get_server(&headers)?,
        };

        Ok(DecodedRequest { scope, body })
    }
}

/// Splits `set-cookie` out of the header list.
#[derive(Debug)]
pub struct ApiGatewayV2Assembler {
    status_code: u16,
    cookies: Vec<String>,
    headers: BTreeMap<String, String>,
}

impl Default for ApiGatewayV2Assembler {
    fn default() -> Self {
        Self {
            status_code: 200,
            cookies: Vec::new(),
            headers: BTreeMap::new(),
        }
    }
}

impl ResponseAssembler for ApiGatewayV2Assembler {
    type Response = ApiGatewayV2Response;

    fn on_start(&mut self, status: u16, headers: Vec<(String, String)>) {
        self.status_code = status;
        for (key, value) in headers {
            if key.eq_ignore_ascii_case("set-cookie") {
                self.cookies.push(value);
                continue;
            }
            // The 2.0 format has no multi-value map; repeated headers are comma-joined.
            self.headers
                .entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
    }

    fn finish(self, body: String) -> ApiGatewayV2Response {
        ApiGatewayV2Response {
            cookies: self.cookies,
            is_base64_encoded: false,
            status_code: self.status_code,
            body,
            headers: self.headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "version": "2.0",
            "rawPath": "/path/to/resource",
            "rawQueryString": "parameter1=value1&parameter1=value2",
            "cookies": ["cookie1", "cookie2"],
            "headers": {"Header1": "value1", "Host": "example.com:8443"},
            "requestContext": {
                "http": {"method": "POST", "path": "/path/to/resource", "sourceIp": "192.168.0.1/32"}
            },
            "body": "Hello",
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_matches() {
        assert!(ApiGatewayV2::matches(&event()));
        assert!(!ApiGatewayV2::matches(&json!({"version": "1.0", "requestContext": {}})));
        assert!(!ApiGatewayV2::matches(&json!({"version": "2.0"})));
        assert!(!ApiGatewayV2::matches(&json!("not an object")));
    }

    #[test]
    fn test_decode() {
        let decoded = ApiGatewayV2::decode(&event(), Some("/path/to")).unwrap();
        let scope = decoded.scope;
        assert_eq!(scope.method, "POST");
        assert_eq!(scope.path, "/resource");
        assert_eq!(scope.query_string, Bytes::from_static(b"parameter1=value1&parameter1=value2"));
        assert_eq!(scope.server, ("example.com".to_string(), 8443));
        assert_eq!(scope.client, (Some("192.168.0.1/32".to_string()), 0));
        assert_eq!(scope.scheme, "https");
        assert_eq!(scope.header("header1"), Some(&b"value1"[..]));
        assert_eq!(scope.header("cookie"), Some(&b"cookie1; cookie2"[..]));
        assert_eq!(decoded.body, Bytes::from_static(b"Hello"));
    }

    #[test]
    fn test_decode_missing_request_context() {
        let mut raw = event();
        raw.as_object_mut().unwrap().remove("requestContext");
        assert!(matches!(
            ApiGatewayV2::decode(&raw, None),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_assembler_splits_cookies() {
        let mut assembler = ApiGatewayV2Assembler::default();
        assembler.on_start(
            200,
            vec![
                ("Set-Cookie".into(), "a=1".into()),
                ("content-type".into(), "application/json".into()),
                ("set-cookie".into(), "b=2".into()),
            ],
        );
        let response = assembler.finish("{}".into());
        assert_eq!(response.cookies, vec!["a=1", "b=2"]);
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.headers["content-type"], "application/json");
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = ApiGatewayV2Assembler::default().finish("ok".into());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"cookies": [], "isBase64Encoded": false, "statusCode": 200, "body": "ok", "headers": {}})
        );
    }
}
