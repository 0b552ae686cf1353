//! API Gateway REST API proxy integration (payload format 1.0).
//!
//! Same event as `sam local generate-event apigateway aws-proxy`.
//!
//! # Design Decisions
//! - `multiValueHeaders` override `headers` for the same name, values joined with `", "`
//! - The query string is rebuilt from the parameter maps; the multi-value map wins
//! - Response headers seen twice move into `multiValueHeaders`

use std::collections::BTreeMap;

use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::interfaces::assembler::ResponseAssembler;
use crate::interfaces::utils::{
    decode_body, encode_query, get_scheme, get_server, lowercase_headers, strip_base_path,
    to_header_pairs, HeaderMap,
};
use crate::interfaces::{DecodedRequest, HttpInterface};
use crate::protocol::{HttpScope, ProtocolVersion};

/// Marker type for the 1.0 payload format.
#[derive(Debug, Clone, Copy)]
pub struct ApiGatewayV1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayV1Event {
    http_method: String,
    path: String,
    #[serde(default)]
    headers: Option<IndexMap<String, String>>,
    #[serde(default)]
    multi_value_headers: Option<IndexMap<String, Option<Vec<String>>>>,
    #[serde(default)]
    query_string_parameters: Option<IndexMap<String, String>>,
    #[serde(default)]
    multi_value_query_string_parameters: Option<IndexMap<String, Vec<String>>>,
    request_context: RequestContext,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RequestContext {
    #[serde(default)]
    identity: Option<Identity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    #[serde(default)]
    source_ip: Option<String>,
}

impl ApiGatewayV1Event {
    fn merged_headers(&self) -> HeaderMap {
        let mut headers = lowercase_headers(self.headers.iter().flatten());
        for (key, values) in self.multi_value_headers.iter().flatten() {
            let joined = values.as_ref().map(|v| v.join(", ")).unwrap_or_default();
            headers.insert(key.to_lowercase(), joined);
        }
        headers
    }

    fn query_string(&self) -> Bytes {
        match (
            &self.multi_value_query_string_parameters,
            &self.query_string_parameters,
        ) {
            (Some(multi), _) if !multi.is_empty() => {
                encode_query(multi.iter().map(|(k, v)| (k, v.iter())))
            }
            (_, Some(single)) if !single.is_empty() => {
                encode_query(single.iter().map(|(k, v)| (k, std::iter::once(v))))
            }
            _ => Bytes::new(),
        }
    }
}

/// Response object for the 1.0 payload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV1Response {
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl HttpInterface for ApiGatewayV1 {
    const NAME: &'static str = "api_gateway_v1";

    type Assembler = ApiGatewayV1Assembler;

    fn matches(event: &Value) -> bool {
        event.get("resource").is_some()
            && event.get("requestContext").is_some_and(Value::is_object)
    }

    fn decode(event: &Value, base_path: Option<&str>) -> Result<DecodedRequest, DecodeError> {
        let event: ApiGatewayV1Event = serde_json::from_value(event.clone())?;
        let headers = event.merged_headers();
        let body = decode_body(
            event.body.as_deref(),
            event.is_base64_encoded.unwrap_or(false),
        )?;

        let scope = HttpScope {
            protocol: ProtocolVersion::HTTP,
            http_version: "1.1",
            method: event.http_method.clone(),
            scheme: get_scheme(&headers),
            path: strip_base_path(&event.path, base_path),
            query_string: event.query_string(),
            root_path: String::new(),
            headers: to_header_pairs(&headers),
            client: (
                event
                    .request_context
                    .identity
                    .and_then(|identity| identity.source_ip),
                0,
            ),
            server: get_server(&headers)?,
        };

        Ok(DecodedRequest { scope, body })
    }
}

/// Splits response headers into single- and multi-valued maps.
#[derive(Debug)]
pub struct ApiGatewayV1Assembler {
    status_code: u16,
    headers: BTreeMap<String, String>,
    multi_value_headers: BTreeMap<String, Vec<String>>,
}

impl Default for ApiGatewayV1Assembler {
    fn default() -> Self {
        Self {
            status_code: 200,
            headers: BTreeMap::new(),
            multi_value_headers: BTreeMap::new(),
        }
    }
}

impl ResponseAssembler for ApiGatewayV1Assembler {
    type Response = ApiGatewayV1Response;

    fn on_start(&mut self, status: u16, headers: Vec<(String, String)>) {
        self.status_code = status;
        for (key, value) in headers {
            let key = key.to_lowercase();
            if let Some(values) = self.multi_value_headers.get_mut(&key) {
                values.push(value);
            } else if let Some(first) = self.headers.remove(&key) {
                self.multi_value_headers.insert(key, vec![first, value]);
            } else {
                self.headers.insert(key, value);
            }
        }
    }

    fn finish(self, body: String) -> ApiGatewayV1Response {
        ApiGatewayV1Response {
            is_base64_encoded: false,
            status_code: self.status_code,
            headers: self.headers,
            multi_value_headers: self.multi_value_headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "resource": "/{proxy+}",
            "path": "/dev/fastapi/",
            "httpMethod": "GET",
            "headers": {"Header1": "value1", "Header2": "value2", "X-Forwarded-Port": "443"},
            "multiValueHeaders": {"Header2": ["value2", "value3"], "Header4": null},
            "queryStringParameters": {"parameter1": "value1"},
            "multiValueQueryStringParameters": {"parameter1": ["value1", "value2"]},
            "requestContext": {"identity": {"sourceIp": "192.0.2.1"}},
            "body": null,
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_matches() {
        assert!(ApiGatewayV1::matches(&event()));
        assert!(!ApiGatewayV1::matches(&json!({"version": "2.0", "requestContext": {}})));
        assert!(!ApiGatewayV1::matches(&json!({"resource": "/"})));
        assert!(!ApiGatewayV1::matches(&json!(null)));
    }

    #[test]
    fn test_decode() {
        let decoded = ApiGatewayV1::decode(&event(), Some("/dev")).unwrap();
        let scope = decoded.scope;
        assert_eq!(scope.method, "GET");
        assert_eq!(scope.path, "/fastapi/");
        assert_eq!(scope.query_string, Bytes::from_static(b"parameter1=value1&parameter1=value2"));
        assert_eq!(scope.header("header2"), Some(&b"value2, value3"[..]));
        assert_eq!(scope.header("header4"), Some(&b""[..]));
        assert_eq!(scope.server, ("lynara".to_string(), 443));
        assert_eq!(scope.client, (Some("192.0.2.1".to_string()), 0));
        assert!(decoded.body.is_empty());
    }

    #[test]
    fn test_query_string_falls_back_to_single_values() {
        let mut raw = event();
        raw["multiValueQueryStringParameters"] = Value::Null;
        let decoded = ApiGatewayV1::decode(&raw, None).unwrap();
        assert_eq!(decoded.scope.query_string, Bytes::from_static(b"parameter1=value1"));

        raw["queryStringParameters"] = json!({});
        let decoded = ApiGatewayV1::decode(&raw, None).unwrap();
        assert!(decoded.scope.query_string.is_empty());
    }

    #[test]
    fn test_decode_keeps_event_order() {
        let mut raw = event();
        raw["headers"] = json!({"X-Zeta": "1", "Accept": "*/*", "Host": "example.com"});
        raw["multiValueHeaders"] = json!({"Accept": ["text/html", "*/*"], "Cache-Control": ["no-cache"]});
        raw["multiValueQueryStringParameters"] = json!({"zeta": ["1"], "alpha": ["2", "3"]});

        let scope = ApiGatewayV1::decode(&raw, None).unwrap().scope;
        assert_eq!(scope.query_string, Bytes::from_static(b"zeta=1&alpha=2&alpha=3"));

        let names: Vec<&[u8]> = scope.headers.iter().map(|(k, _)| k.as_ref()).collect();
        assert_eq!(
            names,
            vec![&b"x-zeta"[..], &b"accept"[..], &b"host"[..], &b"cache-control"[..]]
        );
        assert_eq!(scope.header("accept"), Some(&b"text/html, */*"[..]));
    }

    #[test]
    fn test_missing_identity_leaves_client_empty() {
        let mut raw = event();
        raw["requestContext"] = json!({});
        let decoded = ApiGatewayV1::decode(&raw, None).unwrap();
        assert_eq!(decoded.scope.client, (None, 0));
    }

    #[test]
    fn test_assembler_promotes_repeated_headers() {
        let mut assembler = ApiGatewayV1Assembler::default();
        assembler.on_start(
            200,
            vec![
                ("Content-Type".into(), "application/json".into()),
                ("set-cookie".into(), "a=1".into()),
                ("Set-Cookie".into(), "b=2".into()),
                ("set-cookie".into(), "c=3".into()),
            ],
        );
        let response = assembler.finish(String::new());
        assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));
        assert!(!response.headers.contains_key("set-cookie"));
        assert_eq!(response.multi_value_headers["set-cookie"], vec!["a=1", "b=2", "c=3"]);
    }
}
