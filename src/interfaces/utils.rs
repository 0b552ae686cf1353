//! Helpers shared by the event decoders.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::error::DecodeError;
use crate::protocol::Headers;

/// Lower-cased header names mapped to values, in event order.
pub type HeaderMap = IndexMap<String, String>;

/// Server name reported when the event carries no `host` header.
pub const DEFAULT_SERVER_NAME: &str = "lynara";

/// Server port reported when neither `host` nor `x-forwarded-port` carry one.
pub const DEFAULT_SERVER_PORT: u16 = 80;

/// Scheme reported when `x-forwarded-proto` is absent.
pub const DEFAULT_SCHEME: &str = "https";

/// Resolve the server `(host, port)` tuple from lower-cased headers.
pub fn get_server(headers: &HeaderMap) -> Result<(String, u16), DecodeError> {
    let host = headers
        .get("host")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SERVER_NAME);

    let parts: Vec<&str> = host.split(':').collect();
    if let [name, port] = parts.as_slice() {
        return Ok((name.to_string(), parse_port(port)?));
    }

    let port = match headers.get("x-forwarded-port") {
        Some(port) => parse_port(port)?,
        None => DEFAULT_SERVER_PORT,
    };
    Ok((host.to_string(), port))
}

fn parse_port(raw: &str) -> Result<u16, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidPort(raw.to_string()))
}

/// Strip a deployment base path from `path` and percent-decode the rest.
///
/// The base path is normalised to a single leading slash; `/` or an empty
/// base path disables stripping.
pub fn strip_base_path(path: &str, base_path: Option<&str>) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let normalized = match base_path {
        Some(base) if !base.is_empty() && base != "/" => {
            format!("/{}", base.trim_start_matches('/'))
        }
        _ => String::new(),
    };

    let stripped = path.strip_prefix(normalized.as_str()).unwrap_or(path);
    if stripped.is_empty() {
        return "/".to_string();
    }

    percent_decode_str(stripped).decode_utf8_lossy().into_owned()
}

/// Turn the event body into request bytes.
pub fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> Result<Bytes, DecodeError> {
    let body = match body {
        Some(body) if !body.is_empty() => body,
        _ => return Ok(Bytes::new()),
    };

    if is_base64_encoded {
        let compact: Vec<u8> = body
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Ok(Bytes::from(STANDARD.decode(compact)?))
    } else {
        Ok(Bytes::copy_from_slice(body.as_bytes()))
    }
}

/// Form-encode query parameters, repeating the key for every value.
pub fn encode_query<'a, I, V>(params: I) -> Bytes
where
    I: IntoIterator<Item = (&'a String, V)>,
    V: IntoIterator<Item = &'a String>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in params {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    Bytes::from(serializer.finish())
}

/// Lower-case header names, keeping event order.
///
/// Names that collide after folding keep the first position and the last value.
pub fn lowercase_headers<'a, I>(headers: I) -> HeaderMap
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    headers
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect()
}

/// Convert a header map into protocol header pairs.
pub fn to_header_pairs(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .map(|(k, v)| {
            (
                Bytes::copy_from_slice(k.as_bytes()),
                Bytes::copy_from_slice(v.as_bytes()),
            )
        })
        .collect()
}

/// Scheme from `x-forwarded-proto`, defaulting to https.
pub fn get_scheme(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-proto")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SCHEME.to_string())
}
