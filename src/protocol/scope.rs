//! Connection descriptors handed to the application.

use std::collections::HashMap;

use bytes::Bytes;

use crate::protocol::message::Headers;

/// Protocol version metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub version: &'static str,
    pub spec_version: &'static str,
}

impl ProtocolVersion {
    pub const HTTP: ProtocolVersion = ProtocolVersion {
        version: "3.0",
        spec_version: "2.3",
    };

    pub const LIFESPAN: ProtocolVersion = ProtocolVersion {
        version: "3.0",
        spec_version: "1.0",
    };
}

/// Immutable per-invocation descriptor for an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpScope {
    pub protocol: ProtocolVersion,
    pub http_version: &'static str,
    pub method: String,
    pub scheme: String,
    /// Base path stripped and percent-decoded.
    pub path: String,
    pub query_string: Bytes,
    pub root_path: String,
    /// Lower-cased names, in event order.
    pub headers: Headers,
    /// Source IP and port. The event model never carries a remote port.
    pub client: (Option<String>, u16),
    pub server: (String, u16),
}

impl HttpScope {
    /// First value of a header, by lower-case name.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k.as_ref() == name.as_bytes())
            .map(|(_, v)| v.as_ref())
    }
}

/// Descriptor for the one-time startup/shutdown handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct LifespanScope {
    pub protocol: ProtocolVersion,
    /// Free-form state owned by the application.
    pub state: HashMap<String, serde_json::Value>,
}

impl Default for LifespanScope {
    fn default() -> Self {
        Self {
            protocol: ProtocolVersion::LIFESPAN,
            state: HashMap::new(),
        }
    }
}

/// Which conversation the application is being invoked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    Http(HttpScope),
    Lifespan(LifespanScope),
}

impl Scope {
    /// Wire name of the scope type.
    pub fn kind(&self) -> &'static str {
        match self {
            Scope::Http(_) => "http",
            Scope::Lifespan(_) => "lifespan",
        }
    }
}
