//! HTTP client adapter for the backend microservices
//!
//! Every outbound call goes through the [`Transport`] seam. A call never
//! panics or unwinds: it produces either the backend's JSON body or an
//! [`UpstreamError`] that callers branch on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// A single request to a backend service
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    /// Resolve to `{status, headers, body}` instead of the bare body
    pub full_response: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            full_response: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_full_response(mut self) -> Self {
        self.full_response = true;
        self
    }
}

/// Failure of an outbound call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream responded with status {status}")]
    Status { status: u16, body: Value },

    #[error("Unexpected upstream payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Response body of a non-2xx reply, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            UpstreamError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The `{id, code, description}` failure description of a non-2xx reply.
    /// Any object body counts; absent members stay empty.
    pub fn structured(&self) -> Option<StructuredFailure> {
        let body = self.body()?.as_object()?;
        Some(StructuredFailure {
            id: body.get("id").filter(|id| !id.is_null()).map(display_value),
            code: body.get("code").cloned().unwrap_or(Value::Null),
            description: body.get("description").cloned().unwrap_or(Value::Null),
        })
    }
}

/// Service-reported failure description
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredFailure {
    pub id: Option<String>,
    pub code: Value,
    pub description: Value,
}

/// Outbound HTTP seam
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch one request and resolve to its JSON outcome
    async fn send(&self, request: OutboundRequest) -> Result<Value, UpstreamError>;
}

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    show_urls: bool,
}

impl HttpClient {
    /// Create a client with a total per-request timeout
    pub fn new(timeout: Duration, show_urls: bool) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::GatewayError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client, show_urls })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: OutboundRequest) -> Result<Value, UpstreamError> {
        let url = encode_uri(&request.url);
        if self.show_urls {
            tracing::info!(method = %request.method, url = %url, "upstream request");
        } else {
            tracing::debug!(method = %request.method, url = %url, "upstream request");
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        let headers: Map<String, Value> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let body = parse_body(&bytes);

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                "upstream returned an error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if request.full_response {
            return Ok(json!({
                "status": status.as_u16(),
                "headers": headers,
                "body": body,
            }));
        }

        Ok(body)
    }
}

/// Bodies that are not JSON are kept verbatim as a string
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Percent-encode a URL the way `encodeURI` does.
///
/// Unreserved characters and URI delimiters pass through; everything else is
/// escaped byte-wise, `%` included.
pub fn encode_uri(url: &str) -> String {
    const KEEP: &[u8] = b";,/?:@&=+$-_.!~*'()#";

    let mut encoded = String::with_capacity(url.len());
    for byte in url.bytes() {
        if byte.is_ascii_alphanumeric() || KEEP.contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// String form used for URL segments and messages: strings unquoted
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
