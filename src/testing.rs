//! Test doubles shared by the unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::http::{OutboundRequest, Transport, UpstreamError};
use crate::resolver::GatewayContext;

pub(crate) const VERIFY_URL: &str = "http://35.193.172.140:3005/login/validTok";

/// Transport answering from a fixed route table and recording every call.
/// Unknown routes answer 404.
#[derive(Default)]
pub(crate) struct StubTransport {
    routes: Vec<(Method, String, Result<Value, UpstreamError>)>,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, method: Method, url: &str, body: Value) -> Self {
        self.routes.push((method, url.to_string(), Ok(body)));
        self
    }

    pub(crate) fn fail(mut self, method: Method, url: &str, err: UpstreamError) -> Self {
        self.routes.push((method, url.to_string(), Err(err)));
        self
    }

    /// Accept `validTok` with identity 7
    pub(crate) fn with_valid_token(self) -> Self {
        self.on(Method::GET, VERIFY_URL, json!({"id": 7, "date": "2024-05-01"}))
    }

    pub(crate) fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than token verification
    pub(crate) fn backend_calls(&self) -> Vec<OutboundRequest> {
        self.calls()
            .into_iter()
            .filter(|c| !c.url.contains("/login"))
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Value, UpstreamError> {
        self.calls.lock().unwrap().push(request.clone());
        self.routes
            .iter()
            .find(|(method, url, _)| *method == request.method && *url == request.url)
            .map(|(_, _, outcome)| outcome.clone())
            .unwrap_or(Err(UpstreamError::Status {
                status: 404,
                body: Value::Null,
            }))
    }
}

/// Gateway wired to the stub with default configuration
pub(crate) fn gateway(stub: Arc<StubTransport>) -> Arc<GatewayContext> {
    Arc::new(GatewayContext::new(GatewayConfig::from_lookup(|_| None).unwrap(), stub))
}
