//! Bearer token verification and issuance against the identity service

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{OutboundRequest, Transport, UpstreamError};
use crate::query::is_truthy;

/// Identity behind a verified token. Never cached: every gated call
/// fetches a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdentityRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub date: Value,
}

impl IdentityRecord {
    /// Gate condition: the identity id must be truthy
    pub fn is_valid(&self) -> bool {
        is_truthy(&self.id)
    }
}

/// Token handed out by the `auth` mutation
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub token: Value,
    pub expire: Value,
}

#[derive(Deserialize)]
struct IssueResponse {
    #[serde(default)]
    token: Value,
    #[serde(default)]
    date: Value,
}

/// Client for the identity service
#[derive(Clone)]
pub struct TokenVerifier {
    http: Arc<dyn Transport>,
    base_url: String,
}

impl TokenVerifier {
    pub fn new(http: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchange a bearer token for the identity it was issued to
    pub async fn verify(&self, token: &str) -> Result<IdentityRecord, UpstreamError> {
        let url = format!("{}/login/{}", self.base_url, token);
        let body = self.http.send(OutboundRequest::get(url)).await?;
        serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Issue a token for an identity id
    pub async fn issue_token(&self, id: &Value) -> Result<IssuedToken, UpstreamError> {
        let url = format!("{}/login", self.base_url);
        let body = self
            .http
            .send(OutboundRequest::post(url, json!({ "id": id })))
            .await?;
        let issued: IssueResponse =
            serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(IssuedToken {
            token: issued.token,
            expire: issued.date,
        })
    }
}
