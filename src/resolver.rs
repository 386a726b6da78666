//! Resolver map and per-field dispatch
//!
//! A resolver is any `async fn(FieldCall) -> Result<Value>`. Domains register
//! theirs under the root field name; [`ResolverMap::merge`] combines the
//! domains and refuses duplicate names.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};

use crate::config::GatewayConfig;
use crate::http::{display_value, OutboundRequest, Transport};
use crate::token::{IdentityRecord, TokenVerifier};
use crate::{GatewayError, Result};

/// Shared, read-only state every resolver sees
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub http: Arc<dyn Transport>,
    pub tokens: TokenVerifier,
}

impl GatewayContext {
    pub fn new(config: GatewayConfig, http: Arc<dyn Transport>) -> Self {
        let tokens = TokenVerifier::new(http.clone(), config.token_service_url.clone());
        Self { config, http, tokens }
    }
}

/// One invocation of a root field
pub struct FieldCall {
    args: Map<String, Value>,
    bearer: Option<String>,
    gateway: Arc<GatewayContext>,
}

impl FieldCall {
    pub fn new(
        args: Map<String, Value>,
        bearer: Option<String>,
        gateway: Arc<GatewayContext>,
    ) -> Self {
        Self { args, bearer, gateway }
    }

    pub fn gateway(&self) -> &GatewayContext {
        &self.gateway
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.gateway.config
    }

    /// Token for the gate: a non-empty `token` argument, else the bearer header
    pub fn token(&self) -> Option<&str> {
        self.args
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .or(self.bearer.as_deref())
    }

    /// Required argument
    pub fn arg(&self, name: &str) -> Result<&Value> {
        self.args
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| GatewayError::MissingArgument(name.to_string()))
    }

    /// Required argument rendered as a URL path segment
    pub fn path_arg(&self, name: &str) -> Result<String> {
        self.arg(name).map(display_value)
    }

    /// Verify the caller's token.
    ///
    /// Fails with [`GatewayError::InvalidAuthentication`] when there is no
    /// token, the identity service rejects it, or the service is unreachable.
    pub async fn authorize(&self) -> Result<IdentityRecord> {
        let Some(token) = self.token() else {
            tracing::debug!("no token supplied to a gated field");
            return Err(GatewayError::InvalidAuthentication);
        };

        match self.gateway.tokens.verify(token).await {
            Ok(identity) if identity.is_valid() => Ok(identity),
            Ok(_) => Err(GatewayError::InvalidAuthentication),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                Err(GatewayError::InvalidAuthentication)
            }
        }
    }

    /// Call a backend and hand back its JSON body unmodified
    pub async fn fetch(
        &self,
        method: Method,
        url: impl Into<String>,
        body: Option<Value>,
    ) -> Result<Value> {
        let mut request = OutboundRequest::new(method, url);
        request.body = body;
        Ok(self.gateway.http.send(request).await?)
    }
}

/// Handler bound to one root field
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(&self, call: FieldCall) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> FieldResolver for F
where
    F: Fn(FieldCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn resolve(&self, call: FieldCall) -> Result<Value> {
        (self)(call).await
    }
}

/// Root field name to resolver
#[derive(Clone, Default)]
pub struct ResolverMap {
    resolvers: HashMap<String, Arc<dyn FieldResolver>>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver, replacing any earlier one with the same name
    pub fn with(mut self, field: &str, resolver: impl FieldResolver + 'static) -> Self {
        self.resolvers.insert(field.to_string(), Arc::new(resolver));
        self
    }

    /// Absorb another map. Fails on the first field both maps define.
    pub fn merge(&mut self, other: ResolverMap) -> Result<()> {
        if let Some(field) = other.resolvers.keys().find(|k| self.resolvers.contains_key(*k)) {
            return Err(GatewayError::ResolverConflict(field.clone()));
        }
        self.resolvers.extend(other.resolvers);
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<Arc<dyn FieldResolver>> {
        self.resolvers.get(field).cloned()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.resolvers.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
