//! # bikeshare-gateway
//!
//! GraphQL gateway for the bikeshare platform services.
//!
//! ## Features
//!
//! - **Schema Composition** - per-domain SDL fragments merged into one schema
//! - **Resolver Dispatch** - root fields delegated to REST microservices
//! - **Token Gate** - bearer tokens verified against the identity service
//! - **HTTP Surface** - `/graphql` (GET and POST) and a GraphiQL explorer
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bikeshare_gateway::{assemble, config::GatewayConfig, server::router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::from_env()?;
//! let schema = assemble(config)?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:4500").await?;
//! axum::serve(listener, router(schema)).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod domains;
pub mod http;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod server;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use auth::{extract_bearer_token, graphql_handler, BearerToken};
pub use config::{GatewayConfig, ServiceEndpoint};
pub use http::{HttpClient, OutboundRequest, Transport, UpstreamError};
pub use query::{build_query, is_truthy};
pub use resolver::{FieldCall, FieldResolver, GatewayContext, ResolverMap};
pub use schema::{build_schema, compose, GatewaySchema, SchemaFragment};
pub use token::{IdentityRecord, IssuedToken, TokenVerifier};

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Autenticacion invalida")]
    InvalidAuthentication,

    #[error("Autenticacion fallo")]
    AuthenticationFailed,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Invalid schema: {0}")]
    Schema(String),

    #[error("Resolver for `{0}` is registered by more than one domain")]
    ResolverConflict(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// Stable machine-readable code, exposed as `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidAuthentication => "INVALID_AUTHENTICATION",
            GatewayError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            GatewayError::Upstream(_) => "UPSTREAM_ERROR",
            GatewayError::Schema(_) => "INVALID_SCHEMA",
            GatewayError::ResolverConflict(_) => "RESOLVER_CONFLICT",
            GatewayError::MissingArgument(_) => "MISSING_ARGUMENT",
            GatewayError::Config(_) => "INVALID_CONFIG",
        }
    }

    /// Convert into a GraphQL error, keeping `self` as the error source so the
    /// response formatter can inspect it.
    pub fn into_graphql(self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new_with_source(self).extend_with(|_, e| e.set("code", code))
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Build the executable gateway schema from configuration.
///
/// Creates the reqwest transport, composes every domain fragment, merges the
/// domain resolvers and binds them. Any error here means the gateway must not
/// start serving.
pub fn assemble(config: GatewayConfig) -> Result<GatewaySchema> {
    let http = HttpClient::new(config.upstream_timeout, config.show_urls)?;
    let gateway = GatewayContext::new(config, Arc::new(http));
    assemble_with(gateway)
}

/// Same as [`assemble`] with a caller-provided gateway context.
pub fn assemble_with(gateway: GatewayContext) -> Result<GatewaySchema> {
    let sdl = schema::compose_fragments(&domains::fragments());
    let resolvers = domains::resolvers()?;
    build_schema(&sdl, resolvers, Arc::new(gateway))
}
