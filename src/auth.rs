//! Bearer token extraction and the GraphQL HTTP handler
//!
//! Provides helpers for:
//! - Extracting the bearer token from the `Authorization` header
//! - Injecting it into the per-request GraphQL context
//! - The Axum handler behind `GET`/`POST /graphql`

use async_graphql::Context;
use async_graphql_axum::GraphQLRequest;
use axum::{extract::State, http::HeaderMap, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::Instrument;
use uuid::Uuid;

use crate::schema::GatewaySchema;
use crate::server::render_response;

static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bearer ([A-Za-z0-9]+)").expect("valid bearer pattern"));

/// Token taken from the `Authorization` header, stored in request data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Extract the bearer token from the Authorization header.
///
/// Only the alphanumeric run after `Bearer ` is taken; anything else leaves
/// the request without a token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| BEARER.captures(auth))
        .and_then(|caps| caps.get(1))
        .map(|m| BearerToken(m.as_str().to_string()))
}

/// Standard GraphQL handler with token injection
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use bikeshare_gateway::{auth::graphql_handler, GatewaySchema};
///
/// # fn example(schema: GatewaySchema) -> Router {
/// Router::new()
///     .route("/graphql", get(graphql_handler).post(graphql_handler))
///     .with_state(schema)
/// # }
/// ```
pub async fn graphql_handler(
    State(schema): State<GatewaySchema>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> Json<serde_json::Value> {
    let request_id = Uuid::new_v4();
    let mut request = req.into_inner();

    if let Some(token) = extract_bearer_token(&headers) {
        request = request.data(token);
    }

    let span = tracing::info_span!("graphql", %request_id, operation = ?request.operation_name);
    let response = schema.execute(request).instrument(span).await;

    Json(render_response(response))
}

/// Get the bearer token from GraphQL context
pub fn get_bearer_token<'a>(ctx: &'a Context<'_>) -> Option<&'a str> {
    ctx.data_opt::<BearerToken>().map(|t| t.0.as_str())
}
