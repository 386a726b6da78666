//! HTTP surface of the gateway

use async_graphql::http::GraphiQLSource;
use async_graphql::{Response, ServerError};
use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::graphql_handler;
use crate::schema::GatewaySchema;
use crate::GatewayError;

/// Routes: `/graphql` (GET and POST) and the `/graphiql` explorer
pub fn router(schema: GatewaySchema) -> Router {
    Router::new()
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(schema)
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Serialize an execution result with gateway error formatting
pub fn render_response(response: Response) -> Value {
    let mut body = json!({ "data": response.data });
    if !response.errors.is_empty() {
        body["errors"] = response.errors.iter().map(format_error).collect();
    }
    body
}

/// Client-visible form of one error.
///
/// An upstream failure with a JSON object body becomes
/// `{message: id, code, description, path}`; without an `id` the message is
/// kept. Everything else keeps the default GraphQL error shape.
pub fn format_error(error: &ServerError) -> Value {
    let structured = error
        .source::<GatewayError>()
        .and_then(|source| match source {
            GatewayError::Upstream(upstream) => upstream.structured(),
            _ => None,
        });

    match structured {
        Some(failure) => json!({
            "message": failure.id.unwrap_or_else(|| error.message.clone()),
            "code": failure.code,
            "description": failure.description,
            "path": error.path,
        }),
        None => serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.message })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubTransport, VERIFY_URL};
    use crate::{assemble_with, GatewayConfig, GatewayContext, UpstreamError};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use reqwest::Method;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    fn app(stub: StubTransport) -> Router {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        let schema = assemble_with(GatewayContext::new(config, Arc::new(stub))).unwrap();
        router(schema)
    }

    async fn post_graphql(app: Router, query: &str, authorization: Option<&str>) -> Value {
        let mut request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }

        let response = app
            .oneshot(
                request
                    .body(Body::from(json!({ "query": query }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_graphiql_page() {
        let response = app(StubTransport::new())
            .oneshot(Request::builder().uri("/graphiql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/graphql"));
    }

    #[tokio::test]
    async fn test_profile_pictures_need_no_token() {
        let stub = StubTransport::new().on(
            Method::GET,
            "http://192.168.99.101:3003/profilepictures",
            json!([{"id": 1, "Student": "ana", "Url": "http://img/1.png"}]),
        );
        let body = post_graphql(app(stub), "{ allProfilePictures { id Student Url } }", None).await;

        assert!(body.get("errors").is_none(), "{}", body);
        assert_eq!(
            body["data"]["allProfilePictures"],
            json!([{"id": 1, "Student": "ana", "Url": "http://img/1.png"}])
        );
    }

    #[tokio::test]
    async fn test_bearer_header_opens_gated_query() {
        let stub = StubTransport::new()
            .with_valid_token()
            .on(Method::GET, "http://users-ms:3001/users/42", json!({"id": 42, "name": "Ana"}));
        let query = "{ userById(id: 42) { id name } }";
        let body = post_graphql(app(stub), query, Some("Bearer validTok")).await;

        assert_eq!(body["data"]["userById"], json!({"id": 42, "name": "Ana"}));
    }

    #[tokio::test]
    async fn test_gated_query_without_token_reports_code() {
        let body = post_graphql(app(StubTransport::new()), "{ allUsers { id } }", None).await;

        let error = &body["errors"][0];
        assert_eq!(error["message"], json!("Autenticacion invalida"));
        assert_eq!(error["extensions"]["code"], json!("INVALID_AUTHENTICATION"));
        assert_eq!(error["path"], json!(["allUsers"]));
    }

    #[tokio::test]
    async fn test_structured_upstream_error_is_flattened() {
        let stub = StubTransport::new().with_valid_token().fail(
            Method::GET,
            "http://users-ms:3001/users/9",
            UpstreamError::Status {
                status: 404,
                body: json!({"id": "USER_NOT_FOUND", "code": 404, "description": "no such user"}),
            },
        );
        let query = r#"{ userById(token: "validTok", id: 9) { id } }"#;
        let body = post_graphql(app(stub), query, None).await;

        assert_eq!(
            body["errors"][0],
            json!({
                "message": "USER_NOT_FOUND",
                "code": 404,
                "description": "no such user",
                "path": ["userById"],
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_body_without_id_is_flattened() {
        let stub = StubTransport::new().with_valid_token().fail(
            Method::DELETE,
            "http://localhost:3002/prestamos/5",
            UpstreamError::Status {
                status: 409,
                body: json!({"code": 409, "description": "loan still open"}),
            },
        );
        let body = post_graphql(
            app(stub),
            r#"mutation { deletePrestamo(id: 5) { id } }"#,
            Some("Bearer validTok"),
        )
        .await;

        let error = &body["errors"][0];
        assert_eq!(error["message"], json!("Upstream responded with status 409"));
        assert_eq!(error["code"], json!(409));
        assert_eq!(error["description"], json!("loan still open"));
        assert_eq!(error["path"], json!(["deletePrestamo"]));
    }

    #[tokio::test]
    async fn test_get_request_is_accepted() {
        let stub = StubTransport::new().on(
            Method::GET,
            "http://192.168.99.101:3003/profilepictures/abc",
            json!({"id": 3, "Student": "luis", "Url": null}),
        );
        let response = app(stub)
            .oneshot(
                Request::builder()
                    .uri("/graphql?query=%7BprofilePictureById(id%3A%22abc%22)%7Bid%20Url%7D%7D")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"]["profilePictureById"], json!({"id": 3, "Url": null}));
    }

    #[test]
    fn test_verify_url_matches_default_config() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        assert!(VERIFY_URL.starts_with(&config.token_service_url));
    }
}
