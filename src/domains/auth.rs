//! Credential authentication
//!
//! `auth` checks credentials against the directory service and, when it
//! answers positively, issues a token through the identity service.

use reqwest::Method;
use serde_json::{json, Value};

use crate::resolver::{FieldCall, ResolverMap};
use crate::schema::SchemaFragment;
use crate::{GatewayError, Result};

const TYPE_DEFS: &str = r#"
type Auth {
    token: String!
    expire: String!
}

input AuthInput {
    id: String!
    password: String!
}
"#;

const MUTATIONS: &str = r#"
    auth(auth: AuthInput!): Auth!
"#;

pub fn fragment() -> SchemaFragment {
    SchemaFragment {
        type_defs: TYPE_DEFS,
        queries: "",
        mutations: MUTATIONS,
    }
}

pub fn resolvers() -> ResolverMap {
    ResolverMap::new().with("auth", authenticate)
}

/// The directory service answers with the string `"true"`; a JSON `true` counts too
fn is_confirmed(response: &Value) -> bool {
    matches!(response.get("answer"), Some(Value::String(s)) if s == "true")
        || response.get("answer") == Some(&Value::Bool(true))
}

async fn authenticate(call: FieldCall) -> Result<Value> {
    let credentials = call.arg("auth")?.clone();
    let response = match call
        .fetch(Method::POST, call.config().auth.base_url(), Some(credentials))
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "credential check unavailable");
            return Err(GatewayError::AuthenticationFailed);
        }
    };

    if !is_confirmed(&response) {
        tracing::info!("credential check rejected");
        return Err(GatewayError::AuthenticationFailed);
    }

    let id = response.get("id").cloned().unwrap_or(Value::Null);
    let issued = call.gateway().tokens.issue_token(&id).await?;

    Ok(json!({
        "token": issued.token,
        "expire": issued.expire,
    }))
}
