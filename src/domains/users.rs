//! Users service

use reqwest::Method;
use serde_json::Value;

use crate::query::listing_url;
use crate::resolver::{FieldCall, ResolverMap};
use crate::schema::SchemaFragment;
use crate::Result;

const TYPE_DEFS: &str = r#"
type User {
    id: Int!
    name: String!
    lastname: String!
    id_code: Int!
    email: String!
    id_type: String!
}

input UserInput {
    name: String!
    lastname: String!
    id_code: Int!
    email: String!
    id_type: String!
}
"#;

const QUERIES: &str = r#"
    allUsers(token: String): [User]!
    userById(token: String, id: Int!): User!
"#;

const MUTATIONS: &str = r#"
    createUser(token: String, user: UserInput!): User!
    deleteUser(token: String, id: Int!): User!
    updateUser(token: String, id: Int!, user: UserInput!): User!
"#;

pub fn fragment() -> SchemaFragment {
    SchemaFragment {
        type_defs: TYPE_DEFS,
        queries: QUERIES,
        mutations: MUTATIONS,
    }
}

pub fn resolvers() -> ResolverMap {
    ResolverMap::new()
        .with("allUsers", all_users)
        .with("userById", user_by_id)
        .with("createUser", create_user)
        .with("updateUser", update_user)
        .with("deleteUser", delete_user)
}

fn base_url(call: &FieldCall) -> String {
    call.config().users.base_url()
}

async fn all_users(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    call.fetch(Method::GET, listing_url(&base_url(&call), "", []), None)
        .await
}

async fn user_by_id(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    call.fetch(Method::GET, url, None).await
}

async fn create_user(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let user = call.arg("user")?.clone();
    call.fetch(Method::POST, base_url(&call), Some(user)).await
}

async fn update_user(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    let user = call.arg("user")?.clone();
    call.fetch(Method::PUT, url, Some(user)).await
}

async fn delete_user(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    call.fetch(Method::DELETE, url, None).await
}
