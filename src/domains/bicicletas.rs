//! Bicycles (bicicletas) service
//!
//! Writes use dedicated sub-paths: `/create`, `/edit/{serial}` and
//! `/delete/{serial}`.

use reqwest::Method;
use serde_json::Value;

use crate::query::listing_url;
use crate::resolver::{FieldCall, ResolverMap};
use crate::schema::SchemaFragment;
use crate::Result;

const TYPE_DEFS: &str = r#"
type Bicicleta {
    serial: Int!
    marca: String
    color: String
    ubicacion: String
    estado: String
}

input BicicletaInput {
    serial: Int!
    marca: String!
    color: String!
    ubicacion: String!
    estado: String!
}

input BicicletaInputEdit {
    ubicacion: String!
    estado: String!
}
"#;

const QUERIES: &str = r#"
    allBicicletas(token: String): [Bicicleta]!
    bicicletaById(token: String, serial: Int!): Bicicleta!
"#;

const MUTATIONS: &str = r#"
    createBicicleta(token: String, bicicleta: BicicletaInput!): Bicicleta!
    deleteBicicleta(token: String, serial: Int!): Bicicleta!
    updateBicicleta(token: String, serial: Int!, bicicleta: BicicletaInputEdit!): Bicicleta!
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
        .with("allBicicletas", all_bicicletas)
        .with("bicicletaById", bicicleta_by_id)
        .with("createBicicleta", create_bicicleta)
        .with("updateBicicleta", update_bicicleta)
        .with("deleteBicicleta", delete_bicicleta)
}

fn base_url(call: &FieldCall) -> String {
    call.config().bicicletas.base_url()
}

async fn all_bicicletas(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    call.fetch(Method::GET, listing_url(&base_url(&call), "", []), None)
        .await
}

async fn bicicleta_by_id(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("serial")?);
    call.fetch(Method::GET, url, None).await
}

async fn create_bicicleta(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let bicicleta = call.arg("bicicleta")?.clone();
    call.fetch(Method::POST, format!("{}/create", base_url(&call)), Some(bicicleta))
        .await
}

async fn update_bicicleta(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/edit/{}", base_url(&call), call.path_arg("serial")?);
    let bicicleta = call.arg("bicicleta")?.clone();
    call.fetch(Method::PATCH, url, Some(bicicleta)).await
}

async fn delete_bicicleta(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/delete/{}", base_url(&call), call.path_arg("serial")?);
    call.fetch(Method::DELETE, url, None).await
}
