//! Loans (prestamos) service
//!
//! Updates go out as PATCH, unlike users which use PUT.

use reqwest::Method;
use serde_json::Value;

use crate::query::listing_url;
use crate::resolver::{FieldCall, ResolverMap};
use crate::schema::SchemaFragment;
use crate::Result;

const TYPE_DEFS: &str = r#"
type Prestamo {
    id: Int!
    student_id: Int!
    bici_id: Int!
    solicitud: String
}

input PrestamoInput {
    student_id: Int!
    bici_id: Int!
    solicitud: String
}

input PrestamoInputEdit {
    student_id: Int
    bici_id: Int
    solicitud: String
}
"#;

const QUERIES: &str = r#"
    allPrestamos(token: String): [Prestamo]!
    prestamoById(token: String, id: Int!): Prestamo!
"#;

const MUTATIONS: &str = r#"
    createPrestamo(token: String, prestamo: PrestamoInput!): Prestamo!
    deletePrestamo(token: String, id: Int!): Prestamo!
    updatePrestamo(token: String, id: Int!, prestamo: PrestamoInputEdit!): Prestamo!
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
        .with("allPrestamos", all_prestamos)
        .with("prestamoById", prestamo_by_id)
        .with("createPrestamo", create_prestamo)
        .with("updatePrestamo", update_prestamo)
        .with("deletePrestamo", delete_prestamo)
}

fn base_url(call: &FieldCall) -> String {
    call.config().prestamos.base_url()
}

async fn all_prestamos(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    call.fetch(Method::GET, listing_url(&base_url(&call), "", []), None)
        .await
}

async fn prestamo_by_id(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    call.fetch(Method::GET, url, None).await
}

async fn create_prestamo(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let prestamo = call.arg("prestamo")?.clone();
    call.fetch(Method::POST, base_url(&call), Some(prestamo)).await
}

async fn update_prestamo(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    let prestamo = call.arg("prestamo")?.clone();
    call.fetch(Method::PATCH, url, Some(prestamo)).await
}

async fn delete_prestamo(call: FieldCall) -> Result<Value> {
    call.authorize().await?;
    let url = format!("{}/{}", base_url(&call), call.path_arg("id")?);
    call.fetch(Method::DELETE, url, None).await
}
