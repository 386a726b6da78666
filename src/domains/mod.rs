//! Domain resolver modules
//!
//! Each domain exposes its SDL [`fragment`](users::fragment) and its
//! [`resolvers`](users::resolvers). Gated fields verify the caller's token
//! before touching the backend; profile pictures are read without one.

pub mod auth;
pub mod bicicletas;
pub mod prestamos;
pub mod profile_pictures;
pub mod users;

use crate::resolver::ResolverMap;
use crate::schema::SchemaFragment;
use crate::Result;

/// Fragments of every domain, in composition order
pub fn fragments() -> Vec<SchemaFragment> {
    vec![
        users::fragment(),
        prestamos::fragment(),
        profile_pictures::fragment(),
        bicicletas::fragment(),
        auth::fragment(),
    ]
}

/// Resolvers of every domain. Fails if two domains claim the same field.
pub fn resolvers() -> Result<ResolverMap> {
    let mut merged = ResolverMap::new();
    for domain in [
        users::resolvers(),
        prestamos::resolvers(),
        profile_pictures::resolvers(),
        bicicletas::resolvers(),
        auth::resolvers(),
    ] {
        merged.merge(domain)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FieldCall;
    use crate::testing::{gateway, StubTransport};
    use crate::GatewayError;
    use reqwest::Method;
    use serde_json::{json, Map, Value};
    use std::sync::Arc;

    const GATED: &[&str] = &[
        "allUsers",
        "userById",
        "createUser",
        "updateUser",
        "deleteUser",
        "allPrestamos",
        "prestamoById",
        "createPrestamo",
        "updatePrestamo",
        "deletePrestamo",
        "allBicicletas",
        "bicicletaById",
        "createBicicleta",
        "updateBicicleta",
        "deleteBicicleta",
    ];

    fn full_args(token: Option<&str>) -> Map<String, Value> {
        let mut args = json!({
            "id": 42,
            "serial": 7,
            "user": {"name": "Ana"},
            "prestamo": {"student_id": 1, "bici_id": 2},
            "bicicleta": {"ubicacion": "norte", "estado": "libre"},
        })
        .as_object()
        .cloned()
        .unwrap();
        if let Some(token) = token {
            args.insert("token".to_string(), json!(token));
        }
        args
    }

    #[test]
    fn test_every_field_has_one_resolver() {
        let resolvers = resolvers().unwrap();
        assert_eq!(resolvers.len(), GATED.len() + 3);
        for field in GATED.iter().chain(&["allProfilePictures", "profilePictureById", "auth"]) {
            assert!(resolvers.contains(field), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn test_gated_fields_fail_without_token() {
        let resolvers = resolvers().unwrap();
        for field in GATED {
            let stub = Arc::new(StubTransport::new());
            let call = FieldCall::new(full_args(None), None, gateway(stub.clone()));

            let outcome = resolvers.get(field).unwrap().resolve(call).await;
            assert!(
                matches!(outcome, Err(GatewayError::InvalidAuthentication)),
                "{} did not fail",
                field
            );
            assert!(stub.calls().is_empty(), "{} reached a backend", field);
        }
    }

    #[tokio::test]
    async fn test_gated_fields_fail_on_rejected_token() {
        let resolvers = resolvers().unwrap();
        for field in GATED {
            let stub = Arc::new(StubTransport::new().on(
                Method::GET,
                "http://35.193.172.140:3005/login/badTok",
                json!({"message": "expired"}),
            ));
            let call = FieldCall::new(full_args(Some("badTok")), None, gateway(stub.clone()));

            let outcome = resolvers.get(field).unwrap().resolve(call).await;
            assert!(matches!(outcome, Err(GatewayError::InvalidAuthentication)));
            assert!(stub.backend_calls().is_empty(), "{} reached a backend", field);
        }
    }

    #[test]
    fn test_composed_schema_binds() {
        let stub = Arc::new(StubTransport::new());
        let schema = crate::build_schema(
            &crate::schema::compose_fragments(&fragments()),
            resolvers().unwrap(),
            gateway(stub),
        )
        .unwrap();

        let sdl = schema.sdl();
        let types = [
            "type User",
            "type Prestamo",
            "type ProfilePicture",
            "type Bicicleta",
            "type Auth",
        ];
        for ty in types {
            assert!(sdl.contains(ty), "missing {}", ty);
        }
    }
}
