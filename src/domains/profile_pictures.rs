//! Profile pictures service. Reads are public: no token check.

use reqwest::Method;
use serde_json::Value;

use crate::query::listing_url;
use crate::resolver::{FieldCall, ResolverMap};
use crate::schema::SchemaFragment;
use crate::Result;

const TYPE_DEFS: &str = r#"
type ProfilePicture {
    id: Int!
    Student: String!
    Url: String
}
"#;

const QUERIES: &str = r#"
    allProfilePictures: [ProfilePicture]!
    profilePictureById(id: String!): ProfilePicture!
"#;

pub fn fragment() -> SchemaFragment {
    SchemaFragment {
        type_defs: TYPE_DEFS,
        queries: QUERIES,
        mutations: "",
    }
}

pub fn resolvers() -> ResolverMap {
    ResolverMap::new()
        .with("allProfilePictures", all_profile_pictures)
        .with("profilePictureById", profile_picture_by_id)
}

async fn all_profile_pictures(call: FieldCall) -> Result<Value> {
    let url = listing_url(&call.config().profile_pictures.base_url(), "", []);
    call.fetch(Method::GET, url, None).await
}

async fn profile_picture_by_id(call: FieldCall) -> Result<Value> {
    let url = format!(
        "{}/{}",
        call.config().profile_pictures.base_url(),
        call.path_arg("id")?
    );
    call.fetch(Method::GET, url, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, StubTransport};
    use serde_json::{json, Map};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_all_profile_pictures_without_token() {
        let pictures = json!([{"id": 1, "Student": "ana", "Url": null}]);
        let stub = Arc::new(StubTransport::new().on(
            Method::GET,
            "http://192.168.99.101:3003/profilepictures",
            pictures.clone(),
        ));

        let value = all_profile_pictures(FieldCall::new(Map::new(), None, gateway(stub.clone())))
            .await
            .unwrap();
        assert_eq!(value, pictures);
        // no verification round-trip
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_picture_by_id_passes_raw_id() {
        let stub = Arc::new(StubTransport::new().on(
            Method::GET,
            "http://192.168.99.101:3003/profilepictures/ana lopez",
            json!({"id": 2}),
        ));
        let args = json!({"id": "ana lopez"}).as_object().cloned().unwrap();

        let value = profile_picture_by_id(FieldCall::new(args, None, gateway(stub)))
            .await
            .unwrap();
        assert_eq!(value, json!({"id": 2}));
    }
}
