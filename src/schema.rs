//! Schema composition and binding
//!
//! Domains contribute SDL fragments. [`compose`] concatenates them into one
//! document with synthesized root `Query` and `Mutation` types, and
//! [`build_schema`] parses that document into an executable dynamic schema,
//! binding each root field to its resolver.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, InputObject, InputValue, Object, Scalar, Schema};
use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextResolve, ResolveInfo,
};
use async_graphql::parser::parse_schema;
use async_graphql::parser::types::{
    FieldDefinition, InputValueDefinition, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql::{PathSegment, QueryPathNode, QueryPathSegment, ServerResult, Value as GqlValue};
use async_trait::async_trait;
use serde_json::Map;

use crate::auth::get_bearer_token;
use crate::resolver::{FieldCall, GatewayContext, ResolverMap};
use crate::types::{member, shape, type_ref, ObjectTypes};
use crate::{GatewayError, Result};

/// Executable gateway schema. Built once, read-only afterwards.
pub type GatewaySchema = Schema;

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";

/// One domain's contribution to the schema
#[derive(Debug, Clone, Default)]
pub struct SchemaFragment {
    pub type_defs: &'static str,
    pub queries: &'static str,
    pub mutations: &'static str,
}

/// Concatenate fragments: all type definitions, then one `Query` block and one
/// `Mutation` block. No collision or type checking happens here.
pub fn compose<S: AsRef<str>>(type_defs: &[S], queries: &[S], mutations: &[S]) -> String {
    let join = |parts: &[S]| {
        parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{}\ntype {} {{ {} }}\ntype {} {{ {} }}",
        join(type_defs),
        QUERY,
        join(queries),
        MUTATION,
        join(mutations)
    )
}

/// Compose domain fragments, prefixed with the `JSON` scalar declaration
pub fn compose_fragments(fragments: &[SchemaFragment]) -> String {
    let mut type_defs = vec!["scalar JSON"];
    type_defs.extend(fragments.iter().map(|f| f.type_defs));

    let non_empty = |parts: Vec<&'static str>| {
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
    };
    let queries = non_empty(fragments.iter().map(|f| f.queries).collect());
    let mutations = non_empty(fragments.iter().map(|f| f.mutations).collect());

    compose(&type_defs, &queries, &mutations)
}

/// Parse composed SDL and bind it to resolvers.
///
/// Errors on unparsable SDL, on type kinds the gateway cannot pass through
/// (interfaces, unions, enums), on root fields without a resolver, and on
/// anything the schema builder rejects.
pub fn build_schema(
    sdl: &str,
    resolvers: ResolverMap,
    gateway: Arc<GatewayContext>,
) -> Result<GatewaySchema> {
    let document = parse_schema(sdl).map_err(|e| GatewayError::Schema(e.to_string()))?;

    let definitions: Vec<TypeDefinition> = document
        .definitions
        .into_iter()
        .filter_map(|def| match def {
            TypeSystemDefinition::Type(ty) => Some(ty.node),
            _ => None,
        })
        .collect();

    let objects: Arc<ObjectTypes> = Arc::new(
        definitions
            .iter()
            .filter(|def| matches!(def.kind, TypeKind::Object(_)))
            .map(|def| def.name.node.to_string())
            .collect(),
    );

    let has_mutations = definitions.iter().any(|def| match &def.kind {
        TypeKind::Object(obj) => def.name.node.as_str() == MUTATION && !obj.fields.is_empty(),
        _ => false,
    });

    let mut builder = Schema::build(QUERY, has_mutations.then_some(MUTATION), None);

    for def in &definitions {
        let name = def.name.node.as_str();
        match &def.kind {
            TypeKind::Scalar => {
                builder = builder.register(Scalar::new(name));
            }
            TypeKind::Object(obj) if name == QUERY || name == MUTATION => {
                if name == MUTATION && !has_mutations {
                    continue;
                }
                let mut object = Object::new(name);
                for field in &obj.fields {
                    object = object.field(root_field(&field.node, &resolvers, &objects)?);
                }
                builder = builder.register(object);
            }
            TypeKind::Object(obj) => {
                let mut object = Object::new(name);
                for field in &obj.fields {
                    object = object.field(member_field(&field.node, &objects));
                }
                builder = builder.register(object);
            }
            TypeKind::InputObject(input) => {
                let mut object = InputObject::new(name);
                for field in &input.fields {
                    object = object.field(input_value(&field.node));
                }
                builder = builder.register(object);
            }
            _ => {
                return Err(GatewayError::Schema(format!(
                    "type `{}` has a kind the gateway cannot pass through",
                    name
                )));
            }
        }
    }

    builder
        .data(gateway)
        .extension(ErrorPath)
        .finish()
        .map_err(|e| GatewayError::Schema(e.to_string()))
}

/// Stamps the response path of the failing field onto resolver errors.
///
/// Dynamic resolvers report errors with a position only; without this the
/// client sees no `path`.
struct ErrorPath;

impl ExtensionFactory for ErrorPath {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ErrorPath)
    }
}

#[async_trait]
impl Extension for ErrorPath {
    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<GqlValue>> {
        let path_node = info.path_node;
        next.run(ctx, info).await.map_err(|mut err| {
            // the innermost failing field sets it first
            if err.path.is_empty() {
                err.path = response_path(path_node);
            }
            err
        })
    }
}

fn response_path(node: &QueryPathNode<'_>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        path.push(match node.segment {
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_string()),
            QueryPathSegment::Index(idx) => PathSegment::Index(idx),
        });
        current = node.parent;
    }
    path.reverse();
    path
}

fn input_value(def: &InputValueDefinition) -> InputValue {
    let mut value = InputValue::new(def.name.node.as_str(), type_ref(&def.ty.node));
    if let Some(default) = &def.default_value {
        value = value.default_value(default.node.clone());
    }
    if let Some(description) = &def.description {
        value = value.description(description.node.clone());
    }
    value
}

fn with_arguments(mut field: Field, def: &FieldDefinition) -> Field {
    for arg in &def.arguments {
        field = field.argument(input_value(&arg.node));
    }
    if let Some(description) = &def.description {
        field = field.description(description.node.clone());
    }
    field
}

/// Root field delegating to its registered resolver
fn root_field(
    def: &FieldDefinition,
    resolvers: &ResolverMap,
    objects: &Arc<ObjectTypes>,
) -> Result<Field> {
    let name = def.name.node.to_string();
    let resolver = resolvers
        .get(&name)
        .ok_or_else(|| {
            GatewayError::Schema(format!("no resolver registered for root field `{}`", name))
        })?;
    let ty = def.ty.node.clone();
    let objects = objects.clone();
    let field_name = name.clone();

    let field = Field::new(name, type_ref(&def.ty.node), move |ctx| {
        let resolver = resolver.clone();
        let ty = ty.clone();
        let objects = objects.clone();
        let field_name = field_name.clone();

        FieldFuture::new(async move {
            let gateway = ctx.data::<Arc<GatewayContext>>()?.clone();
            let bearer = get_bearer_token(&ctx).map(str::to_string);

            let mut args = Map::new();
            for (key, value) in ctx.args.as_index_map() {
                args.insert(key.to_string(), value.clone().into_json()?);
            }

            tracing::debug!(field = %field_name, "dispatching resolver");
            let value = resolver
                .resolve(FieldCall::new(args, bearer, gateway))
                .await
                .map_err(|e| {
                    tracing::debug!(field = %field_name, error = %e, "resolver failed");
                    e.into_graphql()
                })?;

            shape(value, &ty, &objects)
        })
    });

    Ok(with_arguments(field, def))
}

/// Field of a pass-through object: reads its member from the parent JSON
fn member_field(def: &FieldDefinition, objects: &Arc<ObjectTypes>) -> Field {
    let name = def.name.node.to_string();
    let ty = def.ty.node.clone();
    let objects = objects.clone();
    let key = name.clone();

    let field = Field::new(name, type_ref(&def.ty.node), move |ctx| {
        let ty = ty.clone();
        let objects = objects.clone();
        let key = key.clone();

        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<serde_json::Value>()?;
            shape(member(parent, &key), &ty, &objects)
        })
    });

    with_arguments(field, def)
}
