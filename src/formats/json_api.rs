use super::{no_content, success_response, ResponseContext, ResponseFormat};
use crate::example_generator::ExampleGenerator;
use crate::messages::Messages;
use crate::openapi_builder::Response;
use crate::routes::HttpMethod;
use crate::schema_builder::Schema;
use crate::type_resolver::OpenApiType;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// Number of linkage entries rendered for a to-many relationship
const TO_MANY_SIZE: usize = 2;

/// JSON:API documents (`data`, `included`, `links`, `meta`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiFormat;

impl ResponseFormat for JsonApiFormat {
    fn name(&self) -> &str {
        "json-api"
    }

    fn description(&self) -> &str {
        "API follows the JSON:API specification"
    }

    fn schemas(&self) -> IndexMap<String, Schema> {
        let string = || Schema::of_type(OpenApiType::String);

        let resource = Schema::object()
            .with_required(&["type", "id"])
            .with_property("type", string().with_example(json!("users")))
            .with_property("id", string().with_example(json!("1")))
            .with_property("attributes", Schema::map())
            .with_property("relationships", Schema::map())
            .with_property("links", Schema::map())
            .with_property("meta", Schema::map());

        let document = Schema::object()
            .with_property(
                "data",
                Schema::one_of(vec![
                    Schema::reference("JsonApiResource"),
                    Schema::array(Schema::reference("JsonApiResource")),
                ]),
            )
            .with_property("included", Schema::array(Schema::reference("JsonApiResource")))
            .with_property("links", Schema::map())
            .with_property("meta", Schema::map());

        let error_object = Schema::object()
            .with_property("status", string())
            .with_property("code", string())
            .with_property("title", string())
            .with_property("detail", string())
            .with_property(
                "source",
                Schema::object()
                    .with_property("pointer", string())
                    .with_property("parameter", string()),
            );
        let error = Schema::object()
            .with_required(&["errors"])
            .with_property("errors", Schema::array(error_object));

        let mut schemas = IndexMap::new();
        schemas.insert("JsonApiResource".to_string(), resource);
        schemas.insert("JsonApiDocument".to_string(), document);
        schemas.insert("JsonApiError".to_string(), error);
        schemas
    }

    fn success_schema(&self) -> &str {
        "JsonApiDocument"
    }

    fn error_schema(&self) -> &str {
        "JsonApiError"
    }

    fn operation_response(
        &self,
        method: HttpMethod,
        ctx: &ResponseContext<'_>,
        examples: &mut ExampleGenerator,
        messages: &Messages,
    ) -> IndexMap<String, Response> {
        if method == HttpMethod::Delete {
            return no_content(messages);
        }

        let count = if ctx.is_collection {
            ctx.collection_size
        } else {
            1
        };

        let mut resources = Vec::with_capacity(count);
        let mut included: Vec<Value> = Vec::new();
        for id in 1..=count as i64 {
            resources.push(render_resource(ctx, id, examples, &mut included));
        }

        let resource_ref = Schema::reference("JsonApiResource");
        let mut schema = Schema::object();
        let mut document = Map::new();

        if ctx.is_collection {
            schema = schema.with_property("data", Schema::array(resource_ref.clone()));
            document.insert("data".to_string(), Value::Array(resources));
        } else {
            schema = schema.with_property("data", resource_ref.clone());
            let single = resources.into_iter().next().unwrap_or(Value::Null);
            document.insert("data".to_string(), single);
        }

        if !included.is_empty() {
            schema = schema.with_property("included", Schema::array(resource_ref));
            document.insert("included".to_string(), Value::Array(included));
        }

        schema = schema.with_property("links", Schema::map());
        if ctx.is_collection {
            let (links, meta) = pagination(ctx, examples);
            schema = schema.with_property("meta", Schema::map());
            document.insert("links".to_string(), links);
            document.insert("meta".to_string(), meta);
        } else {
            document.insert(
                "links".to_string(),
                json!({"self": format!("/{}/1", ctx.collection_name)}),
            );
        }

        success_response(method, messages, schema, Value::Object(document))
    }
}

/// One primary resource with its relationship linkage. Related resources are
/// appended to `included` unless already present.
fn render_resource(
    ctx: &ResponseContext<'_>,
    id: i64,
    examples: &mut ExampleGenerator,
    included: &mut Vec<Value>,
) -> Value {
    let mut resource =
        examples.generate_json_api_resource(ctx.collection_name, ctx.attributes(), id);

    let Some(descriptor) = ctx.descriptor else {
        return resource;
    };
    if descriptor.relationships.is_empty() {
        return resource;
    }

    let mut relationships = Map::new();
    for (name, relationship) in &descriptor.relationships {
        let size = if relationship.collection {
            TO_MANY_SIZE
        } else {
            1
        };
        let related_ids: Vec<i64> = (0..size).map(|_| examples.random_int(1, 100)).collect();

        let mut linkage: Vec<Value> = related_ids
            .iter()
            .map(|related_id| {
                json!({
                    "type": relationship.relation_type,
                    "id": related_id.to_string(),
                })
            })
            .collect();
        let data = if relationship.collection {
            Value::Array(linkage)
        } else {
            linkage.pop().unwrap_or(Value::Null)
        };

        relationships.insert(
            name.clone(),
            json!({
                "data": data,
                "links": {
                    "related": format!("/{}/{}/{}", ctx.collection_name, id, name),
                },
            }),
        );

        let related_attributes = ctx.related.get(name).map(|d| &d.attributes);
        for related_id in related_ids {
            let already_included = included.iter().any(|member| {
                member["type"] == json!(relationship.relation_type)
                    && member["id"] == json!(related_id.to_string())
            });
            if !already_included {
                included.push(examples.generate_json_api_resource(
                    &relationship.relation_type,
                    related_attributes,
                    related_id,
                ));
            }
        }
    }

    resource["relationships"] = Value::Object(relationships);
    resource
}

/// Pagination `links` and `meta` of a collection document
fn pagination(ctx: &ResponseContext<'_>, examples: &mut ExampleGenerator) -> (Value, Value) {
    let per_page = i64::from(ctx.per_page.max(1));
    let total = examples.random_int(per_page + 1, 200_i64.max(per_page * 2));
    let last_page = (total + per_page - 1) / per_page;
    let page = |number: i64| format!("/{}?page[number]={}", ctx.collection_name, number);

    let links = json!({
        "self": page(1),
        "first": page(1),
        "prev": null,
        "next": page(2),
        "last": page(last_page),
    });
    let meta = json!({
        "current_page": 1,
        "per_page": per_page,
        "total": total,
        "last_page": last_page,
    });
    (links, meta)
}
