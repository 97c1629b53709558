use super::{attributes_schema, no_content, success_response, ResponseContext, ResponseFormat};
use crate::example_generator::ExampleGenerator;
use crate::messages::Messages;
use crate::openapi_builder::Response;
use crate::routes::HttpMethod;
use crate::schema_builder::Schema;
use crate::type_resolver::OpenApiType;
use indexmap::IndexMap;
use serde_json::{json, Value};

/// `{success, data, meta}` envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFormat;

impl ResponseFormat for SimpleFormat {
    fn name(&self) -> &str {
        "simple"
    }

    fn description(&self) -> &str {
        "REST API"
    }

    fn schemas(&self) -> IndexMap<String, Schema> {
        let success = Schema::object()
            .with_property(
                "success",
                Schema::of_type(OpenApiType::Boolean).with_example(json!(true)),
            )
            .with_property(
                "data",
                Schema::one_of(vec![Schema::map(), Schema::array(Schema::object())]),
            )
            .with_property("meta", Schema::map());

        let error = Schema::object()
            .with_required(&["success", "message"])
            .with_property(
                "success",
                Schema::of_type(OpenApiType::Boolean).with_example(json!(false)),
            )
            .with_property("message", Schema::of_type(OpenApiType::String))
            .with_property(
                "errors",
                Schema {
                    additional_properties: Some(
                        json!({"type": "array", "items": {"type": "string"}}),
                    ),
                    ..Schema::object()
                },
            );

        let mut schemas = IndexMap::new();
        schemas.insert("SuccessResponse".to_string(), success);
        schemas.insert("ErrorResponse".to_string(), error);
        schemas
    }

    fn success_schema(&self) -> &str {
        "SuccessResponse"
    }

    fn error_schema(&self) -> &str {
        "ErrorResponse"
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

        let attributes = ctx.attributes();
        let record = attributes_schema(attributes);

        let (data_schema, data_example) = if ctx.is_collection {
            let items: Vec<Value> = (1..=ctx.collection_size as i64)
                .map(|id| examples.generate_object(attributes, id))
                .collect();
            (Schema::array(record), Value::Array(items))
        } else {
            (record, examples.generate_object(attributes, 1))
        };

        let mut schema = Schema::object()
            .with_property("success", Schema::of_type(OpenApiType::Boolean))
            .with_property("data", data_schema);
        let mut example = json!({
            "success": true,
            "data": data_example,
        });

        if ctx.is_collection {
            schema = schema.with_property("meta", pagination_schema());
            let total = ctx.collection_size as u64;
            let per_page = u64::from(ctx.per_page.max(1));
            example["meta"] = json!({
                "current_page": 1,
                "per_page": ctx.per_page,
                "total": total,
                "last_page": total.div_ceil(per_page).max(1),
            });
        }

        success_response(method, messages, schema, example)
    }
}

fn pagination_schema() -> Schema {
    ["current_page", "per_page", "total", "last_page"]
        .into_iter()
        .fold(Schema::object(), |schema, name| {
            schema.with_property(name, Schema::of_type(OpenApiType::Integer))
        })
}
