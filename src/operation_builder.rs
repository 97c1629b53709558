use crate::config::Config;
use crate::doc_parser::{DocResponse, ParsedDoc};
use crate::formats::{ResponseContext, ResponseFormat, JSON_CONTENT_TYPE};
use crate::inflector::{camel, headline, singular, snake, studly};
use crate::messages::Messages;
use crate::openapi_builder::{
    MediaType, Operation, Parameter, ParameterLocation, RequestBody, Response, ResponseOrRef,
};
use crate::resource_extractor::{ResourceDescriptor, ResourceExtractor};
use crate::routes::{ActionRef, HttpMethod, Route};
use crate::schema_builder::{Schema, SchemaBuilder};
use crate::type_resolver::{FieldTypeResolver, OpenApiType};
use crate::validation::ValidationRules;
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

/// What is known about a route before its operations are built
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'r> {
    pub route: &'r Route,
    pub doc: &'r ParsedDoc,
    pub rules: &'r ValidationRules,
    pub tags: &'r [String],
}

/// Builds one OpenAPI operation per route and method
pub struct OperationBuilder<'a> {
    config: &'a Config,
    format: &'a dyn ResponseFormat,
    resources: &'a ResourceExtractor<'a>,
    messages: &'a Messages,
    resolver: FieldTypeResolver,
    default_responses: IndexMap<String, ResponseOrRef>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(
        config: &'a Config,
        format: &'a dyn ResponseFormat,
        resources: &'a ResourceExtractor<'a>,
        messages: &'a Messages,
    ) -> Self {
        let mut default_responses = IndexMap::new();
        for (status, value) in &config.default_responses {
            match serde_json::from_value::<ResponseOrRef>(value.clone()) {
                Ok(response) => {
                    default_responses.insert(status.clone(), response);
                }
                Err(e) => warn!("Ignoring default response {}: {}", status, e),
            }
        }

        Self {
            config,
            format,
            resources,
            messages,
            resolver: FieldTypeResolver::new(),
            default_responses,
        }
    }

    /// Build the operation for `method` on a route.
    ///
    /// A request body schema, when there is one, is registered in `schemas`
    /// and referenced from the operation.
    pub fn generate(
        &self,
        ctx: &RouteContext<'_>,
        method: HttpMethod,
        schema_builder: &mut SchemaBuilder,
        schemas: &mut IndexMap<String, Schema>,
    ) -> Operation {
        let route = ctx.route;
        let doc = ctx.doc;
        let segments = route.static_segments();
        let resource = resource_name(doc, &segments);
        let collection_name = segments
            .last()
            .map(|segment| snake(segment))
            .unwrap_or_else(|| resource.clone());
        let is_collection = is_collection(route, method);

        let request_body = if method.has_body() {
            self.request_body(ctx, method, &resource, &segments, schema_builder, schemas)
        } else {
            None
        };

        let mut responses = if doc.responses.is_empty() {
            let descriptor = self.response_descriptor(route, &resource);
            let related = descriptor
                .as_ref()
                .map(|d| self.related_descriptors(d))
                .unwrap_or_default();
            let response_ctx = ResponseContext {
                resource: &resource,
                collection_name: &collection_name,
                descriptor: descriptor.as_ref(),
                related: &related,
                is_collection,
                collection_size: self.config.examples.collection_size,
                per_page: self.config.examples.per_page,
            };
            self.format
                .operation_response(method, &response_ctx, schema_builder.examples(), self.messages)
                .into_iter()
                .map(|(status, response)| (status, ResponseOrRef::Inline(response)))
                .collect()
        } else {
            self.explicit_responses(&doc.responses)
        };

        for (status, response) in &self.default_responses {
            responses
                .entry(status.clone())
                .or_insert_with(|| response.clone());
        }

        let summary = doc.summary.clone().unwrap_or_else(|| {
            let subject = if is_collection {
                headline(&collection_name)
            } else {
                headline(&resource)
            };
            self.messages.summary(method.as_str(), &subject, is_collection)
        });

        Operation {
            operation_id: operation_id(route, method, &segments),
            summary,
            description: doc.description.clone(),
            tags: ctx.tags.to_vec(),
            deprecated: doc.deprecated,
            parameters: self.parameters(route, method, doc),
            request_body,
            responses,
            // An explicit empty requirement opts out of the global security
            security: (doc.authenticated == Some(false)).then(Vec::new),
        }
    }

    /// Path parameters, then documented query parameters for GET.
    fn parameters(&self, route: &Route, method: HttpMethod, doc: &ParsedDoc) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        for name in route.parameter_names() {
            let documented = doc.url_param(&name);
            let type_name = documented.map(|p| p.type_name.as_str()).unwrap_or("string");
            let description = documented
                .map(|p| p.description.clone())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| self.messages.id_of(&headline(&name)));

            parameters.push(Parameter {
                required: documented.and_then(|p| p.required).unwrap_or(true),
                description: Some(description),
                schema: Schema::of_type(self.resolver.normalize(type_name)),
                location: ParameterLocation::Path,
                name,
            });
        }

        if method == HttpMethod::Get {
            for param in &doc.query_params {
                parameters.push(Parameter {
                    name: query_name(&param.name),
                    location: ParameterLocation::Query,
                    required: param.required.unwrap_or(false),
                    description: Some(param.description.clone()).filter(|d| !d.is_empty()),
                    schema: Schema::of_type(self.resolver.normalize(&param.type_name)),
                });
            }
        }

        parameters
    }

    fn request_body(
        &self,
        ctx: &RouteContext<'_>,
        method: HttpMethod,
        resource: &str,
        segments: &[&str],
        schema_builder: &SchemaBuilder,
        schemas: &mut IndexMap<String, Schema>,
    ) -> Option<RequestBody> {
        let mut schema = schema_builder.build(ctx.rules, &ctx.doc.body_params);

        // Path parameters are never part of the body
        for param in ctx.route.parameter_names() {
            schema.properties.shift_remove(&param);
            schema.required.retain(|name| name != &param);
        }

        if schema.properties.is_empty() {
            return None;
        }

        let name = schema_name(resource, method, segments);
        debug!("Registering request schema {}", name);
        schemas.insert(name.clone(), schema);

        Some(RequestBody::new(Schema::reference(&name)))
    }

    fn explicit_responses(&self, responses: &[DocResponse]) -> IndexMap<String, ResponseOrRef> {
        responses
            .iter()
            .map(|r| {
                // scalars keep their decoded JSON type
                let schema = match &r.content {
                    Value::String(_) => Schema::of_type(OpenApiType::String),
                    Value::Bool(_) => Schema::of_type(OpenApiType::Boolean),
                    Value::Number(n) if n.is_f64() => Schema::of_type(OpenApiType::Number),
                    Value::Number(_) => Schema::of_type(OpenApiType::Integer),
                    Value::Object(_) | Value::Array(_) | Value::Null => Schema::default(),
                }
                .with_example(r.content.clone());
                let response = Response::new(self.messages.status(r.status))
                    .with_content(JSON_CONTENT_TYPE, MediaType::new(schema));
                (r.status.to_string(), ResponseOrRef::Inline(response))
            })
            .collect()
    }

    /// Descriptor of the resource class the action responds with.
    ///
    /// Closures have none; controllers are searched for a resource class
    /// before one is guessed from the resource name.
    fn response_descriptor(&self, route: &Route, resource: &str) -> Option<ResourceDescriptor> {
        let ActionRef::Controller { class, method } = &route.action else {
            return None;
        };

        let resource_class = self
            .resources
            .find_resource_class(class, method)
            .or_else(|| {
                self.resources
                    .guess_resource_class(resource, &self.config.resources.namespaces)
            })?;

        debug!("Route {} responds with {}", route.uri, resource_class);
        self.resources.parse_resource(&resource_class)
    }

    /// Descriptors of the related resources, keyed by relationship name
    fn related_descriptors(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> IndexMap<String, ResourceDescriptor> {
        descriptor
            .relationships
            .iter()
            .filter_map(|(name, relationship)| {
                let class = relationship.resource.as_deref()?;
                self.resources
                    .parse_resource(class)
                    .map(|related| (name.clone(), related))
            })
            .collect()
    }
}

/// `@resource` name, else the singular of the last static URI segment
fn resource_name(doc: &ParsedDoc, segments: &[&str]) -> String {
    if let Some(resource) = &doc.resource {
        return resource.clone();
    }
    singular(&snake(segments.last().copied().unwrap_or("resource")))
}

/// GET on a URI that does not end in a placeholder
fn is_collection(route: &Route, method: HttpMethod) -> bool {
    method == HttpMethod::Get
        && !route
            .last_segment()
            .map(|segment| segment.starts_with('{'))
            .unwrap_or(false)
}

/// Route name with dots replaced, else `{method}_{segments}`
fn operation_id(route: &Route, method: HttpMethod, segments: &[&str]) -> String {
    if let Some(name) = route.name.as_deref().filter(|n| !n.is_empty()) {
        return name.replace('.', "_");
    }

    let joined = segments.join("_");
    let path = if joined.is_empty() {
        "root".to_string()
    } else {
        snake(&joined)
    };
    format!("{}_{}", method.as_str(), path)
}

/// `user` + POST `api/users` -> `UserPostApiUsersRequest`
fn schema_name(resource: &str, method: HttpMethod, segments: &[&str]) -> String {
    let mut parts = vec![method.as_str()];
    parts.extend_from_slice(segments);
    studly(&format!("{}_{}_Request", resource, camel(&parts.join("_"))))
}

/// `filter.name` -> `filter[name]`
fn query_name(name: &str) -> String {
    match name.split_once('.') {
        Some((head, rest)) => format!("{}[{}]", head, rest.split('.').collect::<Vec<_>>().join("][")),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc_parser::DocParser;
    use crate::example_generator::ExampleGenerator;
    use crate::formats::{JsonApiFormat, SimpleFormat};
    use crate::messages::Locale;
    use crate::metadata::ClassIndex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Harness {
        config: Config,
        index: ClassIndex,
        messages: Messages,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                config: Config::default(),
                index: ClassIndex::new(),
                messages: Messages::new(Locale::En),
            }
        }

        fn with_sources(sources: &[(&str, &str)]) -> Self {
            Self {
                index: ClassIndex::from_sources(sources),
                ..Self::new()
            }
        }

        fn run(
            &self,
            format: &dyn ResponseFormat,
            route: &Route,
            method: HttpMethod,
            doc: &ParsedDoc,
            rules: &ValidationRules,
        ) -> (Value, IndexMap<String, Schema>) {
            let resources = ResourceExtractor::new(&self.index);
            let builder = OperationBuilder::new(&self.config, format, &resources, &self.messages);
            let mut schema_builder = SchemaBuilder::new(
                self.config.type_map.clone(),
                self.messages.clone(),
                ExampleGenerator::new(Some(3)),
            );
            let mut schemas = IndexMap::new();
            let tags = vec!["Users".to_string()];
            let ctx = RouteContext {
                route,
                doc,
                rules,
                tags: &tags,
            };

            let operation = builder.generate(&ctx, method, &mut schema_builder, &mut schemas);
            (serde_json::to_value(operation).unwrap(), schemas)
        }
    }

    #[test]
    fn test_post_registers_request_schema() {
        let harness = Harness::new();
        let route = Route::new("api/users", &["POST"]);
        let rules: ValidationRules = [("name", "required|string|max:50"), ("email", "required|email")]
            .into_iter()
            .collect();

        let (operation, schemas) =
            harness.run(&SimpleFormat, &route, HttpMethod::Post, &ParsedDoc::default(), &rules);

        assert_eq!(operation["operationId"], json!("post_api_users"));
        assert_eq!(operation["summary"], json!("Create User"));
        assert_eq!(operation["tags"], json!(["Users"]));
        assert_eq!(
            operation["requestBody"],
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": {"$ref": "#/components/schemas/UserPostApiUsersRequest"}
                    }
                }
            })
        );

        let schema = serde_json::to_value(&schemas["UserPostApiUsersRequest"]).unwrap();
        assert_eq!(schema["required"], json!(["name", "email"]));
        assert_eq!(schema["properties"]["name"]["maxLength"], json!(50));
        assert_eq!(schema["properties"]["email"]["format"], json!("email"));
        assert!(operation["responses"].get("201").is_some());
    }

    #[test]
    fn test_path_parameters_are_stripped_from_body() {
        let harness = Harness::new();
        let route = Route::new("api/users/{id}", &["PUT"]);
        let rules: ValidationRules = [("id", "required|integer"), ("name", "required|string")]
            .into_iter()
            .collect();

        let (operation, schemas) =
            harness.run(&SimpleFormat, &route, HttpMethod::Put, &ParsedDoc::default(), &rules);

        let schema = serde_json::to_value(&schemas["UserPutApiUsersRequest"]).unwrap();
        assert!(schema["properties"].get("id").is_none());
        assert_eq!(schema["required"], json!(["name"]));

        assert_eq!(
            operation["parameters"],
            json!([{
                "name": "id",
                "in": "path",
                "required": true,
                "description": "ID of Id",
                "schema": {"type": "string"}
            }])
        );
    }

    #[test]
    fn test_body_with_only_path_parameters_is_omitted() {
        let harness = Harness::new();
        let route = Route::new("api/users/{user}", &["PATCH"]);
        let rules: ValidationRules = [("user", "required")].into_iter().collect();

        let (operation, schemas) =
            harness.run(&SimpleFormat, &route, HttpMethod::Patch, &ParsedDoc::default(), &rules);

        assert!(operation.get("requestBody").is_none());
        assert!(schemas.is_empty());
    }

    #[test]
    fn test_collection_detection() {
        let harness = Harness::new();
        let rules = ValidationRules::new();
        let doc = ParsedDoc::default();

        let (list, _) =
            harness.run(&SimpleFormat, &Route::new("api/posts", &["GET"]), HttpMethod::Get, &doc, &rules);
        assert_eq!(list["summary"], json!("List Posts"));
        assert_eq!(
            list["responses"]["200"]["content"]["application/json"]["schema"]["properties"]["data"]["type"],
            json!("array")
        );

        let (show, _) = harness.run(
            &SimpleFormat,
            &Route::new("api/posts/{post}", &["GET"]),
            HttpMethod::Get,
            &doc,
            &rules,
        );
        assert_eq!(show["summary"], json!("Get Post"));
        assert_eq!(
            show["responses"]["200"]["content"]["application/json"]["schema"]["properties"]["data"]["type"],
            json!("object")
        );
    }

    #[test]
    fn test_doc_driven_operation() {
        let harness = Harness::new();
        let route = Route::new("api/users/{user}/posts", &["GET"]).with_name("users.posts.index");
        let doc = DocParser::parse(
            "/**\n * User posts\n * Long text\n * @deprecated\n * @unauthenticated\n * @urlParam user integer The owner\n * @queryParam filter.status.code string optional Status filter\n * @queryParam page integer\n */",
        );

        let (operation, _) =
            harness.run(&SimpleFormat, &route, HttpMethod::Get, &doc, &ValidationRules::new());

        assert_eq!(operation["operationId"], json!("users_posts_index"));
        assert_eq!(operation["summary"], json!("User posts"));
        assert_eq!(operation["description"], json!("Long text"));
        assert_eq!(operation["deprecated"], json!(true));
        assert_eq!(operation["security"], json!([]));
        assert_eq!(
            operation["parameters"],
            json!([
                {
                    "name": "user",
                    "in": "path",
                    "required": true,
                    "description": "The owner",
                    "schema": {"type": "integer"}
                },
                {
                    "name": "filter[status][code]",
                    "in": "query",
                    "required": false,
                    "description": "Status filter",
                    "schema": {"type": "string"}
                },
                {
                    "name": "page",
                    "in": "query",
                    "required": false,
                    "schema": {"type": "integer"}
                }
            ])
        );
    }

    #[test]
    fn test_query_params_only_for_get() {
        let harness = Harness::new();
        let doc = DocParser::parse("/**\n * @queryParam q string\n */");
        let (operation, _) = harness.run(
            &SimpleFormat,
            &Route::new("api/search", &["POST"]),
            HttpMethod::Post,
            &doc,
            &ValidationRules::new(),
        );
        assert!(operation.get("parameters").is_none());
    }

    #[test]
    fn test_explicit_responses_take_precedence() {
        let mut harness = Harness::new();
        harness.config.default_responses.insert(
            "401".to_string(),
            json!({"$ref": "#/components/responses/Unauthorized"}),
        );
        harness
            .config
            .default_responses
            .insert("200".to_string(), json!({"description": "ignored"}));
        harness
            .config
            .default_responses
            .insert("500".to_string(), json!({"no": "description"}));

        let doc = DocParser::parse(
            "/**\n * @response 200 {\"data\": {\"id\": 1}}\n * @response 404 Missing\n */",
        );
        let (operation, _) = harness.run(
            &SimpleFormat,
            &Route::new("api/users/{user}", &["GET"]),
            HttpMethod::Get,
            &doc,
            &ValidationRules::new(),
        );

        assert_eq!(
            operation["responses"],
            json!({
                "200": {
                    "description": "Success",
                    "content": {"application/json": {"schema": {"example": {"data": {"id": 1}}}}}
                },
                "404": {
                    "description": "Not Found",
                    "content": {
                        "application/json": {"schema": {"type": "string", "example": "Missing"}}
                    }
                },
                "401": {"$ref": "#/components/responses/Unauthorized"}
            })
        );
    }

    #[test]
    fn test_explicit_scalar_responses_keep_their_type() {
        let harness = Harness::new();
        let doc = DocParser::parse(
            "/**\n * @response 404 404\n * @response 409 false\n * @response 422 0.5\n */",
        );
        let (operation, _) = harness.run(
            &SimpleFormat,
            &Route::new("api/users/{user}", &["GET"]),
            HttpMethod::Get,
            &doc,
            &ValidationRules::new(),
        );

        let schema = |status: &str| {
            operation["responses"][status]["content"]["application/json"]["schema"].clone()
        };
        assert_eq!(schema("404"), json!({"type": "integer", "example": 404}));
        assert_eq!(schema("409"), json!({"type": "boolean", "example": false}));
        assert_eq!(schema("422"), json!({"type": "number", "example": 0.5}));
    }

    #[test]
    fn test_delete_yields_only_no_content() {
        let harness = Harness::new();
        let (operation, _) = harness.run(
            &JsonApiFormat,
            &Route::new("api/users/{user}", &["DELETE"]),
            HttpMethod::Delete,
            &ParsedDoc::default(),
            &ValidationRules::new(),
        );
        assert_eq!(operation["responses"], json!({"204": {"description": "No Content"}}));
        assert_eq!(operation["summary"], json!("Delete User"));
    }

    #[test]
    fn test_response_uses_resource_class() {
        let harness = Harness::with_sources(&[
            (
                "app/Http/Controllers/UserController.php",
                r#"<?php
namespace App\Http\Controllers;

use App\Http\Resources\UserResource;

class UserController extends Controller
{
    public function show($user)
    {
        return UserResource::make($user);
    }
}
"#,
            ),
            (
                "app/Http/Resources/UserResource.php",
                r#"<?php
namespace App\Http\Resources;

use Illuminate\Http\Resources\Json\JsonResource;

class UserResource extends JsonResource
{
    public function toArray($request)
    {
        return [
            'id' => $this->id,
            'email' => $this->email,
            'is_admin' => $this->is_admin,
        ];
    }
}
"#,
            ),
        ]);
        let route = Route::new("api/users/{user}", &["GET"])
            .with_action("App\\Http\\Controllers\\UserController@show");

        let (operation, _) = harness.run(
            &SimpleFormat,
            &route,
            HttpMethod::Get,
            &ParsedDoc::default(),
            &ValidationRules::new(),
        );

        let media = &operation["responses"]["200"]["content"]["application/json"];
        assert_eq!(
            media["schema"]["properties"]["data"]["properties"]["is_admin"],
            json!({"type": "boolean"})
        );
        assert!(media["example"]["data"]["email"].is_string());
    }

    #[test]
    fn test_response_guesses_resource_from_irregular_plural() {
        let harness = Harness::with_sources(&[
            (
                "app/Http/Controllers/MovieController.php",
                r#"<?php
namespace App\Http\Controllers;

class MovieController extends Controller
{
    public function show($movie)
    {
        return Movie::findOrFail($movie);
    }
}
"#,
            ),
            (
                "app/Http/Resources/MovieResource.php",
                r#"<?php
namespace App\Http\Resources;

use Illuminate\Http\Resources\Json\JsonResource;

class MovieResource extends JsonResource
{
    public function toArray($request)
    {
        return [
            'id' => $this->id,
            'title' => $this->title,
            'is_published' => $this->is_published,
        ];
    }
}
"#,
            ),
        ]);
        let route = Route::new("api/movies/{movie}", &["GET"])
            .with_action("App\\Http\\Controllers\\MovieController@show");

        let (operation, _) = harness.run(
            &SimpleFormat,
            &route,
            HttpMethod::Get,
            &ParsedDoc::default(),
            &ValidationRules::new(),
        );

        assert_eq!(operation["summary"], json!("Get Movie"));
        let data = &operation["responses"]["200"]["content"]["application/json"]["schema"]
            ["properties"]["data"];
        assert_eq!(data["properties"]["title"], json!({"type": "string"}));
        assert_eq!(data["properties"]["is_published"], json!({"type": "boolean"}));
        assert!(data["properties"].get("created_at").is_none());
    }

    #[test]
    fn test_names() {
        assert_eq!(query_name("filter"), "filter");
        assert_eq!(query_name("filter.name"), "filter[name]");
        assert_eq!(
            schema_name("order_item", HttpMethod::Patch, &["api", "v1", "order-items"]),
            "OrderItemPatchApiV1OrderItemsRequest"
        );
        assert_eq!(operation_id(&Route::new("/", &["GET"]), HttpMethod::Get, &[]), "get_root");
        assert_eq!(
            resource_name(&ParsedDoc::default(), &["api", "categories"]),
            "category"
        );
    }
}
