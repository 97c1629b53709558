//! Response formats.
//!
//! A format decides how responses are enveloped: which component schemas the
//! document carries, which reusable responses exist and how the success
//! response of a single operation looks. Two formats are built in (`simple`
//! and `json-api`); more can be added to a [`FormatRegistry`].

mod json_api;
mod simple;

pub use json_api::JsonApiFormat;
pub use simple::SimpleFormat;

use crate::error::{Error, Result};
use crate::example_generator::ExampleGenerator;
use crate::messages::Messages;
use crate::openapi_builder::{MediaType, Response};
use crate::resource_extractor::{Attributes, ResourceDescriptor};
use crate::routes::HttpMethod;
use crate::schema_builder::Schema;
use crate::type_resolver::OpenApiType;
use indexmap::IndexMap;
use serde_json::Value;

/// Content type of every generated body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Everything a format knows about the operation it renders a response for
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    /// Singular resource name, e.g. `user`
    pub resource: &'a str,
    /// Name of the resource collection, e.g. `users`
    pub collection_name: &'a str,
    /// Resource class metadata, when a resource class was found
    pub descriptor: Option<&'a ResourceDescriptor>,
    /// Metadata of related resources keyed by relationship name
    pub related: &'a IndexMap<String, ResourceDescriptor>,
    pub is_collection: bool,
    /// Number of items rendered in collection examples
    pub collection_size: usize,
    pub per_page: u32,
}

impl<'a> ResponseContext<'a> {
    pub fn attributes(&self) -> Option<&'a Attributes> {
        self.descriptor.map(|d| &d.attributes)
    }
}

/// A response envelope policy
pub trait ResponseFormat {
    /// Identifier used in configuration
    fn name(&self) -> &str;

    /// Default `info.description` of documents in this format
    fn description(&self) -> &str;

    /// Component schemas every document in this format carries
    fn schemas(&self) -> IndexMap<String, Schema>;

    /// Name of the component schema wrapping successful responses
    fn success_schema(&self) -> &str;

    /// Name of the component schema wrapping error responses
    fn error_schema(&self) -> &str;

    /// Reusable component responses
    fn responses(&self, messages: &Messages) -> IndexMap<String, Response> {
        let success = Schema::reference(self.success_schema());
        let error = Schema::reference(self.error_schema());

        let mut responses = IndexMap::new();
        for name in ["Success", "Created"] {
            responses.insert(
                name.to_string(),
                wrap(messages.component_response(name), success.clone()),
            );
        }
        for name in ["BadRequest", "Unauthorized", "NotFound", "ValidationError"] {
            responses.insert(
                name.to_string(),
                wrap(messages.component_response(name), error.clone()),
            );
        }
        responses.insert(
            "NoContent".to_string(),
            Response::new(messages.component_response("NoContent")),
        );
        responses
    }

    /// Success response of one operation, keyed by status code.
    ///
    /// POST answers `201`, DELETE answers `204` without a body and every
    /// other method answers `200`.
    fn operation_response(
        &self,
        method: HttpMethod,
        ctx: &ResponseContext<'_>,
        examples: &mut ExampleGenerator,
        messages: &Messages,
    ) -> IndexMap<String, Response>;
}

/// Status code of a successful response to `method`
pub fn success_status(method: HttpMethod) -> u16 {
    match method {
        HttpMethod::Post => 201,
        HttpMethod::Delete => 204,
        _ => 200,
    }
}

/// `{description, content: {application/json: {schema}}}`
pub fn wrap(description: &str, schema: Schema) -> Response {
    Response::new(description).with_content(JSON_CONTENT_TYPE, MediaType::new(schema))
}

/// The single body-less `204` answer of a DELETE
pub(crate) fn no_content(messages: &Messages) -> IndexMap<String, Response> {
    let mut responses = IndexMap::new();
    responses.insert("204".to_string(), Response::new(messages.status(204)));
    responses
}

/// A JSON success response for `method` with an example payload
pub(crate) fn success_response(
    method: HttpMethod,
    messages: &Messages,
    schema: Schema,
    example: Value,
) -> IndexMap<String, Response> {
    let status = success_status(method);
    let response = Response::new(messages.status(status)).with_content(
        JSON_CONTENT_TYPE,
        MediaType::new(schema).with_example(example),
    );

    let mut responses = IndexMap::new();
    responses.insert(status.to_string(), response);
    responses
}

/// Typed object schema of a resource record, or a free-form object when
/// nothing is known about the resource.
pub(crate) fn attributes_schema(attributes: Option<&Attributes>) -> Schema {
    let Some(attributes) = attributes else {
        return Schema::map();
    };

    let mut schema = Schema::object().with_property("id", Schema::of_type(OpenApiType::Integer));
    for (name, attribute) in attributes {
        schema
            .properties
            .insert(name.clone(), Schema::of_type(attribute.ty));
    }
    schema
}

type FormatFactory = Box<dyn Fn() -> Box<dyn ResponseFormat>>;

/// Format names mapped to constructors
pub struct FormatRegistry {
    factories: IndexMap<String, FormatFactory>,
}

impl FormatRegistry {
    /// Registry holding the built-in formats
    pub fn new() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
        };
        registry.register("simple", || Box::new(SimpleFormat));
        registry.register("json-api", || Box::new(JsonApiFormat));
        registry
    }

    /// Register a format under `name`, replacing any previous registration
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn ResponseFormat> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Instantiate the format registered under `name`
    pub fn resolve(&self, name: &str) -> Result<Box<dyn ResponseFormat>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(Error::UnknownFormat {
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Locale;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct PlainFormat;

    impl ResponseFormat for PlainFormat {
        fn name(&self) -> &str {
            "plain"
        }

        fn description(&self) -> &str {
            "Plain API"
        }

        fn schemas(&self) -> IndexMap<String, Schema> {
            IndexMap::new()
        }

        fn success_schema(&self) -> &str {
            "Plain"
        }

        fn error_schema(&self) -> &str {
            "PlainError"
        }

        fn operation_response(
            &self,
            method: HttpMethod,
            _ctx: &ResponseContext<'_>,
            _examples: &mut ExampleGenerator,
            messages: &Messages,
        ) -> IndexMap<String, Response> {
            success_response(method, messages, Schema::map(), json!({}))
        }
    }

    #[test]
    fn test_registry_resolves_builtins() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.names(), vec!["simple".to_string(), "json-api".to_string()]);
        assert_eq!(registry.resolve("simple").unwrap().name(), "simple");
        assert_eq!(registry.resolve("json-api").unwrap().name(), "json-api");
    }

    #[test]
    fn test_registry_unknown_format_lists_available() {
        let registry = FormatRegistry::new();
        let err = registry.resolve("xml").err().unwrap();
        assert_eq!(err.to_string(), "Unknown format: xml. Available: simple, json-api");
    }

    #[test]
    fn test_registry_accepts_custom_format() {
        let mut registry = FormatRegistry::new();
        registry.register("plain", || Box::new(PlainFormat));

        let format = registry.resolve("plain").unwrap();
        assert_eq!(format.description(), "Plain API");
        assert!(registry.names().contains(&"plain".to_string()));
    }

    #[test]
    fn test_default_component_responses() {
        let responses = PlainFormat.responses(&Messages::new(Locale::En));

        let names: Vec<&str> = responses.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "Success",
                "Created",
                "BadRequest",
                "Unauthorized",
                "NotFound",
                "ValidationError",
                "NoContent"
            ]
        );
        assert_eq!(
            serde_json::to_value(&responses["NotFound"]).unwrap(),
            json!({
                "description": "Resource not found",
                "content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/PlainError"}}
                }
            })
        );
        assert_eq!(
            serde_json::to_value(&responses["NoContent"]).unwrap(),
            json!({"description": "Resource deleted"})
        );
    }

    #[test]
    fn test_success_status() {
        assert_eq!(success_status(HttpMethod::Post), 201);
        assert_eq!(success_status(HttpMethod::Delete), 204);
        assert_eq!(success_status(HttpMethod::Put), 200);
        assert_eq!(success_status(HttpMethod::Get), 200);
    }

    #[test]
    fn test_attributes_schema_without_metadata_is_free_form() {
        assert_eq!(
            serde_json::to_value(attributes_schema(None)).unwrap(),
            json!({"type": "object", "additionalProperties": true})
        );
    }
}
