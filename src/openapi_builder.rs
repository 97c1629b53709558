use crate::config::Config;
use crate::doc_parser::{DocParser, ParsedDoc};
use crate::error::Result;
use crate::example_generator::ExampleGenerator;
use crate::formats::{FormatRegistry, ResponseFormat};
use crate::inflector::headline;
use crate::messages::Messages;
use crate::metadata::MetadataProvider;
use crate::operation_builder::{OperationBuilder, RouteContext};
use crate::resource_extractor::ResourceExtractor;
use crate::routes::{ActionRef, HttpMethod, Route, RouteFilter};
use crate::schema_builder::{Schema, SchemaBuilder};
use crate::validation::{self, ValidationRules};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Security requirement: scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Contact {
    /// Drop empty fields; `None` when nothing is left
    fn compact(self) -> Option<Self> {
        let keep = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
        let contact = Self {
            name: keep(self.name),
            email: keep(self.email),
            url: keep(self.url),
        };
        if contact == Self::default() {
            None
        } else {
            Some(contact)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

/// Substitution variable of a templated server URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - the operations of one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Store the operation for `method`; HEAD and OPTIONS are not documented.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options | HttpMethod::Head => {
                debug!("Skipping {} operation", method);
                return;
            }
        };
        *slot = Some(operation);
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [&self.get, &self.post, &self.put, &self.patch, &self.delete]
            .into_iter()
            .flatten()
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: IndexMap<String, ResponseOrRef>,
    /// `Some(vec![])` opts the operation out of the global requirement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// Required JSON body with the given schema
    pub fn new(schema: Schema) -> Self {
        let mut content = IndexMap::new();
        content.insert(
            crate::formats::JSON_CONTENT_TYPE.to_string(),
            MediaType::new(schema),
        );
        Self {
            description: None,
            required: true,
            content,
        }
    }
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl MediaType {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            example: None,
        }
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
        }
    }

    pub fn with_content(mut self, content_type: &str, media: MediaType) -> Self {
        self.content
            .get_or_insert_with(IndexMap::new)
            .insert(content_type.to_string(), media);
        self
    }
}

/// A response, inline or referenced (`{"$ref": "#/components/responses/..."}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(Response),
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, Value>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Sorted by path; serializes as `{}` when empty
    pub paths: BTreeMap<String, PathItem>,
    pub components: Components,
}

impl OpenApiDocument {
    /// Number of documented operations across all paths
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations().count()).sum()
    }
}

/// Progress of a build, reported once per documented route
#[derive(Debug, Clone, Copy)]
pub struct RouteProgress<'r> {
    /// 1-based position among the collected routes
    pub index: usize,
    pub total: usize,
    pub route: &'r Route,
    pub path: &'r str,
    pub methods: &'r [HttpMethod],
}

type ProgressCallback<'a> = Box<dyn FnMut(RouteProgress<'_>) + 'a>;

/// Specification builder - turns a route table into an OpenAPI document
pub struct OpenApiBuilder<'a> {
    config: &'a Config,
    provider: &'a dyn MetadataProvider,
    format: Box<dyn ResponseFormat>,
    messages: Messages,
    schema_builder: SchemaBuilder,
    progress: Option<ProgressCallback<'a>>,
    processed: usize,
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(
        config: &'a Config,
        provider: &'a dyn MetadataProvider,
        format: Box<dyn ResponseFormat>,
    ) -> Self {
        debug!("Initializing OpenApiBuilder with format {}", format.name());

        let messages =
            Messages::for_code(&config.locale).with_status_overrides(config.status_descriptions.clone());
        let schema_builder = SchemaBuilder::new(
            config.type_map.clone(),
            messages.clone(),
            ExampleGenerator::new(config.examples.seed),
        );

        Self {
            config,
            provider,
            format,
            messages,
            schema_builder,
            progress: None,
            processed: 0,
        }
    }

    /// Builder using the format named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::UnknownFormat`] when the registry has no
    /// such format.
    pub fn from_registry(
        config: &'a Config,
        provider: &'a dyn MetadataProvider,
        registry: &FormatRegistry,
    ) -> Result<Self> {
        let format = registry.resolve(&config.format)?;
        Ok(Self::new(config, provider, format))
    }

    /// Call `callback` for every route that gets documented
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(RouteProgress<'_>) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// The example generator, e.g. to register custom name patterns
    pub fn examples_mut(&mut self) -> &mut ExampleGenerator {
        self.schema_builder.examples()
    }

    pub fn format(&self) -> &dyn ResponseFormat {
        self.format.as_ref()
    }

    /// Number of routes documented by the last build
    pub fn processed_routes(&self) -> usize {
        self.processed
    }

    /// Build the document for a route table.
    pub fn build(&mut self, routes: &[Route]) -> OpenApiDocument {
        let selected = RouteFilter::new(&self.config.routes).collect(routes);
        debug!("{} of {} routes selected", selected.len(), routes.len());

        let resources = ResourceExtractor::new(self.provider);
        let operations =
            OperationBuilder::new(self.config, self.format.as_ref(), &resources, &self.messages);

        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        let mut schemas: IndexMap<String, Schema> = IndexMap::new();
        let mut used_tags: IndexSet<String> = IndexSet::new();
        let total = selected.len();
        self.processed = 0;

        for (idx, route) in selected.into_iter().enumerate() {
            let methods = route.allowed_methods(&self.config.routes.methods);
            if methods.is_empty() {
                debug!("Route {} has no documented methods", route.uri);
                continue;
            }

            let path = route.normalized_path();
            if let Some(progress) = self.progress.as_mut() {
                progress(RouteProgress {
                    index: idx + 1,
                    total,
                    route,
                    path: &path,
                    methods: &methods,
                });
            }

            let (doc, rules) = action_metadata(self.provider, route);
            let tags = resolve_tags(route, &doc);
            used_tags.extend(tags.iter().cloned());

            let ctx = RouteContext {
                route,
                doc: &doc,
                rules: &rules,
                tags: &tags,
            };
            for method in methods {
                let operation =
                    operations.generate(&ctx, method, &mut self.schema_builder, &mut schemas);
                paths.entry(path.clone()).or_default().set(method, operation);
            }
            self.processed += 1;
        }

        let mut components = Components {
            schemas: self.format.schemas(),
            responses: self.format.responses(&self.messages),
            security_schemes: self.config.security.schemes.clone(),
        };
        components.schemas.extend(schemas);

        OpenApiDocument {
            openapi: self.config.openapi_version.clone(),
            info: self.info(),
            servers: self.servers(),
            security: self
                .config
                .security
                .default
                .iter()
                .map(|scheme| {
                    let mut requirement = SecurityRequirement::new();
                    requirement.insert(scheme.clone(), Vec::new());
                    requirement
                })
                .collect(),
            tags: self.tags(&used_tags),
            paths,
            components,
        }
    }

    fn info(&self) -> Info {
        let info = &self.config.info;
        let description = info
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(self.format.description().to_string()))
            .filter(|d| !d.is_empty());

        Info {
            title: info.title.clone(),
            description,
            version: info.version.clone(),
            contact: info.contact.clone().and_then(Contact::compact),
            license: info.license.clone().filter(|l| !l.name.trim().is_empty()),
        }
    }

    fn servers(&self) -> Vec<Server> {
        self.config
            .servers
            .iter()
            .map(|server| Server {
                url: server.url.trim_end_matches('/').to_string(),
                description: server.description.clone().filter(|d| !d.is_empty()),
                variables: server.variables.clone(),
            })
            .collect()
    }

    /// Configured definitions, then tags discovered on operations
    fn tags(&self, used: &IndexSet<String>) -> Vec<Tag> {
        let tags_config = &self.config.tags;

        let mut tags: IndexMap<String, Tag> = tags_config
            .definitions
            .iter()
            .map(|(name, description)| {
                let tag = Tag {
                    name: name.clone(),
                    description: Some(description.clone()).filter(|d| !d.is_empty()),
                };
                (name.clone(), tag)
            })
            .collect();

        if tags_config.auto_generate {
            for name in used {
                tags.entry(name.clone()).or_insert_with(|| Tag {
                    name: name.clone(),
                    description: None,
                });
            }
        }

        let mut tags: Vec<Tag> = tags.into_values().collect();
        if tags_config.sort {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        tags
    }
}

/// Doc-comment and validation rules of the route's controller action.
///
/// Closures and unknown actions yield empty metadata.
fn action_metadata(
    provider: &dyn MetadataProvider,
    route: &Route,
) -> (ParsedDoc, ValidationRules) {
    let ActionRef::Controller { class, method } = &route.action else {
        return (ParsedDoc::default(), ValidationRules::new());
    };

    if !provider.method_exists(class, method) {
        warn!("Action {}@{} not found, using defaults", class, method);
        return (ParsedDoc::default(), ValidationRules::new());
    }

    let doc = provider
        .doc_comment(class, method)
        .map(|raw| DocParser::parse(&raw))
        .unwrap_or_default();
    let rules = validation::extract(provider, class, method);
    (doc, rules)
}

/// Group, then doc tags, then the route name prefix, then the last static
/// URI segment, then `General`.
fn resolve_tags(route: &Route, doc: &ParsedDoc) -> Vec<String> {
    if let Some(group) = doc.group.as_ref().filter(|g| !g.is_empty()) {
        return vec![group.clone()];
    }

    if !doc.tags.is_empty() {
        return doc.tags.clone();
    }

    if let Some((prefix, _)) = route.name.as_deref().and_then(|name| name.split_once('.')) {
        if !prefix.is_empty() {
            return vec![headline(prefix)];
        }
    }

    match route.static_segments().last() {
        Some(segment) => vec![headline(segment)],
        None => vec!["General".to_string()],
    }
}
