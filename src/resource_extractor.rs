//! Resource class introspection.
//!
//! A resource class renders a domain object into a response payload. Its
//! attribute names (and their types) shape the response examples, and its
//! declared relationships drive the JSON:API `relationships`/`included`
//! sections.

use crate::inflector::{singular, snake, studly};
use crate::metadata::MetadataProvider;
use crate::type_resolver::{FieldTypeResolver, OpenApiType};
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

static ARRAY_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"](\w+)['"]\s*=>"#).unwrap());

static RELATIONSHIP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"](\w+)['"]\s*=>\s*(?:fn\s*\(\)\s*=>)?\s*(\w+Resource)::(\w+)"#).unwrap()
});

static FACTORY_CALL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+Resource)::(?:make|collection)\s*\(").unwrap());

static CONSTRUCTOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"new\s+(\w+Resource)\s*\(").unwrap());

static CLASS_CONSTANT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+Resource)::class").unwrap());

/// Guards against cyclic parent chains in hand-written metadata
const MAX_PARENT_DEPTH: usize = 32;

/// Type of one resource attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: OpenApiType,
}

impl Attribute {
    pub fn new(ty: OpenApiType) -> Self {
        Self { ty }
    }
}

/// Attribute name to type, in rendering order
pub type Attributes = IndexMap<String, Attribute>;

/// A relationship declared by a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// JSON:API type of the related resource (`snake_case` relationship name)
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Fully qualified class of the related resource, when resolvable
    pub resource: Option<String>,
    /// To-many relationship
    pub collection: bool,
}

/// Attributes and relationships of a resource class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub attributes: Attributes,
    pub relationships: IndexMap<String, Relationship>,
}

/// Resource/relationship extractor with a per-run cache
pub struct ResourceExtractor<'a> {
    provider: &'a dyn MetadataProvider,
    resolver: FieldTypeResolver,
    cache: RefCell<HashMap<String, Option<ResourceDescriptor>>>,
}

impl<'a> ResourceExtractor<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            resolver: FieldTypeResolver::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Describe a resource class, or `None` if the class is unknown.
    ///
    /// Attributes come from the declared whitelist first, then from the keys
    /// of the `toArray` rendering method; a key already known is not replaced.
    /// Relationships come from `toRelationships`.
    pub fn parse_resource(&self, class: &str) -> Option<ResourceDescriptor> {
        if let Some(cached) = self.cache.borrow().get(class) {
            return cached.clone();
        }

        let descriptor = if self.provider.class_exists(class) {
            debug!("Parsing resource class {}", class);
            Some(ResourceDescriptor {
                attributes: self.extract_attributes(class),
                relationships: self.extract_relationships(class),
            })
        } else {
            debug!("Resource class {} not found", class);
            None
        };

        self.cache
            .borrow_mut()
            .insert(class.to_string(), descriptor.clone());
        descriptor
    }

    /// Locate the resource class a controller action responds with.
    ///
    /// Checks the declared return type, then `XResource::make(`,
    /// `XResource::collection(`, `new XResource(` and `XResource::class` in
    /// the action body.
    pub fn find_resource_class(&self, controller: &str, method: &str) -> Option<String> {
        if !self.provider.method_exists(controller, method) {
            return None;
        }

        if let Some(return_type) = self.provider.method_return_type(controller, method) {
            let name = return_type.trim_start_matches('?');
            if let Some(class) = self.provider.resolve_short_name(name, controller) {
                if self.is_resource_class(&class) {
                    return Some(class);
                }
            }
        }

        let source = self.provider.method_source(controller, method)?;
        [&FACTORY_CALL_REGEX, &CONSTRUCTOR_REGEX, &CLASS_CONSTANT_REGEX]
            .iter()
            .find_map(|regex| regex.captures(&source))
            .and_then(|caps| self.provider.resolve_short_name(&caps[1], controller))
    }

    /// Guess a resource class from a resource name (`users` -> `UserResource`).
    ///
    /// Searches `App\Http\Resources`, `App\Http\Resources\{Name}` and the
    /// given namespaces, in that order.
    pub fn guess_resource_class(&self, resource: &str, namespaces: &[String]) -> Option<String> {
        let base = studly(&singular(resource));
        let resource_name = format!("{}Resource", base);

        let mut candidates = vec![
            "App\\Http\\Resources".to_string(),
            format!("App\\Http\\Resources\\{}", base),
        ];
        candidates.extend(namespaces.iter().cloned());

        candidates
            .iter()
            .map(|ns| format!("{}\\{}", ns.trim_end_matches('\\'), resource_name))
            .find(|class| self.provider.class_exists(class) && self.is_resource_class(class))
    }

    /// Whether any ancestor of the class has `Resource` in its name
    pub fn is_resource_class(&self, class: &str) -> bool {
        let mut current = class.to_string();
        for _ in 0..MAX_PARENT_DEPTH {
            match self.provider.parent_class(&current) {
                Some(parent) if parent.contains("Resource") => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    fn extract_attributes(&self, class: &str) -> Attributes {
        let declared_types = self.provider.declared_field_types(class);
        let mut attributes = Attributes::new();

        for name in self.provider.declared_fields(class).unwrap_or_default() {
            let ty = self
                .resolver
                .resolve(&name, None, declared_types.get(&name).map(String::as_str));
            attributes.insert(name, Attribute::new(ty));
        }

        if let Some(source) = self.provider.method_source(class, "toArray") {
            for caps in ARRAY_KEY_REGEX.captures_iter(&source) {
                let name = &caps[1];
                if attributes.contains_key(name) {
                    continue;
                }
                let ty = self
                    .resolver
                    .resolve(name, None, declared_types.get(name).map(String::as_str));
                attributes.insert(name.to_string(), Attribute::new(ty));
            }
        }

        attributes
    }

    fn extract_relationships(&self, class: &str) -> IndexMap<String, Relationship> {
        let Some(source) = self.provider.method_source(class, "toRelationships") else {
            return IndexMap::new();
        };

        RELATIONSHIP_REGEX
            .captures_iter(&source)
            .map(|caps| {
                let name = caps[1].to_string();
                let relationship = Relationship {
                    relation_type: snake(&name),
                    resource: self.provider.resolve_short_name(&caps[2], class),
                    collection: &caps[3] == "collection",
                };
                (name, relationship)
            })
            .collect()
    }
}
