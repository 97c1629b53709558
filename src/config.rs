//! Generator configuration.
//!
//! Every section carries `#[serde(default)]`, so a configuration file only
//! needs to name the values it changes:
//!
//! ```yaml
//! info:
//!   title: Shop API
//! format: json-api
//! routes:
//!   include: ["api/v1/*"]
//! examples:
//!   seed: 42
//! ```

use crate::error::{Error, Result};
use crate::openapi_builder::{Contact, License, Server};
use crate::type_resolver::OpenApiType;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openapi_version: String,
    pub info: InfoConfig,
    pub servers: Vec<Server>,
    pub security: SecurityConfig,
    /// Name of the response format (`simple`, `json-api` or a registered custom one)
    pub format: String,
    pub routes: RoutesConfig,
    /// Locale of generated descriptions (`en`, `ru`)
    pub locale: String,
    /// Overrides for the localized HTTP status descriptions
    pub status_descriptions: IndexMap<u16, String>,
    /// Validation rule name to OpenAPI type
    pub type_map: IndexMap<String, OpenApiType>,
    pub tags: TagsConfig,
    /// Responses merged into every operation, keyed by status code
    pub default_responses: IndexMap<String, serde_json::Value>,
    pub resources: ResourcesConfig,
    pub output: OutputConfig,
    pub examples: ExamplesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openapi_version: "3.0.3".to_string(),
            info: InfoConfig::default(),
            servers: vec![Server {
                url: "http://localhost".to_string(),
                description: Some("Default server".to_string()),
                variables: IndexMap::new(),
            }],
            security: SecurityConfig::default(),
            format: "simple".to_string(),
            routes: RoutesConfig::default(),
            locale: "en".to_string(),
            status_descriptions: IndexMap::new(),
            type_map: default_type_map(),
            tags: TagsConfig::default(),
            default_responses: IndexMap::new(),
            resources: ResourcesConfig::default(),
            output: OutputConfig::default(),
            examples: ExamplesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            contact: None,
            license: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Security scheme objects keyed by scheme name, emitted verbatim
    pub schemes: IndexMap<String, serde_json::Value>,
    /// Scheme names required by default on every operation
    pub default: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let mut schemes = IndexMap::new();
        schemes.insert(
            "bearerAuth".to_string(),
            serde_json::json!({
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT",
            }),
        );
        Self {
            schemes,
            default: vec!["bearerAuth".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// URI globs a route must match (empty means everything)
    pub include: Vec<String>,
    /// URI globs that drop a route; checked before `include`
    pub exclude: Vec<String>,
    pub exclude_middleware: Vec<String>,
    /// Lower-case HTTP methods to document
    pub methods: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            include: vec!["api/*".to_string()],
            exclude: ["sanctum/*", "horizon/*", "_ignition/*", "__clockwork/*"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_middleware: Vec::new(),
            methods: ["get", "post", "put", "patch", "delete"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Predefined tags: name to description
    pub definitions: IndexMap<String, String>,
    /// Add tags discovered from routes to the top-level tag list
    pub auto_generate: bool,
    /// Sort the top-level tag list by name
    pub sort: bool,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            definitions: IndexMap::new(),
            auto_generate: true,
            sort: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Namespaces searched when guessing a resource class by name
    pub namespaces: Vec<String>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            namespaces: vec!["App\\Http\\Resources".to_string(), "App\\Models".to_string()],
        }
    }
}

/// Serialization format of the output document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("docs/openapi.json"),
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamplesConfig {
    /// Fixed seed for reproducible example values
    pub seed: Option<u64>,
    /// Number of items rendered in collection examples
    pub collection_size: usize,
    /// Page size reported in pagination examples
    pub per_page: u32,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        Self {
            seed: None,
            collection_size: 2,
            per_page: 15,
        }
    }
}

/// Rule name to OpenAPI type mapping used when no `type_map` is configured
pub fn default_type_map() -> IndexMap<String, OpenApiType> {
    [
        ("int", OpenApiType::Integer),
        ("integer", OpenApiType::Integer),
        ("numeric", OpenApiType::Integer),
        ("bool", OpenApiType::Boolean),
        ("boolean", OpenApiType::Boolean),
        ("float", OpenApiType::Number),
        ("double", OpenApiType::Number),
        ("number", OpenApiType::Number),
        ("array", OpenApiType::Array),
        ("object", OpenApiType::Object),
        ("file", OpenApiType::String),
        ("image", OpenApiType::String),
    ]
    .into_iter()
    .map(|(rule, ty)| (rule.to_string(), ty))
    .collect()
}

impl Config {
    /// Load a configuration file; `.json` files are read as JSON, everything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content).map_err(|e| config_error(e.to_string()))
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_yaml::from_str(&content).map_err(|e| config_error(e.to_string()))
        }
    }
}
