//! Route table model, loading and filtering.
//!
//! The host framework's route registry is handed over as a YAML or JSON file:
//!
//! ```yaml
//! routes:
//!   - uri: api/users/{user}
//!     methods: [GET, HEAD]
//!     name: users.show
//!     middleware: [api, auth:sanctum]
//!     action: App\Http\Controllers\UserController@show
//! ```
//!
//! The same file may carry a `classes:` section with exact class metadata
//! (see [`crate::metadata::ClassIndex`]).

use crate::config::RoutesConfig;
use crate::error::{Error, Result};
use crate::metadata::ClassIndex;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

static OPTIONAL_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\?}").unwrap());

static PARAM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}?]+)\??}").unwrap());

/// HTTP methods a route can answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Parse a method name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Lower-case name, as used for OpenAPI path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    /// Whether requests with this method carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Whether the method is ever documented
    pub fn is_documented(&self) -> bool {
        !matches!(self, HttpMethod::Head | HttpMethod::Options)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Target of a route: a controller method or an anonymous closure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionRef {
    Controller { class: String, method: String },
    #[default]
    Closure,
}

impl From<String> for ActionRef {
    fn from(action: String) -> Self {
        match action.split_once('@') {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                ActionRef::Controller {
                    class: class.trim_start_matches('\\').to_string(),
                    method: method.to_string(),
                }
            }
            _ => ActionRef::Closure,
        }
    }
}

impl From<ActionRef> for String {
    fn from(action: ActionRef) -> Self {
        match action {
            ActionRef::Controller { class, method } => format!("{}@{}", class, method),
            ActionRef::Closure => "Closure".to_string(),
        }
    }
}

/// One entry of the host's route table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// URI template such as `api/users/{user}` or `api/posts/{post?}`
    pub uri: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub action: ActionRef,
}

impl Route {
    pub fn new(uri: &str, methods: &[&str]) -> Self {
        Self {
            uri: uri.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            name: None,
            middleware: Vec::new(),
            action: ActionRef::Closure,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_middleware(mut self, middleware: &[&str]) -> Self {
        self.middleware = middleware.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = ActionRef::from(action.to_string());
        self
    }

    /// URI without surrounding slashes, as matched by include/exclude globs
    pub fn bare_uri(&self) -> &str {
        self.uri.trim_matches('/')
    }

    /// OpenAPI path: optional `{p?}` collapsed to `{p}`, with a leading slash.
    pub fn normalized_path(&self) -> String {
        let path = OPTIONAL_PARAM_REGEX.replace_all(&self.uri, "{$1}");
        format!("/{}", path.trim_start_matches('/'))
    }

    /// Path parameter names in URI order
    pub fn parameter_names(&self) -> Vec<String> {
        PARAM_REGEX
            .captures_iter(&self.uri)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// URI segments that are not parameter placeholders
    pub fn static_segments(&self) -> Vec<&str> {
        self.uri
            .split('/')
            .filter(|s| !s.is_empty() && !s.starts_with('{'))
            .collect()
    }

    /// Last URI segment, placeholders included
    pub fn last_segment(&self) -> Option<&str> {
        self.uri.split('/').rev().find(|s| !s.is_empty())
    }

    /// Route methods, in route order, that are configured and documentable.
    ///
    /// HEAD and OPTIONS are never returned.
    pub fn allowed_methods(&self, configured: &[String]) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for method in self.methods.iter().filter_map(|m| HttpMethod::from_name(m)) {
            let allowed = method.is_documented()
                && configured.iter().any(|c| c.eq_ignore_ascii_case(method.as_str()));
            if allowed && !methods.contains(&method) {
                methods.push(method);
            }
        }
        methods
    }
}

/// Routes plus the optional inline class metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(flatten)]
    pub classes: ClassIndex,
}

impl RouteTable {
    /// Load a route table; `.json` files are read as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteTable`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading route table from {}", path.display());

        let table_error = |message: String| Error::RouteTable {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path).map_err(|e| table_error(e.to_string()))?;
        let content = String::from_utf8_lossy(&bytes);

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let table: RouteTable = if is_json {
            serde_json::from_str(&content).map_err(|e| table_error(e.to_string()))?
        } else if content.trim().is_empty() {
            RouteTable::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| table_error(e.to_string()))?
        };

        debug!(
            "Loaded {} routes and {} inline classes",
            table.routes.len(),
            table.classes.len()
        );
        Ok(table)
    }
}

/// Route collector - filters routes by URI globs and middleware
#[derive(Debug, Clone)]
pub struct RouteFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    exclude_middleware: Vec<String>,
}

impl RouteFilter {
    pub fn new(config: &RoutesConfig) -> Self {
        Self {
            include: config.include.iter().filter_map(|p| glob_to_regex(p)).collect(),
            exclude: config.exclude.iter().filter_map(|p| glob_to_regex(p)).collect(),
            exclude_middleware: config.exclude_middleware.clone(),
        }
    }

    /// Whether a route passes the filter.
    ///
    /// Exclude globs win over include globs; a route with any excluded
    /// middleware is dropped; an empty include list lets everything else in.
    pub fn accepts(&self, route: &Route) -> bool {
        let uri = route.bare_uri();

        if self.exclude.iter().any(|re| re.is_match(uri)) {
            debug!("Route {} excluded by pattern", route.uri);
            return false;
        }

        if route
            .middleware
            .iter()
            .any(|m| self.exclude_middleware.contains(m))
        {
            debug!("Route {} excluded by middleware", route.uri);
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|re| re.is_match(uri))
    }

    /// Routes that pass the filter, in table order
    pub fn collect<'r>(&self, routes: &'r [Route]) -> Vec<&'r Route> {
        routes.iter().filter(|route| self.accepts(route)).collect()
    }
}

/// `api/*` -> `^api/.*$`; everything but `*` matches literally
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let body = pattern
        .trim_matches('/')
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    match Regex::new(&format!("^{}$", body)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Ignoring route pattern {}: {}", pattern, e);
            None
        }
    }
}
