//! Code metadata providers.
//!
//! The generator never inspects a host application directly. Everything it
//! needs to know about controllers, form requests and resource classes goes
//! through the [`MetadataProvider`] trait, so a host can hand over exact
//! metadata instead of source text that has to be pattern-matched.
//!
//! [`ClassIndex`] is the bundled implementation. It can be deserialized from
//! an inline `classes:` section of the route table or built by scanning a
//! source tree with [`source::SourceParser`].
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::metadata::{ClassIndex, MetadataProvider};
//!
//! let index = ClassIndex::from_sources(&[(
//!     "app/Http/Controllers/UserController.php",
//!     r#"<?php
//!     namespace App\Http\Controllers;
//!
//!     class UserController extends Controller
//!     {
//!         /** List users. */
//!         public function index() { return []; }
//!     }
//!     "#,
//! )]);
//!
//! assert!(index.class_exists("App\\Http\\Controllers\\UserController"));
//! ```

pub mod source;

use crate::scanner::FileScanner;
use crate::validation::ValidationRules;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Capability interface over the host application's code.
///
/// Every lookup is best-effort: a missing class or method yields `None` (or an
/// empty collection), never an error.
pub trait MetadataProvider {
    /// Whether the fully qualified class is known
    fn class_exists(&self, class: &str) -> bool;

    /// Fully qualified name of the direct parent class
    fn parent_class(&self, class: &str) -> Option<String>;

    /// Whether the class declares the method
    fn method_exists(&self, class: &str, method: &str) -> bool;

    /// Raw doc-comment block attached to a method
    fn doc_comment(&self, class: &str, method: &str) -> Option<String>;

    /// Source text of a method, signature and body included
    fn method_source(&self, class: &str, method: &str) -> Option<String>;

    /// Type hints of the method parameters, in declaration order
    fn method_parameter_types(&self, class: &str, method: &str) -> Vec<String>;

    /// Declared return type of a method
    fn method_return_type(&self, class: &str, method: &str) -> Option<String>;

    /// Explicit attribute whitelist declared on the class
    fn declared_fields(&self, class: &str) -> Option<Vec<String>>;

    /// Declared attribute types (`name -> type`) documented on the class
    fn declared_field_types(&self, class: &str) -> IndexMap<String, String>;

    /// Resolve a short class name as seen from `context_class`
    fn resolve_short_name(&self, name: &str, context_class: &str) -> Option<String>;

    /// Validation rules supplied verbatim by the host, bypassing source scanning
    fn declared_rules(&self, _class: &str, _method: &str) -> Option<ValidationRules> {
        None
    }
}

/// Metadata about one method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodInfo {
    /// Raw doc-comment block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Parameter type hints (untyped parameters are omitted)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// Declared return type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Method source text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Exact validation rules, when the host knows them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<ValidationRules>,
}

/// Metadata about one class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassInfo {
    /// Fully qualified parent class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Imported classes of the declaring file, keyed by alias
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub imports: IndexMap<String, String>,
    /// Explicit attribute whitelist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    /// Documented attribute types
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub property_types: IndexMap<String, String>,
    /// Methods keyed by name
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub methods: IndexMap<String, MethodInfo>,
    /// File the class was read from
    #[serde(skip)]
    pub file: Option<PathBuf>,
}

/// In-memory index of class metadata keyed by fully qualified class name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassIndex {
    #[serde(default)]
    classes: IndexMap<String, ClassInfo>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a class
    pub fn insert(&mut self, class: impl Into<String>, info: ClassInfo) {
        let class = class.into();
        let class = class.trim_start_matches('\\').to_string();
        self.classes.insert(class, info);
    }

    /// Look up a class
    pub fn get(&self, class: &str) -> Option<&ClassInfo> {
        self.classes.get(class.trim_start_matches('\\'))
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Merge another index into this one; classes of `other` win on conflict
    pub fn merge(&mut self, other: ClassIndex) {
        self.classes.extend(other.classes);
    }

    /// Build an index from in-memory `(path, content)` pairs
    pub fn from_sources<P: AsRef<Path>>(sources: &[(P, &str)]) -> Self {
        let mut index = Self::new();
        for (path, content) in sources {
            for (class, info) in source::SourceParser::parse(content, Some(path.as_ref())) {
                index.insert(class, info);
            }
        }
        index
    }

    /// Build an index by scanning a source tree for files with the given extensions.
    ///
    /// Unreadable files are logged and skipped; only a missing root directory
    /// is an error.
    pub fn from_directory(root: &Path, extensions: &[&str]) -> Result<Self> {
        let scanner = FileScanner::new(root.to_path_buf()).with_extensions(extensions);
        let scan_result = scanner
            .scan()
            .with_context(|| format!("Failed to scan source directory: {}", root.display()))?;

        let mut index = Self::new();
        for file in &scan_result.source_files {
            let bytes = match fs::read(file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable source file {}: {}", file.display(), e);
                    continue;
                }
            };
            // Host sources are not guaranteed to be valid UTF-8
            let content = String::from_utf8_lossy(&bytes);
            for (class, info) in source::SourceParser::parse(&content, Some(file)) {
                debug!("Indexed class {} from {}", class, file.display());
                index.insert(class, info);
            }
        }

        debug!("Indexed {} classes under {}", index.len(), root.display());
        Ok(index)
    }

    fn method(&self, class: &str, method: &str) -> Option<&MethodInfo> {
        self.get(class).and_then(|info| info.methods.get(method))
    }
}

/// Namespace part of a fully qualified class name
pub fn namespace_of(class: &str) -> Option<&str> {
    class
        .trim_start_matches('\\')
        .rfind('\\')
        .map(|idx| &class.trim_start_matches('\\')[..idx])
}

/// Last segment of a fully qualified class name
pub fn short_name(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}

impl MetadataProvider for ClassIndex {
    fn class_exists(&self, class: &str) -> bool {
        self.get(class).is_some()
    }

    fn parent_class(&self, class: &str) -> Option<String> {
        self.get(class).and_then(|info| info.parent.clone())
    }

    fn method_exists(&self, class: &str, method: &str) -> bool {
        self.method(class, method).is_some()
    }

    fn doc_comment(&self, class: &str, method: &str) -> Option<String> {
        self.method(class, method).and_then(|m| m.doc.clone())
    }

    fn method_source(&self, class: &str, method: &str) -> Option<String> {
        self.method(class, method)
            .map(|m| m.source.clone())
            .filter(|source| !source.is_empty())
    }

    fn method_parameter_types(&self, class: &str, method: &str) -> Vec<String> {
        self.method(class, method)
            .map(|m| m.parameters.clone())
            .unwrap_or_default()
    }

    fn method_return_type(&self, class: &str, method: &str) -> Option<String> {
        self.method(class, method).and_then(|m| m.return_type.clone())
    }

    fn declared_fields(&self, class: &str) -> Option<Vec<String>> {
        self.get(class).and_then(|info| info.attributes.clone())
    }

    fn declared_field_types(&self, class: &str) -> IndexMap<String, String> {
        self.get(class)
            .map(|info| info.property_types.clone())
            .unwrap_or_default()
    }

    fn resolve_short_name(&self, name: &str, context_class: &str) -> Option<String> {
        let name = name.trim_start_matches('\\');

        if self.class_exists(name) {
            return Some(name.to_string());
        }

        if let Some(context) = self.get(context_class) {
            if let Some(imported) = context.imports.get(name) {
                return Some(imported.clone());
            }
            // `use App\Http\Resources\UserResource as Base;` followed by `Base\Other`
            if let Some((head, rest)) = name.split_once('\\') {
                if let Some(imported) = context.imports.get(head) {
                    return Some(format!("{}\\{}", imported, rest));
                }
            }
        }

        if let Some(ns) = namespace_of(context_class) {
            let candidate = format!("{}\\{}", ns, name);
            if self.class_exists(&candidate) {
                return Some(candidate);
            }
        }

        debug!("Could not resolve class {} from {}", name, context_class);
        None
    }

    fn declared_rules(&self, class: &str, method: &str) -> Option<ValidationRules> {
        self.method(class, method).and_then(|m| m.rules.clone())
    }
}
