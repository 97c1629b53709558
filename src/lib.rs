//! OpenAPI From Routes - OpenAPI 3.0 documents from a web application's route table.
//!
//! The generator reads the routes a host application exposes, the doc-comments
//! and validation rules of their controller actions, and the resource classes
//! that render their responses. From that it synthesizes paths, parameters,
//! request-body schemas and example responses.
//!
//! # Architecture
//!
//! 1. [`routes`] - loads the route table and filters it by URI globs and middleware
//! 2. [`metadata`] - code metadata provider over the host sources ([`scanner`] finds them)
//! 3. [`doc_parser`] - parses `@tag` doc-comments
//! 4. [`validation`] - extracts validation rules from form requests and inline calls
//! 5. [`resource_extractor`] - infers resource attributes and relationships
//! 6. [`type_resolver`] - maps field names and rule tokens to OpenAPI types
//! 7. [`schema_builder`] - turns rule sets into request-body schemas
//! 8. [`example_generator`] - realistic example values keyed by field name
//! 9. [`formats`] - response envelopes (`simple`, `json-api`)
//! 10. [`operation_builder`] - one OpenAPI operation per route and method
//! 11. [`openapi_builder`] - the document model and the top-level builder
//! 12. [`serializer`] - JSON/YAML output
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_routes::{
//!     config::Config,
//!     formats::FormatRegistry,
//!     metadata::ClassIndex,
//!     openapi_builder::OpenApiBuilder,
//!     routes::RouteTable,
//!     serializer::serialize_json,
//! };
//! use std::path::Path;
//!
//! let config = Config::default();
//! let table = RouteTable::load(Path::new("routes.yaml")).unwrap();
//! let classes = ClassIndex::from_directory(Path::new("./app"), &["php"]).unwrap();
//!
//! let mut builder =
//!     OpenApiBuilder::from_registry(&config, &classes, &FormatRegistry::new()).unwrap();
//! let document = builder.build(&table.routes);
//!
//! println!("{}", serialize_json(&document, true).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod doc_parser;
pub mod error;
pub mod example_generator;
pub mod faker;
pub mod formats;
pub mod inflector;
pub mod messages;
pub mod metadata;
pub mod openapi_builder;
pub mod operation_builder;
pub mod resource_extractor;
pub mod routes;
pub mod scanner;
pub mod schema_builder;
pub mod serializer;
pub mod type_resolver;
pub mod validation;
