//! Serialization of OpenAPI documents to JSON or YAML, and atomic file output.
//!
//! JSON output never escapes `/` or non-ASCII characters, so localized
//! descriptions stay readable in the written file.

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiDocument;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes an OpenAPI document to JSON, indented when `pretty` is set.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument, pretty: bool) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON (pretty: {})", pretty);
    let content = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(content)
}

/// Serializes a document in the requested output format.
pub fn serialize(doc: &OpenApiDocument, format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Json => serialize_json(doc, pretty),
        OutputFormat::Yaml => serialize_yaml(doc),
    }
}

/// Writes string content to a file, creating parent directories.
///
/// The content is written to a temporary file next to the target and then
/// moved over it, so a failed write never leaves a partial file behind.
///
/// # Errors
///
/// Returns [`Error::Output`] if the directory cannot be created or the file
/// cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    let output_error = |message: String| Error::Output {
        path: path.to_path_buf(),
        message,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| {
        output_error(format!("cannot create directory {}: {}", parent.display(), e))
    })?;

    let mut file = NamedTempFile::new_in(parent).map_err(|e| output_error(e.to_string()))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| output_error(e.to_string()))?;
    file.persist(path).map_err(|e| output_error(e.error.to_string()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
