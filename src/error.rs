use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
///
/// Only global configuration and output failures are represented here. Failures
/// that concern a single route (missing controller, unreadable source, broken
/// resource class) are absorbed where they happen and never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown format: {name}. Available: {}", available.join(", "))]
    UnknownFormat { name: String, available: Vec<String> },

    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid route table {}: {message}", path.display())]
    RouteTable { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cannot write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_lists_available() {
        let err = Error::UnknownFormat {
            name: "xml".to_string(),
            available: vec!["simple".to_string(), "json-api".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown format: xml. Available: simple, json-api");
    }

    #[test]
    fn test_output_error_mentions_path() {
        let err = Error::Output {
            path: PathBuf::from("/tmp/out/openapi.json"),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/out/openapi.json"));
    }
}
