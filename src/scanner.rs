use anyhow::{bail, Result};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directory names that never contain application sources worth indexing
const SKIPPED_DIRS: &[&str] = &["target", "vendor", "node_modules", "storage"];

/// File scanner for traversing host application source trees.
///
/// The `FileScanner` recursively walks a directory and collects every file whose
/// extension is in its extension list (`php` by default). Dependency and build
/// directories (`vendor`, `node_modules`, `storage`, `target`) and hidden
/// directories are skipped.
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./app"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extensions: Vec<String>,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered source files, in walk order
    pub source_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            extensions: vec!["php".to_string()],
        }
    }

    /// Replaces the list of file extensions to collect (without leading dot).
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Scans the directory tree and collects all matching files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning
    /// continues past them.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            bail!("Not a directory: {}", self.root_path.display());
        }

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = e.file_type().is_dir() && SKIPPED_DIRS.contains(&file_name.as_ref());

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let matches = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .map(|ext| self.extensions.iter().any(|e| e == ext))
                        .unwrap_or(false);

                    if path.is_file() && matches {
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }
}
