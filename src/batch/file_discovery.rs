//! File discovery for batch conversion.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_EXTENSIONS;
use crate::error::{ConvertError, Result};

/// Finds convertible images directly inside a directory.
pub struct FileDiscovery {
    /// Lower-case extensions to match, without the dot.
    extensions: Vec<String>,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDiscovery {
    /// Create a discovery matching `jpg`, `jpeg` and `png`.
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the extensions to match.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Discover matching files in `dir` (non-recursive), sorted by path.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(ConvertError::DirectoryNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(ConvertError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            // Follows symlinks, so a link to an image counts as an image.
            let metadata = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("Skipping unreadable entry {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.is_file() && self.matches_extension(&path) {
                files.push(path);
            }
        }

        files.sort();
        log::debug!("Discovered {} file(s) in {}", files.len(), dir.display());

        Ok(files)
    }

    /// Check if a path has one of the configured extensions.
    fn matches_extension(&self, path: &Path) -> bool {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => return false,
        };

        self.extensions.iter().any(|e| *e == ext)
    }
}
