//! Merge configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default name of the merged output file.
pub const DEFAULT_OUTPUT: &str = "full.list";

/// Default extension of list files (without the leading dot).
pub const DEFAULT_EXTENSION: &str = "list";

/// Default comment marker.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

/// Configuration for a merge run.
///
/// All fields are optional in YAML; missing fields take their defaults.
///
/// ```yaml
/// root: lists
/// output: full.list
/// extension: list
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Directory searched recursively for list files
    pub root: PathBuf,
    /// Path of the merged output file
    pub output: PathBuf,
    /// Extension identifying list files
    pub extension: String,
    /// Lines starting with this marker (after trimming) are comments
    pub comment_marker: String,
    /// Skip the output file when it lies under the root
    pub exclude_output: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            extension: DEFAULT_EXTENSION.to_string(),
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
            exclude_output: false,
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: MergeConfig = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Normalize and check the configuration.
    ///
    /// A leading dot on the extension is dropped (`.list` -> `list`).
    pub fn validated(mut self) -> Result<Self> {
        if let Some(stripped) = self.extension.strip_prefix('.') {
            self.extension = stripped.to_string();
        }
        if self.extension.is_empty() {
            return Err(Error::Config("extension must not be empty".to_string()));
        }
        if self.comment_marker.is_empty() {
            return Err(Error::Config("comment marker must not be empty".to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::Config("output path must not be empty".to_string()));
        }
        Ok(self)
    }
}
