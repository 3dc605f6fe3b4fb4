//! Catalog configuration and category documents
//!
//! The category-definition and override documents are optional inputs. A
//! missing, unreadable or malformed document never fails a session: it
//! degrades to the built-in default with a warning.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::taxonomy::{CategoryOverrides, CategoryTree, DEFAULT_MISC_CATEGORY};

/// Default type at which the hierarchy walk starts
pub const DEFAULT_ROOT_TYPE: &str = "Algorithm";

fn default_root_type() -> String {
    DEFAULT_ROOT_TYPE.to_string()
}

fn default_misc_category() -> String {
    DEFAULT_MISC_CATEGORY.to_string()
}

/// Settings for building a catalog session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Type at which the hierarchy walk starts
    #[serde(default = "default_root_type")]
    pub root_type: String,
    /// Category-definition document
    #[serde(default)]
    pub categories_path: Option<PathBuf>,
    /// Manual override document (type name -> category path)
    #[serde(default)]
    pub category_overrides_path: Option<PathBuf>,
    /// Name of the catch-all category
    #[serde(default = "default_misc_category")]
    pub misc_category: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root_type: default_root_type(),
            categories_path: None,
            category_overrides_path: None,
            misc_category: default_misc_category(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;

        log::info!("Catalog configuration saved to {:?}", path);
        Ok(())
    }

    /// Category definitions named by this configuration
    pub fn category_definitions(&self) -> CategoryTree {
        load_category_definitions(self.categories_path.as_deref())
    }

    /// Category overrides named by this configuration
    pub fn category_overrides(&self) -> CategoryOverrides {
        load_category_overrides(self.category_overrides_path.as_deref())
    }
}

/// Read a category-definition document, falling back to the default set
pub fn load_category_definitions(path: Option<&Path>) -> CategoryTree {
    match path.map(read_document::<CategoryTree>) {
        Some(Ok(tree)) => {
            log::info!("Loaded {} top-level categories", tree.len());
            tree
        }
        Some(Err(e)) => {
            log::warn!("Could not read category definitions, using defaults: {}", e);
            CategoryTree::defaults()
        }
        None => CategoryTree::defaults(),
    }
}

/// Read a category override document, falling back to no overrides
pub fn load_category_overrides(path: Option<&Path>) -> CategoryOverrides {
    match path.map(read_document::<CategoryOverrides>) {
        Some(Ok(overrides)) => {
            log::info!("Loaded {} category overrides", overrides.len());
            overrides
        }
        Some(Err(e)) => {
            log::warn!("Could not read category overrides, using none: {}", e);
            CategoryOverrides::new()
        }
        None => CategoryOverrides::new(),
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(ConfigError::Parse)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse document: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
