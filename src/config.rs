//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/arbor/arbor.toml`
//! 3. Environment variables: `ARBOR_*` prefix
//! 4. Command-line overrides (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::{DEFAULT_EXPORT_FILE, DEFAULT_PAGE_HEIGHT, DEFAULT_SLOT};
use crate::application::ApplicationError;

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    /// File written by `export` when no output is given
    pub file_name: String,
    /// Lines per exported page
    pub page_height: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE.to_string(),
            page_height: DEFAULT_PAGE_HEIGHT,
        }
    }
}

/// Raw export config for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExportConfig {
    pub file_name: Option<String>,
    pub page_height: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_dir: Option<PathBuf>,
    pub slot: Option<String>,
    #[serde(default)]
    pub export: RawExportConfig,
}

impl ExportConfig {
    /// Merge overlay config onto self (base): overlay wins if Some.
    pub fn merge(&self, overlay: &RawExportConfig) -> Self {
        Self {
            file_name: overlay
                .file_name
                .clone()
                .unwrap_or_else(|| self.file_name.clone()),
            page_height: overlay.page_height.unwrap_or(self.page_height),
        }
    }
}

/// Unified configuration for arbor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the slot files (default: platform data dir)
    pub store_dir: PathBuf,
    /// Name of the slot holding the tree
    pub slot: String,
    /// Export settings
    pub export: ExportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            slot: DEFAULT_SLOT.to_string(),
            export: ExportConfig::default(),
        }
    }
}

/// Get the default store directory.
fn default_store_dir() -> PathBuf {
    ProjectDirs::from("", "", "arbor")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.arbor"))
}

/// Get the XDG config directory for arbor.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "arbor").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("arbor.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_dir.to_string_lossy().as_ref());
        self.store_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base).
    ///
    /// Scalar options: overlay wins if Some, otherwise keep base.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_dir: overlay
                .store_dir
                .clone()
                .unwrap_or_else(|| self.store_dir.clone()),
            slot: overlay.slot.clone().unwrap_or_else(|| self.slot.clone()),
            export: self.export.merge(&overlay.export),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/arbor/arbor.toml`
    /// 3. Environment variables: `ARBOR_*` prefix
    pub fn load() -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref())
    }

    /// Load settings using `config_file` instead of the global config location.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Merge config file
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 3. Apply environment variables (replaces - explicit override)
        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        current.validate()?;
        Ok(current)
    }

    /// Apply ARBOR_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("ARBOR")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("store_dir") {
            settings.store_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("slot") {
            settings.slot = val;
        }
        if let Ok(val) = config.get_string("export.file_name") {
            settings.export.file_name = val;
        }
        if let Ok(val) = config.get_string("export.page_height") {
            settings.export.page_height = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ARBOR_EXPORT__PAGE_HEIGHT: {}", e),
            })?;
        }

        Ok(settings)
    }

    /// Reject settings that cannot address a slot or lay out a page.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.slot.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "slot must not be empty".to_string(),
            });
        }
        if self
            .slot
            .chars()
            .any(|c| std::path::is_separator(c) || c == '\0')
        {
            return Err(ApplicationError::Config {
                message: format!("slot must be a plain name: {}", self.slot),
            });
        }
        if self.export.page_height == 0 {
            return Err(ApplicationError::Config {
                message: "export.page_height must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# arbor configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/arbor/arbor.toml
#   Env:    ARBOR_* environment variables (e.g. ARBOR_SLOT, ARBOR_EXPORT__PAGE_HEIGHT)
#   CLI:    --store-dir, --slot

# Directory holding the saved tree
# store_dir = "~/.local/share/arbor"

# Name of the slot holding the tree (stored as <store_dir>/<slot>.json)
# slot = "savedTree"

[export]
# File written by `arbor export` when no --output is given
# file_name = "tree-structure.txt"

# Lines per exported page
# page_height = 60
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
