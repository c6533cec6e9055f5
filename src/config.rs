//! Mealswipe configuration.
//!
//! Loaded from `~/.mealswipe/config.toml`. Every key is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{BundledCatalog, CatalogProvider, FileCatalog};
use crate::deck::DeckPolicy;
use crate::goal::{MAX_WEEKLY_MEALS, check_target};

/// Mealswipe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Default user stamped on decisions when `--as` and `MEALSWIPE_USER`
    /// are absent.
    pub user_id: Option<String>,

    /// Weekly target for `session new` when `--target` is omitted.
    pub default_target: usize,

    pub deck_policy: DeckPolicy,

    /// JSON catalog replacing the bundled one.
    pub catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            default_target: MAX_WEEKLY_MEALS,
            deck_policy: DeckPolicy::default(),
            catalog: None,
        }
    }
}

impl Config {
    /// Load config from `~/.mealswipe/config.toml`.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        check_target(config.default_target).map_err(|e| format!("default-target: {e}"))?;
        Ok(config)
    }

    /// The config file path: `~/.mealswipe/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".mealswipe").join("config.toml"))
    }

    /// The catalog source this configuration selects.
    pub fn catalog_provider(&self) -> Box<dyn CatalogProvider> {
        match &self.catalog {
            Some(path) => Box::new(FileCatalog::new(path)),
            None => Box::new(BundledCatalog),
        }
    }
}
