//! Configuration for the editor, the rendered rule tables and the dashboard.

use crate::error::PoolChemError;
use crate::model::{MeasurementType, MAX_POOLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "poolchem.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolChemConfig {
    pub editor: EditorConfig,
    pub layout: LayoutConfig,
    pub dashboard: DashboardConfig,
    /// JSON file backing the CLI's store.
    pub store_path: Option<PathBuf>,
}

/// Values pre-filled when a new pool is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub default_pool_name: String,
    pub default_pool_count: usize,
    pub default_market: String,
    /// Store id of the reference pool cloned into a new pool.
    pub preset_pool_id: String,
    pub markets: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_pool_name: "New Pool".into(),
            default_pool_count: 1,
            default_market: "North".into(),
            preset_pool_id: "preset".into(),
            markets: vec!["North".into(), "South".into(), "East".into(), "West".into()],
        }
    }
}

/// Value keys present in each rendered rule table, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub ph_keys: Vec<String>,
    pub cl_keys: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ph_keys: ["<7.2", "7.2-7.6", "7.6-7.8", "7.8+"]
                .map(String::from)
                .to_vec(),
            cl_keys: ["<1", "1-3", "3-5", "5-10", "10+"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl LayoutConfig {
    pub fn keys(&self, measurement: MeasurementType) -> &[String] {
        match measurement {
            MeasurementType::Ph => &self.ph_keys,
            MeasurementType::Cl => &self.cl_keys,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { page_size: 25 }
    }
}

impl PoolChemConfig {
    /// Load configuration from `path`, or from `poolchem.toml` in the
    /// working directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PoolChemError> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !config_path.exists() {
            if path.is_some() {
                tracing::warn!(path = %config_path.display(), "config file not found, using defaults");
            }
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, PoolChemError> {
        let config: PoolChemConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PoolChemError> {
        let count = self.editor.default_pool_count;
        if count == 0 || count > MAX_POOLS {
            return Err(PoolChemError::Config(format!(
                "editor.default_pool_count must be between 1 and {}, got {}",
                MAX_POOLS, count
            )));
        }

        if self.layout.ph_keys.is_empty() || self.layout.cl_keys.is_empty() {
            return Err(PoolChemError::Config(
                "layout must define at least one pH key and one chlorine key".into(),
            ));
        }

        if self.dashboard.page_size == 0 {
            return Err(PoolChemError::Config(
                "dashboard.page_size must be positive".into(),
            ));
        }

        Ok(())
    }
}
