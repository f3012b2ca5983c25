pub mod pools;
pub mod presets;
pub mod signups;
pub mod submissions;

use poolchem_core::config::PoolChemConfig;
use poolchem_core::error::PoolChemError;
use poolchem_core::store::JsonFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings shared by every command.
pub struct Context {
    pub config: PoolChemConfig,
    store_path: Option<PathBuf>,
    output: String,
}

impl Context {
    pub fn load(
        config: Option<&Path>,
        store_path: Option<PathBuf>,
        output: &str,
    ) -> Result<Self, PoolChemError> {
        if !matches!(output, "table" | "json") {
            return Err(PoolChemError::Config(format!(
                "unknown output format '{output}'. Use table or json"
            )));
        }
        Ok(Self {
            config: PoolChemConfig::load(config)?,
            store_path,
            output: output.to_string(),
        })
    }

    /// Opened per command so that commands without store access never
    /// touch the store file.
    pub fn store(&self) -> Result<Arc<JsonFileStore>, PoolChemError> {
        poolchem_core::open_store(&self.config, self.store_path.as_deref()).map(Arc::new)
    }

    pub fn json(&self) -> bool {
        self.output == "json"
    }
}
