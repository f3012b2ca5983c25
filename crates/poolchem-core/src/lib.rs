pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod guidance;
pub mod model;
pub mod notify;
pub mod rules;
pub mod store;
pub mod submissions;
pub mod training;

use config::PoolChemConfig;
use error::PoolChemError;
use std::path::{Path, PathBuf};
use store::JsonFileStore;

/// Store file used when neither the caller nor the config names one.
pub const DEFAULT_STORE_FILE: &str = "poolchem-store.json";

/// Open the JSON store for this site.
///
/// An explicit `path` wins over `store_path` from the config, which wins
/// over `poolchem-store.json` in the working directory.
pub fn open_store(
    config: &PoolChemConfig,
    path: Option<&Path>,
) -> Result<JsonFileStore, PoolChemError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| config.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
    tracing::debug!(path = %path.display(), "opening store");
    JsonFileStore::open(path)
}
