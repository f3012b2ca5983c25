pub mod builtin;
pub mod schema;
pub mod table;

use crate::error::PoolChemError;
use crate::model::MAX_POOLS;
use schema::PoolDocument;
use std::path::Path;

/// Load a pool document from a JSON file.
pub fn load_document(path: &Path) -> Result<PoolDocument, PoolChemError> {
    let content = std::fs::read_to_string(path).map_err(|e| PoolChemError::DocumentLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_document(&content, path)
}

/// Parse a pool document from a JSON string.
pub fn parse_document(json: &str, source: &Path) -> Result<PoolDocument, PoolChemError> {
    let document: PoolDocument =
        serde_json::from_str(json).map_err(|e| PoolChemError::DocumentLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_document(&document)?;
    Ok(document)
}

/// Parse a pool document from a JSON string (no file path context).
pub fn parse_document_str(json: &str) -> Result<PoolDocument, PoolChemError> {
    let document: PoolDocument = serde_json::from_str(json).map_err(PoolChemError::Json)?;
    validate_document(&document)?;
    Ok(document)
}

/// Validate that a pool document is well-formed.
pub fn validate_document(document: &PoolDocument) -> Result<(), PoolChemError> {
    if document.name.trim().is_empty() {
        return Err(PoolChemError::DocumentInvalid(
            "pool name must not be empty".into(),
        ));
    }

    if document.num_pools == 0 || document.num_pools > MAX_POOLS {
        return Err(PoolChemError::DocumentInvalid(format!(
            "numPools must be between 1 and {}, got {}",
            MAX_POOLS, document.num_pools
        )));
    }

    for (slot, set) in document.rule_sets().iter().enumerate() {
        for method in crate::model::SanitationMethod::ALL {
            let rules = set.method(method);
            for key in rules.ph.keys().chain(rules.cl.keys()) {
                if key.trim().is_empty() {
                    return Err(PoolChemError::DocumentInvalid(format!(
                        "pool {} ({}) has a rule with an empty value key",
                        slot + 1,
                        method.as_str()
                    )));
                }
            }
        }
    }

    Ok(())
}
