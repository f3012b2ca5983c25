use crate::error::PoolChemError;
use crate::rules::schema::PoolDocument;

const STANDARD_JSON: &str = include_str!("../../../../rules/standard.json");
const SPLASH_PAD_JSON: &str = include_str!("../../../../rules/splash-pad.json");

/// Bundled reference pools that add mode can clone from.
pub const PRESETS: &[&str] = &["standard", "splash-pad"];

/// Load a bundled reference pool by name.
pub fn load_preset(name: &str) -> Result<PoolDocument, PoolChemError> {
    let json = match name {
        "standard" => STANDARD_JSON,
        "splash-pad" => SPLASH_PAD_JSON,
        _ => {
            return Err(PoolChemError::DocumentInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    crate::rules::parse_document_str(json)
}
