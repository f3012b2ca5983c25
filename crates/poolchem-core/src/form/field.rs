use crate::model::MeasurementType;
use std::fmt;

/// Prefix shared by every rule field identifier.
pub const FIELD_PREFIX: &str = "pool";

/// Suffix appended to a response field's identifier to name its selector.
pub const CONCERN_SUFFIX: &str = "-concern";

/// Typed address of one rule row: pool slot, measurement and value key.
///
/// Rendered identifiers follow `pool{slot}-{ph|cl}-{value_key}`, with the
/// concern selector at the same identifier plus [`CONCERN_SUFFIX`]. Markup
/// addressing these rows must produce exactly these strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub slot: usize,
    pub measurement: MeasurementType,
    pub value_key: String,
}

/// Which element of a row an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Response,
    ConcernSelector,
}

impl FieldKey {
    pub fn new(slot: usize, measurement: MeasurementType, value_key: impl Into<String>) -> Self {
        Self {
            slot,
            measurement,
            value_key: value_key.into(),
        }
    }

    pub fn element_id(&self) -> String {
        format!(
            "{}{}-{}-{}",
            FIELD_PREFIX,
            self.slot,
            self.measurement.marker(),
            self.value_key
        )
    }

    pub fn concern_id(&self) -> String {
        format!("{}{}", self.element_id(), CONCERN_SUFFIX)
    }

    /// Recover the key from a response field identifier.
    pub fn from_element_id(id: &str) -> Option<FieldKey> {
        let rest = id.strip_prefix(FIELD_PREFIX)?;
        let (slot, rest) = rest.split_once('-')?;
        let slot: usize = slot.parse().ok()?;

        let (measurement, value_key) = if let Some(key) = rest.strip_prefix("ph-") {
            (MeasurementType::Ph, key)
        } else if let Some(key) = rest.strip_prefix("cl-") {
            (MeasurementType::Cl, key)
        } else {
            return None;
        };

        if value_key.is_empty() {
            return None;
        }
        Some(FieldKey::new(slot, measurement, value_key))
    }

    /// Resolve either a response or a selector identifier.
    pub fn resolve(id: &str) -> Option<(FieldKey, ElementKind)> {
        match id.strip_suffix(CONCERN_SUFFIX) {
            Some(base) => FieldKey::from_element_id(base).map(|k| (k, ElementKind::ConcernSelector)),
            None => FieldKey::from_element_id(id).map(|k| (k, ElementKind::Response)),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id())
    }
}
