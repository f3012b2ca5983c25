use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Upper bound on pool slots a single site can configure.
pub const MAX_POOLS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitationMethod {
    #[default]
    Bleach,
    Granular,
}

impl SanitationMethod {
    pub const ALL: [SanitationMethod; 2] = [SanitationMethod::Bleach, SanitationMethod::Granular];

    pub fn as_str(&self) -> &'static str {
        match self {
            SanitationMethod::Bleach => "bleach",
            SanitationMethod::Granular => "granular",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<SanitationMethod> {
        let lower = s.trim().to_lowercase();
        if lower.starts_with("bleach") || lower.contains("liquid") {
            Some(SanitationMethod::Bleach)
        } else if lower.starts_with("granular") || lower.contains("cal-hypo") {
            Some(SanitationMethod::Granular)
        } else {
            None
        }
    }
}

impl fmt::Display for SanitationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitationMethod::Bleach => write!(f, "Bleach"),
            SanitationMethod::Granular => write!(f, "Granular"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Ph,
    Cl,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 2] = [MeasurementType::Ph, MeasurementType::Cl];

    /// Marker used in rendered field identifiers.
    pub fn marker(&self) -> &'static str {
        match self {
            MeasurementType::Ph => "ph",
            MeasurementType::Cl => "cl",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementType::Ph => write!(f, "pH"),
            MeasurementType::Cl => write!(f, "Chlorine"),
        }
    }
}

/// How worrying a reading in a bucket is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcernLevel {
    #[default]
    None,
    #[serde(alias = "minor")]
    Yellow,
    #[serde(alias = "major")]
    Red,
}

impl ConcernLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcernLevel::None => "none",
            ConcernLevel::Yellow => "yellow",
            ConcernLevel::Red => "red",
        }
    }

    /// Unknown values fall back to `None`, matching an unset selector.
    pub fn from_str_loose(s: &str) -> ConcernLevel {
        match s.trim().to_lowercase().as_str() {
            "yellow" | "minor" => ConcernLevel::Yellow,
            "red" | "major" => ConcernLevel::Red,
            _ => ConcernLevel::None,
        }
    }
}

impl fmt::Display for ConcernLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guidance shown for one measurement bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub response: String,
    #[serde(default)]
    pub concern_level: ConcernLevel,
}

impl RuleEntry {
    pub fn new(response: impl Into<String>, concern_level: ConcernLevel) -> Self {
        Self {
            response: response.into().trim().to_string(),
            concern_level,
        }
    }

    /// An entry carrying no guidance, equivalent to an untouched row.
    pub fn is_blank(&self) -> bool {
        self.response.is_empty() && self.concern_level == ConcernLevel::None
    }
}

/// Rules for one sanitation method, keyed by measurement bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRules {
    #[serde(default)]
    pub ph: BTreeMap<String, RuleEntry>,
    #[serde(default)]
    pub cl: BTreeMap<String, RuleEntry>,
}

impl MethodRules {
    pub fn get(&self, measurement: MeasurementType) -> &BTreeMap<String, RuleEntry> {
        match measurement {
            MeasurementType::Ph => &self.ph,
            MeasurementType::Cl => &self.cl,
        }
    }

    pub fn get_mut(&mut self, measurement: MeasurementType) -> &mut BTreeMap<String, RuleEntry> {
        match measurement {
            MeasurementType::Ph => &mut self.ph,
            MeasurementType::Cl => &mut self.cl,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ph.is_empty() && self.cl.is_empty()
    }

    /// The same rules with every response trimmed, as a rendered row would
    /// hand them back.
    pub fn normalized(self) -> Self {
        let trim = |rules: BTreeMap<String, RuleEntry>| {
            rules
                .into_iter()
                .map(|(key, entry)| (key, RuleEntry::new(entry.response, entry.concern_level)))
                .collect()
        };
        Self {
            ph: trim(self.ph),
            cl: trim(self.cl),
        }
    }
}

/// Both sanitation methods' rules for one pool slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRuleSet {
    #[serde(default)]
    pub bleach: MethodRules,
    #[serde(default)]
    pub granular: MethodRules,
}

impl PoolRuleSet {
    pub fn method(&self, method: SanitationMethod) -> &MethodRules {
        match method {
            SanitationMethod::Bleach => &self.bleach,
            SanitationMethod::Granular => &self.granular,
        }
    }

    pub fn method_mut(&mut self, method: SanitationMethod) -> &mut MethodRules {
        match method {
            SanitationMethod::Bleach => &mut self.bleach,
            SanitationMethod::Granular => &mut self.granular,
        }
    }
}
