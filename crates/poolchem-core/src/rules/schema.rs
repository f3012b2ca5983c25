use crate::model::{MethodRules, PoolRuleSet, RuleEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A site's pool configuration as persisted in the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDocument {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Number of pool slots in use (1..=5).
    pub num_pools: usize,
    #[serde(default)]
    pub markets: BTreeSet<String>,
    #[serde(default)]
    pub rules: PoolRules,
}

impl PoolDocument {
    /// Rule sets for slots `0..num_pools`, normalized from whichever shape
    /// each entry was stored in.
    pub fn rule_sets(&self) -> Vec<PoolRuleSet> {
        self.rules
            .pools
            .iter()
            .take(self.num_pools)
            .map(StoredPoolRules::to_rule_set)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolRules {
    #[serde(default)]
    pub pools: Vec<StoredPoolRules>,
}

/// One slot's rules as found in a stored document.
///
/// Current documents carry `bleach`/`granular`. Older documents carry a flat
/// `ph`/`cl` pair that applies to both methods. Written back, only the split
/// shape is produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredPoolRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleach: Option<MethodRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granular: Option<MethodRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<BTreeMap<String, RuleEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cl: Option<BTreeMap<String, RuleEntry>>,
}

/// Which historical layout a stored slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredShape {
    Split,
    Legacy,
    Empty,
}

impl StoredPoolRules {
    pub fn shape(&self) -> StoredShape {
        if self.bleach.is_some() || self.granular.is_some() {
            StoredShape::Split
        } else if self.ph.is_some() || self.cl.is_some() {
            StoredShape::Legacy
        } else {
            StoredShape::Empty
        }
    }

    /// Normalize to a rule set with trimmed responses. Legacy rules are
    /// cloned into each method so the two never share storage.
    pub fn to_rule_set(&self) -> PoolRuleSet {
        match self.shape() {
            StoredShape::Split => PoolRuleSet {
                bleach: self.bleach.clone().unwrap_or_default().normalized(),
                granular: self.granular.clone().unwrap_or_default().normalized(),
            },
            StoredShape::Legacy => {
                let flat = MethodRules {
                    ph: self.ph.clone().unwrap_or_default(),
                    cl: self.cl.clone().unwrap_or_default(),
                }
                .normalized();
                PoolRuleSet {
                    bleach: flat.clone(),
                    granular: flat,
                }
            }
            StoredShape::Empty => PoolRuleSet::default(),
        }
    }
}

impl From<PoolRuleSet> for StoredPoolRules {
    fn from(set: PoolRuleSet) -> Self {
        Self {
            bleach: Some(set.bleach),
            granular: Some(set.granular),
            ph: None,
            cl: None,
        }
    }
}
