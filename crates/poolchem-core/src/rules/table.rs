use crate::model::{ConcernLevel, MeasurementType, PoolRuleSet, RuleEntry, SanitationMethod};
use crate::rules::schema::StoredPoolRules;
use std::collections::BTreeMap;
use tracing::debug;

/// A value read back from one rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedField {
    pub measurement: MeasurementType,
    pub value_key: String,
    pub response: String,
    /// `None` when the row has no concern selector.
    pub concern: Option<ConcernLevel>,
}

/// Unsaved rule edits for every pool slot and both sanitation methods,
/// independent of what is currently rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    slots: BTreeMap<usize, PoolRuleSet>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for `slot`, inserting an empty set the first time it is touched.
    pub fn get_or_create(&mut self, slot: usize) -> &mut PoolRuleSet {
        self.slots.entry(slot).or_default()
    }

    pub fn get(&self, slot: usize) -> Option<&PoolRuleSet> {
        self.slots.get(&slot)
    }

    pub fn entry(
        &self,
        slot: usize,
        method: SanitationMethod,
        measurement: MeasurementType,
        value_key: &str,
    ) -> Option<&RuleEntry> {
        self.slots
            .get(&slot)
            .and_then(|set| set.method(method).get(measurement).get(value_key))
    }

    /// Replace `slot`'s rules for `method` with the captured fields.
    ///
    /// A row with no response and no concern is kept only when the slot
    /// already held an entry for its key; an untouched row stays absent.
    pub fn capture<I>(&mut self, slot: usize, method: SanitationMethod, fields: I)
    where
        I: IntoIterator<Item = CapturedField>,
    {
        let rules = self.get_or_create(slot).method_mut(method);
        let previous = std::mem::take(rules);

        for field in fields {
            let entry = RuleEntry::new(field.response, field.concern.unwrap_or_default());
            if entry.is_blank() && !previous.get(field.measurement).contains_key(&field.value_key) {
                continue;
            }
            rules.get_mut(field.measurement).insert(field.value_key, entry);
        }

        debug!(
            slot,
            method = method.as_str(),
            ph = rules.ph.len(),
            cl = rules.cl.len(),
            "captured rule fields"
        );
    }

    /// Populate both methods of `slot` from a stored entry.
    pub fn load(&mut self, slot: usize, stored: &StoredPoolRules) {
        debug!(slot, shape = ?stored.shape(), "loading stored rules");
        self.slots.insert(slot, stored.to_rule_set());
    }

    /// Install a copy of an already-normalized rule set into `slot`.
    pub fn load_rule_set(&mut self, slot: usize, set: &PoolRuleSet) {
        self.slots.insert(slot, set.clone());
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Plain stored rules for slots `0..num_pools`. Slots beyond the count
    /// are left out whatever they hold.
    pub fn read_out(&self, num_pools: usize) -> Vec<StoredPoolRules> {
        (0..num_pools)
            .map(|slot| {
                self.slots
                    .get(&slot)
                    .cloned()
                    .unwrap_or_default()
                    .into()
            })
            .collect()
    }
}
