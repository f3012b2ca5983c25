//! Headless model of the rule editor page.
//!
//! [`RuleForm`] holds what the browser would show: metadata inputs, one block
//! per pool slot with a method tab and a row per value key, and the action
//! buttons. It binds to a [`RuleTable`] in both directions through
//! [`RuleForm::render`] and [`RuleForm::captured_fields`], always addressing
//! rows by typed [`FieldKey`]s.

pub mod field;

use crate::config::LayoutConfig;
use crate::error::PoolChemError;
use crate::model::{ConcernLevel, MeasurementType, SanitationMethod, MAX_POOLS};
use crate::rules::table::{CapturedField, RuleTable};
pub use field::{ElementKind, FieldKey};
use std::collections::{BTreeMap, BTreeSet};

/// Visual treatment for a row, one class per concern level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcernStyle {
    Normal,
    Minor,
    Major,
}

impl ConcernStyle {
    pub fn for_level(level: ConcernLevel) -> Self {
        match level {
            ConcernLevel::None => ConcernStyle::Normal,
            ConcernLevel::Yellow => ConcernStyle::Minor,
            ConcernLevel::Red => ConcernStyle::Major,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ConcernStyle::Normal => "concern-none",
            ConcernStyle::Minor => "concern-minor",
            ConcernStyle::Major => "concern-major",
        }
    }
}

/// One rendered row: response input plus concern selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowView {
    pub response: String,
    pub concern: ConcernLevel,
    /// Styles on the row, the selector and the response input. `None`
    /// until the selector has been styled once.
    pub row_style: Option<ConcernStyle>,
    pub selector_style: Option<ConcernStyle>,
    pub field_style: Option<ConcernStyle>,
}

impl RowView {
    fn restyle(&mut self) {
        let style = Some(ConcernStyle::for_level(self.concern));
        self.row_style = style;
        self.selector_style = style;
        self.field_style = style;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub visible: bool,
    pub editable: bool,
    pub active_method: SanitationMethod,
    rows: BTreeMap<(MeasurementType, String), RowView>,
}

impl SlotView {
    fn new(layout: &LayoutConfig) -> Self {
        let rows = MeasurementType::ALL
            .iter()
            .flat_map(|m| layout.keys(*m).iter().map(move |k| ((*m, k.clone()), RowView::default())))
            .collect();
        Self {
            visible: false,
            editable: false,
            active_method: SanitationMethod::Bleach,
            rows,
        }
    }

    pub fn overlay_disabled(&self) -> bool {
        !self.editable
    }

    fn clear(&mut self) {
        for row in self.rows.values_mut() {
            row.response.clear();
            row.concern = ConcernLevel::None;
            row.restyle();
        }
    }

    pub fn row(&self, measurement: MeasurementType, value_key: &str) -> Option<&RowView> {
        self.rows.get(&(measurement, value_key.to_string()))
    }

    pub fn rows(&self) -> impl Iterator<Item = (MeasurementType, &str, &RowView)> {
        self.rows.iter().map(|((m, k), row)| (*m, k.as_str(), row))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataView {
    pub visible: bool,
    pub editable: bool,
    pub name: String,
    pub num_pools: usize,
    pub markets: BTreeSet<String>,
}

impl MetadataView {
    pub fn overlay_disabled(&self) -> bool {
        !self.editable
    }
}

/// Section whose inputs can be locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Slot(usize),
    Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleForm {
    layout: LayoutConfig,
    slots: Vec<SlotView>,
    pub metadata: MetadataView,
    pub rules_section_visible: bool,
    pub preset_visible: bool,
    pub save_enabled: bool,
    pub delete_enabled: bool,
    pub delete_modal_open: bool,
    /// Pool chosen in edit mode's picker.
    pub selected_pool: Option<String>,
}

impl RuleForm {
    pub fn new(layout: LayoutConfig) -> Self {
        let slots = (0..MAX_POOLS).map(|_| SlotView::new(&layout)).collect();
        Self {
            layout,
            slots,
            metadata: MetadataView {
                num_pools: 1,
                ..Default::default()
            },
            rules_section_visible: false,
            preset_visible: false,
            save_enabled: true,
            delete_enabled: true,
            delete_modal_open: false,
            selected_pool: None,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn slot(&self, slot: usize) -> Option<&SlotView> {
        self.slots.get(slot)
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut SlotView, PoolChemError> {
        self.slots.get_mut(slot).ok_or_else(|| {
            PoolChemError::Validation(format!(
                "pool slot {} is out of range (at most {} pools)",
                slot + 1,
                MAX_POOLS
            ))
        })
    }

    pub fn row(&self, key: &FieldKey) -> Option<&RowView> {
        self.slot(key.slot)
            .and_then(|s| s.row(key.measurement, &key.value_key))
    }

    fn row_mut(&mut self, key: &FieldKey) -> Result<&mut RowView, PoolChemError> {
        let slot = self.slot_mut(key.slot)?;
        slot.rows
            .get_mut(&(key.measurement, key.value_key.clone()))
            .ok_or_else(|| PoolChemError::Validation(format!("no rule field '{}'", key)))
    }

    /// Look up the row behind a rendered element identifier.
    pub fn element(&self, id: &str) -> Option<(FieldKey, ElementKind, &RowView)> {
        let (key, kind) = FieldKey::resolve(id)?;
        let row = self.row(&key)?;
        Some((key, kind, row))
    }

    /// Field keys rendered for `slot`, pH rows first, in layout order.
    pub fn field_keys(&self, slot: usize) -> Vec<FieldKey> {
        MeasurementType::ALL
            .iter()
            .flat_map(|m| {
                self.layout
                    .keys(*m)
                    .iter()
                    .map(move |k| FieldKey::new(slot, *m, k.clone()))
            })
            .collect()
    }

    /// Write `method`'s stored rules for `slot` into its rows and make that
    /// method the slot's active tab. Rows without a stored entry are blanked.
    pub fn render(
        &mut self,
        table: &mut RuleTable,
        slot: usize,
        method: SanitationMethod,
    ) -> Result<(), PoolChemError> {
        let rules = table.get_or_create(slot).method(method).clone();
        let view = self.slot_mut(slot)?;
        for ((measurement, value_key), row) in view.rows.iter_mut() {
            match rules.get(*measurement).get(value_key) {
                Some(entry) => {
                    row.response = entry.response.clone();
                    row.concern = entry.concern_level;
                }
                None => {
                    row.response.clear();
                    row.concern = ConcernLevel::None;
                }
            }
            row.restyle();
        }
        view.active_method = method;
        tracing::debug!(slot, method = method.as_str(), "rendered rule table");
        Ok(())
    }

    /// Current contents of `slot`'s rows.
    pub fn captured_fields(&self, slot: usize) -> Vec<CapturedField> {
        self.slot(slot)
            .map(|view| {
                view.rows
                    .iter()
                    .map(|((measurement, value_key), row)| CapturedField {
                        measurement: *measurement,
                        value_key: value_key.clone(),
                        response: row.response.clone(),
                        concern: Some(row.concern),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Show slots `0..count` and hide the rest. Row contents are untouched.
    pub fn set_slot_visibility(&mut self, count: usize) {
        for (index, view) in self.slots.iter_mut().enumerate() {
            view.visible = index < count;
        }
    }

    pub fn set_editable(&mut self, target: EditTarget, enabled: bool) -> Result<(), PoolChemError> {
        match target {
            EditTarget::Slot(slot) => self.slot_mut(slot)?.editable = enabled,
            EditTarget::Metadata => self.metadata.editable = enabled,
        }
        Ok(())
    }

    /// Lock or unlock the metadata section and every slot.
    pub fn set_all_editable(&mut self, enabled: bool) {
        self.metadata.editable = enabled;
        for view in &mut self.slots {
            view.editable = enabled;
        }
    }

    /// Restyle a row from its selector's current value.
    pub fn apply_concern_styling(&mut self, key: &FieldKey) -> Result<(), PoolChemError> {
        self.row_mut(key)?.restyle();
        Ok(())
    }

    fn ensure_editable(&self, slot: usize) -> Result<(), PoolChemError> {
        match self.slot(slot) {
            Some(view) if view.visible && view.editable => Ok(()),
            Some(_) => Err(PoolChemError::Validation(format!(
                "pool {} is read-only",
                slot + 1
            ))),
            None => Err(PoolChemError::Validation(format!(
                "pool slot {} is out of range (at most {} pools)",
                slot + 1,
                MAX_POOLS
            ))),
        }
    }

    pub fn set_response(&mut self, key: &FieldKey, text: &str) -> Result<(), PoolChemError> {
        self.ensure_editable(key.slot)?;
        self.row_mut(key)?.response = text.to_string();
        Ok(())
    }

    /// Change a row's concern level and restyle that row.
    pub fn set_concern(&mut self, key: &FieldKey, level: ConcernLevel) -> Result<(), PoolChemError> {
        self.ensure_editable(key.slot)?;
        let row = self.row_mut(key)?;
        row.concern = level;
        row.restyle();
        Ok(())
    }

    pub fn clear_slot(&mut self, slot: usize) -> Result<(), PoolChemError> {
        self.slot_mut(slot)?.clear();
        Ok(())
    }

    pub fn clear_all_slots(&mut self) {
        for view in &mut self.slots {
            view.clear();
        }
    }

    pub fn clear_metadata(&mut self) {
        self.metadata.name.clear();
        self.metadata.num_pools = 1;
        self.metadata.markets.clear();
    }
}
