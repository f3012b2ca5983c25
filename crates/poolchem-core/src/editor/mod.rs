//! Add/edit controller for pool documents.
//!
//! The controller owns the unsaved [`RuleTable`] and the [`RuleForm`] that
//! renders it, and drives both from user actions. All methods take
//! `&mut self`: edits, loads and store round-trips happen one at a time.

pub mod cache;

use crate::config::{EditorConfig, PoolChemConfig};
use crate::error::PoolChemError;
use crate::form::{EditTarget, FieldKey, RuleForm};
use crate::model::{ConcernLevel, SanitationMethod, MAX_POOLS};
use crate::notify::{Notifier, Severity};
use crate::rules::schema::{PoolDocument, PoolRules};
use crate::rules::table::RuleTable;
use crate::store::PoolStore;
pub use cache::PoolCache;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    Edit,
}

pub struct EditorController<S: PoolStore + ?Sized, N: Notifier> {
    store: Arc<S>,
    notifier: N,
    config: EditorConfig,
    table: RuleTable,
    form: RuleForm,
    cache: PoolCache,
    mode: EditorMode,
    current_id: Option<String>,
    subscribed: bool,
}

impl<S: PoolStore + ?Sized, N: Notifier> EditorController<S, N> {
    /// A controller in edit mode with nothing selected.
    pub fn new(store: Arc<S>, notifier: N, config: &PoolChemConfig) -> Self {
        Self {
            store,
            notifier,
            config: config.editor.clone(),
            table: RuleTable::new(),
            form: RuleForm::new(config.layout.clone()),
            cache: PoolCache::new(),
            mode: EditorMode::Edit,
            current_id: None,
            subscribed: false,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn form(&self) -> &RuleForm {
        &self.form
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn cache(&self) -> &PoolCache {
        &self.cache
    }

    pub fn pool_options(&self) -> Vec<(String, String)> {
        self.cache.options()
    }

    /// Load the pool list and start the live subscription (once).
    pub async fn start(&mut self) -> Result<(), PoolChemError> {
        self.refresh_pools().await?;
        if !self.subscribed {
            self.store.subscribe(self.cache.listener())?;
            self.subscribed = true;
            debug!(backend = self.store.backend_name(), "subscribed to pool changes");
        }
        Ok(())
    }

    pub async fn refresh_pools(&mut self) -> Result<(), PoolChemError> {
        match self.store.list().await {
            Ok(pools) => {
                debug!(count = pools.len(), "refreshed pool list");
                self.cache.replace(pools);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to load pools");
                self.report_failure("Could not load pools", &e);
                Err(e)
            }
        }
    }

    fn report_failure(&self, action: &str, e: &PoolChemError) {
        let message = match e {
            PoolChemError::Validation(m) => m.clone(),
            e if e.is_expected() => format!("{action}. Please try again."),
            e => format!("{action}: {e}"),
        };
        let severity = match e {
            PoolChemError::Validation(_) => Severity::Warning,
            _ => Severity::Error,
        };
        self.notifier.notify(&message, severity);
    }

    /// Shared reset for every mode change.
    fn reset_for_transition(&mut self) {
        self.current_id = None;
        self.form.set_all_editable(false);
        self.form.metadata.visible = false;
        self.form.rules_section_visible = false;
        self.form.preset_visible = false;
        self.form.delete_modal_open = false;
        self.form.selected_pool = None;
    }

    fn render_all(&mut self, method: SanitationMethod) -> Result<(), PoolChemError> {
        for slot in 0..MAX_POOLS {
            self.form.render(&mut self.table, slot, method)?;
        }
        Ok(())
    }

    fn set_sections_editable(&mut self, enabled: bool) -> Result<(), PoolChemError> {
        self.form.set_editable(EditTarget::Metadata, enabled)?;
        for slot in 0..MAX_POOLS {
            let visible = self.form.slot(slot).is_some_and(|s| s.visible);
            self.form.set_editable(EditTarget::Slot(slot), enabled && visible)?;
        }
        Ok(())
    }

    /// Switch to adding a new pool, pre-filled from defaults and the preset.
    pub async fn enter_add_mode(&mut self) -> Result<(), PoolChemError> {
        self.reset_for_transition();
        self.mode = EditorMode::Add;
        debug!("entering add mode");

        self.form.metadata.visible = true;
        self.form.rules_section_visible = true;
        self.form.preset_visible = true;

        let count = self.config.default_pool_count.clamp(1, MAX_POOLS);
        self.form.metadata.name = self.config.default_pool_name.clone();
        self.form.metadata.num_pools = count;
        self.form.metadata.markets = BTreeSet::from([self.config.default_market.clone()]);

        self.table.clear();
        self.form.clear_all_slots();
        self.form.set_slot_visibility(count);
        self.render_all(SanitationMethod::Bleach)?;
        self.set_sections_editable(true)?;

        if let Err(e) = self.clone_preset().await {
            warn!(error = %e, preset = %self.config.preset_pool_id, "preset clone failed");
            self.report_failure("Could not load preset rules", &e);
        }
        Ok(())
    }

    /// Copy the reference pool's rules into every slot: slot 1 takes the
    /// preset's second pool when it has one, all other slots take its first.
    ///
    /// Slots are filled in order; on failure the ones already filled stay.
    pub async fn clone_preset(&mut self) -> Result<(), PoolChemError> {
        let preset_id = self.config.preset_pool_id.clone();
        let preset = self
            .store
            .list()
            .await?
            .into_iter()
            .find(|p| p.id == preset_id)
            .ok_or_else(|| PoolChemError::PoolNotFound {
                id: preset_id.clone(),
            })?;

        let pools = &preset.rules.pools;
        for slot in 0..MAX_POOLS {
            let source = if slot == 1 && pools.len() > 1 { 1 } else { 0 };
            let stored = pools.get(source).ok_or_else(|| {
                PoolChemError::DocumentInvalid(format!("preset '{}' has no pool rules", preset.name))
            })?;
            self.table.load(slot, stored);
            let method = self.form.slot(slot).map(|s| s.active_method).unwrap_or_default();
            self.form.render(&mut self.table, slot, method)?;
        }

        info!(preset = %preset_id, "cloned preset rules");
        self.notifier
            .notify(&format!("Loaded starting rules from {}", preset.name), Severity::Info);
        Ok(())
    }

    /// Switch to editing an existing pool. Nothing is shown until a pool is
    /// picked with [`select_pool`](Self::select_pool).
    pub fn enter_edit_mode(&mut self) {
        self.reset_for_transition();
        self.mode = EditorMode::Edit;
        debug!("entering edit mode");

        self.form.clear_metadata();
        self.table.clear();
        self.form.clear_all_slots();
    }

    /// Load a cached pool into the editor, read-only until
    /// [`begin_editing`](Self::begin_editing).
    pub fn select_pool(&mut self, id: &str) -> Result<(), PoolChemError> {
        if self.mode != EditorMode::Edit {
            let e = PoolChemError::Validation("switch to edit mode to pick an existing pool".into());
            self.report_failure("Could not open pool", &e);
            return Err(e);
        }

        let Some(document) = self.cache.find(id) else {
            warn!(id, "pool missing from local cache");
            let e = PoolChemError::PoolNotFound { id: id.to_string() };
            self.notifier.notify(&e.to_string(), Severity::Error);
            return Err(e);
        };

        self.table.clear();
        for (slot, stored) in document.rules.pools.iter().enumerate().take(MAX_POOLS) {
            self.table.load(slot, stored);
        }

        let count = document.num_pools.clamp(1, MAX_POOLS);
        self.form.metadata.name = document.name.clone();
        self.form.metadata.num_pools = count;
        self.form.metadata.markets = document.markets.clone();
        self.form.set_slot_visibility(count);
        self.render_all(SanitationMethod::Bleach)?;

        self.form.set_all_editable(false);
        self.form.metadata.visible = true;
        self.form.rules_section_visible = true;
        self.form.selected_pool = Some(document.id.clone());
        self.current_id = Some(document.id.clone());

        debug!(id = %document.id, pools = count, "loaded pool into editor");
        Ok(())
    }

    /// Unlock the metadata section and visible slots.
    pub fn begin_editing(&mut self) -> Result<(), PoolChemError> {
        if !self.form.rules_section_visible {
            return Err(PoolChemError::Validation("no pool is open for editing".into()));
        }
        self.set_sections_editable(true)
    }

    /// Show `method`'s rules for `slot`, keeping what was on screen.
    pub fn switch_method(&mut self, slot: usize, method: SanitationMethod) -> Result<(), PoolChemError> {
        let current = self
            .form
            .slot(slot)
            .map(|s| s.active_method)
            .ok_or_else(|| {
                PoolChemError::Validation(format!("pool slot {} is out of range", slot + 1))
            })?;

        self.table
            .capture(slot, current, self.form.captured_fields(slot));
        self.form.render(&mut self.table, slot, method)
    }

    fn ensure_metadata_editable(&self) -> Result<(), PoolChemError> {
        if self.form.metadata.visible && self.form.metadata.editable {
            Ok(())
        } else {
            Err(PoolChemError::Validation("pool details are read-only".into()))
        }
    }

    pub fn set_pool_count(&mut self, count: usize) -> Result<(), PoolChemError> {
        self.ensure_metadata_editable()?;
        if count == 0 || count > MAX_POOLS {
            return Err(PoolChemError::Validation(format!(
                "number of pools must be between 1 and {MAX_POOLS}"
            )));
        }
        self.form.metadata.num_pools = count;
        self.form.set_slot_visibility(count);
        self.set_sections_editable(true)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), PoolChemError> {
        self.ensure_metadata_editable()?;
        self.form.metadata.name = name.to_string();
        Ok(())
    }

    pub fn set_market(&mut self, market: &str, checked: bool) -> Result<(), PoolChemError> {
        self.ensure_metadata_editable()?;
        if checked {
            self.form.metadata.markets.insert(market.to_string());
        } else {
            self.form.metadata.markets.remove(market);
        }
        Ok(())
    }

    pub fn set_response(&mut self, key: &FieldKey, text: &str) -> Result<(), PoolChemError> {
        self.form.set_response(key, text)
    }

    pub fn set_concern(&mut self, key: &FieldKey, level: ConcernLevel) -> Result<(), PoolChemError> {
        self.form.set_concern(key, level)
    }

    /// Build the document to persist from the current state.
    fn build_document(&mut self) -> Result<PoolDocument, PoolChemError> {
        let num_pools = self.form.metadata.num_pools.clamp(1, MAX_POOLS);
        for slot in 0..num_pools {
            if let Some(method) = self.form.slot(slot).map(|s| s.active_method) {
                self.table
                    .capture(slot, method, self.form.captured_fields(slot));
            }
        }

        let name = self.form.metadata.name.trim().to_string();
        if name.is_empty() {
            return Err(PoolChemError::Validation("Pool name is required.".into()));
        }

        Ok(PoolDocument {
            id: self.current_id.clone().unwrap_or_default(),
            name,
            num_pools,
            markets: self.form.metadata.markets.clone(),
            rules: PoolRules {
                pools: self.table.read_out(num_pools),
            },
        })
    }

    /// Persist the pool. On success the stored id becomes current and the
    /// form locks; on failure everything stays editable.
    pub async fn save(&mut self) -> Result<String, PoolChemError> {
        self.form.save_enabled = false;
        let result = self.try_save().await;
        self.form.save_enabled = true;

        match result {
            Ok(id) => {
                info!(id = %id, "saved pool");
                self.notifier.notify("Pool saved.", Severity::Success);
                if let Err(e) = self.refresh_pools().await {
                    warn!(error = %e, "pool list refresh after save failed");
                }
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "save failed");
                self.report_failure("Failed to save pool", &e);
                Err(e)
            }
        }
    }

    async fn try_save(&mut self) -> Result<String, PoolChemError> {
        let document = self.build_document()?;
        let key = self
            .current_id
            .clone()
            .unwrap_or_else(|| document.name.clone());

        let id = self.store.save(&key, &document).await?;
        let id = if id.is_empty() { key } else { id };

        self.current_id = Some(id.clone());
        self.form.selected_pool = Some(id.clone());
        self.form.set_all_editable(false);
        Ok(id)
    }

    /// Open the delete confirmation. Without a loaded pool this only warns.
    pub fn request_delete(&mut self) -> bool {
        if self.current_id.is_none() {
            self.notifier
                .notify("Select a pool before deleting.", Severity::Warning);
            return false;
        }
        self.form.delete_modal_open = true;
        true
    }

    pub fn cancel_delete(&mut self) {
        self.form.delete_modal_open = false;
    }

    /// Delete the loaded pool. `Ok(false)` when the store reported nothing
    /// deleted; the modal then stays open.
    pub async fn confirm_delete(&mut self) -> Result<bool, PoolChemError> {
        let Some(id) = self.current_id.clone() else {
            self.notifier
                .notify("Select a pool before deleting.", Severity::Warning);
            return Ok(false);
        };
        if !self.form.delete_modal_open {
            return Err(PoolChemError::Validation(
                "confirm the deletion in the dialog first".into(),
            ));
        }

        self.form.delete_enabled = false;
        let result = self.store.delete(&id).await;
        self.form.delete_enabled = true;

        match result {
            Ok(true) => {
                info!(id = %id, "deleted pool");
                self.form.delete_modal_open = false;
                self.notifier.notify("Pool deleted.", Severity::Success);
                if let Err(e) = self.refresh_pools().await {
                    warn!(error = %e, "pool list refresh after delete failed");
                }
                self.current_id = None;
                self.form.selected_pool = None;
                self.form.metadata.visible = false;
                self.form.rules_section_visible = false;
                self.form.set_all_editable(false);
                Ok(true)
            }
            Ok(false) => {
                warn!(id = %id, "store reported nothing deleted");
                self.notifier
                    .notify("Failed to delete pool. Please try again.", Severity::Error);
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, id = %id, "delete failed");
                self.report_failure("Failed to delete pool", &e);
                Err(e)
            }
        }
    }
}
