//! End-to-end tests for the editor controller, the store gateway and the
//! submission log.
//!
//! Uses a FlakyStore wrapping the in-memory store so failures can be
//! switched on per test without a hosted backend.

use async_trait::async_trait;
use chrono::Utc;
use poolchem_core::config::PoolChemConfig;
use poolchem_core::editor::{EditorController, EditorMode};
use poolchem_core::error::PoolChemError;
use poolchem_core::form::{ConcernStyle, FieldKey};
use poolchem_core::model::{
    ConcernLevel, MeasurementType, MethodRules, RuleEntry, SanitationMethod, MAX_POOLS,
};
use poolchem_core::notify::{MemoryNotifier, Severity};
use poolchem_core::rules::builtin::load_preset;
use poolchem_core::rules::schema::{PoolDocument, PoolRules, StoredPoolRules, StoredShape};
use poolchem_core::store::{Listener, MemoryStore, PoolStore};
use poolchem_core::submissions::dashboard::Dashboard;
use poolchem_core::submissions::{self, SubmissionDraft};
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_save: AtomicBool,
    fail_save_disk: AtomicBool,
    fail_delete: AtomicBool,
    delete_noop: AtomicBool,
}

impl FlakyStore {
    fn with_pools(pools: impl IntoIterator<Item = PoolDocument>) -> Self {
        Self {
            inner: MemoryStore::with_pools(pools),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PoolStore for FlakyStore {
    async fn list(&self) -> Result<Vec<PoolDocument>, PoolChemError> {
        self.inner.list().await
    }

    fn subscribe(&self, listener: Listener<PoolDocument>) -> Result<(), PoolChemError> {
        self.inner.subscribe(listener)
    }

    async fn save(&self, id: &str, document: &PoolDocument) -> Result<String, PoolChemError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PoolChemError::Store("permission denied".into()));
        }
        if self.fail_save_disk.load(Ordering::SeqCst) {
            return Err(PoolChemError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk quota exceeded",
            )));
        }
        self.inner.save(id, document).await
    }

    async fn delete(&self, id: &str) -> Result<bool, PoolChemError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PoolChemError::Store("backend unavailable".into()));
        }
        if self.delete_noop.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.delete(id).await
    }

    fn backend_name(&self) -> &str {
        "flaky"
    }
}

type Controller = EditorController<FlakyStore, Arc<MemoryNotifier>>;

fn standard_preset() -> PoolDocument {
    load_preset("standard").unwrap()
}

fn existing_pool(id: &str, name: &str) -> PoolDocument {
    let mut doc = standard_preset();
    doc.id = id.into();
    doc.name = name.into();
    doc.num_pools = 1;
    doc.rules.pools.truncate(1);
    doc
}

fn controller(store: &Arc<FlakyStore>) -> (Controller, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let editor = EditorController::new(
        Arc::clone(store),
        Arc::clone(&notifier),
        &PoolChemConfig::default(),
    );
    (editor, notifier)
}

fn response(editor: &Controller, slot: usize, key: &str) -> String {
    editor
        .form()
        .row(&FieldKey::new(slot, MeasurementType::Ph, key))
        .unwrap()
        .response
        .clone()
}

// ---------------------------------------------------------------------------
// Add mode and preset cloning
// ---------------------------------------------------------------------------
#[tokio::test]
async fn add_mode_clones_preset_first_second_first() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();
    editor.enter_add_mode().await.unwrap();

    assert_eq!(editor.mode(), EditorMode::Add);
    assert!(editor.form().preset_visible);
    assert_eq!(editor.form().metadata.name, "New Pool");
    assert_eq!(editor.form().metadata.num_pools, 1);
    assert!(editor.form().metadata.markets.contains("North"));

    let first = "pH low. Add soda ash per the dosing chart and retest in 1 hour.";
    let second = "Wading pool pH low. Add a half dose of soda ash.";
    assert_eq!(response(&editor, 0, "<7.2"), first);
    assert_eq!(response(&editor, 1, "<7.2"), second);
    for slot in 2..MAX_POOLS {
        assert_eq!(response(&editor, slot, "<7.2"), first);
    }

    let last = notifier.last().unwrap();
    assert_eq!(last.severity, Severity::Info);
}

#[tokio::test]
async fn add_mode_without_preset_reports_and_stays_editable() {
    let store = Arc::new(FlakyStore::default());
    let (mut editor, notifier) = controller(&store);
    editor.enter_add_mode().await.unwrap();

    assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    assert!(editor.form().metadata.editable);
    assert!(editor.form().slot(0).unwrap().editable);
    assert_eq!(response(&editor, 0, "<7.2"), "");
}

#[tokio::test]
async fn pool_count_controls_visible_slots() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();

    for count in 1..=MAX_POOLS {
        editor.set_pool_count(count).unwrap();
        for slot in 0..MAX_POOLS {
            let view = editor.form().slot(slot).unwrap();
            assert_eq!(view.visible, slot < count, "count {count}, slot {slot}");
        }
    }
    assert!(matches!(
        editor.set_pool_count(MAX_POOLS + 1),
        Err(PoolChemError::Validation(_))
    ));
    assert!(editor.set_pool_count(0).is_err());
}

// ---------------------------------------------------------------------------
// Method switching
// ---------------------------------------------------------------------------
#[tokio::test]
async fn method_switch_round_trip_keeps_both_methods() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();

    let key = FieldKey::new(0, MeasurementType::Ph, "<7.2");
    editor.set_response(&key, "Custom bleach").unwrap();

    editor.switch_method(0, SanitationMethod::Granular).unwrap();
    assert_eq!(
        response(&editor, 0, "<7.2"),
        "pH low. Broadcast soda ash and retest in 1 hour."
    );
    editor.set_response(&key, "Custom granular").unwrap();

    editor.switch_method(0, SanitationMethod::Bleach).unwrap();
    assert_eq!(response(&editor, 0, "<7.2"), "Custom bleach");
    assert_eq!(
        editor
            .table()
            .entry(0, SanitationMethod::Granular, MeasurementType::Ph, "<7.2")
            .unwrap()
            .response,
        "Custom granular"
    );

    editor.switch_method(0, SanitationMethod::Granular).unwrap();
    assert_eq!(response(&editor, 0, "<7.2"), "Custom granular");
}

#[tokio::test]
async fn method_switch_without_edits_changes_nothing() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();

    for slot in 0..MAX_POOLS {
        let before = editor.table().get(slot).cloned().unwrap();
        editor.switch_method(slot, SanitationMethod::Granular).unwrap();
        editor.switch_method(slot, SanitationMethod::Bleach).unwrap();
        assert_eq!(editor.table().get(slot), Some(&before), "slot {slot}");
    }
}

#[tokio::test]
async fn stored_blank_and_padded_rows_survive_method_switch() {
    let ph = BTreeMap::from([
        (
            "<7.2".to_string(),
            RuleEntry {
                response: String::new(),
                concern_level: ConcernLevel::None,
            },
        ),
        (
            "7.8+".to_string(),
            RuleEntry {
                response: "Add acid ".into(),
                concern_level: ConcernLevel::Red,
            },
        ),
    ]);
    let lake = PoolDocument {
        id: "lake".into(),
        name: "Lakeside".into(),
        num_pools: 1,
        markets: BTreeSet::new(),
        rules: PoolRules {
            pools: vec![StoredPoolRules {
                bleach: Some(MethodRules {
                    ph,
                    cl: BTreeMap::new(),
                }),
                ..Default::default()
            }],
        },
    };
    let store = Arc::new(FlakyStore::with_pools(vec![lake]));
    let (mut editor, _) = controller(&store);
    editor.start().await.unwrap();
    editor.select_pool("lake").unwrap();

    let before = editor.table().get(0).cloned().unwrap();
    editor.switch_method(0, SanitationMethod::Granular).unwrap();
    editor.switch_method(0, SanitationMethod::Bleach).unwrap();
    assert_eq!(editor.table().get(0), Some(&before));

    let bleach = &editor.table().get(0).unwrap().bleach;
    assert!(bleach.ph["<7.2"].is_blank());
    assert_eq!(bleach.ph["7.8+"].response, "Add acid");
    assert_eq!(bleach.ph["7.8+"].concern_level, ConcernLevel::Red);

    editor.begin_editing().unwrap();
    editor.save().await.unwrap();
    let saved = store.inner.pool("lake").unwrap().rules.pools[0].to_rule_set();
    assert!(saved.bleach.ph.contains_key("<7.2"));
    assert_eq!(saved.bleach.ph.len(), 2);
}

#[tokio::test]
async fn legacy_pool_edits_do_not_leak_between_methods() {
    let mut splash = load_preset("splash-pad").unwrap();
    splash.id = "splash".into();
    let store = Arc::new(FlakyStore::with_pools(vec![splash]));
    let (mut editor, _) = controller(&store);
    editor.start().await.unwrap();
    editor.select_pool("splash").unwrap();
    editor.begin_editing().unwrap();

    let key = FieldKey::new(0, MeasurementType::Ph, "7.8+");
    editor.set_response(&key, "Changed bleach").unwrap();
    editor.switch_method(0, SanitationMethod::Granular).unwrap();
    assert_eq!(
        response(&editor, 0, "7.8+"),
        "Shut off the spray features and notify the supervisor."
    );

    editor.save().await.unwrap();
    let stored = store.inner.pool("splash").unwrap();
    let slot = &stored.rules.pools[0];
    assert_eq!(slot.shape(), StoredShape::Split);
    let set = slot.to_rule_set();
    assert_eq!(set.bleach.ph["7.8+"].response, "Changed bleach");
    assert_eq!(
        set.granular.ph["7.8+"].response,
        "Shut off the spray features and notify the supervisor."
    );
}

// ---------------------------------------------------------------------------
// Concern styling
// ---------------------------------------------------------------------------
#[tokio::test]
async fn concern_change_restyles_one_row() {
    let store = Arc::new(FlakyStore::default());
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();

    let key = FieldKey::new(0, MeasurementType::Cl, "1-3");
    editor.set_concern(&key, ConcernLevel::Red).unwrap();

    for other in editor.form().field_keys(0) {
        let row = editor.form().row(&other).unwrap();
        if other == key {
            assert_eq!(row.row_style, Some(ConcernStyle::Major));
            assert_eq!(row.selector_style, Some(ConcernStyle::Major));
            assert_eq!(row.field_style, Some(ConcernStyle::Major));
        } else {
            assert_eq!(row.row_style, Some(ConcernStyle::Normal));
        }
    }
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------
#[tokio::test]
async fn first_save_keys_by_name_then_by_loaded_id() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();
    editor.enter_add_mode().await.unwrap();
    editor.set_name("Lakeside").unwrap();

    let id = editor.save().await.unwrap();
    assert_eq!(id, "Lakeside");
    assert_eq!(editor.current_id(), Some("Lakeside"));
    assert_eq!(notifier.last().unwrap().severity, Severity::Success);
    assert!(!editor.form().metadata.editable);
    assert!(!editor.form().slot(0).unwrap().editable);
    assert!(editor.form().save_enabled);

    editor.begin_editing().unwrap();
    editor.set_name("Lakeside Family Pool").unwrap();
    let id = editor.save().await.unwrap();
    assert_eq!(id, "Lakeside");

    let pools = store.inner.list().await.unwrap();
    assert_eq!(pools.len(), 2);
    let saved = store.inner.pool("Lakeside").unwrap();
    assert_eq!(saved.name, "Lakeside Family Pool");
    assert_eq!(editor.cache().len(), 2);
}

#[tokio::test]
async fn save_reads_out_only_counted_slots() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();
    editor.set_name("Hillside").unwrap();

    editor.set_pool_count(3).unwrap();
    editor
        .set_response(&FieldKey::new(2, MeasurementType::Ph, "<7.2"), "Third pool")
        .unwrap();
    editor.set_pool_count(2).unwrap();
    editor.save().await.unwrap();

    let saved = store.inner.pool("Hillside").unwrap();
    assert_eq!(saved.num_pools, 2);
    assert_eq!(saved.rules.pools.len(), 2);
    assert!(saved
        .rules
        .pools
        .iter()
        .all(|p| p.shape() == StoredShape::Split));
}

#[tokio::test]
async fn failed_save_keeps_fields_editable() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, notifier) = controller(&store);
    editor.enter_add_mode().await.unwrap();
    editor.set_name("Lakeside").unwrap();

    store.fail_save.store(true, Ordering::SeqCst);
    let result = editor.save().await;
    assert!(matches!(result, Err(PoolChemError::Store(_))));

    assert!(editor.form().metadata.editable);
    assert!(editor.form().slot(0).unwrap().editable);
    assert!(editor.form().save_enabled);
    assert_eq!(editor.current_id(), None);
    let last = notifier.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(store.inner.pool("Lakeside").is_none());
}

#[tokio::test]
async fn disk_failure_on_save_shows_the_cause() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, notifier) = controller(&store);
    editor.enter_add_mode().await.unwrap();
    editor.set_name("Lakeside").unwrap();

    store.fail_save_disk.store(true, Ordering::SeqCst);
    let result = editor.save().await;
    assert!(matches!(result, Err(PoolChemError::Io(_))));

    let last = notifier.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.contains("disk quota exceeded"), "{}", last.message);
    assert!(editor.form().save_enabled);
    assert!(editor.form().metadata.editable);
    assert!(store.inner.pool("Lakeside").is_none());
}

#[tokio::test]
async fn blank_name_warns_without_writing() {
    let store = Arc::new(FlakyStore::default());
    let (mut editor, notifier) = controller(&store);
    editor.enter_add_mode().await.unwrap();
    editor.set_name("   ").unwrap();

    assert!(matches!(
        editor.save().await,
        Err(PoolChemError::Validation(_))
    ));
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
    assert!(store.inner.list().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Edit mode
// ---------------------------------------------------------------------------
#[tokio::test]
async fn selected_pool_is_read_only_until_editing() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, _) = controller(&store);
    editor.start().await.unwrap();
    editor.enter_edit_mode();
    assert!(!editor.form().metadata.visible);

    editor.select_pool("lake").unwrap();
    assert!(editor.form().metadata.visible);
    assert_eq!(editor.form().selected_pool.as_deref(), Some("lake"));
    assert_eq!(editor.form().metadata.name, "Lakeside");
    assert!(editor.form().slot(0).unwrap().visible);
    assert!(!editor.form().slot(1).unwrap().visible);

    let key = FieldKey::new(0, MeasurementType::Ph, "<7.2");
    assert!(editor.set_response(&key, "x").is_err());
    assert!(editor.set_name("x").is_err());

    editor.begin_editing().unwrap();
    editor.set_response(&key, "x").unwrap();
}

#[tokio::test]
async fn edit_mode_drops_unsaved_add_mode_metadata() {
    let store = Arc::new(FlakyStore::with_pools(vec![standard_preset()]));
    let (mut editor, _) = controller(&store);
    editor.enter_add_mode().await.unwrap();
    editor.set_name("Lakeside").unwrap();
    editor.set_pool_count(3).unwrap();
    assert!(editor.form().preset_visible);

    editor.enter_edit_mode();
    let form = editor.form();
    assert_eq!(form.metadata.name, "");
    assert_eq!(form.metadata.num_pools, 1);
    assert!(form.metadata.markets.is_empty());
    assert!(!form.preset_visible);
    assert!(!form.metadata.visible);
    assert!(!form.rules_section_visible);
    assert_eq!(editor.current_id(), None);
}

#[tokio::test]
async fn selecting_outside_edit_mode_warns() {
    let store = Arc::new(FlakyStore::with_pools(vec![
        standard_preset(),
        existing_pool("lake", "Lakeside"),
    ]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();
    editor.enter_add_mode().await.unwrap();

    let result = editor.select_pool("lake");
    assert!(matches!(result, Err(PoolChemError::Validation(_))));
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
    assert_eq!(editor.mode(), EditorMode::Add);
    assert_eq!(editor.current_id(), None);
}

#[tokio::test]
async fn stale_selection_is_reported() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();

    let result = editor.select_pool("ghost");
    assert!(matches!(result, Err(PoolChemError::PoolNotFound { .. })));
    assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    assert_eq!(editor.current_id(), None);
}

#[tokio::test]
async fn subscription_keeps_pool_list_current() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, _) = controller(&store);
    editor.start().await.unwrap();
    editor.start().await.unwrap();
    assert_eq!(editor.pool_options().len(), 1);

    store
        .inner
        .save("Beach", &existing_pool("", "Beach"))
        .await
        .unwrap();
    let names: Vec<String> = editor.pool_options().into_iter().map(|(_, n)| n).collect();
    assert_eq!(names, vec!["Beach", "Lakeside"]);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------
#[tokio::test]
async fn delete_without_selection_only_warns() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();

    assert!(!editor.request_delete());
    assert!(!editor.form().delete_modal_open);
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
    assert!(store.inner.pool("lake").is_some());
}

#[tokio::test]
async fn confirmed_delete_clears_the_editor() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();
    editor.select_pool("lake").unwrap();

    assert!(editor.request_delete());
    assert!(editor.form().delete_modal_open);
    assert!(editor.confirm_delete().await.unwrap());

    assert!(!editor.form().delete_modal_open);
    assert_eq!(editor.current_id(), None);
    assert!(!editor.form().rules_section_visible);
    assert!(editor.cache().is_empty());
    assert!(store.inner.pool("lake").is_none());
    assert_eq!(notifier.last().unwrap().severity, Severity::Success);
}

#[tokio::test]
async fn unsuccessful_delete_keeps_modal_open() {
    let store = Arc::new(FlakyStore::with_pools(vec![existing_pool("lake", "Lakeside")]));
    let (mut editor, notifier) = controller(&store);
    editor.start().await.unwrap();
    editor.select_pool("lake").unwrap();
    editor.request_delete();

    store.delete_noop.store(true, Ordering::SeqCst);
    assert!(!editor.confirm_delete().await.unwrap());
    assert!(editor.form().delete_modal_open);
    assert_eq!(notifier.last().unwrap().severity, Severity::Error);

    store.delete_noop.store(false, Ordering::SeqCst);
    store.fail_delete.store(true, Ordering::SeqCst);
    assert!(editor.confirm_delete().await.is_err());
    assert!(editor.form().delete_modal_open);
    assert!(editor.form().delete_enabled);
    assert_eq!(editor.current_id(), Some("lake"));

    editor.cancel_delete();
    assert!(!editor.form().delete_modal_open);
    assert!(store.inner.pool("lake").is_some());
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------
#[tokio::test]
async fn recorded_reading_reaches_live_dashboard() {
    let store = MemoryStore::new();
    let dashboard = Dashboard::live(&store, 10).unwrap();
    let pools = vec![existing_pool("lake", "Lakeside")];

    let draft = SubmissionDraft {
        staff: Some("Sam".into()),
        market: Some("North".into()),
        pool: Some("lake".into()),
        slot: Some(0),
        method: Some(SanitationMethod::Bleach),
        ph: Some(dec!(8.0)),
        cl: Some(dec!(2)),
        notes: None,
    };
    let (submission, assessment) = submissions::record(&store, &pools, &draft, Utc::now())
        .await
        .unwrap();

    assert_eq!(submission.pool, "Lakeside");
    assert_eq!(assessment.concern, ConcernLevel::Red);
    assert_eq!(assessment.ph.unwrap().value_key, "7.8+");
    assert_eq!(assessment.cl.unwrap().entry.concern_level, ConcernLevel::None);

    let dashboard = dashboard.read();
    assert_eq!(dashboard.filtered().len(), 1);
    assert_eq!(dashboard.filtered()[0].id, submission.id);
}
