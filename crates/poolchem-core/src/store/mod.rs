//! Gateway to the hosted document store.
//!
//! The rest of the crate sees the store only through these traits. Writes
//! are last-writer-wins: no version checks, no retries, no timeouts.

pub mod file;
pub mod memory;

use crate::error::PoolChemError;
use crate::rules::schema::PoolDocument;
use crate::submissions::Submission;
use crate::training::TrainingSignup;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Callback handed a full snapshot after every change.
pub type Listener<T> = Box<dyn Fn(&[T]) + Send + Sync>;

#[async_trait]
pub trait PoolStore: Send + Sync {
    /// One-shot fetch of every pool document.
    async fn list(&self) -> Result<Vec<PoolDocument>, PoolChemError>;

    /// Register a live listener. It is called once with the current
    /// contents, then after every change.
    fn subscribe(&self, listener: Listener<PoolDocument>) -> Result<(), PoolChemError>;

    /// Upsert under `id`, returning the id the document was stored under.
    async fn save(&self, id: &str, document: &PoolDocument) -> Result<String, PoolChemError>;

    /// `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, PoolChemError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn list_submissions(&self) -> Result<Vec<Submission>, PoolChemError>;

    /// Store a submission, returning its assigned id.
    async fn add_submission(&self, submission: Submission) -> Result<String, PoolChemError>;

    fn subscribe_submissions(&self, listener: Listener<Submission>) -> Result<(), PoolChemError>;
}

#[async_trait]
pub trait SignupStore: Send + Sync {
    async fn list_signups(&self) -> Result<Vec<TrainingSignup>, PoolChemError>;

    async fn add_signup(&self, signup: TrainingSignup) -> Result<String, PoolChemError>;
}

/// Trim a requested key, rejecting blanks.
pub fn document_key(id: &str) -> Result<String, PoolChemError> {
    let key = id.trim();
    if key.is_empty() {
        return Err(PoolChemError::Validation(
            "a pool name is required to save".into(),
        ));
    }
    Ok(key.to_string())
}

/// Everything a store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub pools: BTreeMap<String, PoolDocument>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(default)]
    pub signups: Vec<TrainingSignup>,
}

impl StoreData {
    pub fn pool_list(&self) -> Vec<PoolDocument> {
        self.pools.values().cloned().collect()
    }

    pub fn upsert_pool(&mut self, id: &str, document: &PoolDocument) -> Result<String, PoolChemError> {
        let key = document_key(id)?;
        let mut stored = document.clone();
        stored.id = key.clone();
        self.pools.insert(key.clone(), stored);
        Ok(key)
    }

    pub fn remove_pool(&mut self, id: &str) -> bool {
        self.pools.remove(id.trim()).is_some()
    }

    pub fn push_submission(&mut self, mut submission: Submission) -> String {
        submission.id = format!("sub-{:06}", self.submissions.len() + 1);
        let id = submission.id.clone();
        self.submissions.push(submission);
        id
    }

    pub fn push_signup(&mut self, mut signup: TrainingSignup) -> String {
        signup.id = format!("signup-{:06}", self.signups.len() + 1);
        let id = signup.id.clone();
        self.signups.push(signup);
        id
    }
}

/// Registered listeners for one kind of record.
pub(crate) struct Listeners<T> {
    inner: RwLock<Vec<Listener<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Listeners<T> {
    pub(crate) fn add(&self, listener: Listener<T>, snapshot: &[T]) {
        listener(snapshot);
        self.inner.write().push(listener);
    }

    pub(crate) fn emit(&self, snapshot: &[T]) {
        for listener in self.inner.read().iter() {
            listener(snapshot);
        }
    }
}
