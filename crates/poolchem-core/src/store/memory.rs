use super::{Listener, Listeners, PoolStore, SignupStore, StoreData, SubmissionStore};
use crate::error::PoolChemError;
use crate::rules::schema::PoolDocument;
use crate::submissions::Submission;
use crate::training::TrainingSignup;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Process-local store for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
    pool_listeners: Listeners<PoolDocument>,
    submission_listeners: Listeners<Submission>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self {
            data: RwLock::new(data),
            ..Default::default()
        }
    }

    /// Seed documents keyed by their own ids.
    pub fn with_pools(pools: impl IntoIterator<Item = PoolDocument>) -> Self {
        let mut data = StoreData::default();
        for pool in pools {
            data.pools.insert(pool.id.clone(), pool);
        }
        Self::with_data(data)
    }

    pub fn snapshot(&self) -> StoreData {
        self.data.read().clone()
    }

    pub fn pool(&self, id: &str) -> Option<PoolDocument> {
        self.data.read().pools.get(id).cloned()
    }
}

#[async_trait]
impl PoolStore for MemoryStore {
    async fn list(&self) -> Result<Vec<PoolDocument>, PoolChemError> {
        Ok(self.data.read().pool_list())
    }

    fn subscribe(&self, listener: Listener<PoolDocument>) -> Result<(), PoolChemError> {
        let snapshot = self.data.read().pool_list();
        self.pool_listeners.add(listener, &snapshot);
        Ok(())
    }

    async fn save(&self, id: &str, document: &PoolDocument) -> Result<String, PoolChemError> {
        let (key, snapshot) = {
            let mut data = self.data.write();
            let key = data.upsert_pool(id, document)?;
            (key, data.pool_list())
        };
        self.pool_listeners.emit(&snapshot);
        Ok(key)
    }

    async fn delete(&self, id: &str) -> Result<bool, PoolChemError> {
        let (removed, snapshot) = {
            let mut data = self.data.write();
            let removed = data.remove_pool(id);
            (removed, data.pool_list())
        };
        if removed {
            self.pool_listeners.emit(&snapshot);
        }
        Ok(removed)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn list_submissions(&self) -> Result<Vec<Submission>, PoolChemError> {
        Ok(self.data.read().submissions.clone())
    }

    async fn add_submission(&self, submission: Submission) -> Result<String, PoolChemError> {
        let (id, snapshot) = {
            let mut data = self.data.write();
            let id = data.push_submission(submission);
            (id, data.submissions.clone())
        };
        self.submission_listeners.emit(&snapshot);
        Ok(id)
    }

    fn subscribe_submissions(&self, listener: Listener<Submission>) -> Result<(), PoolChemError> {
        let snapshot = self.data.read().submissions.clone();
        self.submission_listeners.add(listener, &snapshot);
        Ok(())
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    async fn list_signups(&self) -> Result<Vec<TrainingSignup>, PoolChemError> {
        Ok(self.data.read().signups.clone())
    }

    async fn add_signup(&self, signup: TrainingSignup) -> Result<String, PoolChemError> {
        Ok(self.data.write().push_signup(signup))
    }
}
