use super::{Listener, Listeners, PoolStore, SignupStore, StoreData, SubmissionStore};
use crate::error::PoolChemError;
use crate::rules::schema::PoolDocument;
use crate::submissions::Submission;
use crate::training::TrainingSignup;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store backed by a single JSON file.
///
/// Every write rewrites the whole file through a temporary sibling that is
/// renamed into place, so a failed write leaves the previous contents.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
    pool_listeners: Listeners<PoolDocument>,
    submission_listeners: Listeners<Submission>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PoolChemError> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                StoreData::default()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    PoolChemError::Store(format!("{} is not a valid store file: {}", path.display(), e))
                })?
            }
        } else {
            StoreData::default()
        };

        tracing::debug!(
            path = %path.display(),
            pools = data.pools.len(),
            submissions = data.submissions.len(),
            "opened store file"
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
            pool_listeners: Listeners::default(),
            submission_listeners: Listeners::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the data, write it out, then publish it.
    fn commit<R>(
        &self,
        change: impl FnOnce(&mut StoreData) -> Result<R, PoolChemError>,
    ) -> Result<(R, StoreData), PoolChemError> {
        let mut data = self.data.write();
        let mut next = data.clone();
        let result = change(&mut next)?;
        write_atomic(&self.path, &next)?;
        *data = next.clone();
        Ok((result, next))
    }
}

fn write_atomic(path: &Path, data: &StoreData) -> Result<(), PoolChemError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let json = serde_json::to_string_pretty(data)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| PoolChemError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl PoolStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<PoolDocument>, PoolChemError> {
        Ok(self.data.read().pool_list())
    }

    fn subscribe(&self, listener: Listener<PoolDocument>) -> Result<(), PoolChemError> {
        let snapshot = self.data.read().pool_list();
        self.pool_listeners.add(listener, &snapshot);
        Ok(())
    }

    async fn save(&self, id: &str, document: &PoolDocument) -> Result<String, PoolChemError> {
        let (key, data) = self.commit(|data| data.upsert_pool(id, document))?;
        self.pool_listeners.emit(&data.pool_list());
        Ok(key)
    }

    async fn delete(&self, id: &str) -> Result<bool, PoolChemError> {
        if !self.data.read().pools.contains_key(id.trim()) {
            return Ok(false);
        }
        let (removed, data) = self.commit(|data| Ok(data.remove_pool(id)))?;
        self.pool_listeners.emit(&data.pool_list());
        Ok(removed)
    }

    fn backend_name(&self) -> &str {
        "json-file"
    }
}

#[async_trait]
impl SubmissionStore for JsonFileStore {
    async fn list_submissions(&self) -> Result<Vec<Submission>, PoolChemError> {
        Ok(self.data.read().submissions.clone())
    }

    async fn add_submission(&self, submission: Submission) -> Result<String, PoolChemError> {
        let (id, data) = self.commit(|data| Ok(data.push_submission(submission)))?;
        self.submission_listeners.emit(&data.submissions);
        Ok(id)
    }

    fn subscribe_submissions(&self, listener: Listener<Submission>) -> Result<(), PoolChemError> {
        let snapshot = self.data.read().submissions.clone();
        self.submission_listeners.add(listener, &snapshot);
        Ok(())
    }
}

#[async_trait]
impl SignupStore for JsonFileStore {
    async fn list_signups(&self) -> Result<Vec<TrainingSignup>, PoolChemError> {
        Ok(self.data.read().signups.clone())
    }

    async fn add_signup(&self, signup: TrainingSignup) -> Result<String, PoolChemError> {
        let (id, _) = self.commit(|data| Ok(data.push_signup(signup)))?;
        Ok(id)
    }
}
