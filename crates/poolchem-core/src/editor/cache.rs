use crate::rules::schema::PoolDocument;
use crate::store::Listener;
use parking_lot::RwLock;
use std::sync::Arc;

/// Locally cached pool list, shared by the one-shot refresh and the live
/// subscription so both always agree.
///
/// Refreshes replace the list wholesale. Contents are only as fresh as the
/// last refresh or change notification.
#[derive(Debug, Clone, Default)]
pub struct PoolCache {
    pools: Arc<RwLock<Vec<PoolDocument>>>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, mut pools: Vec<PoolDocument>) {
        pools.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        *self.pools.write() = pools;
    }

    pub fn find(&self, id: &str) -> Option<PoolDocument> {
        self.pools.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn all(&self) -> Vec<PoolDocument> {
        self.pools.read().clone()
    }

    /// `(id, name)` pairs for the pool picker, sorted by name.
    pub fn options(&self) -> Vec<(String, String)> {
        self.pools
            .read()
            .iter()
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }

    /// A store listener that keeps this cache current.
    pub fn listener(&self) -> Listener<PoolDocument> {
        let cache = self.clone();
        Box::new(move |pools| cache.replace(pools.to_vec()))
    }
}
