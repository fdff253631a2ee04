// store.rs
use crate::domain::{derive, PropertyRecord, RenderableCollection};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A dataset together with the collection derived from it.
/// They are swapped as one unit so a reader never pairs old records with new features.
#[derive(Debug)]
struct Snapshot {
    records: Arc<[PropertyRecord]>,
    derived: Arc<RenderableCollection>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            derived: Arc::new(RenderableCollection::default()),
        }
    }
}

/// Holds the one current dataset. The only writer is the fetch-completion path.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Arc<Snapshot>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a whole new dataset. Derivation runs before the lock is taken.
    pub fn replace(&self, records: Vec<PropertyRecord>) {
        let derived = Arc::new(derive(&records));
        let snapshot = Arc::new(Snapshot {
            records: records.into(),
            derived,
        });

        *self.write() = snapshot;
    }

    pub fn current(&self) -> Arc<[PropertyRecord]> {
        self.read().records.clone()
    }

    /// Cached projection of the current dataset, invalidated by `replace`.
    pub fn derive(&self) -> Arc<RenderableCollection> {
        self.read().derived.clone()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock still holds a whole snapshot, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Arc<Snapshot>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Snapshot>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
