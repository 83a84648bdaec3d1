use std::sync::{Arc, RwLock};

use crate::catalog::Catalog;

/// Shared handle to the current catalog snapshot.
///
/// Readers clone the inner `Arc` and keep using it for as long as they need;
/// a reload swaps in a new snapshot without touching the old one.
#[derive(Clone)]
pub struct CatalogStore {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Installs `catalog` as the current snapshot and returns the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
