use clokwerk::{Scheduler, TimeUnits};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::catalog::{fingerprint_of, Catalog, CatalogResult};
use crate::catalog_store::CatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Unchanged,
    Reloaded { photos: usize },
    Skipped,
}

/// Watches the catalog file and swaps in a new snapshot whenever the
/// generator rewrites it.
#[derive(Clone)]
pub struct CatalogReloader {
    metadata_path: PathBuf,
    store: CatalogStore,
    reload_lock: Arc<Mutex<()>>,
}

impl CatalogReloader {
    pub fn new(metadata_path: PathBuf, store: CatalogStore) -> Self {
        Self {
            metadata_path,
            store,
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reloads the catalog when the file's fingerprint differs from the
    /// current snapshot. A catalog that fails to load leaves the current
    /// snapshot in place.
    pub fn reload_if_changed(&self) -> CatalogResult<ReloadOutcome> {
        // Try to acquire lock - if another reload is running, skip this one
        let _lock = match self.reload_lock.try_lock() {
            Ok(lock) => lock,
            Err(_) => {
                warn!("Skipping catalog reload - another reload is already in progress");
                return Ok(ReloadOutcome::Skipped);
            }
        };

        let bytes = std::fs::read(&self.metadata_path)?;
        if fingerprint_of(&bytes) == self.store.snapshot().fingerprint() {
            return Ok(ReloadOutcome::Unchanged);
        }

        match Catalog::load(&bytes) {
            Ok(catalog) => {
                let photos = catalog.len();
                let previous = self.store.replace(catalog);
                info!(
                    "Catalog reloaded from {}: {} photos (was {})",
                    self.metadata_path.display(),
                    photos,
                    previous.len()
                );
                Ok(ReloadOutcome::Reloaded { photos })
            }
            Err(e) => {
                error!(
                    "Keeping previous catalog, {} failed to load: {}",
                    self.metadata_path.display(),
                    e
                );
                Err(e)
            }
        }
    }

    pub fn start(&self, interval_secs: u32) -> JoinHandle<()> {
        let mut scheduler = Scheduler::new();

        let reloader = self.clone();
        scheduler.every(interval_secs.seconds()).run(move || {
            if let Err(e) = reloader.reload_if_changed() {
                error!("Scheduled catalog reload failed: {}", e);
            }
        });

        let handle = thread::spawn(move || loop {
            scheduler.run_pending();
            thread::sleep(Duration::from_millis(500));
        });

        info!(
            "Catalog reloader started - checking {} every {}s",
            self.metadata_path.display(),
            interval_secs
        );
        handle
    }
}
