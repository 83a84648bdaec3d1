use serde::Serialize;

use crate::catalog::Catalog;

/// Photos that differ between two generation cycles, each list sorted by filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl CatalogDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compares two catalogs by content hash.
pub fn diff(old: &Catalog, new: &Catalog) -> CatalogDiff {
    let mut result = CatalogDiff::default();

    for record in new.list(None) {
        match old.get(&record.filename) {
            None => result.added.push(record.filename.clone()),
            Some(previous) if previous.hash != record.hash => {
                result.changed.push(record.filename.clone())
            }
            Some(_) => {}
        }
    }

    result.removed = old
        .list(None)
        .filter(|record| new.get(&record.filename).is_none())
        .map(|record| record.filename.clone())
        .collect();

    result.added.sort();
    result.removed.sort();
    result.changed.sort();
    result
}
