use crate::model::TrackedFinding;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Per-file cache of currently live findings for one finding kind (issues or
/// security hotspots).
///
/// Each file maps to an immutable list behind an `Arc`; mutation is
/// copy-on-write: build a new list with the stale entry removed and the new
/// one appended, then atomically install it in the slot. Readers holding an
/// older `Arc` keep a consistent snapshot.
#[derive(Default)]
pub struct FindingCache {
    files: DashMap<String, Arc<Vec<TrackedFinding>>>,
}

impl FindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-replace by finding id. Two analyses racing on the same file
    /// can stream the "same" finding twice; replacing the existing entry keeps
    /// the streamed view free of duplicates (last writer wins).
    pub fn upsert(&self, finding: TrackedFinding) {
        let mut slot = self
            .files
            .entry(finding.file_uri.clone())
            .or_insert_with(|| Arc::new(Vec::new()));
        let mut next: Vec<TrackedFinding> = slot
            .iter()
            .filter(|existing| existing.id != finding.id)
            .cloned()
            .collect();
        next.push(finding);
        *slot = Arc::new(next);
    }

    /// Clear the file's entry to an empty list. The key is retained so a
    /// concurrent reader sees "no findings" rather than "never analyzed".
    pub fn reset_file(&self, file_uri: &str) {
        self.files
            .insert(file_uri.to_string(), Arc::new(Vec::new()));
    }

    pub fn get(&self, file_uri: &str) -> Option<Arc<Vec<TrackedFinding>>> {
        self.files.get(file_uri).map(|entry| entry.clone())
    }

    /// Point lookup by id across all files.
    pub fn find_by_id(&self, id: Uuid) -> Option<TrackedFinding> {
        for entry in self.files.iter() {
            if let Some(finding) = entry.value().iter().find(|f| f.id == id) {
                return Some(finding.clone());
            }
        }
        None
    }

    /// Snapshot of the cache restricted to the given files. Files without a
    /// cache entry are absent from the result.
    pub fn snapshot_for_files(&self, files: &HashSet<String>) -> HashMap<String, Vec<TrackedFinding>> {
        self.files
            .iter()
            .filter(|entry| files.contains(entry.key()))
            .map(|entry| (entry.key().clone(), entry.value().as_ref().clone()))
            .collect()
    }
}
