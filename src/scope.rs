use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Registry of the file set each in-flight analysis covers.
///
/// Populated before an analysis starts streaming, consulted by the debounced
/// publish to keep one analysis from leaking files belonging to a concurrent
/// one, and discarded when the final report consumes it.
#[derive(Default)]
pub struct AnalysisRegistry {
    files_per_analysis: DashMap<Uuid, HashSet<String>>,
}

impl AnalysisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register files for an analysis; calling twice for the same id unions
    /// the sets.
    pub fn register(&self, analysis_id: Uuid, files: impl IntoIterator<Item = String>) {
        self.files_per_analysis
            .entry(analysis_id)
            .or_default()
            .extend(files);
    }

    pub fn files_for(&self, analysis_id: Uuid) -> Option<HashSet<String>> {
        self.files_per_analysis
            .get(&analysis_id)
            .map(|entry| entry.clone())
    }

    pub fn remove(&self, analysis_id: Uuid) -> Option<HashSet<String>> {
        self.files_per_analysis
            .remove(&analysis_id)
            .map(|(_, files)| files)
    }
}
