use crate::model::{RaisedHotspot, RaisedIssue};
use std::collections::HashMap;
use std::sync::Mutex;

/// The ledger of previously raised findings: authoritative for "what was last
/// sent to the client" per scope and file, across analyses and server events.
///
/// `replace_*_for_files` merges the given per-file entries into the scope
/// (full replace per file, untouched files keep their previous entries) and
/// returns the complete post-merge map — exactly the payload the next client
/// push must carry.
pub trait RaisedFindingsLedger: Send + Sync {
    fn replace_issues_for_files(
        &self,
        scope_id: &str,
        issues: HashMap<String, Vec<RaisedIssue>>,
    ) -> HashMap<String, Vec<RaisedIssue>>;

    fn replace_hotspots_for_files(
        &self,
        scope_id: &str,
        hotspots: HashMap<String, Vec<RaisedHotspot>>,
    ) -> HashMap<String, Vec<RaisedHotspot>>;

    fn raised_issues_for_scope(&self, scope_id: &str) -> HashMap<String, Vec<RaisedIssue>>;

    fn raised_hotspots_for_scope(&self, scope_id: &str) -> HashMap<String, Vec<RaisedHotspot>>;

    /// Clear the given files' entries to empty lists in both kinds.
    fn reset_files(&self, scope_id: &str, files: &[String]);
}

#[derive(Default)]
struct ScopeLedger {
    issues: HashMap<String, Vec<RaisedIssue>>,
    hotspots: HashMap<String, Vec<RaisedHotspot>>,
}

/// Process-local ledger. Persisting raised findings across sessions is the
/// host backend's concern; embedders with storage swap in their own
/// implementation of the trait.
#[derive(Default)]
pub struct InMemoryLedger {
    scopes: Mutex<HashMap<String, ScopeLedger>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RaisedFindingsLedger for InMemoryLedger {
    fn replace_issues_for_files(
        &self,
        scope_id: &str,
        issues: HashMap<String, Vec<RaisedIssue>>,
    ) -> HashMap<String, Vec<RaisedIssue>> {
        let mut scopes = self.scopes.lock().unwrap();
        let scope = scopes.entry(scope_id.to_string()).or_default();
        scope.issues.extend(issues);
        scope.issues.clone()
    }

    fn replace_hotspots_for_files(
        &self,
        scope_id: &str,
        hotspots: HashMap<String, Vec<RaisedHotspot>>,
    ) -> HashMap<String, Vec<RaisedHotspot>> {
        let mut scopes = self.scopes.lock().unwrap();
        let scope = scopes.entry(scope_id.to_string()).or_default();
        scope.hotspots.extend(hotspots);
        scope.hotspots.clone()
    }

    fn raised_issues_for_scope(&self, scope_id: &str) -> HashMap<String, Vec<RaisedIssue>> {
        self.scopes
            .lock()
            .unwrap()
            .get(scope_id)
            .map(|scope| scope.issues.clone())
            .unwrap_or_default()
    }

    fn raised_hotspots_for_scope(&self, scope_id: &str) -> HashMap<String, Vec<RaisedHotspot>> {
        self.scopes
            .lock()
            .unwrap()
            .get(scope_id)
            .map(|scope| scope.hotspots.clone())
            .unwrap_or_default()
    }

    fn reset_files(&self, scope_id: &str, files: &[String]) {
        let mut scopes = self.scopes.lock().unwrap();
        let scope = scopes.entry(scope_id.to_string()).or_default();
        for file in files {
            scope.issues.insert(file.clone(), Vec::new());
            scope.hotspots.insert(file.clone(), Vec::new());
        }
    }
}
