use crate::model::{RaisedHotspot, RaisedIssue};
use anyhow::Result;
use std::collections::HashMap;
use uuid::Uuid;

/// The IDE-side notifier. Implementations forward to the editor over the
/// host's transport; the engine only guarantees it never pushes a duplicate,
/// a stale entry, or an out-of-order snapshot.
///
/// Errors propagate to the caller of the operation that triggered the push;
/// the engine does not retry.
pub trait FindingsClient: Send + Sync {
    fn raise_issues(
        &self,
        scope_id: &str,
        issues_by_file: HashMap<String, Vec<RaisedIssue>>,
        is_intermediate: bool,
        analysis_id: Option<Uuid>,
    ) -> Result<()>;

    fn raise_hotspots(
        &self,
        scope_id: &str,
        hotspots_by_file: HashMap<String, Vec<RaisedHotspot>>,
        is_intermediate: bool,
        analysis_id: Option<Uuid>,
    ) -> Result<()>;
}
