use crate::alarm::Alarm;
use crate::cache::FindingCache;
use crate::client::FindingsClient;
use crate::config::Config;
use crate::convert::{RaiseContext, to_raised_hotspot, to_raised_issue};
use crate::ledger::RaisedFindingsLedger;
use crate::model::{RaisedHotspot, RaisedIssue, TrackedFinding};
use crate::scope::AnalysisRegistry;
use crate::services::{
    AiCodeFixService, BindingRepository, NewCodeDefinition, NewCodeService, SeverityModeService,
};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use uuid::Uuid;

const ALARM_THREAD_NAME: &str = "findstream-streamer";

/// The finding reconciliation & streaming controller.
///
/// Analyzers stream raw findings in per file as analysis proceeds; the
/// controller caches them per scope, debounces intermediate publications, and
/// sends one authoritative final publish per analysis. Server-push events
/// reuse the same replace-then-notify path through
/// [`update_and_report_findings`](Self::update_and_report_findings), bypassing
/// the cache and alarm entirely.
pub struct FindingStreamer {
    client: Arc<dyn FindingsClient>,
    bindings: Arc<dyn BindingRepository>,
    new_code: Arc<dyn NewCodeService>,
    severity_mode: Arc<dyn SeverityModeService>,
    ai_fix: Arc<dyn AiCodeFixService>,
    ledger: Arc<dyn RaisedFindingsLedger>,
    issues: FindingCache,
    hotspots: FindingCache,
    registry: AnalysisRegistry,
    /// At most one live alarm per scope; replaced, never stacked.
    alarms: Mutex<HashMap<String, Alarm>>,
    /// Single critical section serializing ledger merge + client push across
    /// all scopes, so cache visibility and notification order stay consistent.
    publish_lock: Mutex<()>,
    interval: Duration,
}

impl FindingStreamer {
    pub fn new(
        client: Arc<dyn FindingsClient>,
        bindings: Arc<dyn BindingRepository>,
        new_code: Arc<dyn NewCodeService>,
        severity_mode: Arc<dyn SeverityModeService>,
        ai_fix: Arc<dyn AiCodeFixService>,
        ledger: Arc<dyn RaisedFindingsLedger>,
    ) -> Arc<Self> {
        Self::with_interval(
            client,
            bindings,
            new_code,
            severity_mode,
            ai_fix,
            ledger,
            Config::get().streaming_interval(),
        )
    }

    pub fn with_interval(
        client: Arc<dyn FindingsClient>,
        bindings: Arc<dyn BindingRepository>,
        new_code: Arc<dyn NewCodeService>,
        severity_mode: Arc<dyn SeverityModeService>,
        ai_fix: Arc<dyn AiCodeFixService>,
        ledger: Arc<dyn RaisedFindingsLedger>,
        interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            bindings,
            new_code,
            severity_mode,
            ai_fix,
            ledger,
            issues: FindingCache::new(),
            hotspots: FindingCache::new(),
            registry: AnalysisRegistry::new(),
            alarms: Mutex::new(HashMap::new()),
            publish_lock: Mutex::new(()),
            interval,
        })
    }

    /// Register the file set an about-to-run analysis will touch. Additive:
    /// calling twice for the same analysis unions the sets. Must happen
    /// before any `stream_issue` for that analysis.
    pub fn init_files_to_analyze(&self, analysis_id: Uuid, files: impl IntoIterator<Item = String>) {
        self.registry.register(analysis_id, files);
    }

    /// Clear the given files in both caches and in the ledger before a fresh
    /// analysis starts, so stale findings from a previous run cannot leak
    /// into a debounced push racing with the new analysis.
    pub fn reset_findings_for_files(&self, scope_id: &str, files: &[String]) {
        for file in files {
            self.issues.reset_file(file);
            self.hotspots.reset_file(file);
        }
        self.ledger.reset_files(scope_id, files);
    }

    /// Record one incrementally streamed finding and arm (or refresh) the
    /// scope's debounce alarm.
    ///
    /// The cache is cleared when a new analysis starts, but two analyses can
    /// start almost simultaneously and stream the same finding for the same
    /// file. Insert-or-replace by id keeps the streamed view duplicate-free;
    /// the last writer wins until the final report corrects the view.
    pub fn stream_issue(self: &Arc<Self>, scope_id: &str, analysis_id: Uuid, finding: TrackedFinding) {
        if finding.is_security_hotspot {
            self.hotspots.upsert(finding);
        } else {
            self.issues.upsert(finding);
        }
        self.schedule_streaming(scope_id, analysis_id);
    }

    /// The authoritative end-of-analysis report. Retires the scope's debounce
    /// alarm, publishes the complete supplied results (bypassing the cache),
    /// and discards the analysis' file registration.
    ///
    /// Every file registered for the analysis is published, as an empty list
    /// when the report omits it: the final publish is a full replace, never a
    /// merge. Cancelled or partial analyses must still call this (possibly
    /// with empty maps) or they leak an alarm and a registry entry.
    pub fn report_tracked_findings(
        &self,
        scope_id: &str,
        analysis_id: Uuid,
        issues_by_file: HashMap<String, Vec<TrackedFinding>>,
        hotspots_by_file: HashMap<String, Vec<TrackedFinding>>,
    ) -> Result<()> {
        // Stop streaming now; everything is raised one last time below.
        self.stop_streaming(scope_id);
        let ctx = self.raise_context(scope_id);

        let analyzed = self.registry.files_for(analysis_id).unwrap_or_default();
        let mut issues_to_raise: HashMap<String, Vec<RaisedIssue>> = analyzed
            .iter()
            .map(|file| (file.clone(), Vec::new()))
            .collect();
        let mut hotspots_to_raise: HashMap<String, Vec<RaisedHotspot>> = analyzed
            .iter()
            .map(|file| (file.clone(), Vec::new()))
            .collect();
        // Group by each finding's own file URI rather than the input keys.
        for finding in issues_by_file.into_values().flatten() {
            issues_to_raise
                .entry(finding.file_uri.clone())
                .or_default()
                .push(to_raised_issue(&finding, &ctx));
        }
        for finding in hotspots_by_file.into_values().flatten() {
            hotspots_to_raise
                .entry(finding.file_uri.clone())
                .or_default()
                .push(to_raised_hotspot(&finding, &ctx));
        }

        let result = self
            .publish(
                scope_id,
                Some(analysis_id),
                issues_to_raise,
                hotspots_to_raise,
                false,
            )
            .with_context(|| format!("final publish for scope {scope_id} failed"));
        // The analysis is terminal either way; a failed push must not leak
        // the registration.
        self.registry.remove(analysis_id);
        result
    }

    /// Reconcile externally updated findings (e.g. a server push) against the
    /// ledger and republish. The updaters run over every previously raised
    /// finding of the scope; returning `None` deletes the finding from the
    /// next publish, returning `Some` replaces it.
    pub fn update_and_report_findings(
        &self,
        scope_id: &str,
        hotspot_updater: impl Fn(&RaisedHotspot) -> Option<RaisedHotspot>,
        issue_updater: impl Fn(&RaisedIssue) -> Option<RaisedIssue>,
    ) -> Result<()> {
        let updated_hotspots =
            update_findings(hotspot_updater, self.ledger.raised_hotspots_for_scope(scope_id));
        let updated_issues =
            update_findings(issue_updater, self.ledger.raised_issues_for_scope(scope_id));
        self.publish(scope_id, None, updated_issues, updated_hotspots, false)
    }

    pub fn update_and_report_issues(
        &self,
        scope_id: &str,
        issue_updater: impl Fn(&RaisedIssue) -> Option<RaisedIssue>,
    ) -> Result<()> {
        self.update_and_report_findings(scope_id, |hotspot| Some(hotspot.clone()), issue_updater)
    }

    pub fn update_and_report_hotspots(
        &self,
        scope_id: &str,
        hotspot_updater: impl Fn(&RaisedHotspot) -> Option<RaisedHotspot>,
    ) -> Result<()> {
        self.update_and_report_findings(scope_id, hotspot_updater, |issue| Some(issue.clone()))
    }

    /// Point lookup over the live issue cache. Absence is expected under
    /// concurrent resets and is not an error.
    pub fn find_reported_issue(&self, id: Uuid) -> Option<TrackedFinding> {
        self.issues.find_by_id(id)
    }

    /// Point lookup over the live hotspot cache.
    pub fn find_reported_hotspot(&self, id: Uuid) -> Option<TrackedFinding> {
        self.hotspots.find_by_id(id)
    }

    /// Debounced intermediate publication, invoked from the scope's alarm
    /// thread only. Publishes the current cache contents restricted to the
    /// analysis' registered files, so a fire attributed to one analysis never
    /// leaks files belonging to a concurrent one.
    fn trigger_streaming(&self, scope_id: &str, analysis_id: Uuid) -> Result<()> {
        let Some(files) = self.registry.files_for(analysis_id) else {
            // The analysis already sent its final report.
            return Ok(());
        };
        let ctx = self.raise_context(scope_id);
        let issues_to_raise = self
            .issues
            .snapshot_for_files(&files)
            .into_iter()
            .map(|(uri, findings)| {
                let raised = findings.iter().map(|f| to_raised_issue(f, &ctx)).collect();
                (uri, raised)
            })
            .collect();
        let hotspots_to_raise = self
            .hotspots
            .snapshot_for_files(&files)
            .into_iter()
            .map(|(uri, findings)| {
                let raised = findings.iter().map(|f| to_raised_hotspot(f, &ctx)).collect();
                (uri, raised)
            })
            .collect();
        self.publish(scope_id, Some(analysis_id), issues_to_raise, hotspots_to_raise, true)
    }

    /// The shared publish routine: merge into the ledger, then notify the
    /// client, under the single global critical section. Hotspots only go out
    /// when the scope has an effective binding (connected-mode feature).
    fn publish(
        &self,
        scope_id: &str,
        analysis_id: Option<Uuid>,
        updated_issues: HashMap<String, Vec<RaisedIssue>>,
        updated_hotspots: HashMap<String, Vec<RaisedHotspot>>,
        is_intermediate: bool,
    ) -> Result<()> {
        let _guard = self.publish_lock.lock().unwrap();
        let issues_to_raise = self.ledger.replace_issues_for_files(scope_id, updated_issues);
        self.client
            .raise_issues(scope_id, issues_to_raise, is_intermediate, analysis_id)?;
        if self.bindings.effective_binding(scope_id).is_some() {
            let hotspots_to_raise = self
                .ledger
                .replace_hotspots_for_files(scope_id, updated_hotspots);
            self.client
                .raise_hotspots(scope_id, hotspots_to_raise, is_intermediate, analysis_id)?;
        }
        Ok(())
    }

    fn raise_context(&self, scope_id: &str) -> RaiseContext {
        let new_code = self
            .new_code
            .full_new_code_definition(scope_id)
            .unwrap_or(NewCodeDefinition::AlwaysNew);
        let binding = self.bindings.effective_binding(scope_id);
        let mqr = binding
            .as_ref()
            .map(|binding| self.severity_mode.is_mqr_mode(&binding.connection_id))
            .unwrap_or(false);
        let ai_fix = binding.as_ref().and_then(|binding| self.ai_fix.feature(binding));
        RaiseContext { new_code, mqr, ai_fix }
    }

    /// Arm (or refresh) the scope's debounce alarm. The alarm is created
    /// lazily and bound to the analysis id that first armed it; it holds only
    /// a weak reference back to the streamer, so dropping the streamer tears
    /// the alarm threads down.
    fn schedule_streaming(self: &Arc<Self>, scope_id: &str, analysis_id: Uuid) {
        let mut alarms = self.alarms.lock().unwrap();
        let alarm = alarms.entry(scope_id.to_string()).or_insert_with(|| {
            let weak: Weak<Self> = Arc::downgrade(self);
            let scope = scope_id.to_string();
            Alarm::new(ALARM_THREAD_NAME, self.interval, move || {
                let Some(streamer) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = streamer.trigger_streaming(&scope, analysis_id) {
                    eprintln!("findstream: intermediate publish failed for {scope}: {err}");
                }
            })
        });
        alarm.schedule();
    }

    /// Remove and shut down the scope's alarm, joining the timer thread so no
    /// intermediate push can be delivered after this returns.
    fn stop_streaming(&self, scope_id: &str) {
        let alarm = self.alarms.lock().unwrap().remove(scope_id);
        if let Some(mut alarm) = alarm {
            alarm.shutdown_now();
        }
    }
}

impl Drop for FindingStreamer {
    fn drop(&mut self) {
        for (_, mut alarm) in self.alarms.lock().unwrap().drain() {
            alarm.shutdown_now();
        }
    }
}

/// Apply an updater to every previously raised finding; `None` deletes the
/// finding, `Some` replaces it. File keys are always kept so the publish
/// replaces the files' entries rather than leaving them stale.
fn update_findings<F>(
    updater: impl Fn(&F) -> Option<F>,
    previously_raised: HashMap<String, Vec<F>>,
) -> HashMap<String, Vec<F>> {
    previously_raised
        .into_iter()
        .map(|(uri, findings)| {
            let updated = findings.iter().filter_map(&updater).collect();
            (uri, updated)
        })
        .collect()
}
