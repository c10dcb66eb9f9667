use findstream::ledger::InMemoryLedger;
use findstream::model::{RaisedHotspot, RaisedIssue, TrackedFinding};
use findstream::services::{StaticAiCodeFix, StaticBindings, StaticNewCode, StaticSeverityMode};
use findstream::{FindingStreamer, FindingsClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const INTERVAL: Duration = Duration::from_millis(60);
const SETTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct IssuePush {
    issues_by_file: HashMap<String, Vec<RaisedIssue>>,
    is_intermediate: bool,
    analysis_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
struct HotspotPush {
    hotspots_by_file: HashMap<String, Vec<RaisedHotspot>>,
}

#[derive(Default)]
struct RecordingClient {
    issue_pushes: Mutex<Vec<IssuePush>>,
    hotspot_pushes: Mutex<Vec<HotspotPush>>,
}

impl RecordingClient {
    fn issue_pushes(&self) -> Vec<IssuePush> {
        self.issue_pushes.lock().unwrap().clone()
    }

    fn hotspot_pushes(&self) -> Vec<HotspotPush> {
        self.hotspot_pushes.lock().unwrap().clone()
    }
}

impl FindingsClient for RecordingClient {
    fn raise_issues(
        &self,
        _scope_id: &str,
        issues_by_file: HashMap<String, Vec<RaisedIssue>>,
        is_intermediate: bool,
        analysis_id: Option<Uuid>,
    ) -> anyhow::Result<()> {
        self.issue_pushes.lock().unwrap().push(IssuePush {
            issues_by_file,
            is_intermediate,
            analysis_id,
        });
        Ok(())
    }

    fn raise_hotspots(
        &self,
        _scope_id: &str,
        hotspots_by_file: HashMap<String, Vec<RaisedHotspot>>,
        _is_intermediate: bool,
        _analysis_id: Option<Uuid>,
    ) -> anyhow::Result<()> {
        self.hotspot_pushes
            .lock()
            .unwrap()
            .push(HotspotPush { hotspots_by_file });
        Ok(())
    }
}

fn streamer(client: Arc<RecordingClient>) -> Arc<FindingStreamer> {
    FindingStreamer::with_interval(
        client,
        Arc::new(StaticBindings::unbound()),
        Arc::new(StaticNewCode::absent()),
        Arc::new(StaticSeverityMode::standard()),
        Arc::new(StaticAiCodeFix::absent()),
        Arc::new(InMemoryLedger::new()),
        INTERVAL,
    )
}

#[test]
fn debounced_stream_publishes_intermediate_exactly_once() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    let finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "unused variable");
    let id = finding.id;
    streamer.stream_issue("scope", analysis, finding);
    thread::sleep(SETTLE);

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].is_intermediate);
    assert_eq!(pushes[0].analysis_id, Some(analysis));
    let raised = &pushes[0].issues_by_file["file:///a.rs"];
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].id, id);
}

#[test]
fn streaming_the_same_id_twice_publishes_one_entry_with_latest_data() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    let mut finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "first message");
    streamer.stream_issue("scope", analysis, finding.clone());
    finding.message = "updated message".to_string();
    streamer.stream_issue("scope", analysis, finding);
    thread::sleep(SETTLE);

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 1);
    let raised = &pushes[0].issues_by_file["file:///a.rs"];
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].primary_message, "updated message");
}

#[test]
fn debounced_fire_publishes_only_the_analysis_own_files() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis_a = Uuid::new_v4();
    let analysis_b = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis_a, ["file:///f1.rs".to_string()]);
    streamer.init_files_to_analyze(analysis_b, ["file:///f2.rs".to_string()]);

    // The scope's alarm is created by the first stream and stays bound to
    // analysis A; B's finding lands in the cache but must not leak into A's
    // debounced publication.
    streamer.stream_issue(
        "scope",
        analysis_a,
        TrackedFinding::issue("file:///f1.rs", "rust:S1", "from a"),
    );
    streamer.stream_issue(
        "scope",
        analysis_b,
        TrackedFinding::issue("file:///f2.rs", "rust:S1", "from b"),
    );
    thread::sleep(SETTLE);

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].issues_by_file.contains_key("file:///f1.rs"));
    assert!(!pushes[0].issues_by_file.contains_key("file:///f2.rs"));
}

#[test]
fn final_report_suppresses_the_pending_debounced_push() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    let finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "streamed");
    streamer.stream_issue("scope", analysis, finding.clone());

    // Final report lands before the debounce interval elapses.
    let mut issues = HashMap::new();
    issues.insert("file:///a.rs".to_string(), vec![finding]);
    streamer
        .report_tracked_findings("scope", analysis, issues, HashMap::new())
        .unwrap();
    thread::sleep(SETTLE);

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 1);
    assert!(!pushes[0].is_intermediate);
    assert_eq!(pushes[0].analysis_id, Some(analysis));
}

#[test]
fn final_report_fully_replaces_files_omitted_from_the_input() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    let mut finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "first");
    streamer.stream_issue("scope", analysis, finding.clone());
    finding.message = "second".to_string();
    streamer.stream_issue("scope", analysis, finding);

    // Let the intermediate push deliver the streamed issue first.
    thread::sleep(SETTLE);
    assert_eq!(client.issue_pushes().len(), 1);

    // The final report omits the file entirely: full replace, not merge.
    streamer
        .report_tracked_findings("scope", analysis, HashMap::new(), HashMap::new())
        .unwrap();

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 2);
    let last = &pushes[1];
    assert!(!last.is_intermediate);
    assert!(last.issues_by_file["file:///a.rs"].is_empty());
}

#[test]
fn reset_before_a_new_analysis_clears_stale_findings_from_the_push() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    streamer.stream_issue(
        "scope",
        analysis,
        TrackedFinding::issue("file:///a.rs", "rust:S1", "stale"),
    );
    streamer.reset_findings_for_files("scope", &["file:///a.rs".to_string()]);
    thread::sleep(SETTLE);

    // The armed alarm still fires, but the reset file publishes empty.
    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].issues_by_file["file:///a.rs"].is_empty());
}

#[test]
fn rearming_after_a_fire_publishes_again() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    streamer.stream_issue(
        "scope",
        analysis,
        TrackedFinding::issue("file:///a.rs", "rust:S1", "first round"),
    );
    thread::sleep(SETTLE);
    streamer.stream_issue(
        "scope",
        analysis,
        TrackedFinding::issue("file:///a.rs", "rust:S2", "second round"),
    );
    thread::sleep(SETTLE);

    let pushes = client.issue_pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[1].issues_by_file["file:///a.rs"].len(), 2);
}

#[test]
fn hotspots_are_never_pushed_without_a_binding() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    streamer.stream_issue(
        "scope",
        analysis,
        TrackedFinding::hotspot("file:///a.rs", "rust:S2068", "hardcoded credentials"),
    );
    thread::sleep(SETTLE);
    streamer
        .report_tracked_findings("scope", analysis, HashMap::new(), HashMap::new())
        .unwrap();

    assert!(!client.issue_pushes().is_empty());
    assert!(client.hotspot_pushes().is_empty());
}

#[test]
fn point_lookups_return_absent_for_unknown_ids() {
    let client = Arc::new(RecordingClient::default());
    let streamer = streamer(client.clone());
    let analysis = Uuid::new_v4();
    streamer.init_files_to_analyze(analysis, ["file:///a.rs".to_string()]);

    let issue = TrackedFinding::issue("file:///a.rs", "rust:S1", "lookup me");
    let issue_id = issue.id;
    let hotspot = TrackedFinding::hotspot("file:///a.rs", "rust:S2068", "and me");
    let hotspot_id = hotspot.id;
    streamer.stream_issue("scope", analysis, issue);
    streamer.stream_issue("scope", analysis, hotspot);

    assert_eq!(streamer.find_reported_issue(issue_id).unwrap().id, issue_id);
    assert_eq!(
        streamer.find_reported_hotspot(hotspot_id).unwrap().id,
        hotspot_id
    );
    assert!(streamer.find_reported_issue(Uuid::new_v4()).is_none());
    assert!(streamer.find_reported_hotspot(Uuid::new_v4()).is_none());
    // kinds are cached separately: an issue id is not found among hotspots
    assert!(streamer.find_reported_hotspot(issue_id).is_none());
}
