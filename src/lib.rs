//! findstream — the finding reconciliation & streaming engine of an
//! IDE-integrated static-analysis backend.
//!
//! Analyzers push raw per-file findings in as analysis proceeds;
//! [`FindingStreamer`] keeps per-scope caches of the currently live findings,
//! debounces intermediate client publications, sends one authoritative final
//! publish per analysis, and reconciles the previously-raised ledger against
//! server-pushed updates and deletions — without ever sending the client a
//! duplicate, a stale entry, or an out-of-order snapshot.

pub mod alarm;
pub mod cache;
pub mod client;
pub mod config;
pub mod convert;
pub mod ledger;
pub mod model;
pub mod scope;
pub mod services;
pub mod streaming;

pub use alarm::Alarm;
pub use cache::FindingCache;
pub use client::FindingsClient;
pub use config::Config;
pub use convert::{RaiseContext, to_raised_hotspot, to_raised_issue};
pub use ledger::{InMemoryLedger, RaisedFindingsLedger};
pub use model::{
    HotspotStatus, Impact, ImpactSeverity, RaisedHotspot, RaisedIssue, RuleType, Severity,
    SeverityMode, SoftwareQuality, TextRange, TrackedFinding, VulnerabilityProbability,
};
pub use scope::AnalysisRegistry;
pub use services::{
    AiCodeFixService, AiFixFeature, Binding, BindingRepository, NewCodeDefinition, NewCodeService,
    SeverityModeService, StaticAiCodeFix, StaticBindings, StaticNewCode, StaticSeverityMode,
};
pub use streaming::FindingStreamer;
