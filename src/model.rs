use serde::Serialize;
use uuid::Uuid;

/// Rule severity in standard (non-MQR) mode.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    CodeSmell,
    Bug,
    Vulnerability,
    SecurityHotspot,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SoftwareQuality {
    Maintainability,
    Reliability,
    Security,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImpactSeverity {
    Blocker,
    High,
    Medium,
    Low,
    Info,
}

/// One MQR-mode impact entry (quality affected + how hard).
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Impact {
    pub quality: SoftwareQuality,
    pub severity: ImpactSeverity,
}

/// Review lifecycle of a security hotspot.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HotspotStatus {
    ToReview,
    Acknowledged,
    Fixed,
    Safe,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityProbability {
    High,
    Medium,
    Low,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start_line: i64,
    pub start_col: i64,
    pub end_line: i64,
    pub end_col: i64,
}

/// A finding as produced by the tracking/matching layer: the input shape of
/// the streaming engine. Ids are stable within a configuration scope and
/// finding kind; `server_key` appears once the finding has been matched to a
/// server-side one.
#[derive(Debug, Clone)]
pub struct TrackedFinding {
    pub id: Uuid,
    pub server_key: Option<String>,
    pub file_uri: String,
    pub rule_key: String,
    pub message: String,
    pub severity: Severity,
    pub rule_type: RuleType,
    /// MQR-mode metadata; empty when the analyzer only reported the legacy
    /// severity/type pair.
    pub clean_code_attribute: Option<String>,
    pub impacts: Vec<Impact>,
    /// Epoch millis of first detection; drives new-code classification.
    pub introduction_date: Option<i64>,
    pub resolved: bool,
    pub text_range: Option<TextRange>,
    pub rule_description_context_key: Option<String>,
    /// Routes the finding to the hotspot cache instead of the issue cache.
    pub is_security_hotspot: bool,
    pub hotspot_status: Option<HotspotStatus>,
    pub vulnerability_probability: Option<VulnerabilityProbability>,
}

/// Severity information as shown to the client, depending on the mode of the
/// connection the scope is bound to.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeverityMode {
    Standard {
        severity: Severity,
        rule_type: RuleType,
    },
    Mqr {
        clean_code_attribute: String,
        impacts: Vec<Impact>,
    },
}

/// Wire projection of a tracked issue, computed at publish time and never
/// stored in the streaming cache.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RaisedIssue {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_key: Option<String>,
    pub rule_key: String,
    pub primary_message: String,
    pub severity_mode: SeverityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction_date: Option<i64>,
    pub is_on_new_code: bool,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_range: Option<TextRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_description_context_key: Option<String>,
    pub is_ai_fixable: bool,
}

/// Wire projection of a tracked security hotspot.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RaisedHotspot {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_key: Option<String>,
    pub rule_key: String,
    pub primary_message: String,
    pub severity_mode: SeverityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction_date: Option<i64>,
    pub is_on_new_code: bool,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_range: Option<TextRange>,
    pub status: HotspotStatus,
    pub vulnerability_probability: VulnerabilityProbability,
}

impl TrackedFinding {
    /// Minimal issue; call sites fill the rest with struct update syntax.
    pub fn issue(file_uri: &str, rule_key: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_key: None,
            file_uri: file_uri.to_string(),
            rule_key: rule_key.to_string(),
            message: message.to_string(),
            severity: Severity::Major,
            rule_type: RuleType::CodeSmell,
            clean_code_attribute: None,
            impacts: Vec::new(),
            introduction_date: None,
            resolved: false,
            text_range: None,
            rule_description_context_key: None,
            is_security_hotspot: false,
            hotspot_status: None,
            vulnerability_probability: None,
        }
    }

    /// Minimal security hotspot, defaulting to the to-review state.
    pub fn hotspot(file_uri: &str, rule_key: &str, message: &str) -> Self {
        Self {
            rule_type: RuleType::SecurityHotspot,
            is_security_hotspot: true,
            hotspot_status: Some(HotspotStatus::ToReview),
            vulnerability_probability: Some(VulnerabilityProbability::Medium),
            ..Self::issue(file_uri, rule_key, message)
        }
    }
}
