use crate::model::{
    HotspotStatus, RaisedHotspot, RaisedIssue, SeverityMode, TrackedFinding,
    VulnerabilityProbability,
};
use crate::services::{AiFixFeature, NewCodeDefinition};

/// Everything needed to project tracked findings into their wire shape,
/// resolved once per publish rather than once per finding.
pub struct RaiseContext {
    pub new_code: NewCodeDefinition,
    /// MQR severities apply when the scope's connection runs in MQR mode.
    pub mqr: bool,
    /// AI fix feature of the bound server; absent in standalone mode.
    pub ai_fix: Option<AiFixFeature>,
}

impl Default for RaiseContext {
    fn default() -> Self {
        Self {
            new_code: NewCodeDefinition::AlwaysNew,
            mqr: false,
            ai_fix: None,
        }
    }
}

impl RaiseContext {
    fn severity_mode(&self, finding: &TrackedFinding) -> SeverityMode {
        // MQR details are only available when the analyzer reported them;
        // otherwise fall back to the legacy pair even in MQR mode.
        match (&finding.clean_code_attribute, self.mqr) {
            (Some(attribute), true) if !finding.impacts.is_empty() => SeverityMode::Mqr {
                clean_code_attribute: attribute.clone(),
                impacts: finding.impacts.clone(),
            },
            _ => SeverityMode::Standard {
                severity: finding.severity,
                rule_type: finding.rule_type,
            },
        }
    }

    fn is_ai_fixable(&self, finding: &TrackedFinding) -> bool {
        self.ai_fix
            .as_ref()
            .map(|feature| feature.is_fixable(finding))
            .unwrap_or(false)
    }
}

pub fn to_raised_issue(finding: &TrackedFinding, ctx: &RaiseContext) -> RaisedIssue {
    RaisedIssue {
        id: finding.id,
        server_key: finding.server_key.clone(),
        rule_key: finding.rule_key.clone(),
        primary_message: finding.message.clone(),
        severity_mode: ctx.severity_mode(finding),
        introduction_date: finding.introduction_date,
        is_on_new_code: ctx.new_code.is_on_new_code(finding.introduction_date),
        resolved: finding.resolved,
        text_range: finding.text_range,
        rule_description_context_key: finding.rule_description_context_key.clone(),
        is_ai_fixable: ctx.is_ai_fixable(finding),
    }
}

pub fn to_raised_hotspot(finding: &TrackedFinding, ctx: &RaiseContext) -> RaisedHotspot {
    RaisedHotspot {
        id: finding.id,
        server_key: finding.server_key.clone(),
        rule_key: finding.rule_key.clone(),
        primary_message: finding.message.clone(),
        severity_mode: ctx.severity_mode(finding),
        introduction_date: finding.introduction_date,
        is_on_new_code: ctx.new_code.is_on_new_code(finding.introduction_date),
        resolved: finding.resolved,
        text_range: finding.text_range,
        status: finding.hotspot_status.unwrap_or(HotspotStatus::ToReview),
        vulnerability_probability: finding
            .vulnerability_probability
            .unwrap_or(VulnerabilityProbability::Medium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Impact, ImpactSeverity, RuleType, Severity, SoftwareQuality, TextRange};

    fn mqr_finding() -> TrackedFinding {
        let mut finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "m");
        finding.clean_code_attribute = Some("CONVENTIONAL".to_string());
        finding.impacts = vec![Impact {
            quality: SoftwareQuality::Maintainability,
            severity: ImpactSeverity::Medium,
        }];
        finding
    }

    #[test]
    fn standard_mode_uses_legacy_severity_pair() {
        let issue = to_raised_issue(&mqr_finding(), &RaiseContext::default());
        assert_eq!(
            issue.severity_mode,
            SeverityMode::Standard {
                severity: Severity::Major,
                rule_type: RuleType::CodeSmell,
            }
        );
    }

    #[test]
    fn mqr_mode_emits_impacts_when_present() {
        let ctx = RaiseContext {
            mqr: true,
            ..RaiseContext::default()
        };
        let issue = to_raised_issue(&mqr_finding(), &ctx);
        match issue.severity_mode {
            SeverityMode::Mqr { clean_code_attribute, impacts } => {
                assert_eq!(clean_code_attribute, "CONVENTIONAL");
                assert_eq!(impacts.len(), 1);
            }
            other => panic!("expected MQR severity mode, got {other:?}"),
        }
    }

    #[test]
    fn mqr_mode_without_metadata_falls_back_to_standard() {
        let ctx = RaiseContext {
            mqr: true,
            ..RaiseContext::default()
        };
        let plain = TrackedFinding::issue("file:///a.rs", "rust:S1", "m");
        let issue = to_raised_issue(&plain, &ctx);
        assert!(matches!(issue.severity_mode, SeverityMode::Standard { .. }));
    }

    #[test]
    fn new_code_classification_follows_the_definition() {
        let ctx = RaiseContext {
            new_code: NewCodeDefinition::Since { start_millis: 1_000 },
            ..RaiseContext::default()
        };
        let mut old = TrackedFinding::issue("file:///a.rs", "rust:S1", "m");
        old.introduction_date = Some(500);
        assert!(!to_raised_issue(&old, &ctx).is_on_new_code);

        let mut recent = TrackedFinding::issue("file:///a.rs", "rust:S1", "m");
        recent.introduction_date = Some(2_000);
        assert!(to_raised_issue(&recent, &ctx).is_on_new_code);
    }

    #[test]
    fn ai_fixability_defaults_to_false_without_feature() {
        let mut finding = TrackedFinding::issue("file:///a.rs", "rust:S1", "m");
        finding.text_range = Some(TextRange {
            start_line: 1,
            start_col: 0,
            end_line: 1,
            end_col: 5,
        });
        assert!(!to_raised_issue(&finding, &RaiseContext::default()).is_ai_fixable);

        let ctx = RaiseContext {
            ai_fix: Some(AiFixFeature {
                enabled_rules: ["rust:S1".to_string()].into_iter().collect(),
            }),
            ..RaiseContext::default()
        };
        assert!(to_raised_issue(&finding, &ctx).is_ai_fixable);
    }

    #[test]
    fn hotspot_projection_defaults_status_and_probability() {
        let mut finding = TrackedFinding::hotspot("file:///a.rs", "rust:S2068", "m");
        finding.hotspot_status = None;
        finding.vulnerability_probability = None;

        let hotspot = to_raised_hotspot(&finding, &RaiseContext::default());
        assert_eq!(hotspot.status, HotspotStatus::ToReview);
        assert_eq!(
            hotspot.vulnerability_probability,
            VulnerabilityProbability::Medium
        );
    }
}
