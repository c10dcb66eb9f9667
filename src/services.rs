use crate::model::TrackedFinding;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// The server connection + project a configuration scope is bound to,
/// possibly inherited from a parent scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub connection_id: String,
    pub project_key: String,
}

/// Resolves the effective binding of a configuration scope. Absence is a
/// normal state (standalone mode), not an error.
pub trait BindingRepository: Send + Sync {
    fn effective_binding(&self, scope_id: &str) -> Option<Binding>;
}

/// Defines which findings count as "on new code" for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewCodeDefinition {
    /// Everything is new; the default when the scope has no definition.
    AlwaysNew,
    /// New since the given instant (epoch millis).
    Since { start_millis: i64 },
}

impl NewCodeDefinition {
    /// Findings without an introduction date are treated as new.
    pub fn is_on_new_code(&self, introduction_date: Option<i64>) -> bool {
        match self {
            NewCodeDefinition::AlwaysNew => true,
            NewCodeDefinition::Since { start_millis } => introduction_date
                .map(|date| date >= *start_millis)
                .unwrap_or(true),
        }
    }
}

pub trait NewCodeService: Send + Sync {
    fn full_new_code_definition(&self, scope_id: &str) -> Option<NewCodeDefinition>;
}

/// Whether a connection reports severities in MQR mode (impacts on software
/// qualities) rather than the legacy severity/type pair.
pub trait SeverityModeService: Send + Sync {
    fn is_mqr_mode(&self, connection_id: &str) -> bool;
}

/// AI-fix capability advertised by the bound server, if any.
#[derive(Debug, Clone, Default)]
pub struct AiFixFeature {
    pub enabled_rules: HashSet<String>,
}

impl AiFixFeature {
    /// A finding is fixable when it is a regular issue (not a hotspot),
    /// carries a text range to anchor the fix, and its rule is enabled for
    /// the feature.
    pub fn is_fixable(&self, finding: &TrackedFinding) -> bool {
        !finding.is_security_hotspot
            && finding.text_range.is_some()
            && self.enabled_rules.contains(&finding.rule_key)
    }
}

pub trait AiCodeFixService: Send + Sync {
    fn feature(&self, binding: &Binding) -> Option<AiFixFeature>;
}

/// Fixed scope-to-binding table; the host backend's configuration repository
/// in miniature, also used throughout the tests.
#[derive(Default)]
pub struct StaticBindings {
    bindings: Mutex<HashMap<String, Binding>>,
}

impl StaticBindings {
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bound(scope_id: &str, connection_id: &str, project_key: &str) -> Self {
        let bindings = Self::default();
        bindings.bind(scope_id, connection_id, project_key);
        bindings
    }

    pub fn bind(&self, scope_id: &str, connection_id: &str, project_key: &str) {
        self.bindings.lock().unwrap().insert(
            scope_id.to_string(),
            Binding {
                connection_id: connection_id.to_string(),
                project_key: project_key.to_string(),
            },
        );
    }

    pub fn unbind(&self, scope_id: &str) {
        self.bindings.lock().unwrap().remove(scope_id);
    }
}

impl BindingRepository for StaticBindings {
    fn effective_binding(&self, scope_id: &str) -> Option<Binding> {
        self.bindings.lock().unwrap().get(scope_id).cloned()
    }
}

/// One definition for every scope, or none at all.
#[derive(Default)]
pub struct StaticNewCode {
    definition: Option<NewCodeDefinition>,
}

impl StaticNewCode {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn since(start_millis: i64) -> Self {
        Self {
            definition: Some(NewCodeDefinition::Since { start_millis }),
        }
    }
}

impl NewCodeService for StaticNewCode {
    fn full_new_code_definition(&self, _scope_id: &str) -> Option<NewCodeDefinition> {
        self.definition
    }
}

pub struct StaticSeverityMode {
    mqr: bool,
}

impl StaticSeverityMode {
    pub fn standard() -> Self {
        Self { mqr: false }
    }

    pub fn mqr() -> Self {
        Self { mqr: true }
    }
}

impl SeverityModeService for StaticSeverityMode {
    fn is_mqr_mode(&self, _connection_id: &str) -> bool {
        self.mqr
    }
}

/// AI fix feature enabled for a fixed rule set, or absent entirely.
#[derive(Default)]
pub struct StaticAiCodeFix {
    feature: Option<AiFixFeature>,
}

impl StaticAiCodeFix {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn enabled_for(rules: impl IntoIterator<Item = String>) -> Self {
        Self {
            feature: Some(AiFixFeature {
                enabled_rules: rules.into_iter().collect(),
            }),
        }
    }
}

impl AiCodeFixService for StaticAiCodeFix {
    fn feature(&self, _binding: &Binding) -> Option<AiFixFeature> {
        self.feature.clone()
    }
}
