//! Severity-tagged validation findings.

use serde::{Deserialize, Serialize};

/// Which validation check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Collision,
    Accessibility,
    Volume,
    Temperature,
    Contamination,
    Capacity,
    Compatibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One diagnostic produced by a validation pass. Findings are reported,
/// never thrown — even error severity does not abort planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub kind: ValidationKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub affected_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggested_fix: Option<String>,
}

impl ValidationFinding {
    pub fn error(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            affected_roles: Vec::new(),
            suggested_fix: None,
        }
    }

    pub fn warning(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            affected_roles: Vec::new(),
            suggested_fix: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_error_highest() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn builder_attaches_roles_and_fix() {
        let finding = ValidationFinding::warning(ValidationKind::Contamination, "too close")
            .with_roles(["waste", "samples"])
            .with_fix("increase separation");
        assert_eq!(finding.affected_roles, ["waste", "samples"]);
        assert!(finding.suggested_fix.is_some());
    }
}
