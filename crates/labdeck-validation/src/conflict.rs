//! Aggregate risk and per-slot conflict zones.

use std::collections::BTreeMap;

use labdeck_core::binding::{BindingMap, CollisionRisk, ConflictZone};
use labdeck_core::finding::{Severity, ValidationFinding};

/// Aggregate risk over a finding set: any error → high, more than two
/// warnings → medium, otherwise low.
pub fn overall_risk(findings: &[ValidationFinding]) -> CollisionRisk {
    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .count();

    if errors > 0 {
        CollisionRisk::High
    } else if warnings > 2 {
        CollisionRisk::Medium
    } else {
        CollisionRisk::Low
    }
}

/// Group findings by the slot of each affected role's binding, one zone per
/// slot with outstanding issues.
pub fn conflict_zones(findings: &[ValidationFinding], binding_map: &BindingMap) -> Vec<ConflictZone> {
    let mut per_slot: BTreeMap<u32, Vec<&ValidationFinding>> = BTreeMap::new();

    for finding in findings {
        for role in &finding.affected_roles {
            if let Some(binding) = binding_map.bindings.get(role) {
                per_slot.entry(binding.slot).or_default().push(finding);
            }
        }
    }

    per_slot
        .into_iter()
        .map(|(slot, issues)| {
            let severity = if issues.iter().any(|f| f.severity == Severity::Error) {
                Severity::Error
            } else {
                Severity::Warning
            };
            let mut kinds: Vec<String> = issues.iter().map(|f| format!("{:?}", f.kind)).collect();
            kinds.sort();
            kinds.dedup();
            ConflictZone {
                slots: vec![slot],
                kind: issues[0].kind,
                severity,
                description: format!("{} issue(s): {}", issues.len(), kinds.join(", ")),
            }
        })
        .collect()
}
