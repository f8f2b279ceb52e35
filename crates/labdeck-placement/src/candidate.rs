//! Scored placement candidates.

use std::collections::BTreeMap;

/// A solved placement is one candidate per successfully placed role, keyed
/// by role name. Ordered so solver output iterates deterministically.
pub type Solution = BTreeMap<String, PlacementCandidate>;

/// One proposed slot + labware assignment for a role, with its constraint
/// score and any violation descriptions recorded during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementCandidate {
    pub role: String,
    pub slot: u32,
    pub labware_id: String,
    pub module_id: Option<String>,
    pub score: f64,
    pub violations: Vec<String>,
}

impl PlacementCandidate {
    pub fn new(role: impl Into<String>, slot: u32, labware_id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            slot,
            labware_id: labware_id.into(),
            module_id: None,
            score: 0.0,
            violations: Vec::new(),
        }
    }
}
