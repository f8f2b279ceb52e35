//! Greedy placement: most-constrained roles first, best candidate wins.

use tracing::{debug, warn};

use labdeck_catalog::ResourceCatalog;
use labdeck_core::spec::{DeckSpec, RoleSpec};

use crate::board::DeckBoard;
use crate::candidate::{PlacementCandidate, Solution};
use crate::constraint::{PlacementConstraint, role_priority};
use crate::score::evaluate_candidate;

/// Deterministic greedy pass. Roles are placed in descending total
/// constraint priority (name order breaks ties); each placement commits its
/// slot before the next role is considered.
pub fn solve_greedy(
    spec: &DeckSpec,
    catalog: &ResourceCatalog,
    constraints: &[PlacementConstraint],
    board: &mut DeckBoard,
) -> Solution {
    let mut roles: Vec<(&String, &RoleSpec)> = spec.roles.iter().collect();
    roles.sort_by(|a, b| {
        role_priority(constraints, b.0)
            .total_cmp(&role_priority(constraints, a.0))
            .then_with(|| a.0.cmp(b.0))
    });

    let mut placements = Solution::new();
    for (role_name, role) in roles {
        match find_best_placement(role_name, role, catalog, constraints, board, &placements) {
            Some(candidate) => {
                debug!(
                    role = %role_name,
                    slot = candidate.slot,
                    labware = %candidate.labware_id,
                    score = candidate.score,
                    "role placed"
                );
                board.occupy(&candidate);
                placements.insert(role_name.clone(), candidate);
            }
            None => {
                warn!(role = %role_name, "no suitable labware found for role");
            }
        }
    }

    placements
}

/// Evaluate every free slot × capability-compatible labware combination and
/// return the highest-scoring candidate. `None` when no labware offers the
/// role's capabilities.
fn find_best_placement(
    role_name: &str,
    role: &RoleSpec,
    catalog: &ResourceCatalog,
    constraints: &[PlacementConstraint],
    board: &DeckBoard,
    placements: &Solution,
) -> Option<PlacementCandidate> {
    let suitable = catalog.find_labware_by_capabilities(&role.capabilities);
    if suitable.is_empty() {
        return None;
    }

    let needs_module = role.capabilities.iter().any(|c| c.kind.is_module_flavored());

    let mut best: Option<PlacementCandidate> = None;
    for slot in board.free_slots() {
        for labware in &suitable {
            let mut candidate = PlacementCandidate::new(role_name, slot, labware.id.clone());

            if needs_module {
                match board.slot(slot).and_then(|s| s.module.as_ref()) {
                    Some(module) => candidate.module_id = Some(module.id.clone()),
                    None => candidate
                        .violations
                        .push(format!("module required but not available in slot {slot}")),
                }
            }

            evaluate_candidate(&mut candidate, role, constraints, board, placements);

            // Strict comparison keeps the first candidate on ties, so
            // enumeration order decides.
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
    }

    best
}
