//! Candidate and solution scoring.

use labdeck_core::deck;
use labdeck_core::spec::{DeckSpec, OptimizationWeights, RoleSpec};

use crate::board::DeckBoard;
use crate::candidate::{PlacementCandidate, Solution};
use crate::constraint::{ConstraintKind, PlacementConstraint};

/// Scoring constants. Empirically tuned; changing them changes solver
/// behavior, so they stay as-is.
pub const CANDIDATE_BASE_SCORE: f64 = 100.0;
pub const FIXED_SLOT_PENALTY: f64 = 50.0;
pub const ADJACENCY_PENALTY: f64 = 30.0;
pub const ISOLATION_PENALTY: f64 = 20.0;
pub const DISTANCE_PENALTY: f64 = 25.0;
pub const ACCESSIBILITY_PENALTY: f64 = 40.0;
pub const VIOLATION_PENALTY: f64 = 5.0;
pub const PREFERRED_LABWARE_BONUS: f64 = 10.0;
/// Normalization span for movement efficiency — roughly the deck diagonal.
pub const MAX_TRAVEL_MM: f64 = 300.0;

/// Score a candidate against the role's constraints and the placements made
/// so far. Resets and refills the candidate's violation list, so repeated
/// evaluation (annealing swaps, genetic mutations) stays idempotent.
pub fn evaluate_candidate(
    candidate: &mut PlacementCandidate,
    role: &RoleSpec,
    constraints: &[PlacementConstraint],
    board: &DeckBoard,
    placements: &Solution,
) {
    let mut score = CANDIDATE_BASE_SCORE;
    let mut violations = std::mem::take(&mut candidate.violations);
    // Structural violations (recorded at candidate construction) survive;
    // constraint violations are recomputed from scratch.
    violations.retain(|v| v.starts_with("module required"));

    for constraint in constraints.iter().filter(|c| c.role == candidate.role) {
        match &constraint.kind {
            ConstraintKind::Fixed(slot) => {
                if candidate.slot != *slot {
                    score -= FIXED_SLOT_PENALTY * constraint.priority;
                    violations.push(format!("must be in slot {slot}"));
                }
            }
            ConstraintKind::Adjacent(other_role) => {
                if let Some(other) = placements.get(other_role) {
                    if !deck::adjacent_slots(candidate.slot).contains(&other.slot) {
                        score -= ADJACENCY_PENALTY * constraint.priority;
                        violations.push(format!("should be adjacent to {other_role}"));
                    }
                }
            }
            ConstraintKind::Isolated => {
                let has_neighbor = deck::adjacent_slots(candidate.slot).iter().any(|&n| {
                    board.is_occupied(n)
                        || placements
                            .values()
                            .any(|p| p.slot == n && p.role != candidate.role)
                });
                if has_neighbor {
                    score -= ISOLATION_PENALTY * constraint.priority;
                    violations.push("should be isolated".to_string());
                }
            }
            ConstraintKind::Distance(max_mm) => {
                for placement in placements.values() {
                    if placement.role == candidate.role {
                        continue;
                    }
                    let distance = deck::slot_distance_mm(candidate.slot, placement.slot)
                        .unwrap_or(f64::INFINITY);
                    if distance > *max_mm {
                        score -= DISTANCE_PENALTY * constraint.priority;
                        violations.push(format!("too far from {}", placement.role));
                    }
                }
            }
            ConstraintKind::Accessibility(descriptors) => {
                for descriptor in descriptors {
                    if descriptor.contains("left")
                        && !deck::reachable(labdeck_core::capability::Mount::Left, candidate.slot)
                    {
                        score -= ACCESSIBILITY_PENALTY * constraint.priority;
                        violations.push("not accessible by left pipette".to_string());
                    }
                    if descriptor.contains("right")
                        && !deck::reachable(labdeck_core::capability::Mount::Right, candidate.slot)
                    {
                        score -= ACCESSIBILITY_PENALTY * constraint.priority;
                        violations.push("not accessible by right pipette".to_string());
                    }
                }
            }
        }
    }

    // Isolation cuts both ways: landing next to an already-placed isolated
    // role violates that role's constraint.
    for constraint in constraints {
        if constraint.role == candidate.role || constraint.kind != ConstraintKind::Isolated {
            continue;
        }
        let crowds = placements
            .get(&constraint.role)
            .is_some_and(|p| deck::adjacent_slots(p.slot).contains(&candidate.slot));
        if crowds {
            score -= ISOLATION_PENALTY * constraint.priority;
            violations.push(format!("would crowd isolated {}", constraint.role));
        }
    }

    if role.prefers(&candidate.labware_id) {
        score += PREFERRED_LABWARE_BONUS;
    }
    score -= violations.len() as f64 * VIOLATION_PENALTY;

    candidate.violations = violations;
    candidate.score = score.max(0.0);
}

/// Total solution quality: per-candidate scores plus, when optimization
/// preferences exist, weighted movement-efficiency and slot-utilization
/// objectives.
pub fn evaluate_solution(
    solution: &mut Solution,
    spec: &DeckSpec,
    constraints: &[PlacementConstraint],
    board: &DeckBoard,
) -> f64 {
    let mut total = 0.0;
    let role_names: Vec<String> = solution.keys().cloned().collect();
    for role_name in &role_names {
        let Some(role) = spec.roles.get(role_name) else { continue };
        let Some(mut candidate) = solution.remove(role_name) else { continue };
        evaluate_candidate(&mut candidate, role, constraints, board, solution);
        total += candidate.score;
        solution.insert(role_name.clone(), candidate);
    }

    if let Some(optimization) = &spec.optimization {
        let weights = optimization.weights.unwrap_or_else(OptimizationWeights::default);
        let movement = movement_efficiency(solution) * weights.movement_distance;
        let utilization =
            solution.len() as f64 / f64::from(deck::SLOT_COUNT) * weights.resource_utilization;
        total += (movement + utilization) * 100.0;
    }

    total
}

/// 1 − (average pairwise slot distance / deck span); 1.0 for fewer than two
/// placements.
pub fn movement_efficiency(solution: &Solution) -> f64 {
    let slots: Vec<u32> = solution.values().map(|p| p.slot).collect();
    let mut total = 0.0;
    let mut pairs = 0u32;
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            total += deck::slot_distance_mm(slots[i], slots[j]).unwrap_or(0.0);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 1.0;
    }
    1.0 - (total / f64::from(pairs)) / MAX_TRAVEL_MM
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use labdeck_core::capability::{Capability, CapabilityKind};
    use labdeck_core::spec::{ProtocolInfo, RoleConstraints};

    use crate::constraint::extract_constraints;

    fn role(constraints: Option<RoleConstraints>) -> RoleSpec {
        RoleSpec {
            description: "role".into(),
            capabilities: vec![Capability::new(CapabilityKind::HoldLiquid)],
            constraints,
            preferred_labware: None,
            volume: None,
            temperature: None,
        }
    }

    fn spec(roles: Vec<(&str, RoleSpec)>) -> DeckSpec {
        DeckSpec {
            version: Some("1.0".into()),
            protocol: ProtocolInfo {
                name: "test".into(),
                author: None,
                description: None,
            },
            roles: roles
                .into_iter()
                .map(|(name, role)| (name.to_string(), role))
                .collect(),
            template: None,
            optimization: None,
        }
    }

    #[test]
    fn fixed_slot_mismatch_penalized() {
        let spec = spec(vec![(
            "samples",
            role(Some(RoleConstraints {
                fixed_slot: Some(3),
                ..Default::default()
            })),
        )]);
        let constraints = extract_constraints(&spec);
        let board = DeckBoard::from_runtime(None);

        let mut on_target = PlacementCandidate::new("samples", 3, "plate");
        evaluate_candidate(
            &mut on_target,
            &spec.roles["samples"],
            &constraints,
            &board,
            &BTreeMap::new(),
        );
        // Base score, no violations.
        assert_eq!(on_target.score, 100.0);

        let mut off_target = PlacementCandidate::new("samples", 5, "plate");
        evaluate_candidate(
            &mut off_target,
            &spec.roles["samples"],
            &constraints,
            &board,
            &BTreeMap::new(),
        );
        // −50 × 1.0 priority, −5 for the violation string.
        assert_eq!(off_target.score, 45.0);
        assert_eq!(off_target.violations, ["must be in slot 3"]);
    }

    #[test]
    fn isolation_sees_other_placements() {
        let spec = spec(vec![(
            "waste",
            role(Some(RoleConstraints {
                isolated: Some(true),
                ..Default::default()
            })),
        )]);
        let constraints = extract_constraints(&spec);
        let board = DeckBoard::from_runtime(None);

        let mut placements: Solution = BTreeMap::new();
        placements.insert(
            "samples".to_string(),
            PlacementCandidate::new("samples", 2, "plate"),
        );

        // Slot 1 neighbors slot 2, so isolation is violated.
        let mut crowded = PlacementCandidate::new("waste", 1, "reservoir");
        evaluate_candidate(&mut crowded, &spec.roles["waste"], &constraints, &board, &placements);
        assert!(crowded.violations.iter().any(|v| v.contains("isolated")));

        // Slot 9 neighbors 6 and 8, both free.
        let mut isolated = PlacementCandidate::new("waste", 9, "reservoir");
        evaluate_candidate(&mut isolated, &spec.roles["waste"], &constraints, &board, &placements);
        assert!(isolated.violations.is_empty());
        assert!(isolated.score > crowded.score);
    }

    #[test]
    fn crowding_an_isolated_role_is_penalized() {
        let spec = spec(vec![
            (
                "waste",
                role(Some(RoleConstraints {
                    isolated: Some(true),
                    ..Default::default()
                })),
            ),
            ("reagents", role(None)),
        ]);
        let constraints = extract_constraints(&spec);
        let board = DeckBoard::from_runtime(None);

        let mut placements: Solution = BTreeMap::new();
        placements.insert(
            "waste".to_string(),
            PlacementCandidate::new("waste", 1, "reservoir"),
        );

        // Slot 2 neighbors the isolated waste in slot 1.
        let mut crowding = PlacementCandidate::new("reagents", 2, "trough");
        evaluate_candidate(
            &mut crowding,
            &spec.roles["reagents"],
            &constraints,
            &board,
            &placements,
        );
        assert!(crowding.violations.iter().any(|v| v.contains("isolated waste")));

        let mut clear = PlacementCandidate::new("reagents", 3, "trough");
        evaluate_candidate(
            &mut clear,
            &spec.roles["reagents"],
            &constraints,
            &board,
            &placements,
        );
        assert!(clear.violations.is_empty());
        assert!(clear.score > crowding.score);
    }

    #[test]
    fn repeated_evaluation_is_idempotent() {
        let spec = spec(vec![(
            "samples",
            role(Some(RoleConstraints {
                fixed_slot: Some(3),
                ..Default::default()
            })),
        )]);
        let constraints = extract_constraints(&spec);
        let board = DeckBoard::from_runtime(None);

        let mut candidate = PlacementCandidate::new("samples", 5, "plate");
        for _ in 0..3 {
            evaluate_candidate(
                &mut candidate,
                &spec.roles["samples"],
                &constraints,
                &board,
                &BTreeMap::new(),
            );
        }
        assert_eq!(candidate.violations.len(), 1);
        assert_eq!(candidate.score, 45.0);
    }

    #[test]
    fn preferred_labware_bonus_applies() {
        let mut r = role(None);
        r.preferred_labware = Some(vec!["special_plate".into()]);
        let spec = spec(vec![("samples", r)]);
        let constraints = extract_constraints(&spec);
        let board = DeckBoard::from_runtime(None);

        let mut preferred = PlacementCandidate::new("samples", 1, "special_plate");
        evaluate_candidate(
            &mut preferred,
            &spec.roles["samples"],
            &constraints,
            &board,
            &BTreeMap::new(),
        );
        assert_eq!(preferred.score, 110.0);
    }

    #[test]
    fn movement_efficiency_bounds() {
        let mut solution: Solution = BTreeMap::new();
        assert_eq!(movement_efficiency(&solution), 1.0);

        solution.insert("a".into(), PlacementCandidate::new("a", 1, "x"));
        solution.insert("b".into(), PlacementCandidate::new("b", 2, "x"));
        let near = movement_efficiency(&solution);

        solution.get_mut("b").unwrap().slot = 9;
        let far = movement_efficiency(&solution);
        assert!(near > far);
    }
}
