//! Placement constraints extracted from a deck specification.
//!
//! Each role constraint becomes one weighted `PlacementConstraint`. The
//! weights order how strongly a violation is penalized and which roles the
//! greedy pass places first.

use labdeck_core::spec::DeckSpec;

/// Priority weights per constraint kind. Fixed slots dominate; distance
/// preferences yield first.
pub const FIXED_PRIORITY: f64 = 1.0;
pub const ACCESSIBILITY_PRIORITY: f64 = 0.9;
pub const ADJACENT_PRIORITY: f64 = 0.8;
pub const ISOLATED_PRIORITY: f64 = 0.7;
pub const DISTANCE_PRIORITY: f64 = 0.6;

/// The constraint kinds the solver scores against.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Must land in exactly this slot.
    Fixed(u32),
    /// Should neighbor the named role.
    Adjacent(String),
    /// All neighboring slots should stay free.
    Isolated,
    /// Stay within this distance (mm) of every other placed role.
    Distance(f64),
    /// Must be reachable by the described pipettes.
    Accessibility(Vec<String>),
}

/// One weighted constraint attached to a role.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConstraint {
    pub role: String,
    pub kind: ConstraintKind,
    pub priority: f64,
}

/// Flatten every role's constraints into weighted entries.
pub fn extract_constraints(spec: &DeckSpec) -> Vec<PlacementConstraint> {
    let mut constraints = Vec::new();

    for (role_name, role) in &spec.roles {
        let Some(rc) = &role.constraints else { continue };

        if let Some(slot) = rc.fixed_slot {
            constraints.push(PlacementConstraint {
                role: role_name.clone(),
                kind: ConstraintKind::Fixed(slot),
                priority: FIXED_PRIORITY,
            });
        }
        if let Some(adjacent) = &rc.adjacent {
            for other in adjacent {
                constraints.push(PlacementConstraint {
                    role: role_name.clone(),
                    kind: ConstraintKind::Adjacent(other.clone()),
                    priority: ADJACENT_PRIORITY,
                });
            }
        }
        if rc.isolated == Some(true) {
            constraints.push(PlacementConstraint {
                role: role_name.clone(),
                kind: ConstraintKind::Isolated,
                priority: ISOLATED_PRIORITY,
            });
        }
        if let Some(max_distance) = rc.max_distance_mm {
            constraints.push(PlacementConstraint {
                role: role_name.clone(),
                kind: ConstraintKind::Distance(max_distance),
                priority: DISTANCE_PRIORITY,
            });
        }
        if let Some(accessible_by) = &rc.accessible_by {
            constraints.push(PlacementConstraint {
                role: role_name.clone(),
                kind: ConstraintKind::Accessibility(accessible_by.clone()),
                priority: ACCESSIBILITY_PRIORITY,
            });
        }
    }

    constraints
}

/// Total constraint priority for a role — how constrained it is overall.
pub fn role_priority(constraints: &[PlacementConstraint], role: &str) -> f64 {
    constraints
        .iter()
        .filter(|c| c.role == role)
        .map(|c| c.priority)
        .sum()
}
