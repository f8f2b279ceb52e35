//! Per-solve deck state.
//!
//! A `DeckBoard` tracks slot occupancy for one solver invocation, seeded
//! from the runtime snapshot (pre-occupied slots, installed modules,
//! existing labware) and updated as the greedy pass commits placements.

use labdeck_core::deck::SLOT_COUNT;
use labdeck_core::spec::{InstalledModule, RuntimeContext};

use crate::candidate::PlacementCandidate;

/// State of a single deck slot during solving.
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    pub occupied: bool,
    pub module: Option<InstalledModule>,
    pub labware_id: Option<String>,
    pub assigned_role: Option<String>,
}

/// Occupancy board for the 11-slot deck.
#[derive(Debug, Clone)]
pub struct DeckBoard {
    slots: Vec<SlotState>,
}

impl DeckBoard {
    /// A board seeded from the runtime snapshot. Slots listed as occupied,
    /// holding a module, or holding labware start out marked accordingly.
    pub fn from_runtime(runtime: Option<&RuntimeContext>) -> Self {
        let mut slots = vec![SlotState::default(); SLOT_COUNT as usize];

        if let Some(runtime) = runtime {
            for (index, state) in slots.iter_mut().enumerate() {
                let slot = index as u32 + 1;
                if runtime.occupied_slots.contains(&slot) {
                    state.occupied = true;
                }
                if let Some(module) = runtime.module_in_slot(slot) {
                    state.module = Some(module.clone());
                }
                if let Some(labware) = runtime.labware_in_slot(slot) {
                    state.labware_id = Some(labware.labware_id.clone());
                    state.occupied = true;
                }
            }
        }

        Self { slots }
    }

    pub fn slot(&self, slot: u32) -> Option<&SlotState> {
        self.slots.get(slot as usize - 1)
    }

    pub fn is_occupied(&self, slot: u32) -> bool {
        self.slot(slot).is_some_and(|s| s.occupied)
    }

    /// Slot numbers currently free for placement.
    pub fn free_slots(&self) -> Vec<u32> {
        (1..=SLOT_COUNT).filter(|&s| !self.is_occupied(s)).collect()
    }

    /// Slots that are free, or already assigned to `role` (so a mutation can
    /// keep a role in place).
    pub fn free_or_own_slots(&self, role: &str) -> Vec<u32> {
        (1..=SLOT_COUNT)
            .filter(|&s| {
                let state = &self.slots[s as usize - 1];
                !state.occupied || state.assigned_role.as_deref() == Some(role)
            })
            .collect()
    }

    /// Commit a candidate: mark its slot occupied and record the assignment.
    pub fn occupy(&mut self, candidate: &PlacementCandidate) {
        if let Some(state) = self.slots.get_mut(candidate.slot as usize - 1) {
            state.occupied = true;
            state.assigned_role = Some(candidate.role.clone());
            state.labware_id = Some(candidate.labware_id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdeck_core::capability::{Capability, CapabilityKind, ModuleKind};

    #[test]
    fn empty_board_has_all_slots_free() {
        let board = DeckBoard::from_runtime(None);
        assert_eq!(board.free_slots().len(), SLOT_COUNT as usize);
    }

    #[test]
    fn runtime_seeds_occupancy_and_modules() {
        let runtime = RuntimeContext {
            available_slots: (1..=11).collect(),
            installed_modules: vec![InstalledModule {
                slot: 4,
                kind: ModuleKind::TemperatureModuleGen2,
                id: "temperature_module_gen2".into(),
                capabilities: vec![Capability::new(CapabilityKind::TemperatureControl)],
            }],
            available_pipettes: vec![],
            existing_labware: vec![],
            occupied_slots: vec![2, 7],
        };
        let board = DeckBoard::from_runtime(Some(&runtime));

        assert!(board.is_occupied(2));
        assert!(board.is_occupied(7));
        // A module alone does not occupy the slot; labware still goes on top.
        assert!(!board.is_occupied(4));
        assert!(board.slot(4).unwrap().module.is_some());
        assert_eq!(board.free_slots().len(), 9);
    }

    #[test]
    fn occupy_tracks_the_assigned_role() {
        let mut board = DeckBoard::from_runtime(None);
        let candidate = PlacementCandidate::new("tips", 5, "opentrons_96_tiprack_300ul");
        board.occupy(&candidate);

        assert!(board.is_occupied(5));
        assert!(board.free_or_own_slots("tips").contains(&5));
        assert!(!board.free_or_own_slots("other").contains(&5));
    }
}
