//! Pipette assignment.
//!
//! Picks the best mounted pipette for a volume window and channel count,
//! preferring the requested mount, tighter volume coverage, and small
//! pipettes for small-volume work.

use labdeck_core::binding::PipetteAssignment;
use labdeck_core::capability::{Mount, VolumeRange};
use labdeck_core::spec::RuntimeContext;

const PREFERRED_MOUNT_BONUS: f64 = 50.0;
const VOLUME_TIGHTNESS_WEIGHT: f64 = 30.0;
const SMALL_PIPETTE_BONUS: f64 = 20.0;
const SMALL_VOLUME_CUTOFF_UL: f64 = 300.0;

/// Choose a pipette able to cover `volume` with the given channel count.
/// Returns `None` when no mounted pipette qualifies.
pub fn assign_pipette(
    runtime: &RuntimeContext,
    volume: VolumeRange,
    channels: u8,
    preferred_mount: Option<Mount>,
) -> Option<PipetteAssignment> {
    let mut best: Option<(&labdeck_core::spec::PipetteSpec, f64)> = None;

    for pipette in &runtime.available_pipettes {
        if pipette.channels != channels {
            continue;
        }
        if pipette.min_volume_ul > volume.min_ul || pipette.max_volume_ul < volume.max_ul {
            continue;
        }

        let mut score = 0.0;
        if preferred_mount == Some(pipette.mount) {
            score += PREFERRED_MOUNT_BONUS;
        }
        let span = pipette.max_volume_ul - pipette.min_volume_ul;
        if span > 0.0 {
            score += (volume.max_ul - volume.min_ul) / span * VOLUME_TIGHTNESS_WEIGHT;
        }
        if volume.max_ul <= SMALL_VOLUME_CUTOFF_UL && pipette.max_volume_ul <= SMALL_VOLUME_CUTOFF_UL
        {
            score += SMALL_PIPETTE_BONUS;
        }

        if best.is_none_or(|(_, s)| score > s) {
            best = Some((pipette, score));
        }
    }

    let (pipette, _) = best?;

    // Locate a tip rack on the deck sized for this pipette.
    let tip_rack_slot = runtime
        .existing_labware
        .iter()
        .find(|l| {
            l.labware_type.contains("tiprack")
                && l.labware_type.contains(&pipette.max_volume_ul.to_string())
        })
        .map(|l| l.slot);

    Some(PipetteAssignment {
        mount: pipette.mount,
        model: pipette.model.clone(),
        tip_rack_slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdeck_core::spec::{ExistingLabware, PipetteSpec};

    fn runtime(pipettes: Vec<PipetteSpec>) -> RuntimeContext {
        RuntimeContext {
            available_slots: (1..=11).collect(),
            installed_modules: vec![],
            available_pipettes: pipettes,
            existing_labware: vec![],
            occupied_slots: vec![],
        }
    }

    fn p300(mount: Mount) -> PipetteSpec {
        PipetteSpec {
            mount,
            model: "p300_single_gen2".into(),
            channels: 1,
            min_volume_ul: 20.0,
            max_volume_ul: 300.0,
        }
    }

    fn p1000(mount: Mount) -> PipetteSpec {
        PipetteSpec {
            mount,
            model: "p1000_single_gen2".into(),
            channels: 1,
            min_volume_ul: 100.0,
            max_volume_ul: 1000.0,
        }
    }

    #[test]
    fn smaller_pipette_wins_for_small_volumes() {
        let rt = runtime(vec![p1000(Mount::Right), p300(Mount::Left)]);
        let assigned =
            assign_pipette(&rt, VolumeRange::new(50.0, 200.0), 1, None).unwrap();
        assert_eq!(assigned.model, "p300_single_gen2");
    }

    #[test]
    fn preferred_mount_outweighs_tightness() {
        let rt = runtime(vec![p300(Mount::Left), p300(Mount::Right)]);
        let assigned =
            assign_pipette(&rt, VolumeRange::new(50.0, 200.0), 1, Some(Mount::Right)).unwrap();
        assert_eq!(assigned.mount, Mount::Right);
    }

    #[test]
    fn no_pipette_covers_the_window() {
        let rt = runtime(vec![p300(Mount::Left)]);
        assert!(assign_pipette(&rt, VolumeRange::new(10.0, 500.0), 1, None).is_none());
    }

    #[test]
    fn finds_matching_tip_rack_slot() {
        let mut rt = runtime(vec![p300(Mount::Left)]);
        rt.existing_labware = vec![ExistingLabware {
            slot: 9,
            labware_id: "tips".into(),
            labware_type: "opentrons_96_tiprack_300ul".into(),
            used_wells: vec![],
        }];
        let assigned =
            assign_pipette(&rt, VolumeRange::new(50.0, 200.0), 1, None).unwrap();
        assert_eq!(assigned.tip_rack_slot, Some(9));
    }
}
