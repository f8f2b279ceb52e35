//! Hard-coded legacy labware id mappings.
//!
//! Ids that predate the catalog are translated to capability sets so a
//! best-effort modern equivalent can be found, plus a role-name suggestion
//! for migration reports.

use labdeck_core::capability::CapabilityKind;

/// Migration data for one legacy labware id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyLabware {
    pub display_name: &'static str,
    pub default_capabilities: &'static [CapabilityKind],
    pub suggested_role: &'static str,
}

/// Known legacy id → modern mapping. Anything not listed resolves to a
/// synthetic placeholder.
pub fn lookup(labware_id: &str) -> Option<LegacyLabware> {
    let entry = match labware_id {
        "plate_96" => LegacyLabware {
            display_name: "Generic 96-well Plate",
            default_capabilities: &[CapabilityKind::HoldLiquid, CapabilityKind::WellFormat96],
            suggested_role: "sample_plate",
        },
        "tips_300ul" => LegacyLabware {
            display_name: "300µL Tips",
            default_capabilities: &[CapabilityKind::TipRack],
            suggested_role: "tips_p300",
        },
        "reservoir_12" => LegacyLabware {
            display_name: "12-well Reservoir",
            default_capabilities: &[
                CapabilityKind::ReagentReservoir,
                CapabilityKind::LargeVolume,
            ],
            suggested_role: "reagent_source",
        },
        "waste_container" => LegacyLabware {
            display_name: "Waste Container",
            default_capabilities: &[CapabilityKind::Waste, CapabilityKind::LargeVolume],
            suggested_role: "liquid_waste",
        },
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_map_and_unknown_ids_do_not() {
        assert_eq!(lookup("plate_96").unwrap().suggested_role, "sample_plate");
        assert_eq!(lookup("waste_container").unwrap().suggested_role, "liquid_waste");
        assert!(lookup("mystery_labware").is_none());
    }
}
