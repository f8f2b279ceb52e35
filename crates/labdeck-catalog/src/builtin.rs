//! Built-in labware and module definitions.
//!
//! The fixed set registered at catalog construction. Dimensions, well
//! layouts, and compatibility lists mirror the manufacturers' published
//! specifications for the reference deck.

use labdeck_core::capability::{Capability, CapabilityKind, ModuleKind, TemperatureRange};
use labdeck_core::deck::Dimensions;

use crate::entry::{LabwareEntry, ModuleEntry, WellLayout, WellShape};

fn caps(kinds: &[CapabilityKind]) -> Vec<Capability> {
    kinds.iter().copied().map(Capability::new).collect()
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn labware() -> Vec<LabwareEntry> {
    vec![
        LabwareEntry {
            id: "corning_96_wellplate_360ul_flat".into(),
            display_name: "Corning 96 Well Plate 360 µL Flat".into(),
            manufacturer: "Corning".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::WellFormat96,
                CapabilityKind::MultiChannelAccessible,
                CapabilityKind::SingleChannelAccessible,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 14.22),
            well_layout: Some(WellLayout {
                rows: 8,
                columns: 12,
                well_volume_ul: 360.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![
                ModuleKind::TemperatureModuleGen1,
                ModuleKind::TemperatureModuleGen2,
                ModuleKind::HeaterShakerModule,
                ModuleKind::MagneticModuleGen1,
                ModuleKind::MagneticModuleGen2,
            ],
            tags: tags(&["plate", "96-well", "standard"]),
        },
        LabwareEntry {
            id: "biorad_96_wellplate_200ul_pcr".into(),
            display_name: "Bio-Rad 96 Well Plate 200 µL PCR".into(),
            manufacturer: "Bio-Rad".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::WellFormat96,
                CapabilityKind::MultiChannelAccessible,
                CapabilityKind::SingleChannelAccessible,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 16.06),
            well_layout: Some(WellLayout {
                rows: 8,
                columns: 12,
                well_volume_ul: 200.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![
                ModuleKind::TemperatureModuleGen1,
                ModuleKind::TemperatureModuleGen2,
                ModuleKind::ThermocyclerModule,
            ],
            tags: tags(&["plate", "96-well", "PCR"]),
        },
        LabwareEntry {
            id: "corning_384_wellplate_112ul_flat".into(),
            display_name: "Corning 384 Well Plate 112 µL Flat".into(),
            manufacturer: "Corning".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::WellFormat384,
                CapabilityKind::SingleChannelAccessible,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 14.5),
            well_layout: Some(WellLayout {
                rows: 16,
                columns: 24,
                well_volume_ul: 112.0,
                well_shape: WellShape::Square,
            }),
            compatible_modules: vec![ModuleKind::TemperatureModuleGen2],
            tags: tags(&["plate", "384-well", "high-throughput"]),
        },
        LabwareEntry {
            id: "nest_12_reservoir_15ml".into(),
            display_name: "NEST 12 Well Reservoir 15 mL".into(),
            manufacturer: "NEST".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::LargeVolume,
                CapabilityKind::ReagentReservoir,
                CapabilityKind::MultiChannelAccessible,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 31.4),
            well_layout: Some(WellLayout {
                rows: 1,
                columns: 12,
                well_volume_ul: 15_000.0,
                well_shape: WellShape::Rectangular,
            }),
            compatible_modules: vec![],
            tags: tags(&["reservoir", "reagent", "large-volume"]),
        },
        LabwareEntry {
            id: "nest_1_reservoir_195ml".into(),
            display_name: "NEST 1 Well Reservoir 195 mL".into(),
            manufacturer: "NEST".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::LargeVolume,
                CapabilityKind::Waste,
                CapabilityKind::ReagentReservoir,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 40.0),
            well_layout: Some(WellLayout {
                rows: 1,
                columns: 1,
                well_volume_ul: 195_000.0,
                well_shape: WellShape::Rectangular,
            }),
            compatible_modules: vec![],
            tags: tags(&["reservoir", "waste", "large-volume"]),
        },
        LabwareEntry {
            id: "opentrons_96_tiprack_300ul".into(),
            display_name: "Opentrons 96 Tip Rack 300 µL".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[CapabilityKind::TipRack]),
            dimensions: Dimensions::new(127.76, 85.48, 64.69),
            well_layout: Some(WellLayout {
                rows: 8,
                columns: 12,
                well_volume_ul: 300.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![],
            tags: tags(&["tiprack", "300ul", "standard"]),
        },
        LabwareEntry {
            id: "opentrons_96_filtertiprack_200ul".into(),
            display_name: "Opentrons 96 Filter Tip Rack 200 µL".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[CapabilityKind::TipRack, CapabilityKind::FilterTips]),
            dimensions: Dimensions::new(127.76, 85.48, 64.69),
            well_layout: Some(WellLayout {
                rows: 8,
                columns: 12,
                well_volume_ul: 200.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![],
            tags: tags(&["tiprack", "200ul", "filter"]),
        },
        LabwareEntry {
            id: "opentrons_96_tiprack_1000ul".into(),
            display_name: "Opentrons 96 Tip Rack 1000 µL".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[CapabilityKind::TipRack]),
            dimensions: Dimensions::new(127.76, 85.48, 85.47),
            well_layout: Some(WellLayout {
                rows: 8,
                columns: 12,
                well_volume_ul: 1000.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![],
            tags: tags(&["tiprack", "1000ul", "standard"]),
        },
        LabwareEntry {
            id: "opentrons_24_tuberack_eppendorf_1.5ml".into(),
            display_name: "Opentrons 24 Tube Rack with Eppendorf 1.5 mL".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[
                CapabilityKind::HoldLiquid,
                CapabilityKind::SingleChannelAccessible,
            ]),
            dimensions: Dimensions::new(127.76, 85.48, 42.6),
            well_layout: Some(WellLayout {
                rows: 4,
                columns: 6,
                well_volume_ul: 1500.0,
                well_shape: WellShape::Circular,
            }),
            compatible_modules: vec![
                ModuleKind::TemperatureModuleGen1,
                ModuleKind::TemperatureModuleGen2,
            ],
            tags: tags(&["tuberack", "eppendorf", "1.5ml"]),
        },
    ]
}

pub(crate) fn modules() -> Vec<ModuleEntry> {
    vec![
        ModuleEntry {
            id: "temperature_module_gen2".into(),
            kind: ModuleKind::TemperatureModuleGen2,
            display_name: "Temperature Module GEN2".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[
                CapabilityKind::TemperatureControl,
                CapabilityKind::Cooling,
                CapabilityKind::Heating,
            ]),
            temperature_range: Some(TemperatureRange::new(4.0, 95.0)),
            shaking_speed_rpm: None,
            magnetic_strength_t: None,
            slot_compatibility: (1..=11).collect(),
            height_offset_mm: 70.0,
        },
        ModuleEntry {
            id: "magnetic_module_gen2".into(),
            kind: ModuleKind::MagneticModuleGen2,
            display_name: "Magnetic Module GEN2".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[CapabilityKind::Magnetic]),
            temperature_range: None,
            shaking_speed_rpm: None,
            magnetic_strength_t: Some(1.8),
            slot_compatibility: (1..=11).collect(),
            height_offset_mm: 35.0,
        },
        ModuleEntry {
            id: "heater_shaker_module".into(),
            kind: ModuleKind::HeaterShakerModule,
            display_name: "Heater-Shaker Module".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[
                CapabilityKind::Heating,
                CapabilityKind::Shaking,
                CapabilityKind::Mixing,
                CapabilityKind::TemperatureControl,
            ]),
            temperature_range: Some(TemperatureRange::new(20.0, 95.0)),
            shaking_speed_rpm: Some((200.0, 3000.0)),
            magnetic_strength_t: None,
            slot_compatibility: (1..=11).collect(),
            height_offset_mm: 70.0,
        },
        ModuleEntry {
            id: "thermocycler_module".into(),
            kind: ModuleKind::ThermocyclerModule,
            display_name: "Thermocycler Module".into(),
            manufacturer: "Opentrons".into(),
            capabilities: caps(&[
                CapabilityKind::TemperatureControl,
                CapabilityKind::Heating,
                CapabilityKind::Cooling,
            ]),
            temperature_range: Some(TemperatureRange::new(4.0, 99.0)),
            shaking_speed_rpm: None,
            magnetic_strength_t: None,
            // Spans multiple positions; only these anchor slots are legal.
            slot_compatibility: vec![7, 8, 10, 11],
            // Carries its own lid, no extra stack offset.
            height_offset_mm: 0.0,
        },
    ]
}
