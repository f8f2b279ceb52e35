//! Resource-requirement derivation.
//!
//! Each capability kind maps to the resource categories that can provide it
//! through a fixed table. A role's capability list plus its explicit
//! constraints collapse into one [`ResourceRequirement`] describing what the
//! candidate enumeration must look for.

use labdeck_core::capability::{CapabilityKind, CapabilityValue, ModuleKind, Mount, VolumeRange};
use labdeck_core::spec::RoleSpec;

/// Resource categories a capability can be provided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    Labware,
    Module,
    Pipette,
}

/// Fixed capability → provider-category table.
pub fn categories_for(kind: CapabilityKind) -> &'static [ResourceCategory] {
    use CapabilityKind::*;
    use ResourceCategory::*;
    match kind {
        HoldLiquid | HoldSolid | TipRack | Waste | ReagentReservoir | WellFormat96
        | WellFormat384 | FilterTips | LargeVolume => &[Labware],
        TemperatureControl | Heating | Cooling | Shaking | Magnetic => &[Module],
        Mixing => &[Module, Pipette],
        MultiChannelAccessible | SingleChannelAccessible => &[Labware, Pipette],
    }
}

/// What the labware candidate search must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabwareRequirement {
    pub required: bool,
    /// Concrete labware ids seeded by capability kinds and preferences.
    pub options: Vec<String>,
    pub volume: Option<VolumeRange>,
}

/// What the module candidate search must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleRequirement {
    pub required: bool,
    pub kind: Option<ModuleKind>,
    pub temperature_setpoint_c: Option<f64>,
    pub shaking_speed_rpm: Option<f64>,
}

/// What the pipette candidate search must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipetteRequirement {
    pub required: bool,
    pub channels: Option<u8>,
    pub mount: Option<Mount>,
    pub volume: Option<VolumeRange>,
}

/// Derived resource needs for one role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequirement {
    pub labware: LabwareRequirement,
    pub module: ModuleRequirement,
    pub pipette: PipetteRequirement,
}

impl ResourceRequirement {
    /// Analyze a role's capabilities and constraints.
    pub fn for_role(role: &RoleSpec) -> Self {
        let mut req = Self::default();
        req.labware.volume = role.volume;

        for capability in &role.capabilities {
            for category in categories_for(capability.kind) {
                match category {
                    ResourceCategory::Labware => {
                        req.labware.required = true;
                        req.seed_labware_options(capability.kind, capability.value.as_ref());
                    }
                    ResourceCategory::Module => {
                        req.module.required = true;
                        req.seed_module_kind(capability.kind, capability.value.as_ref());
                    }
                    ResourceCategory::Pipette => {
                        req.pipette.required = true;
                        req.seed_pipette(capability.kind);
                    }
                }
            }
        }

        if let Some(constraints) = &role.constraints {
            if let Some(temperature) = &constraints.temperature {
                req.module.required = true;
                req.module.temperature_setpoint_c = Some(temperature.min_c);
            }
            if let Some(accessible_by) = &constraints.accessible_by {
                req.pipette.required = true;
                for descriptor in accessible_by {
                    if descriptor.contains("multi") {
                        req.pipette.channels = Some(8);
                    } else if descriptor.contains("single") {
                        req.pipette.channels = Some(1);
                    }
                    if descriptor.contains("left") {
                        req.pipette.mount = Some(Mount::Left);
                    } else if descriptor.contains("right") {
                        req.pipette.mount = Some(Mount::Right);
                    }
                }
            }
        }

        if let Some(preferred) = &role.preferred_labware {
            req.labware.options.extend(preferred.iter().cloned());
        }

        req
    }

    fn seed_labware_options(&mut self, kind: CapabilityKind, value: Option<&CapabilityValue>) {
        let ids: &[&str] = match kind {
            CapabilityKind::WellFormat96 => &[
                "corning_96_wellplate_360ul_flat",
                "biorad_96_wellplate_200ul_pcr",
            ],
            CapabilityKind::WellFormat384 => &["corning_384_wellplate_112ul_flat"],
            CapabilityKind::TipRack => &[
                "opentrons_96_tiprack_300ul",
                "opentrons_96_tiprack_1000ul",
                "opentrons_96_filtertiprack_200ul",
            ],
            CapabilityKind::FilterTips => &["opentrons_96_filtertiprack_200ul"],
            CapabilityKind::Waste => &["nest_1_reservoir_195ml"],
            CapabilityKind::ReagentReservoir => {
                &["nest_12_reservoir_15ml", "nest_1_reservoir_195ml"]
            }
            CapabilityKind::LargeVolume => {
                self.labware.volume = Some(match value {
                    Some(CapabilityValue::Volume(range)) => *range,
                    _ => VolumeRange::new(15_000.0, 195_000.0),
                });
                &[]
            }
            _ => &[],
        };
        self.labware.options.extend(ids.iter().map(|s| s.to_string()));
    }

    fn seed_module_kind(&mut self, kind: CapabilityKind, value: Option<&CapabilityValue>) {
        match kind {
            CapabilityKind::TemperatureControl => {
                self.module.kind = Some(ModuleKind::TemperatureModuleGen2);
            }
            CapabilityKind::Heating => {
                if self.module.kind.is_none() {
                    self.module.kind = Some(ModuleKind::HeaterShakerModule);
                }
            }
            CapabilityKind::Cooling => {
                if self.module.kind.is_none() {
                    self.module.kind = Some(ModuleKind::TemperatureModuleGen2);
                }
            }
            CapabilityKind::Shaking | CapabilityKind::Mixing => {
                self.module.kind = Some(ModuleKind::HeaterShakerModule);
                if let Some(CapabilityValue::Speed { rpm }) = value {
                    self.module.shaking_speed_rpm = Some(*rpm);
                }
            }
            CapabilityKind::Magnetic => {
                self.module.kind = Some(ModuleKind::MagneticModuleGen2);
            }
            _ => {}
        }
    }

    fn seed_pipette(&mut self, kind: CapabilityKind) {
        match kind {
            CapabilityKind::MultiChannelAccessible => self.pipette.channels = Some(8),
            CapabilityKind::SingleChannelAccessible => {
                if self.pipette.channels.is_none() {
                    self.pipette.channels = Some(1);
                }
            }
            CapabilityKind::Mixing => self.pipette.required = true,
            _ => {}
        }
    }
}
