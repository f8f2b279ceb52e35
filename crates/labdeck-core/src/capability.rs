//! Capability vocabulary.
//!
//! Capabilities are the only language through which roles, labware, modules,
//! and pipettes communicate compatibility: a role *requires* a set of
//! capabilities, a resource *offers* a set. A capability may carry a value
//! payload (a volume window, a shaking speed); value-aware matching requires
//! the offered payload to equal the required one.

use serde::{Deserialize, Serialize};

/// Closed set of capability tags understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    HoldLiquid,
    HoldSolid,
    TemperatureControl,
    Mixing,
    Heating,
    Cooling,
    Shaking,
    Magnetic,
    MultiChannelAccessible,
    SingleChannelAccessible,
    TipRack,
    Waste,
    ReagentReservoir,
    #[serde(rename = "96_well_compatible")]
    WellFormat96,
    #[serde(rename = "384_well_compatible")]
    WellFormat384,
    FilterTips,
    LargeVolume,
}

impl CapabilityKind {
    /// Capabilities whose absence is penalized most heavily during matching.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            CapabilityKind::TemperatureControl | CapabilityKind::Magnetic | CapabilityKind::TipRack
        )
    }

    /// Capabilities that only a deck module can provide.
    pub fn is_module_flavored(self) -> bool {
        matches!(
            self,
            CapabilityKind::TemperatureControl
                | CapabilityKind::Heating
                | CapabilityKind::Cooling
                | CapabilityKind::Shaking
                | CapabilityKind::Mixing
                | CapabilityKind::Magnetic
        )
    }
}

/// Optional payload attached to a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapabilityValue {
    /// A volume window in microliters.
    Volume(VolumeRange),
    /// A shaking/mixing speed in RPM.
    Speed { rpm: f64 },
}

/// A single required or offered capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(rename = "type")]
    pub kind: CapabilityKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<CapabilityValue>,
}

impl Capability {
    pub fn new(kind: CapabilityKind) -> Self {
        Self { kind, value: None }
    }

    pub fn with_value(kind: CapabilityKind, value: CapabilityValue) -> Self {
        Self {
            kind,
            value: Some(value),
        }
    }

    /// Whether `offered` satisfies this requirement. Kinds must match; when
    /// the requirement carries a value the offer must carry the same value.
    pub fn satisfied_by(&self, offered: &Capability) -> bool {
        self.kind == offered.kind
            && match &self.value {
                None => true,
                Some(required) => offered.value.as_ref() == Some(required),
            }
    }

    /// Whether any capability in `offers` satisfies this requirement.
    pub fn satisfied_by_any(&self, offers: &[Capability]) -> bool {
        offers.iter().any(|o| self.satisfied_by(o))
    }
}

/// Volume window in microliters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub min_ul: f64,
    pub max_ul: f64,
}

impl VolumeRange {
    pub fn new(min_ul: f64, max_ul: f64) -> Self {
        Self { min_ul, max_ul }
    }

    pub fn contains(&self, volume_ul: f64) -> bool {
        volume_ul >= self.min_ul && volume_ul <= self.max_ul
    }
}

/// Temperature window in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min_c: f64,
    pub max_c: f64,
}

impl TemperatureRange {
    pub fn new(min_c: f64, max_c: f64) -> Self {
        Self { min_c, max_c }
    }

    /// Whether this range fully covers `other`.
    pub fn covers(&self, other: &TemperatureRange) -> bool {
        self.min_c <= other.min_c && self.max_c >= other.max_c
    }
}

/// The module types the deck supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    TemperatureModuleGen1,
    TemperatureModuleGen2,
    MagneticModuleGen1,
    MagneticModuleGen2,
    HeaterShakerModule,
    ThermocyclerModule,
}

impl ModuleKind {
    /// The dedicated temperature modules. Heater-shakers and thermocyclers
    /// control temperature too but do not count for the airflow-interference
    /// check.
    pub fn is_temperature_module(self) -> bool {
        matches!(
            self,
            ModuleKind::TemperatureModuleGen1 | ModuleKind::TemperatureModuleGen2
        )
    }
}

/// Pipette mount side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mount {
    Left,
    Right,
}
