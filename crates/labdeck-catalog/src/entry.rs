//! Catalog entry types for labware and modules.

use serde::{Deserialize, Serialize};

use labdeck_core::binding::LabwareDescriptor;
use labdeck_core::capability::{Capability, ModuleKind, TemperatureRange};
use labdeck_core::deck::Dimensions;

/// Well grid geometry for plate-like labware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellLayout {
    pub rows: u32,
    pub columns: u32,
    pub well_volume_ul: f64,
    pub well_shape: WellShape,
}

impl WellLayout {
    pub fn well_count(&self) -> u32 {
        self.rows * self.columns
    }

    /// Total liquid capacity across all wells, in µL.
    pub fn total_capacity_ul(&self) -> f64 {
        self.well_volume_ul * f64::from(self.well_count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellShape {
    Circular,
    Square,
    Rectangular,
}

/// A registered labware definition. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareEntry {
    pub id: String,
    pub display_name: String,
    pub manufacturer: String,
    pub capabilities: Vec<Capability>,
    pub dimensions: Dimensions,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub well_layout: Option<WellLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub compatible_modules: Vec<ModuleKind>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

impl LabwareEntry {
    /// Whether every capability in `required` is offered (value-aware).
    pub fn offers_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|r| r.satisfied_by_any(&self.capabilities))
    }

    /// Descriptor form carried on bindings.
    pub fn descriptor(&self) -> LabwareDescriptor {
        LabwareDescriptor {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            dimensions: self.dimensions,
            well_count: self.well_layout.as_ref().map(WellLayout::well_count),
            well_volume_ul: self.well_layout.as_ref().map(|w| w.well_volume_ul),
        }
    }
}

/// A registered module definition. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub id: String,
    pub kind: ModuleKind,
    pub display_name: String,
    pub manufacturer: String,
    pub capabilities: Vec<Capability>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature_range: Option<TemperatureRange>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shaking_speed_rpm: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub magnetic_strength_t: Option<f64>,
    pub slot_compatibility: Vec<u32>,
    /// Extra stack height the module adds under its labware, in mm.
    pub height_offset_mm: f64,
}

impl ModuleEntry {
    pub fn offers_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|r| r.satisfied_by_any(&self.capabilities))
    }
}
