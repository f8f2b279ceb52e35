//! Deck specifications and runtime deck state.
//!
//! A `DeckSpec` is the caller's declarative input: named roles with required
//! capabilities and optional constraints, plus optimization preferences. A
//! `RuntimeContext` is a point-in-time snapshot of the physical deck. Both
//! are immutable during a single planning call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, ModuleKind, Mount, TemperatureRange, VolumeRange};

// ── Deck specification ─────────────────────────────────────────────

/// Declarative deck specification: protocol metadata plus an ordered
/// role-name → role mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSpec {
    pub version: Option<String>,
    pub protocol: ProtocolInfo,
    /// Ordered so planning iterates roles deterministically.
    pub roles: BTreeMap<String, RoleSpec>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub template: Option<ProtocolTemplate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub optimization: Option<OptimizationConfig>,
}

/// Protocol metadata carried on the spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// Pre-configured protocol families a spec may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolTemplate {
    #[serde(rename = "PCR")]
    Pcr,
    NgsPrep,
    #[serde(rename = "ELISA")]
    Elisa,
    CellCulture,
    ProteinPurification,
    MagneticSeparation,
    Custom,
}

/// A named placement requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub description: String,
    pub capabilities: Vec<Capability>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constraints: Option<RoleConstraints>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferred_labware: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume: Option<VolumeRange>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<TemperatureRange>,
}

impl RoleSpec {
    pub fn prefers(&self, labware_id: &str) -> bool {
        self.preferred_labware
            .as_ref()
            .is_some_and(|p| p.iter().any(|id| id == labware_id))
    }
}

/// Optional hard/soft constraints on a role's placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleConstraints {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<TemperatureRange>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume: Option<VolumeRange>,
    /// Roles this role should sit next to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adjacent: Option<Vec<String>>,
    /// Keep all neighboring slots free.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub isolated: Option<bool>,
    /// Pin the role to one specific slot.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fixed_slot: Option<u32>,
    /// Pipette descriptors ("left_single", "right_multi", ...) that must
    /// reach this role.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accessible_by: Option<Vec<String>>,
    /// Maximum allowed distance to every other placed role, in mm.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_distance_mm: Option<f64>,
}

// ── Optimization preferences ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub priority: OptimizationPriority,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weights: Option<OptimizationWeights>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constraints: Option<OptimizationConstraints>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationPriority {
    MinimizeMoves,
    MaximizeThroughput,
    MinimizeTips,
    MinimizeTime,
    MinimizeContaminationRisk,
}

/// Per-objective weights, each in 0–1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationWeights {
    pub movement_distance: f64,
    pub tip_usage: f64,
    pub time: f64,
    pub contamination_risk: f64,
    pub resource_utilization: f64,
}

impl Default for OptimizationWeights {
    fn default() -> Self {
        Self {
            movement_distance: 0.2,
            tip_usage: 0.2,
            time: 0.2,
            contamination_risk: 0.2,
            resource_utilization: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConstraints {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_tip_usage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_execution_time_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_separation_distance_mm: Option<f64>,
}

/// Placement search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    #[default]
    Greedy,
    SimulatedAnnealing,
    Ilp,
    GeneticAlgorithm,
    Manual,
}

// ── Runtime context ────────────────────────────────────────────────

/// Snapshot of the physical deck at plan time. Read-only input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub available_slots: Vec<u32>,
    pub installed_modules: Vec<InstalledModule>,
    pub available_pipettes: Vec<PipetteSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub existing_labware: Vec<ExistingLabware>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub occupied_slots: Vec<u32>,
}

impl RuntimeContext {
    pub fn module_in_slot(&self, slot: u32) -> Option<&InstalledModule> {
        self.installed_modules.iter().find(|m| m.slot == slot)
    }

    pub fn labware_in_slot(&self, slot: u32) -> Option<&ExistingLabware> {
        self.existing_labware.iter().find(|l| l.slot == slot)
    }
}

/// A module already installed on the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledModule {
    pub slot: u32,
    pub kind: ModuleKind,
    pub id: String,
    pub capabilities: Vec<Capability>,
}

/// A pipette mounted on the gantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipetteSpec {
    pub mount: Mount,
    pub model: String,
    /// 1 (single-channel) or 8 (multi-channel).
    pub channels: u8,
    pub min_volume_ul: f64,
    pub max_volume_ul: f64,
}

/// Labware already sitting on the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingLabware {
    pub slot: u32,
    pub labware_id: String,
    pub labware_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub used_wells: Vec<String>,
}
