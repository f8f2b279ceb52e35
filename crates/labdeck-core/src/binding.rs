//! Solved bindings and binding maps.
//!
//! A `Binding` is the finalized slot + resource assignment for one role; a
//! `BindingMap` is the full role → binding mapping plus planning metadata,
//! the execution-plan summary, and an optional visualization payload. All of
//! it is plain structured data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityKind, ModuleKind, Mount};
use crate::deck::Dimensions;
use crate::finding::ValidationKind;
use crate::spec::SolverStrategy;

// ── Per-role binding ───────────────────────────────────────────────

/// Resolved labware descriptor attached to a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareDescriptor {
    pub id: String,
    pub display_name: String,
    pub dimensions: Dimensions,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub well_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub well_volume_ul: Option<f64>,
}

/// Module assigned to a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleAssignment {
    pub id: String,
    pub kind: ModuleKind,
}

/// Pipette assigned to service a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipetteAssignment {
    pub mount: Mount,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tip_rack_slot: Option<u32>,
}

/// Selected wells within the bound labware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellSelection {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rows: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub specific: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pattern: Option<WellPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellPattern {
    All,
    Sequential,
    Alternating,
    Checkerboard,
    Custom,
}

/// Capability bookkeeping and solver warnings for one binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingMeta {
    pub capabilities_satisfied: Vec<CapabilityKind>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// The finalized per-role placement result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub slot: u32,
    pub labware: LabwareDescriptor,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub module: Option<ModuleAssignment>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pipette: Option<PipetteAssignment>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wells: Option<WellSelection>,
    pub meta: BindingMeta,
}

// ── Binding map ────────────────────────────────────────────────────

/// Validation outcome recorded on a binding map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Valid,
    Warnings,
    Errors,
}

/// Planning metadata attached to every binding map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingMetadata {
    /// Unix timestamp (seconds) when the map was created.
    pub created_at: u64,
    pub solver_version: String,
    pub solver_strategy: SolverStrategy,
    /// Normalized 0–1 solution score.
    pub optimization_score: f64,
    pub validation_status: ValidationStatus,
}

/// The complete role → binding mapping plus aggregate metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingMap {
    pub bindings: BTreeMap<String, Binding>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub execution_plan: Option<ExecutionPlan>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub visualization: Option<VisualizationData>,
    pub metadata: BindingMetadata,
}

impl BindingMap {
    /// Bound slot for a role, if the role was placed.
    pub fn slot_of(&self, role: &str) -> Option<u32> {
        self.bindings.get(role).map(|b| b.slot)
    }

    /// The binding occupying `slot`, if any.
    pub fn binding_in_slot(&self, slot: u32) -> Option<(&String, &Binding)> {
        self.bindings.iter().find(|(_, b)| b.slot == slot)
    }
}

// ── Execution-plan summary ─────────────────────────────────────────

/// Aggregate collision risk over a validated layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionRisk {
    #[default]
    Low,
    Medium,
    High,
}

/// Estimated tip consumption for one pipette model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TipUsage {
    pub tips_needed: u32,
    pub racks_needed: u32,
}

/// Deck resource utilization percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    pub slot_usage_pct: f64,
    pub module_usage_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub left_pipette_usage_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub right_pipette_usage_pct: Option<f64>,
}

/// Rough execution estimates derived from a completed layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub estimated_time_s: f64,
    pub tip_usage: BTreeMap<String, TipUsage>,
    /// 0–1; higher means shorter average travel.
    pub movement_efficiency: f64,
    pub collision_risk: CollisionRisk,
    pub resource_utilization: ResourceUtilization,
}

// ── Visualization payload ──────────────────────────────────────────

/// Structured layout diagnostics for a presentation layer to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conflict_zones: Vec<ConflictZone>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub movement_paths: Vec<MovementPath>,
}

/// A slot (or slot group) with outstanding findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictZone {
    pub slots: Vec<u32>,
    pub kind: ValidationKind,
    pub severity: crate::finding::Severity,
    pub description: String,
}

/// An expected liquid-transfer path between two slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPath {
    pub from_slot: u32,
    pub to_slot: u32,
    pub frequency: u32,
    pub distance_mm: f64,
}
