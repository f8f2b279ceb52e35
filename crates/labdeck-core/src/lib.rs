//! labdeck-core — shared domain types for the LabDeck planning engine.
//!
//! Everything the planning pipeline passes between crates lives here:
//!
//! - **`capability`** — the capability vocabulary roles and resources use to
//!   talk about compatibility
//! - **`spec`** — deck specifications and the runtime deck snapshot
//! - **`binding`** — solved bindings, binding maps, and execution-plan data
//! - **`finding`** — severity-tagged validation findings
//! - **`deck`** — static deck geometry (slots, adjacency, pipette reach)
//!
//! All result-facing types serialize to plain structured data (maps, lists,
//! scalars) so a consumer can export a binding map without touching engine
//! internals.

pub mod binding;
pub mod capability;
pub mod deck;
pub mod finding;
pub mod spec;

pub use binding::{
    Binding, BindingMap, BindingMeta, BindingMetadata, CollisionRisk, ConflictZone, ExecutionPlan,
    LabwareDescriptor, ModuleAssignment, MovementPath, PipetteAssignment, ResourceUtilization,
    TipUsage, ValidationStatus, VisualizationData, WellPattern, WellSelection,
};
pub use capability::{
    Capability, CapabilityKind, CapabilityValue, ModuleKind, Mount, TemperatureRange, VolumeRange,
};
pub use deck::Dimensions;
pub use finding::{Severity, ValidationFinding, ValidationKind};
pub use spec::{
    DeckSpec, ExistingLabware, InstalledModule, OptimizationConfig, OptimizationConstraints,
    OptimizationPriority, OptimizationWeights, PipetteSpec, ProtocolInfo, ProtocolTemplate,
    RoleConstraints, RoleSpec, RuntimeContext, SolverStrategy,
};
