//! labdeck-capability — maps role requirements to physical resources.
//!
//! Given a role's required capabilities and the runtime deck snapshot, this
//! crate derives a [`ResourceRequirement`], enumerates candidate labware,
//! modules, and pipettes, and scores every combination into a ranked list of
//! [`CapabilityMatch`]es. Zero-score matches are kept — they tell the solver
//! a role has no compatible resource rather than silently vanishing.
//!
//! Also hosts the well-selection and pipette-assignment helpers used when a
//! solved placement is turned into a binding.

pub mod mapper;
pub mod pipette;
pub mod requirement;
pub mod wells;

pub use mapper::{CapabilityMapper, CapabilityMatch};
pub use pipette::assign_pipette;
pub use requirement::{
    LabwareRequirement, ModuleRequirement, PipetteRequirement, ResourceCategory,
    ResourceRequirement,
};
pub use wells::{SelectionPattern, select_wells};
