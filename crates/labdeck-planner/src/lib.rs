//! labdeck-planner — the planning orchestrator.
//!
//! One `plan()` call runs the whole pipeline:
//!
//! ```text
//! DeckPlanner
//!   ├── cache probe (content hash of spec + runtime snapshot)
//!   ├── structural spec check
//!   ├── CapabilityMapper  (role → ranked resource matches)
//!   ├── PlacementSolver   (role → slot candidates)
//!   ├── binding map construction (labware, module, pipette, wells)
//!   ├── DeckValidator     (findings → warnings/errors)
//!   └── cache write + session binding registration
//! ```
//!
//! `plan()` never propagates an error: every failure is folded into the
//! result's `errors` list alongside an empty-but-valid binding map.

pub mod cache;
pub mod error;
pub mod execution;
pub mod planner;

pub use cache::{BindingCache, cache_key};
pub use error::{PlannerError, PlannerResult};
pub use planner::{DeckPlanner, PlannerOptions, PlanningResult};
