//! labdeck-compat — resolves locations across three addressing styles.
//!
//! Older protocols address the deck by raw slot + labware id; the planner
//! works in symbolic roles. The [`BindingResolver`] bridges both worlds:
//!
//! - **legacy** — slot + labware literals, mapped to modern catalog entries
//!   where possible, with migration hints emitted along the way
//! - **role-based** — symbolic lookups against solved bindings (session
//!   overrides first, then the injected [`BindingLookup`])
//! - **hybrid** — per-side mix of the two, with a migration-progress figure
//!
//! Strict migration mode turns error-level hints into failed resolutions;
//! resolution failures never corrupt other resolves.

pub mod error;
pub mod legacy;
pub mod resolver;

pub use error::{ResolutionError, ResolveResult};
pub use resolver::{
    AddressingKind, BindingLookup, BindingResolver, LocationSpec, MigrationHint, MigrationMode,
    MigrationReadiness, ResolveRequest, ResolvedBinding, ResolvedLocation, RoleSuggestion,
};
