//! labdeck-catalog — the read-only resource catalog.
//!
//! Holds labware and module definitions (dimensions, capabilities, well
//! geometry, module compatibility) and answers pure lookup/query calls for
//! the rest of the pipeline. One catalog instance is constructed at startup
//! with the built-in definitions and shared behind `Arc`; it is never
//! mutated during planning.
//!
//! Missing ids return `None`/empty results — the catalog has no error
//! conditions of its own.

pub mod catalog;
pub mod entry;

mod builtin;

pub use catalog::ResourceCatalog;
pub use entry::{LabwareEntry, ModuleEntry, WellLayout, WellShape};
