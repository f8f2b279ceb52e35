//! labdeck-placement — assigns roles to deck slots.
//!
//! The solver turns a deck specification plus a runtime snapshot into a
//! role → [`PlacementCandidate`] map, scoring every candidate against the
//! spec's constraints and the current board state. Strategies share one
//! interface:
//!
//! - **greedy** — deterministic, most-constrained roles first
//! - **simulated annealing** — greedy seed, slot-swap neighborhood,
//!   Metropolis acceptance with geometric cooling
//! - **genetic** — greedy-seeded population, tournament selection, uniform
//!   crossover, slot-reassignment mutation
//! - **ilp** — declared for future exact solving; falls back to greedy with
//!   a non-fatal notice
//!
//! A role with no capability-compatible labware anywhere yields no
//! candidate; the orchestrator escalates that to a planning error.

pub mod board;
pub mod candidate;
pub mod constraint;
pub mod score;
pub mod solver;

mod annealing;
mod genetic;
mod greedy;

pub use board::{DeckBoard, SlotState};
pub use candidate::{PlacementCandidate, Solution};
pub use constraint::{ConstraintKind, PlacementConstraint, extract_constraints, role_priority};
pub use score::{evaluate_candidate, evaluate_solution};
pub use solver::PlacementSolver;
