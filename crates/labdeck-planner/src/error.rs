//! Planner error types.
//!
//! These surface only inside the pipeline; the orchestrator boundary folds
//! them into result-level error strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("no roles defined in deck specification")]
    EmptySpec,

    #[error("invalid fixed slot {slot} for role {role}")]
    InvalidFixedSlot { role: String, slot: u32 },

    #[error("no compatible resources found for roles: {0}")]
    UnsatisfiableRoles(String),

    #[error("failed to find a valid placement solution")]
    NoSolution,
}

pub type PlannerResult<T> = Result<T, PlannerError>;
