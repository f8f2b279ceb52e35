//! Resolution error types.

use thiserror::Error;

/// Errors a single `resolve()` call can fail with.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("legacy format requires slot and labware for the {0} location")]
    IncompleteLegacyLocation(&'static str),

    #[error("role-based format requires a role for the {0} location")]
    MissingRole(&'static str),

    #[error("no binding found for role '{0}'")]
    UnboundRole(String),

    #[error("insufficient information for the {0} location")]
    Unresolvable(&'static str),

    #[error("migration error: {0}")]
    Migration(String),
}

pub type ResolveResult<T> = Result<T, ResolutionError>;
