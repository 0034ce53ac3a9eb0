//! Clustering-time errors. Ordinary solver failure (infeasible or timed out) is
//! not an error here; it is folded into the recursion's fallback-leaf behavior
//! and only observable through `SolverOutcome` for testability.

use super::error_code::{self, BlockcutErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("no usable ILP/CP backend is configured")]
    SolverUnavailable,
}

impl BlockcutErrorCode for ClusterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SolverUnavailable => error_code::SOLVER_UNAVAILABLE,
        }
    }
}
