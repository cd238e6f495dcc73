//! Error types for state solvers.

use hg_core::HgError;
use hg_solver::SolverError;
use hg_thermo::ThermoError;
use thiserror::Error;

/// Errors raised by the flame, isentropic and nozzle solvers.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The search bracket holds no root for the requested condition.
    #[error("No solution: {what}")]
    NoSolution { what: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Thermo error: {0}")]
    Thermo(#[from] ThermoError),
}

pub type ProcessResult<T> = Result<T, ProcessError>;

impl ProcessError {
    /// True for property-model errors, which no other operating point would avoid.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProcessError::Thermo(_) | ProcessError::Solver(SolverError::Thermo(_))
        )
    }
}

impl From<HgError> for ProcessError {
    fn from(e: HgError) -> Self {
        ProcessError::Thermo(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProcessError::NoSolution {
            what: "flame temperature".into(),
        };
        assert!(err.to_string().contains("flame temperature"));

        let err: ProcessError = SolverError::RootSearchFailed {
            what: "inner".into(),
        }
        .into();
        assert!(matches!(err, ProcessError::Solver(_)));
    }

    #[test]
    fn only_property_errors_are_fatal() {
        let phase = || ThermoError::PhaseConsistency {
            species: "H2O(L)".into(),
        };
        assert!(ProcessError::Thermo(phase()).is_fatal());
        assert!(ProcessError::Solver(SolverError::Thermo(phase())).is_fatal());

        let local = [
            ProcessError::NoSolution { what: "exit".into() },
            ProcessError::InvalidArg { what: "pressure" },
            ProcessError::Solver(SolverError::RootSearchFailed { what: "inner".into() }),
        ];
        assert!(local.iter().all(|e| !e.is_fatal()));
    }
}
