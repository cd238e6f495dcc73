//! Error types for solver operations.

use hg_core::HgError;
use hg_thermo::ThermoError;
use thiserror::Error;

/// Errors that can occur while equilibrating or searching for a target condition.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },

    /// Raised only under [`crate::NonConvergencePolicy::Error`].
    #[error("Equilibrium did not converge after {iterations} iterations (residual {residual:e})")]
    MinimizerNonConvergence { iterations: usize, residual: f64 },

    /// A nested root search (e.g. inside another residual) ended without a root.
    #[error("Root search failed: {what}")]
    RootSearchFailed { what: String },

    #[error("Thermo error: {0}")]
    Thermo(#[from] ThermoError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<HgError> for SolverError {
    fn from(e: HgError) -> Self {
        SolverError::Thermo(e.into())
    }
}
