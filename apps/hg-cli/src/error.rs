use hg_process::ProcessError;
use hg_solver::SolverError;
use hg_thermo::ThermoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("bad argument '{arg}': {what}")]
    BadArgument { arg: String, what: String },

    #[error(transparent)]
    Thermo(#[from] ThermoError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
