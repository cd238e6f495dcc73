//! hg-process: state solvers built on the equilibrium and root-finding core.
//!
//! - [`flame`]: adiabatic flame temperature
//! - [`isentropic`]: isentropic expansion to a pressure or to a Mach number
//! - [`nozzle`]: isentropic expansion swept over exit pressures, with thrust and Isp

pub mod error;
pub mod flame;
pub mod isentropic;
pub mod nozzle;

pub use error::{ProcessError, ProcessResult};
pub use flame::{FlameResult, InletEnthalpy, flame_temperature};
pub use isentropic::{
    ExpansionTarget, IsentropicResult, isentropic, isentropic_mach, pressure_search_config,
};
pub use nozzle::{NozzlePoint, NozzleSweep, nozzle_sweep};
