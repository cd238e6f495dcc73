//! hg-solver: chemical equilibrium and target-temperature solvers.
//!
//! - [`equilibrium`]: Gibbs-energy minimisation at fixed (T, P) under element balance
//! - [`secant`]: bracketed hybrid secant/bisection root finder with parabolic preconditioning
//! - [`target`]: temperature that reproduces a prescribed enthalpy or entropy, in frozen or
//!   shifting flow
//!
//! The root finder drives the equilibrium solver through residual closures; each trial point
//! re-equilibrates (shifting flow) or keeps the composition (frozen flow).

pub mod config;
pub mod equilibrium;
pub mod error;
pub mod secant;
pub mod target;

pub use config::{EquilibriumConfig, FlowMode, NonConvergencePolicy, SecantConfig, SolverConfig};
pub use equilibrium::{EquilibriumResult, equilibrate, equilibrate_mixture};
pub use error::{SolverError, SolverResult};
pub use secant::{RootFindResult, RootStatus, find_root};
pub use target::{TargetProperty, clip_bracket, solve_target, target_residual};
