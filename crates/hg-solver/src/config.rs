//! Solver configuration, passed by value.

use core::str::FromStr;

use crate::error::{SolverError, SolverResult};

/// Bracket and tolerances for [`crate::find_root`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecantConfig {
    /// Lower end of the initial bracket
    pub xmin: f64,
    /// Upper end of the initial bracket
    pub xmax: f64,
    pub max_iterations: usize,
    /// Converged once both bracket ends are within `eps_x` of the trial point
    pub eps_x: f64,
    /// Converged once the residual magnitude drops below `eps_y`
    pub eps_y: f64,
    /// Next step bisects when the trial point lands within `f_change` of a bracket end
    pub f_change: f64,
    /// Half-width of the sub-bracket around the parabolic root estimate
    pub d_tp: f64,
}

impl Default for SecantConfig {
    /// Temperature search in K against an enthalpy residual in kJ.
    fn default() -> Self {
        Self {
            xmin: 300.0,
            xmax: 4000.0,
            max_iterations: 200,
            eps_x: 5.0,
            eps_y: 1.0,
            f_change: 500.0,
            d_tp: 100.0,
        }
    }
}

impl SecantConfig {
    /// Temperature search against an entropy residual in kJ/K.
    pub fn for_entropy() -> Self {
        Self {
            eps_x: 0.5,
            eps_y: 1e-4,
            ..Self::default()
        }
    }

    pub fn with_bracket(self, xmin: f64, xmax: f64) -> Self {
        Self { xmin, xmax, ..self }
    }

    pub fn validate(&self) -> SolverResult<()> {
        let invalid = |what| Err(SolverError::InvalidConfig { what });
        if !(self.xmin.is_finite() && self.xmax.is_finite()) {
            return invalid("bracket must be finite");
        }
        if self.xmin >= self.xmax {
            return invalid("xmin must be below xmax");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive");
        }
        if !(self.eps_x > 0.0 && self.eps_y > 0.0) {
            return invalid("tolerances must be positive");
        }
        if !(self.f_change >= 0.0 && self.d_tp > 0.0) {
            return invalid("f_change must be non-negative and d_tp positive");
        }
        Ok(())
    }
}

/// What happens when the equilibrium iteration runs out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonConvergencePolicy {
    /// Log a warning and return the last iterate with `success == false`
    #[default]
    Warn,
    /// Fail with [`SolverError::MinimizerNonConvergence`]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumConfig {
    pub max_iterations: usize,
    /// Bound on the scaled Newton correction and the relative element-balance residual
    pub tolerance: f64,
    pub on_failure: NonConvergencePolicy,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-9,
            on_failure: NonConvergencePolicy::Warn,
        }
    }
}

/// Composition behaviour while temperature or pressure changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMode {
    /// Composition held fixed
    Frozen,
    /// Composition re-equilibrated at every state
    #[default]
    Shifting,
}

impl FlowMode {
    pub fn key(&self) -> &'static str {
        match self {
            FlowMode::Frozen => "frozen",
            FlowMode::Shifting => "shifting",
        }
    }
}

impl FromStr for FlowMode {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frozen" => Ok(FlowMode::Frozen),
            "shifting" => Ok(FlowMode::Shifting),
            _ => Err(SolverError::InvalidConfig {
                what: "flow mode must be frozen or shifting",
            }),
        }
    }
}

/// Everything a target-condition solve needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverConfig {
    pub secant: SecantConfig,
    pub equilibrium: EquilibriumConfig,
    pub flow: FlowMode,
}

impl SolverConfig {
    pub fn frozen() -> Self {
        Self {
            flow: FlowMode::Frozen,
            ..Self::default()
        }
    }

    /// Shifting-flow temperature search against entropy.
    pub fn isentropic() -> Self {
        Self {
            secant: SecantConfig::for_entropy(),
            ..Self::default()
        }
    }

    pub fn with_flow(self, flow: FlowMode) -> Self {
        Self { flow, ..self }
    }

    pub fn with_secant(self, secant: SecantConfig) -> Self {
        Self { secant, ..self }
    }
}
