//! Adiabatic flame temperature.

use hg_core::ensure_finite;
use hg_solver::{RootStatus, SolverConfig, TargetProperty, solve_target};
use hg_thermo::{MixtureState, Property, SpeciesDatabase, mixture_property};
use tracing::{debug, debug_span, warn};

use crate::error::ProcessResult;

/// Source of the enthalpy the products must match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InletEnthalpy {
    /// Enthalpy of the reactants at their own temperature(s)
    FromReactants,
    /// Total enthalpy in kJ
    Given(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlameResult {
    /// Flame temperature, K; `None` when no sign change was found in the bracket
    pub temperature: Option<f64>,
    /// Product amounts, mol, in reactant species order
    pub amounts: Vec<f64>,
    /// Enthalpy that was matched, kJ
    pub inlet_enthalpy: f64,
    pub status: RootStatus,
    pub iterations: usize,
}

impl FlameResult {
    pub fn converged(&self) -> bool {
        self.status == RootStatus::Converged
    }

    pub fn mole_fractions(&self) -> Vec<f64> {
        let total: f64 = self.amounts.iter().sum();
        self.amounts.iter().map(|n| n / total).collect()
    }
}

/// Temperature at which the products of `reactants` hold the inlet enthalpy at the
/// reactants' pressure.
///
/// The species list of `reactants` is also the product species list; include the
/// dissociation products that should be allowed to form, at zero amount. Frozen flow keeps the
/// reactant composition.
pub fn flame_temperature<D: SpeciesDatabase + ?Sized>(
    db: &D,
    reactants: &MixtureState,
    inlet: InletEnthalpy,
    config: &SolverConfig,
) -> ProcessResult<FlameResult> {
    let _span = debug_span!("flame_temperature", p = reactants.pressure()).entered();

    let h0 = match inlet {
        InletEnthalpy::FromReactants => mixture_property(db, reactants, Property::Enthalpy)?,
        InletEnthalpy::Given(h) => ensure_finite(h, "inlet enthalpy")?,
    };

    let products = MixtureState::new(
        reactants.ids().to_vec(),
        reactants.amounts().to_vec(),
        reactants.average_temperature()?,
        reactants.pressure(),
    )?;
    let root = solve_target(db, &products, TargetProperty::Enthalpy, h0, config)?;

    match root.status {
        RootStatus::Converged => {
            debug!(t = root.x, iterations = root.iterations, "flame temperature converged");
        }
        RootStatus::MaxIterationsExceeded => {
            warn!(t = root.x, iterations = root.iterations, "flame temperature search exhausted iterations");
        }
        RootStatus::NoBracketingSignChange => {
            warn!(h0, "inlet enthalpy not reachable inside the temperature bracket");
        }
    }

    Ok(FlameResult {
        temperature: root.x,
        amounts: root.amounts,
        inlet_enthalpy: h0,
        status: root.status,
        iterations: root.iterations,
    })
}
