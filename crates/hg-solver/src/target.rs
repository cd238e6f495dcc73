//! Temperature that reproduces a prescribed enthalpy or entropy.

use core::str::FromStr;

use hg_core::SpeciesId;
use hg_thermo::{MixtureState, Property, SpeciesDatabase, mixture_property};
use tracing::debug;

use crate::config::{EquilibriumConfig, FlowMode, SolverConfig};
use crate::equilibrium::equilibrate;
use crate::error::{SolverError, SolverResult};
use crate::secant::{RootFindResult, find_root};

/// Conserved quantity matched by [`solve_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProperty {
    /// Total enthalpy, kJ
    Enthalpy,
    /// Total entropy, kJ/K
    Entropy,
}

impl TargetProperty {
    fn property(self) -> Property {
        match self {
            TargetProperty::Enthalpy => Property::Enthalpy,
            TargetProperty::Entropy => Property::Entropy,
        }
    }
}

impl FromStr for TargetProperty {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "H" | "h" => Ok(TargetProperty::Enthalpy),
            "S" | "s" => Ok(TargetProperty::Entropy),
            _ => Err(SolverError::InvalidConfig {
                what: "target property must be H or S",
            }),
        }
    }
}

/// `property(T, P) - target` for `amounts` at `(t, p)`.
///
/// In shifting flow `amounts` is only the starting point: the mixture is re-equilibrated at
/// `(t, p)` first and the equilibrium amounts are returned. In frozen flow `amounts` is used
/// as is.
#[allow(clippy::too_many_arguments)]
pub fn target_residual<D: SpeciesDatabase + ?Sized>(
    db: &D,
    ids: &[SpeciesId],
    amounts: &[f64],
    t: f64,
    p: f64,
    property: TargetProperty,
    target: f64,
    flow: FlowMode,
    eq: &EquilibriumConfig,
) -> SolverResult<(f64, Vec<f64>)> {
    let n = match flow {
        FlowMode::Frozen => amounts.to_vec(),
        FlowMode::Shifting => equilibrate(db, ids, amounts, t, p, eq)?.amounts,
    };
    let state = MixtureState::new(ids.to_vec(), n, t, p)?;
    let value = mixture_property(db, &state, property.property())?;
    Ok((value - target, state.amounts().to_vec()))
}

/// Temperature bracket clipped to the range where every species of `mix` is valid.
pub fn clip_bracket<D: SpeciesDatabase + ?Sized>(
    db: &D,
    mix: &MixtureState,
    xmin: f64,
    xmax: f64,
) -> SolverResult<(f64, f64)> {
    let (t_lo, t_hi) = mix.common_temperature_range(db)?;
    let (lo, hi) = (xmin.max(t_lo), xmax.min(t_hi));
    if lo != xmin || hi != xmax {
        debug!(xmin, xmax, lo, hi, "temperature bracket clipped to species validity range");
    }
    if lo >= hi {
        return Err(SolverError::ProblemSetup {
            what: format!("temperature bracket [{xmin}, {xmax}] K lies outside the species data"),
        });
    }
    Ok((lo, hi))
}

/// Temperature at which `mix` (at its own pressure) has `property == target`.
///
/// The amounts of `mix` are the reactant composition: they are held fixed in frozen flow and
/// seed the equilibrium in shifting flow. The search bracket of `config.secant` is clipped to
/// the temperature range shared by all species.
pub fn solve_target<D: SpeciesDatabase + ?Sized>(
    db: &D,
    mix: &MixtureState,
    property: TargetProperty,
    target: f64,
    config: &SolverConfig,
) -> SolverResult<RootFindResult> {
    let (lo, hi) = clip_bracket(db, mix, config.secant.xmin, config.secant.xmax)?;
    let secant = config.secant.with_bracket(lo, hi);
    let p = mix.pressure();
    let fixed = mix.amounts();

    let residual = |t: f64, seed: &[f64]| {
        let start = match config.flow {
            FlowMode::Frozen => fixed,
            FlowMode::Shifting => seed,
        };
        target_residual(
            db,
            mix.ids(),
            start,
            t,
            p,
            property,
            target,
            config.flow,
            &config.equilibrium,
        )
    };
    find_root(residual, fixed, &secant)
}
