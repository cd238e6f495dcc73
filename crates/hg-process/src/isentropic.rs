//! Isentropic expansion from a stagnation state.
//!
//! The inlet entropy `S1`, specific enthalpy `h1 = H1/m` and mass `m = sum(n) Mm 1e-3` are
//! taken from the inlet mixture. The outlet temperature at a given pressure matches `S1`;
//! the outlet velocity follows from the enthalpy drop, `v = sqrt(2000 (h1 - h2))` with h in
//! kJ/kg.

use hg_core::ensure_positive;
use hg_solver::{
    FlowMode, RootStatus, SecantConfig, SolverConfig, SolverError, SolverResult, TargetProperty,
    find_root, solve_target,
};
use hg_thermo::{MixtureState, Property, SpeciesDatabase, mixture_property};
use tracing::{debug, debug_span, warn};

use crate::error::{ProcessError, ProcessResult};

/// Lowest pressure tried by the Mach search, bar.
const MIN_SEARCH_PRESSURE: f64 = 0.1;
/// Frozen flow starts the Mach search slightly below the inlet pressure.
const FROZEN_PRESSURE_FACTOR: f64 = 0.9;

/// Condition that ends the expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpansionTarget {
    /// Outlet pressure, bar
    Pressure(f64),
    /// Outlet Mach number
    Mach(f64),
}

/// Outlet state of an expansion. The outlet fields are `None` when the search that fixes the
/// outlet found no sign change in its bracket (`status == NoBracketingSignChange`).
#[derive(Debug, Clone, PartialEq)]
pub struct IsentropicResult {
    /// Outlet temperature, K
    pub temperature: Option<f64>,
    /// Outlet pressure, bar
    pub pressure: Option<f64>,
    /// Outlet amounts, mol; the inlet amounts when there is no outlet state
    pub amounts: Vec<f64>,
    /// m/s
    pub velocity: Option<f64>,
    pub mach: Option<f64>,
    /// Status of the search that fixed the outlet state (the pressure search in Mach mode)
    pub status: RootStatus,
    pub iterations: usize,
}

impl IsentropicResult {
    pub fn converged(&self) -> bool {
        self.status == RootStatus::Converged
    }

    fn unreached(inlet: &MixtureState, pressure: Option<f64>) -> Self {
        Self {
            temperature: None,
            pressure,
            amounts: inlet.amounts().to_vec(),
            velocity: None,
            mach: None,
            status: RootStatus::NoBracketingSignChange,
            iterations: 0,
        }
    }
}

/// Inlet quantities conserved along the expansion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Inlet {
    /// kJ/K
    entropy: f64,
    /// kJ/kg
    enthalpy: f64,
    /// kg
    pub(crate) mass: f64,
    /// K
    temperature: f64,
    /// bar
    pressure: f64,
}

impl Inlet {
    pub(crate) fn of<D: SpeciesDatabase + ?Sized>(
        db: &D,
        mix: &MixtureState,
    ) -> ProcessResult<Self> {
        let entropy = mixture_property(db, mix, Property::Entropy)?;
        let molar_mass = mixture_property(db, mix, Property::MolarMass)?;
        let enthalpy = mixture_property(db, mix, Property::Enthalpy)?;
        let mass = mix.total_moles() * molar_mass * 1e-3;
        Ok(Self {
            entropy,
            enthalpy: enthalpy / mass,
            mass,
            temperature: mix.average_temperature()?,
            pressure: mix.pressure(),
        })
    }

    /// Velocity reached at an outlet enthalpy of `h` kJ in total. Drops that are slightly
    /// negative from solver tolerance give zero.
    fn velocity(&self, h: f64) -> f64 {
        (2000.0 * (self.enthalpy - h / self.mass)).max(0.0).sqrt()
    }
}

/// Outlet state at pressure `p` matching the inlet entropy, with its total enthalpy and
/// sound speed.
struct Outlet {
    temperature: f64,
    amounts: Vec<f64>,
    enthalpy: f64,
    sound_speed: f64,
    status: RootStatus,
    iterations: usize,
}

impl Outlet {
    fn into_result(
        self,
        inlet: &Inlet,
        p: f64,
        status: RootStatus,
        iterations: usize,
    ) -> IsentropicResult {
        let velocity = inlet.velocity(self.enthalpy);
        IsentropicResult {
            temperature: Some(self.temperature),
            pressure: Some(p),
            amounts: self.amounts,
            velocity: Some(velocity),
            mach: Some(velocity / self.sound_speed),
            status,
            iterations,
        }
    }
}

/// `None` when no temperature in the bracket matches the inlet entropy at `p`.
fn outlet_at<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &Inlet,
    mix: &MixtureState,
    start: &[f64],
    p: f64,
    config: &SolverConfig,
) -> SolverResult<Option<Outlet>> {
    let state = MixtureState::new(mix.ids().to_vec(), start.to_vec(), inlet.temperature, p)?;
    let root = solve_target(db, &state, TargetProperty::Entropy, inlet.entropy, config)?;
    let Some(t) = root.x else {
        return Ok(None);
    };
    let out = MixtureState::new(mix.ids().to_vec(), root.amounts, t, p)?;
    Ok(Some(Outlet {
        temperature: t,
        enthalpy: mixture_property(db, &out, Property::Enthalpy)?,
        sound_speed: mixture_property(db, &out, Property::SoundSpeed)?,
        amounts: out.amounts().to_vec(),
        status: root.status,
        iterations: root.iterations,
    }))
}

/// Bracket and tolerances of the outer pressure search in Mach mode.
pub fn pressure_search_config(p0: f64, flow: FlowMode, base: &SecantConfig) -> SecantConfig {
    let xmax = match flow {
        FlowMode::Frozen => p0 * FROZEN_PRESSURE_FACTOR,
        FlowMode::Shifting => p0,
    };
    SecantConfig {
        xmin: MIN_SEARCH_PRESSURE,
        xmax,
        max_iterations: 50,
        eps_x: 0.01,
        eps_y: 0.001,
        f_change: 1.0,
        d_tp: base.d_tp,
    }
}

/// Expand `inlet` isentropically to `target`.
///
/// `config.secant` drives the outlet temperature search against entropy
/// (see [`SolverConfig::isentropic`]). In Mach mode the outer pressure search uses
/// [`pressure_search_config`]; see [`isentropic_mach`].
pub fn isentropic<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    target: ExpansionTarget,
    config: &SolverConfig,
) -> ProcessResult<IsentropicResult> {
    let _span = debug_span!("isentropic", p0 = inlet.pressure()).entered();
    let state = Inlet::of(db, inlet)?;
    match target {
        ExpansionTarget::Pressure(p1) => expand_to_pressure(db, inlet, &state, p1, config),
        ExpansionTarget::Mach(m_target) => {
            let search = pressure_search_config(state.pressure, config.flow, &config.secant);
            expand_to_mach(db, inlet, &state, m_target, config, &search)
        }
    }
}

/// Expand `inlet` until the flow reaches `mach`, searching pressure with `search`.
///
/// An outer search over pressure wraps the outlet temperature search. An inner search that
/// does not converge aborts with [`SolverError::RootSearchFailed`]. An outer search without a
/// sign change is reported through the status, and one that runs out of iterations warns and
/// solves the outlet at its last pressure.
pub fn isentropic_mach<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    mach: f64,
    config: &SolverConfig,
    search: &SecantConfig,
) -> ProcessResult<IsentropicResult> {
    let _span = debug_span!("isentropic_mach", p0 = inlet.pressure(), mach).entered();
    let state = Inlet::of(db, inlet)?;
    expand_to_mach(db, inlet, &state, mach, config, search)
}

pub(crate) fn expand_to_pressure<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    state: &Inlet,
    p1: f64,
    config: &SolverConfig,
) -> ProcessResult<IsentropicResult> {
    ensure_positive(p1, "outlet pressure")?;
    let Some(out) = outlet_at(db, state, inlet, inlet.amounts(), p1, config)? else {
        warn!(p1, "no outlet temperature matches the inlet entropy");
        return Ok(IsentropicResult::unreached(inlet, Some(p1)));
    };
    if out.status != RootStatus::Converged {
        warn!(p1, iterations = out.iterations, "outlet temperature search did not converge");
    }
    let (status, iterations) = (out.status, out.iterations);
    Ok(out.into_result(state, p1, status, iterations))
}

fn expand_to_mach<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    state: &Inlet,
    m_target: f64,
    config: &SolverConfig,
    search: &SecantConfig,
) -> ProcessResult<IsentropicResult> {
    ensure_positive(m_target, "outlet Mach number")?;

    let mach_residual = |p: f64, seed: &[f64]| {
        let out = outlet_at(db, state, inlet, seed, p, config)?
            .filter(|out| out.status == RootStatus::Converged)
            .ok_or_else(|| SolverError::RootSearchFailed {
                what: format!("outlet temperature search at {p} bar"),
            })?;
        let mach = state.velocity(out.enthalpy) / out.sound_speed;
        Ok((m_target - mach, out.amounts))
    };
    let root = find_root(mach_residual, inlet.amounts(), search)?;

    let Some(p1) = root.x else {
        warn!(
            m_target,
            xmin = search.xmin,
            xmax = search.xmax,
            "target Mach not reached inside the pressure bracket"
        );
        return Ok(IsentropicResult::unreached(inlet, None));
    };
    if root.status != RootStatus::Converged {
        warn!(p1, iterations = root.iterations, "pressure search for target Mach did not converge");
    }
    debug!(p1, iterations = root.iterations, "pressure for target Mach");

    let out = outlet_at(db, state, inlet, &root.amounts, p1, config)?.ok_or_else(|| {
        ProcessError::NoSolution {
            what: format!("no outlet temperature matches the inlet entropy at {p1} bar"),
        }
    })?;
    Ok(out.into_result(state, p1, root.status, root.iterations))
}
