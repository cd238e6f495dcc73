//! Nozzle expansion swept over exit pressures.

use hg_core::constants::{G0_MPS2, PA_PER_BAR};
use hg_core::units::{
    Area, Density, Force, MassRate, Pressure, Ratio, Temperature, Time, Velocity, bar, k, kgpm3,
    kgps, m2, mps, newton, s, unitless,
};
use hg_core::ensure_non_negative;
use hg_solver::SolverConfig;
use hg_thermo::{MixtureState, Property, SpeciesDatabase, mixture_property};
use tracing::{debug, debug_span, warn};
use uom::si::{
    area::square_meter, force::newton as newtons, mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second, pressure::bar as bars, ratio::ratio, thermodynamic_temperature::kelvin, time::second,
    velocity::meter_per_second,
};

use crate::error::{ProcessError, ProcessResult};
use crate::isentropic::{Inlet, expand_to_pressure};

/// Exit state of one sweep point. Flow quantities are for the inlet mixture as a mass
/// flow of `sum(n) Mm 1e-3` kg/s.
#[derive(Debug, Clone, PartialEq)]
pub struct NozzlePoint {
    pub pressure: Pressure,
    pub temperature: Temperature,
    /// Exit amounts, mol
    pub amounts: Vec<f64>,
    pub density: Density,
    pub velocity: Velocity,
    pub mach: Ratio,
    pub area: Area,
    pub thrust: Force,
    pub specific_impulse: Time,
}

impl NozzlePoint {
    pub fn pressure_bar(&self) -> f64 {
        self.pressure.get::<bars>()
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature.get::<kelvin>()
    }

    pub fn density_kg_m3(&self) -> f64 {
        self.density.get::<kilogram_per_cubic_meter>()
    }

    pub fn velocity_mps(&self) -> f64 {
        self.velocity.get::<meter_per_second>()
    }

    pub fn mach_number(&self) -> f64 {
        self.mach.get::<ratio>()
    }

    pub fn area_m2(&self) -> f64 {
        self.area.get::<square_meter>()
    }

    pub fn thrust_n(&self) -> f64 {
        self.thrust.get::<newtons>()
    }

    pub fn isp_s(&self) -> f64 {
        self.specific_impulse.get::<second>()
    }
}

/// Result of [`nozzle_sweep`].
#[derive(Debug, Clone)]
pub struct NozzleSweep {
    /// Requested exit pressures, bar
    pub pressures: Vec<f64>,
    /// One entry per requested pressure; `None` where the expansion failed
    pub points: Vec<Option<NozzlePoint>>,
    pub mass_flow: MassRate,
    pub ambient: Pressure,
    pub num_converged: usize,
    pub num_failed: usize,
}

impl NozzleSweep {
    /// Points that converged, with their exit pressure in bar.
    pub fn converged(&self) -> impl Iterator<Item = (f64, &NozzlePoint)> {
        self.pressures
            .iter()
            .zip(&self.points)
            .filter_map(|(p, pt)| pt.as_ref().map(|pt| (*p, pt)))
    }

    pub fn mass_flow_kgps(&self) -> f64 {
        self.mass_flow.get::<kilogram_per_second>()
    }

    pub fn temperature_k(&self) -> Vec<f64> {
        self.converged().map(|(_, pt)| pt.temperature_k()).collect()
    }

    pub fn velocity_mps(&self) -> Vec<f64> {
        self.converged().map(|(_, pt)| pt.velocity_mps()).collect()
    }

    pub fn thrust_n(&self) -> Vec<f64> {
        self.converged().map(|(_, pt)| pt.thrust_n()).collect()
    }

    pub fn isp_s(&self) -> Vec<f64> {
        self.converged().map(|(_, pt)| pt.isp_s()).collect()
    }
}

/// Expand `inlet` isentropically to each of `pressures` (bar) and size the nozzle exit for
/// an ambient pressure of `ambient_bar`.
///
/// A point whose expansion finds no outlet state or does not converge is logged and left as
/// `None`; the sweep carries on. Property-model errors (see [`ProcessError::is_fatal`]) abort
/// the sweep, as do inlet-level problems.
pub fn nozzle_sweep<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    pressures: &[f64],
    ambient_bar: f64,
    config: &SolverConfig,
) -> ProcessResult<NozzleSweep> {
    let _span = debug_span!("nozzle_sweep", points = pressures.len()).entered();
    ensure_non_negative(ambient_bar, "ambient pressure")?;
    if pressures.is_empty() {
        return Err(ProcessError::InvalidArg {
            what: "nozzle sweep needs at least one exit pressure",
        });
    }

    let p0 = inlet.pressure();
    let state = Inlet::of(db, inlet)?;
    let mass_flow = state.mass;

    let mut points = Vec::with_capacity(pressures.len());
    let mut num_converged = 0;
    let mut num_failed = 0;

    for (i, &p) in pressures.iter().enumerate() {
        if !(p > 0.0 && p < p0) {
            warn!(index = i, p, p0, "exit pressure outside (0, P0), skipped");
            points.push(None);
            num_failed += 1;
            continue;
        }
        match exit_point(db, inlet, &state, p, ambient_bar, config) {
            Ok(point) => {
                points.push(Some(point));
                num_converged += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(index = i, p, error = %e, "nozzle point failed");
                points.push(None);
                num_failed += 1;
            }
        }
    }
    debug!(num_converged, num_failed, "nozzle sweep done");

    Ok(NozzleSweep {
        pressures: pressures.to_vec(),
        points,
        mass_flow: kgps(mass_flow),
        ambient: bar(ambient_bar),
        num_converged,
        num_failed,
    })
}

fn exit_point<D: SpeciesDatabase + ?Sized>(
    db: &D,
    inlet: &MixtureState,
    inlet_state: &Inlet,
    p: f64,
    ambient_bar: f64,
    config: &SolverConfig,
) -> ProcessResult<NozzlePoint> {
    let exit = expand_to_pressure(db, inlet, inlet_state, p, config)?;
    let (Some(t), Some(v), Some(mach)) = (exit.temperature, exit.velocity, exit.mach) else {
        return Err(ProcessError::NoSolution {
            what: format!("no exit state at {p} bar: {:?}", exit.status),
        });
    };
    if !exit.converged() {
        return Err(ProcessError::NoSolution {
            what: format!("exit temperature at {p} bar: {:?}", exit.status),
        });
    }
    let mass_flow = inlet_state.mass;
    let state = MixtureState::new(inlet.ids().to_vec(), exit.amounts, t, p)?;
    let rg = mixture_property(db, &state, Property::GasConstant)?;
    let rho = p * PA_PER_BAR / (rg * 1000.0 * t);
    if !(v > 0.0) {
        return Err(ProcessError::NoSolution {
            what: format!("no velocity gained expanding to {p} bar"),
        });
    }
    let area = mass_flow / (v * rho);
    let thrust = mass_flow * v + area * (p - ambient_bar) * PA_PER_BAR;

    Ok(NozzlePoint {
        pressure: bar(p),
        temperature: k(t),
        amounts: state.amounts().to_vec(),
        density: kgpm3(rho),
        velocity: mps(v),
        mach: unitless(mach),
        area: m2(area),
        thrust: newton(thrust),
        specific_impulse: s(v / G0_MPS2),
    })
}
