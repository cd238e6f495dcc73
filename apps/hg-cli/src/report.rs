//! Serializable command results and their plain-text rendering.

use std::collections::BTreeMap;

use hg_core::SpeciesId;
use hg_process::{FlameResult, IsentropicResult, NozzleSweep};
use hg_solver::{EquilibriumResult, RootStatus};
use hg_thermo::{Phase, SpeciesDatabase, SpeciesRecord, TemperatureRange};
use serde::Serialize;

use crate::error::CliResult;

#[derive(Serialize, Debug)]
pub struct SpeciesAmount {
    pub name: String,
    pub moles: f64,
    pub fraction: f64,
}

pub fn composition<D: SpeciesDatabase + ?Sized>(
    db: &D,
    ids: &[SpeciesId],
    amounts: &[f64],
) -> CliResult<Vec<SpeciesAmount>> {
    let total: f64 = amounts.iter().sum();
    ids.iter()
        .zip(amounts)
        .map(|(id, &n)| -> CliResult<SpeciesAmount> {
            Ok(SpeciesAmount {
                name: db.record(*id)?.name().to_string(),
                moles: n,
                fraction: if total > 0.0 { n / total } else { 0.0 },
            })
        })
        .collect()
}

fn status_key(status: RootStatus) -> &'static str {
    match status {
        RootStatus::Converged => "converged",
        RootStatus::MaxIterationsExceeded => "max-iterations",
        RootStatus::NoBracketingSignChange => "no-bracket",
    }
}

#[derive(Serialize, Debug)]
pub struct PropReport {
    pub species: String,
    pub phase: Phase,
    pub molar_mass: f64,
    pub range: TemperatureRange,
    pub temperature: f64,
    pub pressure: f64,
    pub values: BTreeMap<&'static str, f64>,
}

impl PropReport {
    pub fn new(record: &SpeciesRecord, t: f64, p: f64, values: BTreeMap<&'static str, f64>) -> Self {
        Self {
            species: record.name().to_string(),
            phase: record.phase(),
            molar_mass: record.molar_mass(),
            range: record.range(),
            temperature: t,
            pressure: p,
            values,
        }
    }

    pub fn print(&self) {
        let r = &self.range;
        println!(
            "{} ({}, {:.4} g/mol, {}-{}-{} K) at {} K, {} bar",
            self.species,
            self.phase.key(),
            self.molar_mass,
            r.low,
            r.mid,
            r.high,
            self.temperature,
            self.pressure
        );
        for (key, v) in &self.values {
            println!("  {key:>6} = {v:.6}");
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EquilibriumReport {
    pub temperature: f64,
    pub pressure: f64,
    pub converged: bool,
    pub iterations: usize,
    pub gibbs: f64,
    pub element_residual: f64,
    pub species: Vec<SpeciesAmount>,
}

impl EquilibriumReport {
    pub fn new(r: &EquilibriumResult, t: f64, p: f64, species: Vec<SpeciesAmount>) -> Self {
        Self {
            temperature: t,
            pressure: p,
            converged: r.success,
            iterations: r.iterations,
            gibbs: r.gibbs,
            element_residual: r.element_residual,
            species,
        }
    }

    pub fn print(&self) {
        println!(
            "Equilibrium at {} K, {} bar: {} after {} iterations",
            self.temperature,
            self.pressure,
            if self.converged { "converged" } else { "NOT converged" },
            self.iterations
        );
        println!("  G = {:.4} kJ, element residual {:.2e}", self.gibbs, self.element_residual);
        print_species(&self.species);
    }
}

#[derive(Serialize, Debug)]
pub struct FlameReport {
    pub temperature: Option<f64>,
    pub inlet_enthalpy: f64,
    pub status: &'static str,
    pub iterations: usize,
    pub species: Vec<SpeciesAmount>,
}

impl FlameReport {
    pub fn new(r: &FlameResult, species: Vec<SpeciesAmount>) -> Self {
        Self {
            temperature: r.temperature,
            inlet_enthalpy: r.inlet_enthalpy,
            status: status_key(r.status),
            iterations: r.iterations,
            species,
        }
    }

    pub fn print(&self) {
        match self.temperature {
            Some(t) => println!("Flame temperature: {t:.2} K ({}, {} iterations)", self.status, self.iterations),
            None => println!("No flame temperature in the search bracket"),
        }
        println!("  H0 = {:.4} kJ", self.inlet_enthalpy);
        print_species(&self.species);
    }
}

#[derive(Serialize, Debug)]
pub struct IsentropicReport {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub velocity: Option<f64>,
    pub mach: Option<f64>,
    pub status: &'static str,
    pub iterations: usize,
    pub species: Vec<SpeciesAmount>,
}

impl IsentropicReport {
    pub fn new(r: &IsentropicResult, species: Vec<SpeciesAmount>) -> Self {
        Self {
            temperature: r.temperature,
            pressure: r.pressure,
            velocity: r.velocity,
            mach: r.mach,
            status: status_key(r.status),
            iterations: r.iterations,
            species,
        }
    }

    pub fn print(&self) {
        match (self.temperature, self.pressure, self.velocity, self.mach) {
            (Some(t), Some(p), Some(v), Some(m)) => println!(
                "Outlet: T = {t:.2} K, P = {p:.4} bar, v = {v:.1} m/s, M = {m:.3} ({})",
                self.status
            ),
            (_, Some(p), _, _) => {
                println!("No outlet temperature matches the inlet entropy at {p:.4} bar")
            }
            _ => println!("Target Mach number not reached in the pressure bracket"),
        }
        print_species(&self.species);
    }
}

#[derive(Serialize, Debug)]
pub struct NozzleRow {
    pub pressure: f64,
    pub temperature: Option<f64>,
    pub velocity: Option<f64>,
    pub mach: Option<f64>,
    pub area: Option<f64>,
    pub thrust: Option<f64>,
    pub isp: Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct NozzleReport {
    pub mass_flow: f64,
    pub ambient: f64,
    pub num_converged: usize,
    pub num_failed: usize,
    pub points: Vec<NozzleRow>,
}

impl NozzleReport {
    pub fn new(sweep: &NozzleSweep, ambient: f64) -> Self {
        let points = sweep
            .pressures
            .iter()
            .zip(&sweep.points)
            .map(|(&p, pt)| NozzleRow {
                pressure: p,
                temperature: pt.as_ref().map(|pt| pt.temperature_k()),
                velocity: pt.as_ref().map(|pt| pt.velocity_mps()),
                mach: pt.as_ref().map(|pt| pt.mach_number()),
                area: pt.as_ref().map(|pt| pt.area_m2()),
                thrust: pt.as_ref().map(|pt| pt.thrust_n()),
                isp: pt.as_ref().map(|pt| pt.isp_s()),
            })
            .collect();
        Self {
            mass_flow: sweep.mass_flow_kgps(),
            ambient,
            num_converged: sweep.num_converged,
            num_failed: sweep.num_failed,
            points,
        }
    }

    pub fn print(&self) {
        println!(
            "Nozzle sweep: mdot = {:.5} kg/s, Pa = {} bar ({} converged, {} failed)",
            self.mass_flow, self.ambient, self.num_converged, self.num_failed
        );
        println!(
            "  {:>9} {:>9} {:>9} {:>7} {:>11} {:>10} {:>8}",
            "P bar", "T K", "v m/s", "M", "A m2", "F N", "Isp s"
        );
        for row in &self.points {
            match (row.temperature, row.velocity, row.mach, row.area, row.thrust, row.isp) {
                (Some(t), Some(v), Some(m), Some(a), Some(f), Some(isp)) => println!(
                    "  {:>9.4} {:>9.2} {:>9.1} {:>7.3} {:>11.4e} {:>10.3} {:>8.2}",
                    row.pressure, t, v, m, a, f, isp
                ),
                _ => println!("  {:>9.4} failed", row.pressure),
            }
        }
    }
}

fn print_species(species: &[SpeciesAmount]) {
    for s in species {
        println!("  {:<8} {:>14.6e} mol  x = {:.6}", s.name, s.moles, s.fraction);
    }
}
