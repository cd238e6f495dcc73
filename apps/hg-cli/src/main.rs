mod args;
mod error;
mod report;

use std::collections::BTreeMap;
use std::io;

use clap::{Parser, Subcommand};
use hg_process::{ExpansionTarget, InletEnthalpy, flame_temperature, isentropic, nozzle_sweep};
use hg_solver::{EquilibriumConfig, FlowMode, SolverConfig, equilibrate};
use hg_thermo::{MixtureState, Property, SpeciesDatabase, SpeciesTable, builtin_table, single_property};
use serde::Serialize;
use tracing::info;

use crate::args::{FlowArgs, MixtureArgs};
use crate::error::{CliError, CliResult};
use crate::report::{
    EquilibriumReport, FlameReport, IsentropicReport, NozzleReport, PropReport, composition,
};

/// Standard atmosphere, bar.
const STANDARD_AMBIENT_BAR: f64 = 1.01325;

#[derive(Parser)]
#[command(name = "hg-cli")]
#[command(about = "hotgas CLI - thermochemical equilibrium, flame and nozzle calculations", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Properties of a single species
    Prop {
        /// Species name
        name: String,
        /// One property key (Mm, Cp, Cv, H, S, G, Rg, gamma, a); all when omitted
        #[arg(long)]
        property: Option<Property>,
        /// Temperature in K
        #[arg(short, long = "temperature")]
        t: f64,
        /// Partial pressure in bar
        #[arg(short, long = "pressure", default_value_t = 1.0)]
        p: f64,
    },
    /// Chemical equilibrium at fixed temperature and pressure
    Eq {
        #[command(flatten)]
        mixture: MixtureArgs,
    },
    /// Adiabatic flame temperature of a reactant mixture
    Flame {
        #[command(flatten)]
        mixture: MixtureArgs,
        #[command(flatten)]
        flow: FlowArgs,
        /// Inlet enthalpy in kJ instead of the reactant enthalpy
        #[arg(long)]
        enthalpy: Option<f64>,
    },
    /// Isentropic expansion to a pressure or a Mach number
    Isentropic {
        #[command(flatten)]
        mixture: MixtureArgs,
        #[command(flatten)]
        flow: FlowArgs,
        /// Outlet pressure in bar
        #[arg(long, conflicts_with = "mach", required_unless_present = "mach")]
        to: Option<f64>,
        /// Outlet Mach number
        #[arg(long)]
        mach: Option<f64>,
        /// Equilibrate the inlet at its temperature and pressure first
        #[arg(long)]
        equilibrate: bool,
    },
    /// Nozzle expansion over a list of exit pressures
    Nozzle {
        #[command(flatten)]
        mixture: MixtureArgs,
        #[command(flatten)]
        flow: FlowArgs,
        /// Exit pressures in bar, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        pressures: Vec<f64>,
        /// Ambient pressure in bar
        #[arg(long, default_value_t = STANDARD_AMBIENT_BAR)]
        ambient: f64,
        /// Equilibrate the inlet at its temperature and pressure first
        #[arg(long)]
        equilibrate: bool,
    },
    /// List species and named mixtures whose name contains a pattern
    Find {
        pattern: String,
    },
}

fn main() -> CliResult<()> {
    // Logs go to stderr so --json output stays clean.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let db = builtin_table();
    info!(species = db.len(), "species table loaded");

    match cli.command {
        Commands::Prop { name, property, t, p } => cmd_prop(&db, &name, property, t, p, cli.json),
        Commands::Eq { mixture } => cmd_eq(&db, &mixture, cli.json),
        Commands::Flame {
            mixture,
            flow,
            enthalpy,
        } => cmd_flame(&db, &mixture, flow.flow, enthalpy, cli.json),
        Commands::Isentropic {
            mixture,
            flow,
            to,
            mach,
            equilibrate,
        } => {
            let target = match (to, mach) {
                (Some(p), _) => ExpansionTarget::Pressure(p),
                (None, Some(m)) => ExpansionTarget::Mach(m),
                (None, None) => {
                    return Err(CliError::BadArgument {
                        arg: "--to/--mach".into(),
                        what: "one expansion target is required".into(),
                    });
                }
            };
            cmd_isentropic(&db, &mixture, flow.flow, target, equilibrate, cli.json)
        }
        Commands::Nozzle {
            mixture,
            flow,
            pressures,
            ambient,
            equilibrate,
        } => cmd_nozzle(&db, &mixture, flow.flow, &pressures, ambient, equilibrate, cli.json),
        Commands::Find { pattern } => cmd_find(&db, &pattern, cli.json),
    }
}

fn emit<T: Serialize>(report: &T, json: bool, print: impl FnOnce(&T)) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print(report);
    }
    Ok(())
}

fn cmd_prop(
    db: &SpeciesTable,
    name: &str,
    property: Option<Property>,
    t: f64,
    p: f64,
    json: bool,
) -> CliResult<()> {
    let id = db.id_of(name).ok_or_else(|| hg_thermo::ThermoError::UnknownSpecies {
        name: name.to_string(),
    })?;
    let record = db.record(id)?;
    let wanted: Vec<Property> = match property {
        Some(prop) => vec![prop],
        None => Property::ALL.to_vec(),
    };
    let mut values = BTreeMap::new();
    for prop in wanted {
        values.insert(prop.key(), single_property(db, name, prop, t, p)?);
    }
    emit(&PropReport::new(record, t, p, values), json, PropReport::print)
}

fn cmd_eq(db: &SpeciesTable, mixture: &MixtureArgs, json: bool) -> CliResult<()> {
    let resolved = mixture.resolve(db)?;
    let r = equilibrate(
        db,
        &resolved.ids,
        &resolved.amounts,
        mixture.t,
        mixture.p,
        &EquilibriumConfig::default(),
    )?;
    let species = composition(db, &resolved.ids, &r.amounts)?;
    emit(
        &EquilibriumReport::new(&r, mixture.t, mixture.p, species),
        json,
        EquilibriumReport::print,
    )
}

fn cmd_flame(
    db: &SpeciesTable,
    mixture: &MixtureArgs,
    flow: FlowMode,
    enthalpy: Option<f64>,
    json: bool,
) -> CliResult<()> {
    let reactants = mixture.state(db)?;
    let inlet = enthalpy.map_or(InletEnthalpy::FromReactants, InletEnthalpy::Given);
    let r = flame_temperature(db, &reactants, inlet, &SolverConfig::default().with_flow(flow))?;
    let species = composition(db, reactants.ids(), &r.amounts)?;
    emit(&FlameReport::new(&r, species), json, FlameReport::print)
}

/// Inlet state, optionally replaced by its equilibrium composition.
fn inlet_state(db: &SpeciesTable, mixture: &MixtureArgs, equilibrate_first: bool) -> CliResult<MixtureState> {
    let state = mixture.state(db)?;
    if !equilibrate_first {
        return Ok(state);
    }
    let eq = equilibrate(
        db,
        state.ids(),
        state.amounts(),
        mixture.t,
        mixture.p,
        &EquilibriumConfig::default(),
    )?;
    Ok(MixtureState::new(state.ids().to_vec(), eq.amounts, mixture.t, mixture.p)?)
}

fn cmd_isentropic(
    db: &SpeciesTable,
    mixture: &MixtureArgs,
    flow: FlowMode,
    target: ExpansionTarget,
    equilibrate_first: bool,
    json: bool,
) -> CliResult<()> {
    let inlet = inlet_state(db, mixture, equilibrate_first)?;
    let r = isentropic(db, &inlet, target, &SolverConfig::isentropic().with_flow(flow))?;
    let species = composition(db, inlet.ids(), &r.amounts)?;
    emit(&IsentropicReport::new(&r, species), json, IsentropicReport::print)
}

fn cmd_nozzle(
    db: &SpeciesTable,
    mixture: &MixtureArgs,
    flow: FlowMode,
    pressures: &[f64],
    ambient: f64,
    equilibrate_first: bool,
    json: bool,
) -> CliResult<()> {
    let inlet = inlet_state(db, mixture, equilibrate_first)?;
    let sweep = nozzle_sweep(db, &inlet, pressures, ambient, &SolverConfig::isentropic().with_flow(flow))?;
    emit(&NozzleReport::new(&sweep, ambient), json, NozzleReport::print)
}

fn cmd_find(db: &SpeciesTable, pattern: &str, json: bool) -> CliResult<()> {
    let names = db.find(pattern);
    emit(&names, json, |names| {
        if names.is_empty() {
            println!("No species or mixtures match '{pattern}'");
        }
        for name in names {
            println!("  {name}");
        }
    })
}
