//! Mixture arguments of the form `NAME[:AMOUNT][@T]`.

use clap::Args;
use hg_solver::FlowMode;
use hg_thermo::{MixtureState, ResolvedMixture, SpeciesDatabase, resolve_named};

use crate::error::{CliError, CliResult};

#[derive(Args, Debug)]
pub struct MixtureArgs {
    /// Components as NAME[:AMOUNT][@T], comma separated. Amounts default to 0 and
    /// temperatures to --temperature. NAME may be a named mixture such as Air.
    #[arg(short, long = "species", value_delimiter = ',', required = true)]
    pub species: Vec<String>,
    /// Temperature in K
    #[arg(short, long = "temperature")]
    pub t: f64,
    /// Pressure in bar
    #[arg(short, long = "pressure")]
    pub p: f64,
}

#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Composition behaviour: shifting or frozen
    #[arg(long, default_value = "shifting")]
    pub flow: FlowMode,
}

#[derive(Debug, Clone, PartialEq)]
struct Component {
    name: String,
    amount: f64,
    temperature: Option<f64>,
}

fn parse_component(raw: &str) -> CliResult<Component> {
    let bad = |what: &str| CliError::BadArgument {
        arg: raw.to_string(),
        what: what.to_string(),
    };
    let (rest, temperature) = match raw.split_once('@') {
        Some((rest, t)) => (rest, Some(t.trim().parse::<f64>().map_err(|_| bad("temperature after @ is not a number"))?)),
        None => (raw, None),
    };
    let (name, amount) = match rest.split_once(':') {
        Some((name, n)) => (name, n.trim().parse::<f64>().map_err(|_| bad("amount after : is not a number"))?),
        None => (rest, 0.0),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(bad("missing species name"));
    }
    Ok(Component {
        name: name.to_string(),
        amount,
        temperature,
    })
}

impl MixtureArgs {
    pub fn resolve<D: SpeciesDatabase + ?Sized>(&self, db: &D) -> CliResult<ResolvedMixture> {
        let parts = self
            .species
            .iter()
            .map(|s| parse_component(s))
            .collect::<CliResult<Vec<_>>>()?;
        let entries: Vec<(&str, f64, f64)> = parts
            .iter()
            .map(|c| (c.name.as_str(), c.amount, c.temperature.unwrap_or(self.t)))
            .collect();
        Ok(resolve_named(db, &entries)?)
    }

    pub fn state<D: SpeciesDatabase + ?Sized>(&self, db: &D) -> CliResult<MixtureState> {
        Ok(self.resolve(db)?.into_state(self.p)?)
    }
}
