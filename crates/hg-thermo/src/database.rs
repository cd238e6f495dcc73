//! Species database provider and named-mixture resolution.
//!
//! The solvers only see resolved species ids and amounts; name lookup and expansion of
//! named mixtures (e.g. `Air`) into their constituent species happen here.

use std::collections::HashMap;

use crate::error::{ThermoError, ThermoResult};
use crate::mixture::MixtureState;
use crate::species::SpeciesRecord;
use hg_core::{SpeciesId, ensure_non_negative, ensure_positive};

/// Tolerance on the percentage sum of a named mixture.
const PERCENT_SUM_TOL: f64 = 1e-6;

/// Read-only access to species records and named mixtures.
pub trait SpeciesDatabase {
    /// Number of species records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, id: SpeciesId) -> ThermoResult<&SpeciesRecord>;

    /// Id of the species named `name`, if it is a species (not a mixture).
    fn id_of(&self, name: &str) -> Option<SpeciesId>;

    fn mixture(&self, name: &str) -> Option<&NamedMixture>;

    /// Resolve a list of species names, failing on the first unknown one.
    fn ids_of(&self, names: &[&str]) -> ThermoResult<Vec<SpeciesId>> {
        names
            .iter()
            .map(|name| {
                self.id_of(name).ok_or_else(|| ThermoError::UnknownSpecies {
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

/// One species of a named mixture and its share in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureComponent {
    pub species: SpeciesId,
    pub percent: f64,
}

/// A named blend of species, stored flattened to plain species.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMixture {
    name: String,
    components: Vec<MixtureComponent>,
}

impl NamedMixture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[MixtureComponent] {
        &self.components
    }
}

/// In-memory species table.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    records: Vec<SpeciesRecord>,
    index: HashMap<String, usize>,
    mixtures: Vec<NamedMixture>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.mixtures.iter().any(|m| m.name == name)
    }

    /// Add a species record; names must be unique across species and mixtures.
    pub fn insert(&mut self, record: SpeciesRecord) -> ThermoResult<SpeciesId> {
        if self.name_taken(record.name()) {
            return Err(ThermoError::InvalidRecord {
                name: record.name().to_string(),
                what: "name already used",
            });
        }
        let index = self.records.len();
        self.index.insert(record.name().to_string(), index);
        self.records.push(record);
        Ok(SpeciesId::from_index(index as u32))
    }

    /// Register a named mixture from `(name, percent)` pairs.
    ///
    /// Components may themselves be named mixtures; they are flattened into plain species
    /// with their percentages scaled. The percentages must sum to 100.
    pub fn add_mixture(&mut self, name: &str, parts: &[(&str, f64)]) -> ThermoResult<()> {
        let invalid = |what| ThermoError::InvalidMixture {
            name: name.to_string(),
            what,
        };
        if name.trim().is_empty() {
            return Err(invalid("empty name"));
        }
        if self.name_taken(name) {
            return Err(invalid("name already used"));
        }
        if parts.is_empty() {
            return Err(invalid("no components"));
        }

        let mut sum = 0.0;
        let mut components: Vec<MixtureComponent> = Vec::new();
        for &(part, percent) in parts {
            ensure_positive(percent, "mixture percentage")?;
            sum += percent;
            if let Some(species) = self.id_of(part) {
                components.push(MixtureComponent { species, percent });
            } else if let Some(nested) = self.mixture(part) {
                components.extend(nested.components.iter().map(|c| MixtureComponent {
                    species: c.species,
                    percent: c.percent * percent / 100.0,
                }));
            } else {
                return Err(ThermoError::UnknownSpecies {
                    name: part.to_string(),
                });
            }
        }
        if (sum - 100.0).abs() > PERCENT_SUM_TOL {
            return Err(invalid("percentages do not sum to 100"));
        }

        self.mixtures.push(NamedMixture {
            name: name.to_string(),
            components,
        });
        Ok(())
    }

    pub fn records(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (SpeciesId::from_index(i as u32), r))
    }

    pub fn mixtures(&self) -> &[NamedMixture] {
        &self.mixtures
    }

    /// Species and mixture names containing `pattern` (case-insensitive), species first.
    pub fn find(&self, pattern: &str) -> Vec<&str> {
        let needle = pattern.to_ascii_lowercase();
        let species = self.records.iter().map(|r| r.name());
        let mixtures = self.mixtures.iter().map(|m| m.name.as_str());
        species
            .chain(mixtures)
            .filter(|name| name.to_ascii_lowercase().contains(&needle))
            .collect()
    }
}

impl SpeciesDatabase for SpeciesTable {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, id: SpeciesId) -> ThermoResult<&SpeciesRecord> {
        self.records.get(id.index()).ok_or(ThermoError::IndexOob {
            index: id.index(),
            len: self.records.len(),
        })
    }

    fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.index
            .get(name)
            .map(|&i| SpeciesId::from_index(i as u32))
    }

    fn mixture(&self, name: &str) -> Option<&NamedMixture> {
        self.mixtures.iter().find(|m| m.name == name)
    }
}

/// Flat species list produced by [`resolve_named`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMixture {
    pub ids: Vec<SpeciesId>,
    pub amounts: Vec<f64>,
    pub temperatures: Vec<f64>,
}

impl ResolvedMixture {
    /// Build a mixture state at pressure `p`, keeping per-species temperatures only when
    /// they differ.
    pub fn into_state(self, p: f64) -> ThermoResult<MixtureState> {
        let uniform = self
            .temperatures
            .first()
            .copied()
            .filter(|t0| self.temperatures.iter().all(|t| t == t0));
        match uniform {
            Some(t) => MixtureState::new(self.ids, self.amounts, t, p),
            None => MixtureState::with_temperatures(self.ids, self.amounts, self.temperatures, p),
        }
    }
}

/// Expand `(name, amount, temperature)` entries into plain species.
///
/// Named mixtures contribute `amount * percent / 100` of each component at the entry's
/// temperature. Repeated species are merged: amounts add up and the temperature becomes
/// the amount-weighted mean.
pub fn resolve_named<D: SpeciesDatabase + ?Sized>(
    db: &D,
    entries: &[(&str, f64, f64)],
) -> ThermoResult<ResolvedMixture> {
    if entries.is_empty() {
        return Err(ThermoError::InvalidArg {
            what: "no reactant entries",
        });
    }

    let mut out = ResolvedMixture {
        ids: Vec::new(),
        amounts: Vec::new(),
        temperatures: Vec::new(),
    };
    let mut push = |id: SpeciesId, n: f64, t: f64| match out.ids.iter().position(|x| *x == id) {
        Some(i) => {
            let total = out.amounts[i] + n;
            if total > 0.0 {
                out.temperatures[i] = (out.temperatures[i] * out.amounts[i] + t * n) / total;
            }
            out.amounts[i] = total;
        }
        None => {
            out.ids.push(id);
            out.amounts.push(n);
            out.temperatures.push(t);
        }
    };

    for &(name, amount, t) in entries {
        ensure_non_negative(amount, "reactant amount")?;
        ensure_positive(t, "reactant temperature")?;
        if let Some(id) = db.id_of(name) {
            push(id, amount, t);
        } else if let Some(mixture) = db.mixture(name) {
            for c in mixture.components() {
                push(c.species, amount * c.percent / 100.0, t);
            }
        } else {
            return Err(ThermoError::UnknownSpecies {
                name: name.to_string(),
            });
        }
    }
    Ok(out)
}
