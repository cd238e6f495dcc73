//! Caller-owned mixture buffer shared by the property model and the solvers.

use crate::database::SpeciesDatabase;
use crate::error::{ThermoError, ThermoResult};
use hg_core::{SpeciesId, ensure_non_negative, ensure_positive};

/// Temperature of a mixture: one shared value or one per species (blending of streams
/// entering at different temperatures).
#[derive(Debug, Clone, PartialEq)]
pub enum Temperatures {
    Uniform(f64),
    PerSpecies(Vec<f64>),
}

/// Species, amounts, temperature and pressure of one mixture.
///
/// Invariants checked on every mutation: ids are unique, `amounts.len() == ids.len()`,
/// amounts are finite and non-negative, temperatures and pressure are finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureState {
    ids: Vec<SpeciesId>,
    amounts: Vec<f64>,
    temperature: Temperatures,
    pressure: f64,
}

impl MixtureState {
    /// Mixture at a single shared temperature `t` (K) and pressure `p` (bar).
    pub fn new(ids: Vec<SpeciesId>, amounts: Vec<f64>, t: f64, p: f64) -> ThermoResult<Self> {
        Self::build(ids, amounts, Temperatures::Uniform(t), p)
    }

    /// Mixture whose species enter at individual temperatures.
    pub fn with_temperatures(
        ids: Vec<SpeciesId>,
        amounts: Vec<f64>,
        temperatures: Vec<f64>,
        p: f64,
    ) -> ThermoResult<Self> {
        Self::build(ids, amounts, Temperatures::PerSpecies(temperatures), p)
    }

    fn build(
        ids: Vec<SpeciesId>,
        amounts: Vec<f64>,
        temperature: Temperatures,
        p: f64,
    ) -> ThermoResult<Self> {
        if ids.is_empty() {
            return Err(ThermoError::InvalidArg {
                what: "mixture has no species",
            });
        }
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(ThermoError::InvalidArg {
                    what: "duplicate species id in mixture",
                });
            }
        }
        let mut state = Self {
            ids,
            amounts: Vec::new(),
            temperature: Temperatures::Uniform(1.0),
            pressure: 1.0,
        };
        state.set_amounts(amounts)?;
        state.set_temperatures(temperature)?;
        state.set_pressure(p)?;
        Ok(state)
    }

    pub fn ids(&self) -> &[SpeciesId] {
        &self.ids
    }

    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn temperature(&self) -> &Temperatures {
        &self.temperature
    }

    /// Pressure, bar.
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Temperature seen by species `i`.
    pub fn temperature_of(&self, i: usize) -> f64 {
        match &self.temperature {
            Temperatures::Uniform(t) => *t,
            Temperatures::PerSpecies(ts) => ts[i],
        }
    }

    pub fn set_amounts(&mut self, amounts: Vec<f64>) -> ThermoResult<()> {
        if amounts.len() != self.ids.len() {
            return Err(ThermoError::LengthMismatch {
                what: "amounts",
                expected: self.ids.len(),
                got: amounts.len(),
            });
        }
        for &n in &amounts {
            ensure_non_negative(n, "species amount")?;
        }
        self.amounts = amounts;
        Ok(())
    }

    /// Switch to a single shared temperature.
    pub fn set_temperature(&mut self, t: f64) -> ThermoResult<()> {
        self.set_temperatures(Temperatures::Uniform(t))
    }

    pub fn set_temperatures(&mut self, temperature: Temperatures) -> ThermoResult<()> {
        match &temperature {
            Temperatures::Uniform(t) => {
                ensure_positive(*t, "temperature")?;
            }
            Temperatures::PerSpecies(ts) => {
                if ts.len() != self.ids.len() {
                    return Err(ThermoError::LengthMismatch {
                        what: "temperatures",
                        expected: self.ids.len(),
                        got: ts.len(),
                    });
                }
                for &t in ts {
                    ensure_positive(t, "temperature")?;
                }
            }
        }
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_pressure(&mut self, p: f64) -> ThermoResult<()> {
        self.pressure = ensure_positive(p, "pressure")?;
        Ok(())
    }

    pub fn total_moles(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Normalised mole fractions; fails when the mixture holds no moles.
    pub fn mole_fractions(&self) -> ThermoResult<Vec<f64>> {
        let total = self.total_moles();
        if total <= 0.0 {
            return Err(ThermoError::NonPhysical {
                what: "total moles must be positive",
            });
        }
        Ok(self.amounts.iter().map(|n| n / total).collect())
    }

    /// Mole-weighted mean temperature, K.
    pub fn average_temperature(&self) -> ThermoResult<f64> {
        match &self.temperature {
            Temperatures::Uniform(t) => Ok(*t),
            Temperatures::PerSpecies(ts) => {
                let total = self.total_moles();
                if total <= 0.0 {
                    return Err(ThermoError::NonPhysical {
                        what: "total moles must be positive",
                    });
                }
                let weighted: f64 = ts.iter().zip(&self.amounts).map(|(t, n)| t * n).sum();
                Ok(weighted / total)
            }
        }
    }

    /// Moles of each element, in order of first appearance across the species list.
    pub fn element_totals<D: SpeciesDatabase + ?Sized>(
        &self,
        db: &D,
    ) -> ThermoResult<Vec<(String, f64)>> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for (id, n) in self.ids.iter().zip(&self.amounts) {
            let record = db.record(*id)?;
            for (symbol, count) in record.elements() {
                match totals.iter_mut().find(|(s, _)| s == symbol) {
                    Some((_, total)) => *total += count * n,
                    None => totals.push((symbol.to_string(), count * n)),
                }
            }
        }
        Ok(totals)
    }

    /// Temperature interval over which every species in the mixture is valid.
    pub fn common_temperature_range<D: SpeciesDatabase + ?Sized>(
        &self,
        db: &D,
    ) -> ThermoResult<(f64, f64)> {
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        for id in &self.ids {
            let range = db.record(*id)?.range();
            lo = lo.max(range.low);
            hi = hi.min(range.high);
        }
        if lo >= hi {
            return Err(ThermoError::InvalidArg {
                what: "species temperature ranges do not overlap",
            });
        }
        Ok((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_table;

    fn ids(db: &impl SpeciesDatabase, names: &[&str]) -> Vec<SpeciesId> {
        db.ids_of(names).unwrap()
    }

    #[test]
    fn rejects_length_mismatch() {
        let db = builtin_table();
        let err = MixtureState::new(ids(&db, &["H2", "O2"]), vec![1.0], 300.0, 1.0).unwrap_err();
        assert!(matches!(err, ThermoError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_negative_amount_and_duplicates() {
        let db = builtin_table();
        assert!(MixtureState::new(ids(&db, &["H2", "O2"]), vec![1.0, -0.1], 300.0, 1.0).is_err());
        assert!(MixtureState::new(ids(&db, &["H2", "H2"]), vec![1.0, 1.0], 300.0, 1.0).is_err());
        assert!(MixtureState::new(ids(&db, &["H2"]), vec![1.0], 300.0, 0.0).is_err());
    }

    #[test]
    fn mole_fractions_and_average_temperature() {
        let db = builtin_table();
        let mix = MixtureState::with_temperatures(
            ids(&db, &["H2", "O2"]),
            vec![3.0, 1.0],
            vec![300.0, 700.0],
            1.0,
        )
        .unwrap();
        let x = mix.mole_fractions().unwrap();
        assert_eq!(x, vec![0.75, 0.25]);
        assert!((mix.average_temperature().unwrap() - 400.0).abs() < 1e-12);
        assert_eq!(mix.temperature_of(1), 700.0);
    }

    #[test]
    fn zero_moles_has_no_fractions() {
        let db = builtin_table();
        let mix = MixtureState::new(ids(&db, &["H2"]), vec![0.0], 300.0, 1.0).unwrap();
        assert!(mix.mole_fractions().is_err());
    }

    #[test]
    fn element_totals_count_atoms() {
        let db = builtin_table();
        let mix =
            MixtureState::new(ids(&db, &["H2", "O2", "H2O"]), vec![2.0, 1.0, 0.5], 300.0, 1.0)
                .unwrap();
        let totals = mix.element_totals(&db).unwrap();
        assert_eq!(totals, vec![("H".to_string(), 5.0), ("O".to_string(), 2.5)]);
    }

    #[test]
    fn common_range_is_intersection() {
        let db = builtin_table();
        let mix = MixtureState::new(ids(&db, &["H2", "N2"]), vec![1.0, 1.0], 300.0, 1.0).unwrap();
        assert_eq!(mix.common_temperature_range(&db).unwrap(), (300.0, 3500.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fractions_sum_to_one(amounts in prop::collection::vec(0.0_f64..10.0, 3)) {
                prop_assume!(amounts.iter().sum::<f64>() > 1e-9);
                let db = builtin_table();
                let mix = MixtureState::new(ids(&db, &["H2", "O2", "N2"]), amounts, 800.0, 2.0)
                    .unwrap();
                let x = mix.mole_fractions().unwrap();
                prop_assert!((x.iter().sum::<f64>() - 1.0).abs() < 1e-12);
                prop_assert!(x.iter().all(|xi| (0.0..=1.0).contains(xi)));
            }
        }
    }
}
