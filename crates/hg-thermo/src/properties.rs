//! Ideal-gas property model over NASA-7 polynomials.
//!
//! Per species (molar basis):
//! - `cp = R (c1 + c2 T + c3 T^2 + c4 T^3 + c5 T^4)`
//! - `h  = R (c6 + c1 T + c2 T^2/2 + c3 T^3/3 + c4 T^4/4 + c5 T^5/5)`
//! - `s  = R (c7 + c1 ln T + c2 T + c3 T^2/2 + c4 T^3/3 + c5 T^4/4) - R ln(P_i / P_ref)`
//! - `cv = cp - R`, `g = h - T s`
//!
//! The pressure term only applies to gases with a non-zero partial pressure. Mixture values
//! are mole-weighted sums (extensive: kJ/K, kJ) except molar mass, gas constant, gamma and
//! sound speed.

use core::str::FromStr;

use crate::database::SpeciesDatabase;
use crate::error::{ThermoError, ThermoResult};
use crate::mixture::MixtureState;
use crate::species::SpeciesRecord;
use hg_core::constants::{P_REF_BAR, R};
use hg_core::ensure_non_negative;

/// Molar properties of one species at (T, P).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesProperties {
    /// kJ/(mol K)
    pub cp: f64,
    /// kJ/(mol K)
    pub cv: f64,
    /// kJ/mol
    pub h: f64,
    /// kJ/(mol K)
    pub s: f64,
    /// kJ/mol
    pub g: f64,
}

/// Mixture property selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// g/mol
    MolarMass,
    /// kJ/K
    Cp,
    /// kJ/K
    Cv,
    /// kJ
    Enthalpy,
    /// kJ/K
    Entropy,
    /// kJ
    Gibbs,
    /// kJ/(kg K)
    GasConstant,
    Gamma,
    /// m/s
    SoundSpeed,
}

impl Property {
    pub const ALL: [Property; 9] = [
        Property::MolarMass,
        Property::Cp,
        Property::Cv,
        Property::Enthalpy,
        Property::Entropy,
        Property::Gibbs,
        Property::GasConstant,
        Property::Gamma,
        Property::SoundSpeed,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Property::MolarMass => "Mm",
            Property::Cp => "Cp",
            Property::Cv => "Cv",
            Property::Enthalpy => "H",
            Property::Entropy => "S",
            Property::Gibbs => "G",
            Property::GasConstant => "Rg",
            Property::Gamma => "gamma",
            Property::SoundSpeed => "a",
        }
    }

    fn needs_partial_pressures(&self) -> bool {
        matches!(self, Property::Entropy | Property::Gibbs)
    }
}

impl FromStr for Property {
    type Err = ThermoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.key().eq_ignore_ascii_case(s.trim()))
            .ok_or(ThermoError::InvalidArg {
                what: "unknown property name",
            })
    }
}

/// Aggregated mixture properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureProperties {
    /// mol
    pub total_moles: f64,
    /// Mole-weighted mean temperature, K
    pub temperature: f64,
    /// g/mol
    pub molar_mass: f64,
    /// kJ/K
    pub cp: f64,
    /// kJ/K
    pub cv: f64,
    /// kJ
    pub h: f64,
    /// kJ/K
    pub s: f64,
    /// kJ
    pub g: f64,
    /// kJ/(kg K)
    pub gas_constant: f64,
    pub gamma: f64,
    /// m/s
    pub sound_speed: f64,
}

/// Standard-state molar Gibbs energy over RT, `h/RT - s°/R`, at `t`.
pub fn standard_gibbs_rt(record: &SpeciesRecord, t: f64) -> ThermoResult<f64> {
    let seg = record.segment(t)?;
    Ok(seg.h_r(t) / t - seg.s_r(t))
}

fn species_at(record: &SpeciesRecord, t: f64, partial: f64) -> ThermoResult<SpeciesProperties> {
    let seg = record.segment(t)?;
    let cp = R * seg.cp_r(t);
    let h = R * seg.h_r(t);
    let mut s = R * seg.s_r(t);
    if record.is_gas() && partial > 0.0 {
        s -= R * (partial / P_REF_BAR).ln();
    }
    Ok(SpeciesProperties {
        cp,
        cv: cp - R,
        h,
        s,
        g: h - t * s,
    })
}

/// Properties of a pure species at temperature `t` (K) and pressure `p` (bar).
///
/// Condensed species carry no pressure term in their entropy.
pub fn evaluate(record: &SpeciesRecord, t: f64, p: f64) -> ThermoResult<SpeciesProperties> {
    ensure_non_negative(p, "pressure")?;
    species_at(record, t, p)
}

fn require_moles(total: f64) -> ThermoResult<f64> {
    if total > 0.0 {
        Ok(total)
    } else {
        Err(ThermoError::NonPhysical {
            what: "total moles must be positive",
        })
    }
}

fn require_gas<D: SpeciesDatabase + ?Sized>(db: &D, mix: &MixtureState) -> ThermoResult<()> {
    for id in mix.ids() {
        let record = db.record(*id)?;
        if !record.is_gas() {
            return Err(ThermoError::PhaseConsistency {
                species: record.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Mole-weighted sum of a per-species property.
fn weighted_sum<D, F>(db: &D, mix: &MixtureState, partial: bool, f: F) -> ThermoResult<f64>
where
    D: SpeciesDatabase + ?Sized,
    F: Fn(&SpeciesProperties) -> f64,
{
    let total = mix.total_moles();
    let mut sum = 0.0;
    for (i, (id, &n)) in mix.ids().iter().zip(mix.amounts()).enumerate() {
        let record = db.record(*id)?;
        let p_i = if partial && total > 0.0 {
            mix.pressure() * n / total
        } else {
            0.0
        };
        let props = species_at(record, mix.temperature_of(i), p_i)?;
        sum += n * f(&props);
    }
    Ok(sum)
}

fn molar_mass<D: SpeciesDatabase + ?Sized>(db: &D, mix: &MixtureState) -> ThermoResult<f64> {
    let total = require_moles(mix.total_moles())?;
    let mut sum = 0.0;
    for (id, &n) in mix.ids().iter().zip(mix.amounts()) {
        sum += n * db.record(*id)?.molar_mass();
    }
    Ok(sum / total)
}

/// A single mixture property.
///
/// Entropy and Gibbs energy are only defined for all-gas mixtures; requesting either on a
/// mixture holding a condensed species is a [`ThermoError::PhaseConsistency`].
pub fn mixture_property<D: SpeciesDatabase + ?Sized>(
    db: &D,
    mix: &MixtureState,
    property: Property,
) -> ThermoResult<f64> {
    if property.needs_partial_pressures() {
        require_gas(db, mix)?;
    }
    match property {
        Property::MolarMass => molar_mass(db, mix),
        Property::Cp => weighted_sum(db, mix, false, |p| p.cp),
        Property::Cv => weighted_sum(db, mix, false, |p| p.cv),
        Property::Enthalpy => weighted_sum(db, mix, false, |p| p.h),
        Property::Entropy => weighted_sum(db, mix, true, |p| p.s),
        Property::Gibbs => weighted_sum(db, mix, true, |p| p.g),
        Property::GasConstant => Ok(R / molar_mass(db, mix)? * 1000.0),
        Property::Gamma => {
            let cp = weighted_sum(db, mix, false, |p| p.cp)?;
            let cv = weighted_sum(db, mix, false, |p| p.cv)?;
            require_moles(mix.total_moles())?;
            Ok(cp / cv)
        }
        Property::SoundSpeed => {
            let gamma = mixture_property(db, mix, Property::Gamma)?;
            let rg = mixture_property(db, mix, Property::GasConstant)?;
            Ok((gamma * rg * 1000.0 * mix.average_temperature()?).sqrt())
        }
    }
}

/// All mixture properties at once. The mixture must be all-gas.
pub fn evaluate_mixture<D: SpeciesDatabase + ?Sized>(
    db: &D,
    mix: &MixtureState,
) -> ThermoResult<MixtureProperties> {
    require_gas(db, mix)?;
    let total_moles = require_moles(mix.total_moles())?;
    let temperature = mix.average_temperature()?;

    let mut acc = SpeciesProperties {
        cp: 0.0,
        cv: 0.0,
        h: 0.0,
        s: 0.0,
        g: 0.0,
    };
    let mut mass = 0.0;
    for (i, (id, &n)) in mix.ids().iter().zip(mix.amounts()).enumerate() {
        let record = db.record(*id)?;
        let props = species_at(record, mix.temperature_of(i), mix.pressure() * n / total_moles)?;
        acc.cp += n * props.cp;
        acc.cv += n * props.cv;
        acc.h += n * props.h;
        acc.s += n * props.s;
        acc.g += n * props.g;
        mass += n * record.molar_mass();
    }

    let molar_mass = mass / total_moles;
    let gas_constant = R / molar_mass * 1000.0;
    let gamma = acc.cp / acc.cv;
    Ok(MixtureProperties {
        total_moles,
        temperature,
        molar_mass,
        cp: acc.cp,
        cv: acc.cv,
        h: acc.h,
        s: acc.s,
        g: acc.g,
        gas_constant,
        gamma,
        sound_speed: (gamma * gas_constant * 1000.0 * temperature).sqrt(),
    })
}

/// Molar property of one named species at (T, P).
///
/// Extensive quantities are per mole; `GasConstant`, `Gamma` and `SoundSpeed` are those of the
/// pure species.
pub fn single_property<D: SpeciesDatabase + ?Sized>(
    db: &D,
    name: &str,
    property: Property,
    t: f64,
    p: f64,
) -> ThermoResult<f64> {
    let id = db.id_of(name).ok_or_else(|| ThermoError::UnknownSpecies {
        name: name.to_string(),
    })?;
    let record = db.record(id)?;
    let props = evaluate(record, t, p)?;
    let rg = R / record.molar_mass() * 1000.0;
    Ok(match property {
        Property::MolarMass => record.molar_mass(),
        Property::Cp => props.cp,
        Property::Cv => props.cv,
        Property::Enthalpy => props.h,
        Property::Entropy => props.s,
        Property::Gibbs => props.g,
        Property::GasConstant => rg,
        Property::Gamma => props.cp / props.cv,
        Property::SoundSpeed => (props.cp / props.cv * rg * 1000.0 * t).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_table;
    use crate::species::{Phase, TemperatureRange};
    use crate::database::SpeciesTable;
    use hg_core::{Tolerances, nearly_equal};

    fn water_liquid() -> SpeciesRecord {
        // Constant-cp liquid water, adequate for phase checks.
        SpeciesRecord::new(
            "H2O(L)",
            Phase::Liquid,
            &[("H", 2.0), ("O", 1.0)],
            TemperatureRange::new(273.15, 373.15, 600.0),
            [9.07, 0.0, 0.0, 0.0, 0.0, -37_100.0, -37.0],
            [9.07, 0.0, 0.0, 0.0, 0.0, -37_100.0, -37.0],
        )
        .unwrap()
    }

    fn table_with_liquid() -> SpeciesTable {
        let mut db = builtin_table();
        db.insert(water_liquid()).unwrap();
        db
    }

    #[test]
    fn cv_is_cp_minus_r() {
        let db = builtin_table();
        for (_, record) in db.records() {
            let props = evaluate(record, 1500.0, 1.0).unwrap();
            assert!((props.cp - props.cv - R).abs() < 1e-15);
        }
    }

    #[test]
    fn water_formation_enthalpy() {
        let db = builtin_table();
        let h = single_property(&db, "H2O", Property::Enthalpy, 298.15, 1.0).unwrap();
        assert!((h + 241.8).abs() < 0.1, "h(H2O, 298.15 K) = {h}");
    }

    #[test]
    fn pressure_term_lowers_entropy() {
        let db = builtin_table();
        let s1 = single_property(&db, "O2", Property::Entropy, 1000.0, 1.0).unwrap();
        let s10 = single_property(&db, "O2", Property::Entropy, 1000.0, 10.0).unwrap();
        assert!((s1 - s10 - R * 10f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_pressure_skips_log_term() {
        let db = builtin_table();
        let s0 = single_property(&db, "O2", Property::Entropy, 1000.0, 0.0).unwrap();
        let s1 = single_property(&db, "O2", Property::Entropy, 1000.0, 1.0).unwrap();
        assert_eq!(s0, s1);
    }

    #[test]
    fn out_of_range_temperature_errors() {
        let db = builtin_table();
        let err = single_property(&db, "H2O", Property::Cp, 4000.0, 1.0).unwrap_err();
        assert!(matches!(err, ThermoError::OutOfRange { .. }));
    }

    #[test]
    fn mixture_entropy_rejects_condensed_species() {
        let db = table_with_liquid();
        let ids = db.ids_of(&["H2O", "H2O(L)"]).unwrap();
        let mix = MixtureState::new(ids, vec![1.0, 1.0], 350.0, 1.0).unwrap();
        for prop in [Property::Entropy, Property::Gibbs] {
            let err = mixture_property(&db, &mix, prop).unwrap_err();
            assert!(matches!(err, ThermoError::PhaseConsistency { .. }));
        }
        assert!(matches!(
            evaluate_mixture(&db, &mix),
            Err(ThermoError::PhaseConsistency { .. })
        ));
        // Enthalpy stays defined.
        assert!(mixture_property(&db, &mix, Property::Enthalpy).is_ok());
    }

    #[test]
    fn condensed_single_species_has_no_pressure_term() {
        let db = table_with_liquid();
        let s1 = single_property(&db, "H2O(L)", Property::Entropy, 300.0, 1.0).unwrap();
        let s5 = single_property(&db, "H2O(L)", Property::Entropy, 300.0, 5.0).unwrap();
        assert_eq!(s1, s5);
    }

    #[test]
    fn mixture_aggregates_match_single_property() {
        let db = builtin_table();
        let ids = db.ids_of(&["H2", "O2"]).unwrap();
        let mix = MixtureState::new(ids, vec![2.0, 1.0], 1200.0, 3.0).unwrap();
        let all = evaluate_mixture(&db, &mix).unwrap();
        let tol = Tolerances::new(1e-12, 1e-12);

        for prop in Property::ALL {
            let one = mixture_property(&db, &mix, prop).unwrap();
            let agg = match prop {
                Property::MolarMass => all.molar_mass,
                Property::Cp => all.cp,
                Property::Cv => all.cv,
                Property::Enthalpy => all.h,
                Property::Entropy => all.s,
                Property::Gibbs => all.g,
                Property::GasConstant => all.gas_constant,
                Property::Gamma => all.gamma,
                Property::SoundSpeed => all.sound_speed,
            };
            assert!(nearly_equal(one, agg, tol), "{}: {one} vs {agg}", prop.key());
        }

        // Partial pressures: H2 at 2 bar, O2 at 1 bar.
        let h2 = single_property(&db, "H2", Property::Entropy, 1200.0, 2.0).unwrap();
        let o2 = single_property(&db, "O2", Property::Entropy, 1200.0, 1.0).unwrap();
        assert!(nearly_equal(all.s, 2.0 * h2 + o2, tol));
        assert!(nearly_equal(all.g, all.h - 1200.0 * all.s, Tolerances::new(1e-9, 1e-12)));
    }

    #[test]
    fn air_sound_speed_is_plausible() {
        let db = builtin_table();
        let air = crate::database::resolve_named(&db, &[("Air", 1.0, 300.0)])
            .unwrap()
            .into_state(1.0)
            .unwrap();
        let a = mixture_property(&db, &air, Property::SoundSpeed).unwrap();
        assert!((a - 347.0).abs() < 3.0, "a(air, 300 K) = {a}");
        let mm = mixture_property(&db, &air, Property::MolarMass).unwrap();
        assert!((mm - 28.96).abs() < 0.02, "Mm(air) = {mm}");
    }

    #[test]
    fn intensive_properties_need_moles() {
        let db = builtin_table();
        let ids = db.ids_of(&["N2"]).unwrap();
        let mix = MixtureState::new(ids, vec![0.0], 300.0, 1.0).unwrap();
        assert_eq!(mixture_property(&db, &mix, Property::Enthalpy).unwrap(), 0.0);
        assert!(mixture_property(&db, &mix, Property::MolarMass).is_err());
        assert!(mixture_property(&db, &mix, Property::SoundSpeed).is_err());
    }

    #[test]
    fn property_names_parse() {
        assert_eq!("cp".parse::<Property>().unwrap(), Property::Cp);
        assert_eq!("H".parse::<Property>().unwrap(), Property::Enthalpy);
        assert!("enthalpy".parse::<Property>().is_err());
    }
}
