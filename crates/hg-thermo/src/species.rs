//! Species records: phase, elemental composition and NASA-7 polynomials.

use crate::error::{ThermoError, ThermoResult};
use core::str::FromStr;

/// Maximum number of distinct elements a single species record may carry.
pub const MAX_ELEMENTS: usize = 4;

/// Physical phase of a species record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Gas,
    Liquid,
    Solid,
}

impl Phase {
    pub fn key(&self) -> &'static str {
        match self {
            Phase::Gas => "G",
            Phase::Liquid => "L",
            Phase::Solid => "S",
        }
    }
}

impl FromStr for Phase {
    type Err = ThermoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" | "gas" => Ok(Phase::Gas),
            "l" | "liquid" => Ok(Phase::Liquid),
            "s" | "solid" => Ok(Phase::Solid),
            _ => Err(ThermoError::InvalidArg {
                what: "unrecognised phase",
            }),
        }
    }
}

/// Standard atomic weight in g/mol for the element symbols the table accepts.
pub fn atomic_weight(symbol: &str) -> Option<f64> {
    let w = match symbol {
        "E" => 5.485_799e-4,
        "H" => 1.007_94,
        "D" => 2.014_102,
        "He" => 4.002_602,
        "Li" => 6.941,
        "Be" => 9.012_182,
        "B" => 10.811,
        "C" => 12.010_7,
        "N" => 14.006_7,
        "O" => 15.999_4,
        "F" => 18.998_403_2,
        "Ne" => 20.179_7,
        "Na" => 22.989_77,
        "Mg" => 24.305_0,
        "Al" => 26.981_538,
        "Si" => 28.085_5,
        "P" => 30.973_761,
        "S" => 32.065,
        "Cl" => 35.453,
        "Ar" => 39.948,
        "K" => 39.098_3,
        "Ca" => 40.078,
        "Ti" => 47.867,
        "Fe" => 55.845,
        "Br" => 79.904,
        "Kr" => 83.798,
        "I" => 126.904_47,
        "Xe" => 131.293,
        _ => return None,
    };
    Some(w)
}

/// One temperature segment of NASA 7-coefficient polynomials.
///
/// Coefficients `c1..c5` describe `cp/R`, `c6` is the enthalpy integration constant and `c7`
/// the entropy integration constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nasa7 {
    pub coeffs: [f64; 7],
}

impl Nasa7 {
    pub const fn new(coeffs: [f64; 7]) -> Self {
        Self { coeffs }
    }

    /// Dimensionless heat capacity cp/R.
    pub fn cp_r(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * c[4])))
    }

    /// Enthalpy over R, in K.
    pub fn h_r(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[5] + t * (c[0] + t * (c[1] / 2.0 + t * (c[2] / 3.0 + t * (c[3] / 4.0 + t * c[4] / 5.0))))
    }

    /// Standard-state entropy over R (no pressure term).
    pub fn s_r(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[6] + c[0] * t.ln() + t * (c[1] + t * (c[2] / 2.0 + t * (c[3] / 3.0 + t * c[4] / 4.0)))
    }
}

/// Validity range `(T_low, T_mid, T_high)` of a record, in K.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureRange {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl TemperatureRange {
    pub const fn new(low: f64, mid: f64, high: f64) -> Self {
        Self { low, mid, high }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.low && t <= self.high
    }
}

/// Immutable species record as consumed by the property model.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRecord {
    name: String,
    phase: Phase,
    elements: Vec<(String, f64)>,
    range: TemperatureRange,
    low: Nasa7,
    high: Nasa7,
    molar_mass: f64,
}

impl SpeciesRecord {
    /// Build and validate a record.
    ///
    /// Rejects empty names, more than [`MAX_ELEMENTS`] elements, unknown element symbols,
    /// non-positive atom counts, non-finite coefficients and ranges not satisfying
    /// `T_low < T_mid < T_high`. The molar mass is derived here and cached.
    pub fn new(
        name: impl Into<String>,
        phase: Phase,
        elements: &[(&str, f64)],
        range: TemperatureRange,
        low: [f64; 7],
        high: [f64; 7],
    ) -> ThermoResult<Self> {
        let name = name.into();
        let invalid = |what| ThermoError::InvalidRecord {
            name: name.clone(),
            what,
        };

        if name.trim().is_empty() {
            return Err(invalid("empty name"));
        }
        if elements.is_empty() {
            return Err(invalid("no elements"));
        }
        if elements.len() > MAX_ELEMENTS {
            return Err(invalid("more than four distinct elements"));
        }
        if !(range.low.is_finite() && range.mid.is_finite() && range.high.is_finite())
            || !(range.low > 0.0 && range.low < range.mid && range.mid < range.high)
        {
            return Err(invalid("temperature range must satisfy 0 < T_low < T_mid < T_high"));
        }
        if low.iter().chain(high.iter()).any(|c| !c.is_finite()) {
            return Err(invalid("non-finite polynomial coefficient"));
        }

        let mut owned: Vec<(String, f64)> = Vec::with_capacity(elements.len());
        let mut molar_mass = 0.0;
        for &(symbol, count) in elements {
            if !(count.is_finite() && count > 0.0) {
                return Err(invalid("atom counts must be positive"));
            }
            if owned.iter().any(|(s, _)| s == symbol) {
                return Err(invalid("duplicate element symbol"));
            }
            let weight = atomic_weight(symbol).ok_or_else(|| ThermoError::UnknownElement {
                species: name.clone(),
                symbol: symbol.to_string(),
            })?;
            molar_mass += weight * count;
            owned.push((symbol.to_string(), count));
        }

        Ok(Self {
            name,
            phase,
            elements: owned,
            range,
            low: Nasa7::new(low),
            high: Nasa7::new(high),
            molar_mass,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_gas(&self) -> bool {
        self.phase == Phase::Gas
    }

    pub fn range(&self) -> TemperatureRange {
        self.range
    }

    /// Molar mass, g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Element symbols with their atom counts.
    pub fn elements(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.elements.iter().map(|(s, c)| (s.as_str(), *c))
    }

    /// Atoms of `symbol` per molecule (0 when absent).
    pub fn element_count(&self, symbol: &str) -> f64 {
        self.elements
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| *c)
            .unwrap_or(0.0)
    }

    pub fn coefficients_low(&self) -> &Nasa7 {
        &self.low
    }

    pub fn coefficients_high(&self) -> &Nasa7 {
        &self.high
    }

    /// Polynomial segment valid at `t`: low for `t <= T_mid`, high above.
    pub fn segment(&self, t: f64) -> ThermoResult<&Nasa7> {
        if !t.is_finite() || !self.range.contains(t) {
            return Err(ThermoError::OutOfRange {
                species: self.name.clone(),
                temperature: t,
                t_low: self.range.low,
                t_high: self.range.high,
            });
        }
        Ok(if t <= self.range.mid {
            &self.low
        } else {
            &self.high
        })
    }
}
