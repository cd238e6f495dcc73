// hg-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Force as UomForce, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Force = UomForce;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Physical constants in the working unit system (K, bar, kJ, mol, g/mol).
pub mod constants {
    /// Universal gas constant, kJ/(mol K).
    pub const R: f64 = 8.314_462_618_153_24e-3;

    /// Reference pressure for standard-state entropy, bar.
    pub const P_REF_BAR: f64 = 1.0;

    /// bar -> Pa.
    pub const PA_PER_BAR: f64 = 1.0e5;

    /// Standard gravity, m/s^2.
    pub const G0_MPS2: f64 = 9.806_65;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_read_back_in_si() {
        use uom::si::{
            area::square_centimeter, force::kilonewton, thermodynamic_temperature::degree_celsius,
            time::millisecond,
        };
        assert!((k(300.0).get::<degree_celsius>() - 26.85).abs() < 1e-9);
        assert!((m2(0.01).get::<square_centimeter>() - 100.0).abs() < 1e-9);
        assert!((newton(2500.0).get::<kilonewton>() - 2.5).abs() < 1e-12);
        assert!((s(0.1).get::<millisecond>() - 100.0).abs() < 1e-9);
        assert_eq!(unitless(0.5).value, 0.5);
        assert_eq!(kgps(1.2).value, 1.2);
        assert_eq!(mps(1000.0).value, 1000.0);
        assert_eq!(kgpm3(1.2).value, 1.2);
    }

    #[test]
    fn bar_converts_to_pascal() {
        use uom::si::pressure::pascal;
        let p = bar(2.5);
        assert!((p.get::<pascal>() - 2.5 * constants::PA_PER_BAR).abs() < 1e-9);
    }
}
