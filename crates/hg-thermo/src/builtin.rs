//! Built-in species table: NASA-7 fits (GRI-Mech 3.0 thermo data) for H/O/N/C/Ar combustion
//! products, plus the `Air` mixture.

use crate::database::SpeciesTable;
use crate::species::{Phase, SpeciesRecord, TemperatureRange};

struct Entry {
    name: &'static str,
    elements: &'static [(&'static str, f64)],
    range: (f64, f64, f64),
    low: [f64; 7],
    high: [f64; 7],
}

const ENTRIES: &[Entry] = &[
    Entry {
        name: "H2",
        elements: &[("H", 2.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            2.344_331_12, 7.980_520_75e-3, -1.947_815_10e-5, 2.015_720_94e-8, -7.376_117_61e-12,
            -917.935_173, 0.683_010_238,
        ],
        high: [
            3.337_279_20, -4.940_247_31e-5, 4.994_567_78e-7, -1.795_663_94e-10, 2.002_553_76e-14,
            -950.158_922, -3.205_023_31,
        ],
    },
    Entry {
        name: "O2",
        elements: &[("O", 2.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            3.782_456_36, -2.996_734_16e-3, 9.847_302_01e-6, -9.681_295_09e-9, 3.243_728_37e-12,
            -1_063.943_56, 3.657_675_73,
        ],
        high: [
            3.282_537_84, 1.483_087_54e-3, -7.579_666_69e-7, 2.094_705_55e-10, -2.167_177_94e-14,
            -1_088.457_72, 5.453_231_29,
        ],
    },
    Entry {
        name: "H2O",
        elements: &[("H", 2.0), ("O", 1.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            4.198_640_56, -2.036_434_10e-3, 6.520_402_11e-6, -5.487_970_62e-9, 1.771_978_17e-12,
            -30_293.726_7, -0.849_032_208,
        ],
        high: [
            3.033_992_49, 2.176_918_04e-3, -1.640_725_18e-7, -9.704_198_70e-11, 1.682_009_92e-14,
            -30_004.297_1, 4.966_770_10,
        ],
    },
    Entry {
        name: "H",
        elements: &[("H", 1.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            2.5, 7.053_328_19e-13, -1.995_919_64e-15, 2.300_816_32e-18, -9.277_323_32e-22,
            25_473.659_9, -0.446_682_853,
        ],
        high: [
            2.500_000_01, -2.308_429_73e-11, 1.615_619_48e-14, -4.735_152_35e-18, 4.981_973_57e-22,
            25_473.659_9, -0.446_682_914,
        ],
    },
    Entry {
        name: "O",
        elements: &[("O", 1.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            3.168_267_10, -3.279_318_84e-3, 6.643_063_96e-6, -6.128_066_24e-9, 2.112_659_71e-12,
            29_122.259_2, 2.051_933_46,
        ],
        high: [
            2.569_420_78, -8.597_411_37e-5, 4.194_845_89e-8, -1.001_777_99e-11, 1.228_336_91e-15,
            29_217.579_1, 4.784_338_64,
        ],
    },
    Entry {
        name: "OH",
        elements: &[("O", 1.0), ("H", 1.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            3.992_015_43, -2.401_317_52e-3, 4.617_938_41e-6, -3.881_133_33e-9, 1.364_114_70e-12,
            3_615.080_56, -0.103_925_458,
        ],
        high: [
            3.092_887_67, 5.484_297_16e-4, 1.265_052_28e-7, -8.794_615_56e-11, 1.174_123_76e-14,
            3_858.657_00, 4.476_696_10,
        ],
    },
    Entry {
        name: "N2",
        elements: &[("N", 2.0)],
        range: (300.0, 1000.0, 5000.0),
        low: [
            3.298_677, 1.408_240_4e-3, -3.963_222e-6, 5.641_515e-9, -2.444_854e-12, -1_020.899_9,
            3.950_372,
        ],
        high: [
            2.926_64, 1.487_976_8e-3, -5.684_76e-7, 1.009_703_8e-10, -6.753_351e-15, -922.797_7,
            5.980_528,
        ],
    },
    Entry {
        name: "CO",
        elements: &[("C", 1.0), ("O", 1.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            3.579_533_47, -6.103_536_80e-4, 1.016_814_33e-6, 9.070_058_84e-10, -9.044_244_99e-13,
            -14_344.086_0, 3.508_409_28,
        ],
        high: [
            2.715_185_61, 2.062_527_43e-3, -9.988_257_71e-7, 2.300_530_08e-10, -2.036_477_16e-14,
            -14_151.872_4, 7.818_687_72,
        ],
    },
    Entry {
        name: "CO2",
        elements: &[("C", 1.0), ("O", 2.0)],
        range: (200.0, 1000.0, 3500.0),
        low: [
            2.356_773_52, 8.984_596_77e-3, -7.123_562_69e-6, 2.459_190_22e-9, -1.436_995_48e-13,
            -48_371.969_7, 9.901_052_22,
        ],
        high: [
            3.857_460_29, 4.414_370_26e-3, -2.214_814_04e-6, 5.234_901_88e-10, -4.720_841_64e-14,
            -48_759.166_0, 2.271_638_06,
        ],
    },
    Entry {
        name: "Ar",
        elements: &[("Ar", 1.0)],
        range: (300.0, 1000.0, 5000.0),
        low: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
        high: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
    },
];

/// Dry air by mole percent.
const AIR: &[(&str, f64)] = &[("N2", 78.084), ("O2", 20.946), ("Ar", 0.970)];

/// Species table holding the built-in records and the `Air` mixture.
pub fn builtin_table() -> SpeciesTable {
    let mut table = SpeciesTable::new();
    for e in ENTRIES {
        let (low, mid, high) = e.range;
        let record = SpeciesRecord::new(
            e.name,
            Phase::Gas,
            e.elements,
            TemperatureRange::new(low, mid, high),
            e.low,
            e.high,
        );
        // Static data: every entry is validated by the tests below.
        if let Ok(record) = record {
            let _ = table.insert(record);
        }
    }
    let _ = table.add_mixture("Air", AIR);
    table
}
