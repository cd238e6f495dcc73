//! hg-thermo: species data and the ideal-gas property model for hotgas.
//!
//! Provides:
//! - Species records with temperature-segmented NASA 7-coefficient polynomials
//! - The `SpeciesDatabase` trait plus an in-memory `SpeciesTable` and a built-in data set
//! - Named-mixture resolution into flat species/amount lists
//! - `MixtureState`, the caller-owned mixture buffer shared by all solvers
//! - Per-species and mixture property evaluation (cp, cv, h, s, g, Mm, Rg, gamma, a)
//!
//! # Units
//!
//! Temperatures are in K, pressures in bar, amounts in mol, molar enthalpy in kJ/mol, molar
//! entropy in kJ/(mol K) and molar mass in g/mol.
//!
//! # Example
//!
//! ```
//! use hg_thermo::{Property, builtin_table, single_property};
//!
//! let db = builtin_table();
//! let cp = single_property(&db, "N2", Property::Cp, 300.0, 1.0).unwrap();
//! assert!(cp > 0.028 && cp < 0.030);
//! ```

pub mod builtin;
pub mod database;
pub mod error;
pub mod mixture;
pub mod properties;
pub mod species;

pub use builtin::builtin_table;
pub use database::{
    MixtureComponent, NamedMixture, ResolvedMixture, SpeciesDatabase, SpeciesTable,
    resolve_named,
};
pub use error::{ThermoError, ThermoResult};
pub use mixture::{MixtureState, Temperatures};
pub use properties::{
    MixtureProperties, Property, SpeciesProperties, evaluate, evaluate_mixture,
    mixture_property, single_property,
};
pub use species::{Nasa7, Phase, SpeciesRecord, TemperatureRange, atomic_weight};
