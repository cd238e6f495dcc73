//! Species data and property errors.

use hg_core::HgError;
use thiserror::Error;

/// Result type for species data and property operations.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised by the species table and the property model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Temperature outside the validity range of a species' polynomials.
    #[error("Temperature {temperature} K out of range [{t_low}, {t_high}] K for {species}")]
    OutOfRange {
        species: String,
        temperature: f64,
        t_low: f64,
        t_high: f64,
    },

    /// Entropy or Gibbs energy requested on a mixture holding a condensed species.
    #[error("Entropy/Gibbs energy undefined for mixture containing non-gas species {species}")]
    PhaseConsistency { species: String },

    #[error("Unknown species or mixture: {name}")]
    UnknownSpecies { name: String },

    #[error("Unknown element symbol {symbol} in {species}")]
    UnknownElement { species: String, symbol: String },

    /// Species record rejected at construction.
    #[error("Invalid species record {name}: {what}")]
    InvalidRecord { name: String, what: &'static str },

    #[error("Invalid mixture definition {name}: {what}")]
    InvalidMixture { name: String, what: &'static str },

    #[error("Species id {index} out of bounds (table length {len})")]
    IndexOob { index: usize, len: usize },

    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch: {what} (expected={expected}, got={got})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl From<HgError> for ThermoError {
    fn from(err: HgError) -> Self {
        match err {
            HgError::NonFinite { what, .. } => ThermoError::NonPhysical { what },
            HgError::InvalidArg { what } => ThermoError::InvalidArg { what },
        }
    }
}
