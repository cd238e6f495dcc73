//! hg-core: shared foundation for the hotgas workspace.
//!
//! Contains:
//! - units (uom SI types + constructors, physical constants)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact species identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{HgError, HgResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
