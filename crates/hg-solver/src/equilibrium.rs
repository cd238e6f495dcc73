//! Chemical equilibrium at fixed temperature and pressure.
//!
//! Minimises `G = sum_j n_j g_j(T, P n_j / n)` subject to element balance
//! `sum_j a_ij n_j = b0_i` with an element-potential Newton iteration in logarithmic mole
//! variables. Each step solves for one Lagrange multiplier `pi_i` per element plus the
//! correction `dln n` to the total moles:
//!
//! ```text
//! sum_k (sum_j a_ij a_kj n_j) pi_k + (sum_j a_ij n_j) dln n = b0_i - b_i + sum_j a_ij n_j mu_j
//! sum_k (sum_j a_kj n_j) pi_k + (sum_j n_j - n) dln n     = n - sum_j n_j + sum_j n_j mu_j
//! dln n_j = -mu_j + sum_i a_ij pi_i + dln n,   mu_j = g0_j/RT + ln(n_j/n) + ln(P/P_ref)
//! ```
//!
//! Steps are damped so that no major species changes by more than a factor e^2 per step and
//! trace species cannot jump above a mole fraction of 1e-4. Working in logarithms keeps every
//! amount positive; amounts are floored at 1e-300 of the total instead of reaching zero.

use hg_core::constants::{P_REF_BAR, R};
use hg_core::{SpeciesId, ensure_non_negative, ensure_positive};
use hg_thermo::properties::standard_gibbs_rt;
use hg_thermo::{MixtureState, SpeciesDatabase, Temperatures, ThermoError};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, debug_span, warn};

use crate::config::{EquilibriumConfig, NonConvergencePolicy};
use crate::error::{SolverError, SolverResult};

/// Initial amount given to species absent from the reactants, relative to the total.
const SEED_FRACTION: f64 = 1e-10;
/// Smallest amount kept, relative to the total.
const TRACE_FLOOR: f64 = 1e-300;
/// ln(1e-8): mole fraction below which a species is trace for step control.
const LN_TRACE: f64 = -18.420_681;
/// ln(1e-4): ceiling a trace species may reach in one step.
const LN_TRACE_CEILING: f64 = -9.210_340_4;
/// Diagonal shift, relative to the largest diagonal entry.
const REGULARISATION: f64 = 1e-12;

/// Outcome of one equilibrium solve.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumResult {
    /// Equilibrium amounts, mol, in the order of the input ids
    pub amounts: Vec<f64>,
    /// Total Gibbs energy at the equilibrium point, kJ
    pub gibbs: f64,
    pub success: bool,
    pub iterations: usize,
    /// Largest relative element-balance error
    pub element_residual: f64,
}

impl EquilibriumResult {
    pub fn total_moles(&self) -> f64 {
        self.amounts.iter().sum()
    }

    pub fn mole_fractions(&self) -> Vec<f64> {
        let total = self.total_moles();
        self.amounts.iter().map(|n| n / total).collect()
    }
}

/// Element matrix restricted to elements present in the reactants.
struct Problem {
    /// `atoms[i][j]`: atoms of element i per molecule of species j
    atoms: Vec<Vec<f64>>,
    b0: Vec<f64>,
    /// Species made only of present elements
    active: Vec<usize>,
    /// Standard-state g/RT per species
    g0: Vec<f64>,
}

impl Problem {
    fn build<D: SpeciesDatabase + ?Sized>(
        db: &D,
        ids: &[SpeciesId],
        n0: &[f64],
        t: f64,
    ) -> SolverResult<Self> {
        let mut symbols: Vec<String> = Vec::new();
        let mut g0 = Vec::with_capacity(ids.len());
        for id in ids {
            let record = db.record(*id)?;
            if !record.is_gas() {
                return Err(ThermoError::PhaseConsistency {
                    species: record.name().to_string(),
                }
                .into());
            }
            for (symbol, _) in record.elements() {
                if !symbols.iter().any(|s| s == symbol) {
                    symbols.push(symbol.to_string());
                }
            }
            g0.push(standard_gibbs_rt(record, t)?);
        }

        let mut all_atoms = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let mut row = Vec::with_capacity(ids.len());
            for id in ids {
                row.push(db.record(*id)?.element_count(symbol));
            }
            all_atoms.push(row);
        }

        let mut atoms = Vec::new();
        let mut b0 = Vec::new();
        let mut absent = Vec::new();
        for row in all_atoms {
            let b: f64 = row.iter().zip(n0).map(|(a, n)| a * n).sum();
            if b > 0.0 {
                atoms.push(row);
                b0.push(b);
            } else {
                absent.push(row);
            }
        }
        let active: Vec<usize> = (0..ids.len())
            .filter(|&j| absent.iter().all(|row| row[j] == 0.0))
            .collect();
        if active.is_empty() || b0.is_empty() {
            return Err(SolverError::ProblemSetup {
                what: "no species can be formed from the reactant elements".to_string(),
            });
        }

        Ok(Self {
            atoms,
            b0,
            active,
            g0,
        })
    }

    fn element_residual(&self, n: &[f64]) -> f64 {
        self.atoms
            .iter()
            .zip(&self.b0)
            .map(|(row, b0)| {
                let b: f64 = self.active.iter().map(|&j| row[j] * n[j]).sum();
                (b - b0).abs() / b0
            })
            .fold(0.0, f64::max)
    }
}

/// Solve `m x = rhs` on a slightly shifted matrix, then refine once against `m`.
///
/// The shift keeps the system solvable when element rows become dependent (e.g. only H2O
/// left from H2/O2 at low temperature).
fn solve_shifted(m: &DMatrix<f64>, rhs: &DVector<f64>) -> SolverResult<DVector<f64>> {
    let shift = REGULARISATION * m.diagonal().amax();
    let shifted = m + DMatrix::identity(m.nrows(), m.ncols()) * shift;
    let lu = shifted.lu();
    let mut x = lu.solve(rhs).ok_or_else(|| SolverError::Numeric {
        what: "equilibrium Newton matrix is singular".to_string(),
    })?;
    let r = rhs - m * &x;
    if let Some(dx) = lu.solve(&r) {
        x += dx;
    }
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(SolverError::Numeric {
            what: "non-finite equilibrium Newton step".to_string(),
        })
    }
}

/// Equilibrium composition of `ids` at temperature `t` (K) and pressure `p` (bar), starting
/// from the reactant amounts `n0`.
///
/// Elements absent from the reactants are dropped and species containing them stay at zero.
/// All species must be gases. Exhausting `config.max_iterations` either warns and returns
/// the last iterate with `success == false`, or fails, depending on `config.on_failure`.
pub fn equilibrate<D: SpeciesDatabase + ?Sized>(
    db: &D,
    ids: &[SpeciesId],
    n0: &[f64],
    t: f64,
    p: f64,
    config: &EquilibriumConfig,
) -> SolverResult<EquilibriumResult> {
    let _span = debug_span!("equilibrate", t, p).entered();

    if ids.len() != n0.len() {
        return Err(ThermoError::LengthMismatch {
            what: "reactant amounts",
            expected: ids.len(),
            got: n0.len(),
        }
        .into());
    }
    ensure_positive(t, "temperature")?;
    ensure_positive(p, "pressure")?;
    for &n in n0 {
        ensure_non_negative(n, "reactant amount")?;
    }
    let n0_total: f64 = n0.iter().sum();
    if n0_total <= 0.0 {
        return Err(SolverError::ProblemSetup {
            what: "reactants hold no moles".to_string(),
        });
    }

    let problem = Problem::build(db, ids, n0, t)?;
    let ln_p = (p / P_REF_BAR).ln();
    let ne = problem.b0.len();
    let size = ne + 1;

    let mut n = vec![0.0; ids.len()];
    for &j in &problem.active {
        n[j] = n0[j].max(SEED_FRACTION * n0_total);
    }
    let mut n_total: f64 = n.iter().sum();
    let mut mu = vec![0.0; ids.len()];
    let mut dln = vec![0.0; ids.len()];

    let mut converged = false;
    let mut iterations = 0;
    let mut element_residual = f64::INFINITY;

    for iter in 1..=config.max_iterations {
        iterations = iter;

        for &j in &problem.active {
            mu[j] = problem.g0[j] + (n[j] / n_total).ln() + ln_p;
        }

        let mut m = DMatrix::<f64>::zeros(size, size);
        let mut rhs = DVector::<f64>::zeros(size);
        let sum_n: f64 = problem.active.iter().map(|&j| n[j]).sum();
        for (i, row_i) in problem.atoms.iter().enumerate() {
            for (k, row_k) in problem.atoms.iter().enumerate() {
                m[(i, k)] = problem.active.iter().map(|&j| row_i[j] * row_k[j] * n[j]).sum();
            }
            let b_i: f64 = problem.active.iter().map(|&j| row_i[j] * n[j]).sum();
            m[(i, ne)] = b_i;
            m[(ne, i)] = b_i;
            rhs[i] = problem.b0[i] - b_i
                + problem
                    .active
                    .iter()
                    .map(|&j| row_i[j] * n[j] * mu[j])
                    .sum::<f64>();
        }
        m[(ne, ne)] = sum_n - n_total;
        rhs[ne] = n_total - sum_n + problem.active.iter().map(|&j| n[j] * mu[j]).sum::<f64>();

        let x = solve_shifted(&m, &rhs)?;
        let dln_n = x[ne];
        for &j in &problem.active {
            let potential: f64 = problem.atoms.iter().enumerate().map(|(i, row)| row[j] * x[i]).sum();
            dln[j] = -mu[j] + potential + dln_n;
        }

        // Step control.
        let mut largest = 5.0 * dln_n.abs();
        let mut lambda_trace: f64 = 1.0;
        for &j in &problem.active {
            let ln_x = (n[j] / n_total).ln();
            if ln_x > LN_TRACE {
                largest = largest.max(dln[j].abs());
            } else if dln[j] >= 0.0 && dln[j] != dln_n {
                lambda_trace = lambda_trace.min(((-ln_x + LN_TRACE_CEILING) / (dln[j] - dln_n)).abs());
            }
        }
        let lambda_major = if largest > 2.0 { 2.0 / largest } else { 1.0 };
        let lambda = 1.0_f64.min(lambda_major).min(lambda_trace);

        n_total *= (lambda * dln_n).exp();
        for &j in &problem.active {
            n[j] = (n[j] * (lambda * dln[j]).exp()).max(n_total * TRACE_FLOOR);
        }

        let sum_n: f64 = problem.active.iter().map(|&j| n[j]).sum();
        let correction = problem
            .active
            .iter()
            .map(|&j| n[j] * dln[j].abs() / sum_n)
            .fold(dln_n.abs(), f64::max);
        element_residual = problem.element_residual(&n);
        debug!(iter, lambda, correction, element_residual, "equilibrium step");

        if correction < config.tolerance && element_residual < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        match config.on_failure {
            NonConvergencePolicy::Warn => {
                warn!(
                    t,
                    p,
                    iterations,
                    element_residual,
                    "equilibrium did not converge; returning last iterate"
                );
            }
            NonConvergencePolicy::Error => {
                return Err(SolverError::MinimizerNonConvergence {
                    iterations,
                    residual: element_residual,
                });
            }
        }
    }

    let total: f64 = n.iter().sum();
    let gibbs = R
        * t
        * problem
            .active
            .iter()
            .map(|&j| n[j] * (problem.g0[j] + (n[j] / total).ln() + ln_p))
            .sum::<f64>();

    Ok(EquilibriumResult {
        amounts: n,
        gibbs,
        success: converged,
        iterations,
        element_residual,
    })
}

/// [`equilibrate`] at the temperature, pressure and amounts of `mix`.
///
/// The mixture must carry a single shared temperature.
pub fn equilibrate_mixture<D: SpeciesDatabase + ?Sized>(
    db: &D,
    mix: &MixtureState,
    config: &EquilibriumConfig,
) -> SolverResult<EquilibriumResult> {
    match mix.temperature() {
        Temperatures::Uniform(t) => equilibrate(db, mix.ids(), mix.amounts(), *t, mix.pressure(), config),
        Temperatures::PerSpecies(_) => Err(SolverError::ProblemSetup {
            what: "equilibrium requires a single mixture temperature".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hg_thermo::{Phase, Property, SpeciesRecord, SpeciesTable, TemperatureRange};
    use hg_thermo::{builtin_table, mixture_property};

    const PRODUCTS: [&str; 6] = ["H2", "O2", "H2O", "H", "O", "OH"];

    fn hydrogen_oxygen(db: &SpeciesTable) -> (Vec<SpeciesId>, Vec<f64>) {
        (db.ids_of(&PRODUCTS).unwrap(), vec![2.0, 1.0, 0.0, 0.0, 0.0, 0.0])
    }

    fn fractions(r: &EquilibriumResult) -> Vec<f64> {
        r.mole_fractions()
    }

    #[test]
    fn water_dissociation_at_3000_k() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let r = equilibrate(&db, &ids, &n0, 3000.0, 10.0, &EquilibriumConfig::default()).unwrap();
        assert!(r.success, "iterations {}", r.iterations);
        let x = fractions(&r);
        let expected = [0.0743, 0.0251, 0.8308, 0.0136, 0.0057, 0.0505];
        for (name, (got, want)) in PRODUCTS.iter().zip(x.iter().zip(expected)) {
            assert!((got - want).abs() < 2e-3, "{name}: {got} vs {want}");
        }
        assert!((r.gibbs + 1844.68).abs() < 0.5, "G = {}", r.gibbs);
    }

    #[test]
    fn gibbs_matches_property_model() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let r = equilibrate(&db, &ids, &n0, 2500.0, 10.0, &EquilibriumConfig::default()).unwrap();
        let mix = MixtureState::new(ids, r.amounts.clone(), 2500.0, 10.0).unwrap();
        let g = mixture_property(&db, &mix, Property::Gibbs).unwrap();
        assert!((g - r.gibbs).abs() < 1e-6 * g.abs());
    }

    #[test]
    fn complete_combustion_at_low_temperature() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let r = equilibrate(&db, &ids, &n0, 300.0, 1.0, &EquilibriumConfig::default()).unwrap();
        assert!(r.success);
        assert!((r.amounts[2] - 2.0).abs() < 1e-6, "H2O = {}", r.amounts[2]);
        assert!(r.element_residual < 1e-9);
    }

    #[test]
    fn re_equilibration_is_idempotent() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let cfg = EquilibriumConfig::default();
        let first = equilibrate(&db, &ids, &n0, 2800.0, 20.0, &cfg).unwrap();
        let second = equilibrate(&db, &ids, &first.amounts, 2800.0, 20.0, &cfg).unwrap();
        assert!(second.success);
        for (a, b) in first.amounts.iter().zip(&second.amounts) {
            assert!((a - b).abs() < 1e-7 * first.total_moles(), "{a} vs {b}");
        }
        assert!(second.iterations <= first.iterations);
    }

    #[test]
    fn absent_element_species_stay_zero() {
        let db = builtin_table();
        let ids = db.ids_of(&["H2", "O2", "H2O", "N2", "CO"]).unwrap();
        let n0 = [2.0, 1.0, 0.0, 0.0, 0.0];
        let r = equilibrate(&db, &ids, &n0, 2000.0, 1.0, &EquilibriumConfig::default()).unwrap();
        assert!(r.success);
        assert_eq!(r.amounts[3], 0.0);
        assert_eq!(r.amounts[4], 0.0);
    }

    #[test]
    fn condensed_species_rejected() {
        let mut db = builtin_table();
        let liquid = SpeciesRecord::new(
            "H2O(L)",
            Phase::Liquid,
            &[("H", 2.0), ("O", 1.0)],
            TemperatureRange::new(273.15, 373.15, 600.0),
            [9.07, 0.0, 0.0, 0.0, 0.0, -37_100.0, -37.0],
            [9.07, 0.0, 0.0, 0.0, 0.0, -37_100.0, -37.0],
        )
        .unwrap();
        db.insert(liquid).unwrap();
        let ids = db.ids_of(&["H2", "O2", "H2O(L)"]).unwrap();
        let err = equilibrate(&db, &ids, &[2.0, 1.0, 0.0], 350.0, 1.0, &EquilibriumConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::Thermo(ThermoError::PhaseConsistency { .. })
        ));
    }

    #[test]
    fn non_convergence_policy() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let warn_cfg = EquilibriumConfig {
            max_iterations: 1,
            ..EquilibriumConfig::default()
        };
        let r = equilibrate(&db, &ids, &n0, 3000.0, 10.0, &warn_cfg).unwrap();
        assert!(!r.success);
        assert_eq!(r.iterations, 1);

        let err_cfg = EquilibriumConfig {
            on_failure: NonConvergencePolicy::Error,
            ..warn_cfg
        };
        let err = equilibrate(&db, &ids, &n0, 3000.0, 10.0, &err_cfg).unwrap_err();
        assert!(matches!(
            err,
            SolverError::MinimizerNonConvergence { iterations: 1, .. }
        ));
    }

    #[test]
    fn rejects_bad_inputs() {
        let db = builtin_table();
        let (ids, _) = hydrogen_oxygen(&db);
        let cfg = EquilibriumConfig::default();
        assert!(equilibrate(&db, &ids, &[1.0], 2000.0, 1.0, &cfg).is_err());
        assert!(equilibrate(&db, &ids, &[0.0; 6], 2000.0, 1.0, &cfg).is_err());
        assert!(equilibrate(&db, &ids, &[2.0, 1.0, 0.0, 0.0, 0.0, 0.0], 2000.0, -1.0, &cfg).is_err());
        assert!(matches!(
            equilibrate(&db, &ids, &[2.0, 1.0, 0.0, 0.0, 0.0, 0.0], 5000.0, 1.0, &cfg),
            Err(SolverError::Thermo(ThermoError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn mixture_entry_point_needs_uniform_temperature() {
        let db = builtin_table();
        let (ids, n0) = hydrogen_oxygen(&db);
        let mix = MixtureState::with_temperatures(ids, n0, vec![2000.0; 6], 1.0).unwrap();
        assert!(matches!(
            equilibrate_mixture(&db, &mix, &EquilibriumConfig::default()),
            Err(SolverError::ProblemSetup { .. })
        ));
    }
}
