//! Bracketed hybrid secant/bisection root finder.
//!
//! The residual closure receives the trial abscissa and the composition to start from (the
//! mixture of the closer bracket end) and returns the residual together with the composition
//! it produced. Wide brackets are first narrowed by a parabola through both ends and the
//! midpoint.

use tracing::{debug, debug_span};

use crate::config::SecantConfig;
use crate::error::SolverResult;

/// Brackets wider than this are narrowed with the parabolic estimate first.
const PARABOLA_MIN_SPAN: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStatus {
    Converged,
    MaxIterationsExceeded,
    NoBracketingSignChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootFindResult {
    /// Root estimate; `None` when the initial bracket showed no sign change, the last iterate
    /// when iterations ran out
    pub x: Option<f64>,
    /// Composition at `x` (the starting composition when there is no root)
    pub amounts: Vec<f64>,
    /// Residual at `x`
    pub residual: f64,
    pub status: RootStatus,
    pub iterations: usize,
}

impl RootFindResult {
    pub fn converged(&self) -> bool {
        self.status == RootStatus::Converged
    }
}

/// Bracket end: abscissa, residual, composition.
#[derive(Debug, Clone)]
struct End {
    x: f64,
    y: f64,
    n: Vec<f64>,
}

/// Root of the parabola through three points, preferring the larger root when it lies at or
/// above `x1`.
fn parabola_root(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Option<f64> {
    let s23 = (y2 - y3) / (x2 - x3);
    let a = (y1 - s23 * x1 - y3 + x3 * s23)
        / (x1 * x1 + (x1 - x3) * (x3 * x3 - x2 * x2) / (x2 - x3) - x3 * x3);
    let b = (y2 - y3 + a * x3 * x3 - a * x2 * x2) / (x2 - x3);
    let c = y3 - a * x3 * x3 - b * x3;
    let disc = b * b - 4.0 * a * c;
    if a == 0.0 || !a.is_finite() || !(disc >= 0.0) {
        return None;
    }
    let root = (-b + disc.sqrt()) / (2.0 * a);
    let root = if root >= x1 {
        root
    } else {
        (-b - disc.sqrt()) / (2.0 * a)
    };
    root.is_finite().then_some(root)
}

/// Find `x` in `[config.xmin, config.xmax]` with `f(x) = 0`.
///
/// `f(x, seed)` returns the residual at `x` and the composition it settled on. Errors from
/// `f` abort the search; running out of bracket or iterations is reported through
/// [`RootStatus`].
pub fn find_root<F>(mut f: F, n0: &[f64], config: &SecantConfig) -> SolverResult<RootFindResult>
where
    F: FnMut(f64, &[f64]) -> SolverResult<(f64, Vec<f64>)>,
{
    config.validate()?;
    let _span = debug_span!("find_root", xmin = config.xmin, xmax = config.xmax).entered();

    let (y1, n1) = f(config.xmin, n0)?;
    let (y2, n2) = f(config.xmax, n0)?;
    let mut lo = End {
        x: config.xmin,
        y: y1,
        n: n1,
    };
    let mut hi = End {
        x: config.xmax,
        y: y2,
        n: n2,
    };

    if lo.y * hi.y > 0.0 || !(lo.y * hi.y).is_finite() {
        debug!(y1 = lo.y, y2 = hi.y, "no sign change across bracket");
        return Ok(RootFindResult {
            x: None,
            amounts: n0.to_vec(),
            residual: lo.y,
            status: RootStatus::NoBracketingSignChange,
            iterations: 0,
        });
    }
    for end in [&lo, &hi] {
        if end.y == 0.0 {
            return Ok(RootFindResult {
                x: Some(end.x),
                amounts: end.n.clone(),
                residual: 0.0,
                status: RootStatus::Converged,
                iterations: 0,
            });
        }
    }

    if hi.x - lo.x > PARABOLA_MIN_SPAN {
        let xm = 0.5 * (lo.x + hi.x);
        let (ym, _) = f(xm, n0)?;
        if let Some(root) = parabola_root(lo.x, lo.y, hi.x, hi.y, xm, ym) {
            let a = (root - config.d_tp).max(lo.x);
            let b = (root + config.d_tp).min(hi.x);
            if a < b {
                let (ya, na) = f(a, n0)?;
                let (yb, nb) = f(b, n0)?;
                if ya * yb < 0.0 {
                    debug!(root, a, b, "parabolic sub-bracket adopted");
                    lo = End { x: a, y: ya, n: na };
                    hi = End { x: b, y: yb, n: nb };
                }
            }
        }
    }

    let mut bisect = false;
    let mut last = (lo.x, lo.y, lo.n.clone());
    for iter in 1..=config.max_iterations {
        let xc = if bisect {
            bisect = false;
            0.5 * (lo.x + hi.x)
        } else {
            lo.x - lo.y * (hi.x - lo.x) / (hi.y - lo.y)
        };
        let seed = if xc - lo.x < hi.x - xc { &lo.n } else { &hi.n };
        let (yc, nc) = f(xc, seed)?;
        debug!(iter, x1 = lo.x, xc, x2 = hi.x, yc, "secant step");

        if yc.abs() < config.eps_y || ((xc - lo.x).abs() < config.eps_x && (hi.x - xc).abs() < config.eps_x) {
            return Ok(RootFindResult {
                x: Some(xc),
                amounts: nc,
                residual: yc,
                status: RootStatus::Converged,
                iterations: iter,
            });
        }

        if hi.x - xc < config.f_change || xc - lo.x < config.f_change {
            bisect = true;
        }
        last = (xc, yc, nc.clone());
        let end = End { x: xc, y: yc, n: nc };
        if yc * lo.y > 0.0 {
            lo = end;
        } else {
            hi = end;
        }
    }

    let (x, residual, amounts) = last;
    Ok(RootFindResult {
        x: Some(x),
        amounts,
        residual,
        status: RootStatus::MaxIterationsExceeded,
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;

    fn scalar<G: Fn(f64) -> f64>(g: G) -> impl FnMut(f64, &[f64]) -> SolverResult<(f64, Vec<f64>)> {
        move |x, _| Ok((g(x), vec![x]))
    }

    fn narrow(xmin: f64, xmax: f64) -> SecantConfig {
        SecantConfig {
            xmin,
            xmax,
            max_iterations: 100,
            eps_x: 1e-9,
            eps_y: 1e-10,
            f_change: 0.0,
            d_tp: 100.0,
        }
    }

    #[test]
    fn linear_root_in_one_step() {
        let r = find_root(scalar(|x| 2.0 * x - 3.0), &[], &narrow(0.0, 10.0)).unwrap();
        assert_eq!(r.status, RootStatus::Converged);
        assert!((r.x.unwrap() - 1.5).abs() < 1e-12);
        assert_eq!(r.iterations, 1);
        assert_eq!(r.amounts, vec![r.x.unwrap()]);
    }

    #[test]
    fn no_sign_change_does_not_iterate() {
        let mut calls = 0;
        let f = |x: f64, _: &[f64]| {
            calls += 1;
            Ok((x * x + 1.0, Vec::new()))
        };
        let r = find_root(f, &[1.0, 2.0], &narrow(-1.0, 2.0)).unwrap();
        assert_eq!(r.status, RootStatus::NoBracketingSignChange);
        assert_eq!(r.x, None);
        assert_eq!(r.iterations, 0);
        assert_eq!(r.amounts, vec![1.0, 2.0]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn root_at_bracket_end() {
        let r = find_root(scalar(|x| x - 1.0), &[], &narrow(1.0, 3.0)).unwrap();
        assert!(r.converged());
        assert_eq!(r.x, Some(1.0));
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn cubic_converges_with_bisection_fallback() {
        let cfg = SecantConfig {
            f_change: 0.5,
            ..narrow(-3.0, 4.0)
        };
        let r = find_root(scalar(|x| x * x * x - 2.0 * x - 5.0), &[], &cfg).unwrap();
        assert!(r.converged());
        assert!((r.x.unwrap() - 2.094_551_481_542_327).abs() < 1e-8);
    }

    #[test]
    fn parabola_narrows_wide_bracket() {
        let mut evaluated = Vec::new();
        let f = |x: f64, _: &[f64]| {
            evaluated.push(x);
            Ok(((x - 300.0) * (x + 300.0) / 1e4 - 600.0, Vec::new()))
        };
        let cfg = SecantConfig::default();
        let r = find_root(f, &[], &cfg).unwrap();
        assert!(r.converged());
        let root = (300.0_f64 * 300.0 + 600.0 * 1e4).sqrt();
        assert!((r.x.unwrap() - root).abs() < cfg.eps_x);
        // Exact quadratic: the sub-bracket ends sit one d_tp either side of the root.
        assert!(evaluated.iter().any(|x| (x - (root - 100.0)).abs() < 1e-6));
        assert!(evaluated.iter().any(|x| (x - (root + 100.0)).abs() < 1e-6));
    }

    #[test]
    fn parabola_sub_bracket_without_sign_change_is_rejected() {
        // A steep step: the parabola lands near 3293, where both sub-bracket ends are negative.
        let mut evaluated = Vec::new();
        let f = |x: f64, _: &[f64]| {
            evaluated.push(x);
            Ok((((x - 3500.0) / 50.0).tanh(), Vec::new()))
        };
        let cfg = SecantConfig {
            eps_x: 1e-3,
            eps_y: 1e-6,
            ..SecantConfig::default()
        };
        let r = find_root(f, &[], &cfg).unwrap();
        assert!(r.converged());
        assert!((r.x.unwrap() - 3500.0).abs() < 0.01, "x = {:?}", r.x);

        assert_eq!(&evaluated[..3], &[300.0, 4000.0, 2150.0]);
        assert!((evaluated[3] - 3193.36).abs() < 0.1, "{evaluated:?}");
        assert!((evaluated[4] - 3393.36).abs() < 0.1, "{evaluated:?}");
        // The first secant step spans the initial bracket, so it lands at its midpoint.
        assert!((evaluated[5] - 2150.0).abs() < 1e-3, "{evaluated:?}");
    }

    #[test]
    fn exhaustion_reports_last_iterate() {
        let cfg = SecantConfig {
            max_iterations: 3,
            eps_y: 1e-300,
            eps_x: 1e-300,
            ..narrow(0.0, 10.0)
        };
        let r = find_root(scalar(|x| (x - 1.0).powi(3)), &[], &cfg).unwrap();
        assert_eq!(r.status, RootStatus::MaxIterationsExceeded);
        assert_eq!(r.iterations, 3);
        let x = r.x.unwrap();
        assert!(x > 0.0 && x < 10.0);
    }

    #[test]
    fn residual_errors_propagate() {
        let f = |x: f64, _: &[f64]| -> SolverResult<(f64, Vec<f64>)> {
            if x > 5.0 {
                Err(SolverError::Numeric {
                    what: "boom".to_string(),
                })
            } else {
                Ok((x - 1.0, Vec::new()))
            }
        };
        assert!(find_root(f, &[], &narrow(0.0, 10.0)).is_err());
    }

    #[test]
    fn seeds_with_closer_end_mixture() {
        let mut seeds = Vec::new();
        let f = |x: f64, seed: &[f64]| {
            seeds.push(seed.first().copied());
            Ok((x - 2.0, vec![x]))
        };
        let cfg = SecantConfig {
            f_change: 0.0,
            ..narrow(0.0, 10.0)
        };
        let r = find_root(f, &[-1.0], &cfg).unwrap();
        assert!(r.converged());
        assert_eq!(seeds[0], Some(-1.0));
        assert_eq!(seeds[1], Some(-1.0));
        // Trial x = 2 sits closer to the lower end (x = 0).
        assert_eq!(seeds[2], Some(0.0));
    }
}
