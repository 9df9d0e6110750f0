//! 1D root-finding solvers.
//!
//! Two ways in:
//!
//! - [`find_root`] / [`find_root_with_derivative`] take a [`RootSearch`]
//!   (bracket or initial guess) and pick the solver.
//! - The named solvers [`brent`], [`bisection`], [`newton_safe`] and
//!   [`newton`] can be called directly.
//!
//! Every solver stops when `|f(x)| < accuracy` or the bracket (or step)
//! shrinks below `x_accuracy`, and fails with `Error::Convergence` once
//! `max_iterations` is spent.  A bracket without a sign change is rejected
//! with `Error::InvalidBracket` before any iteration.  Roots returned from a
//! bracket always lie inside it.

use ql_core::{
    errors::{Error, Result},
    Real,
};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Tolerances and iteration budget shared by all solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solver1DConfig {
    /// Stop once `|f(x)|` falls below this.
    pub accuracy: Real,
    /// Stop once the bracket width (or Newton step) falls below this.
    pub x_accuracy: Real,
    /// Iteration budget; exceeding it is a `Convergence` error.
    pub max_iterations: usize,
}

impl Default for Solver1DConfig {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-12,
            x_accuracy: 1.0e-12,
            max_iterations: 100,
        }
    }
}

impl Solver1DConfig {
    /// Check that tolerances are positive and the budget is non-zero.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.accuracy > 0.0 && self.accuracy.is_finite(),
            Configuration,
            "solver accuracy must be positive, got {}",
            self.accuracy
        );
        ql_core::ensure!(
            self.x_accuracy > 0.0 && self.x_accuracy.is_finite(),
            Configuration,
            "solver x_accuracy must be positive, got {}",
            self.x_accuracy
        );
        ql_core::ensure!(
            self.max_iterations > 0,
            Configuration,
            "solver max_iterations must be at least 1"
        );
        Ok(())
    }
}

/// Where to look for the root.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RootSearch {
    /// `f(lo)` and `f(hi)` must have opposite signs.
    Bracket {
        /// Lower end.
        lo: Real,
        /// Upper end.
        hi: Real,
    },
    /// Start Newton iteration from `x0`, optionally confined to `bounds`.
    Guess {
        /// Starting point.
        x0: Real,
        /// Hard domain bounds `(lo, hi)`; iterates are clamped into them.
        bounds: Option<(Real, Real)>,
    },
}

/// Solve `f(x) = 0`.
///
/// A bracket is handled by [`brent`]; a guess by [`newton`] with a
/// central-difference derivative.
///
/// ```
/// use ql_math::solvers1d::{find_root, RootSearch, Solver1DConfig};
/// let cfg = Solver1DConfig::default();
/// let x = find_root(|x| x * x - 2.0, RootSearch::Bracket { lo: 0.0, hi: 2.0 }, &cfg).unwrap();
/// assert!((x - 2f64.sqrt()).abs() < 1e-10);
/// ```
pub fn find_root<F>(f: F, search: RootSearch, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    match search {
        RootSearch::Bracket { lo, hi } => brent(f, lo, hi, cfg),
        RootSearch::Guess { x0, bounds } => {
            newton(|x| (f(x), central_difference(&f, x)), x0, bounds, cfg)
        }
    }
}

/// Solve `f(x) = 0` given `f_df(x) = (f(x), f'(x))`.
///
/// A bracket is handled by [`newton_safe`]; a guess by [`newton`].
pub fn find_root_with_derivative<F>(f_df: F, search: RootSearch, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> (Real, Real),
{
    match search {
        RootSearch::Bracket { lo, hi } => newton_safe(f_df, lo, hi, cfg),
        RootSearch::Guess { x0, bounds } => newton(f_df, x0, bounds, cfg),
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn central_difference<F: Fn(Real) -> Real>(f: &F, x: Real) -> Real {
    let h = 1.0e-6 * x.abs().max(1.0);
    (f(x + h) - f(x - h)) / (2.0 * h)
}

fn finite(fx: Real, x: Real, iterations: usize) -> Result<Real> {
    if fx.is_finite() {
        Ok(fx)
    } else {
        Err(Error::Convergence {
            iterations,
            reason: format!("objective is not finite at x = {x} (f = {fx})"),
        })
    }
}

fn check_bracket(lo: Real, hi: Real, f_lo: Real, f_hi: Real) -> Result<()> {
    let malformed = !(lo.is_finite() && hi.is_finite() && lo < hi);
    if malformed || f_lo * f_hi > 0.0 {
        return Err(Error::InvalidBracket { lo, hi, f_lo, f_hi });
    }
    Ok(())
}

fn exhausted(cfg: &Solver1DConfig, solver: &str, x: Real, fx: Real) -> Error {
    Error::Convergence {
        iterations: cfg.max_iterations,
        reason: format!("{solver}: budget exhausted at x = {x}, f(x) = {fx}"),
    }
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)` in `[lo, hi]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation; every
/// iterate stays inside the current bracket.
pub fn brent<F>(f: F, lo: Real, hi: Real, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    cfg.validate()?;
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(Error::InvalidBracket {
            lo,
            hi,
            f_lo: Real::NAN,
            f_hi: Real::NAN,
        });
    }
    let mut a = lo;
    let mut b = hi;
    let mut fa = finite(f(a), a, 0)?;
    let mut fb = finite(f(b), b, 0)?;
    check_bracket(lo, hi, fa, fb)?;
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iteration in 1..=cfg.max_iterations {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * Real::EPSILON * b.abs() + 0.5 * cfg.x_accuracy;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb.abs() < cfg.accuracy {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            // inverse quadratic interpolation, or secant when a == c
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = finite(f(b), b, iteration)?;
    }
    Err(exhausted(cfg, "brent", b, fb))
}

// ── Bisection ────────────────────────────────────────────────────────────────

/// Plain bisection.  Slow but unconditionally convergent on a valid bracket.
pub fn bisection<F>(f: F, lo: Real, hi: Real, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    cfg.validate()?;
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(Error::InvalidBracket {
            lo,
            hi,
            f_lo: Real::NAN,
            f_hi: Real::NAN,
        });
    }
    let mut a = lo;
    let mut b = hi;
    let fa = finite(f(a), a, 0)?;
    let fb = finite(f(b), b, 0)?;
    check_bracket(lo, hi, fa, fb)?;
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let a_negative = fa < 0.0;
    let mut mid = 0.5 * (a + b);
    let mut fm = fa;
    for iteration in 1..=cfg.max_iterations {
        mid = 0.5 * (a + b);
        fm = finite(f(mid), mid, iteration)?;
        if fm.abs() < cfg.accuracy || 0.5 * (b - a) < cfg.x_accuracy {
            return Ok(mid);
        }
        if (fm < 0.0) == a_negative {
            a = mid;
        } else {
            b = mid;
        }
    }
    Err(exhausted(cfg, "bisection", mid, fm))
}

// ── Newton-Safe ──────────────────────────────────────────────────────────────

/// Safeguarded Newton-Raphson inside the bracket `[lo, hi]`, started from the
/// midpoint.
///
/// Falls back to bisection whenever the Newton step would leave the bracket
/// or is not shrinking fast enough.
pub fn newton_safe<F>(f_df: F, lo: Real, hi: Real, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> (Real, Real),
{
    newton_safe_from(f_df, lo, hi, 0.5 * (lo + hi), cfg)
}

/// [`newton_safe`] started from `x0` (clamped into the bracket; the midpoint
/// is used if `x0` is not finite).
pub fn newton_safe_from<F>(f_df: F, lo: Real, hi: Real, x0: Real, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> (Real, Real),
{
    cfg.validate()?;
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(Error::InvalidBracket {
            lo,
            hi,
            f_lo: Real::NAN,
            f_hi: Real::NAN,
        });
    }
    let f_lo = finite(f_df(lo).0, lo, 0)?;
    let f_hi = finite(f_df(hi).0, hi, 0)?;
    check_bracket(lo, hi, f_lo, f_hi)?;
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }

    // Orient so that f(xl) < 0
    let (mut xl, mut xh) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };

    let mut x = if x0.is_finite() {
        x0.clamp(lo, hi)
    } else {
        0.5 * (lo + hi)
    };
    let mut dx_old = hi - lo;
    let mut dx = dx_old;
    let (f0, df0) = f_df(x);
    let mut fx = finite(f0, x, 0)?;
    let mut dfx = df0;

    for iteration in 1..=cfg.max_iterations {
        if fx.abs() < cfg.accuracy {
            return Ok(x);
        }
        let newton_out_of_range =
            !dfx.is_finite() || ((x - xh) * dfx - fx) * ((x - xl) * dfx - fx) > 0.0;
        let too_slow = (2.0 * fx).abs() > (dx_old * dfx).abs();

        dx_old = dx;
        if newton_out_of_range || too_slow {
            dx = 0.5 * (xh - xl);
            x = xl + dx;
        } else {
            dx = fx / dfx;
            x -= dx;
        }
        if dx.abs() < cfg.x_accuracy {
            return Ok(x);
        }

        let (f_new, df_new) = f_df(x);
        fx = finite(f_new, x, iteration)?;
        dfx = df_new;
        if fx < 0.0 {
            xl = x;
        } else {
            xh = x;
        }
        if (xh - xl).abs() < cfg.x_accuracy {
            return Ok(x);
        }
    }
    Err(exhausted(cfg, "newton_safe", x, fx))
}

// ── Newton-Raphson ────────────────────────────────────────────────────────────

/// Newton-Raphson from a single starting point.
///
/// Once two iterates straddle a sign change the bracket is remembered; any
/// later Newton step that leaves it, or fails to reduce `|f|`, is replaced by
/// bisection of that bracket.  Until a bracket is known a non-improving step
/// is halved instead.  Optional `bounds` clamp every iterate.
pub fn newton<F>(f_df: F, x0: Real, bounds: Option<(Real, Real)>, cfg: &Solver1DConfig) -> Result<Real>
where
    F: Fn(Real) -> (Real, Real),
{
    const MAX_HALVINGS: usize = 60;

    cfg.validate()?;
    ql_core::ensure!(x0.is_finite(), InvalidParameter, "starting point must be finite, got {x0}");
    if let Some((lo, hi)) = bounds {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::InvalidBracket {
                lo,
                hi,
                f_lo: Real::NAN,
                f_hi: Real::NAN,
            });
        }
    }
    let clamp = |x: Real| match bounds {
        Some((lo, hi)) => x.clamp(lo, hi),
        None => x,
    };

    let mut x = clamp(x0);
    let (f0, df0) = f_df(x);
    let mut fx = finite(f0, x, 0)?;
    let mut dfx = df0;
    // (x with f < 0, x with f > 0)
    let mut bracket: Option<(Real, Real)> = None;

    for iteration in 1..=cfg.max_iterations {
        if fx.abs() < cfg.accuracy {
            return Ok(x);
        }
        if let Some((xn, xp)) = bracket {
            if (xp - xn).abs() < cfg.x_accuracy {
                return Ok(x);
            }
        }

        let newton_x = if dfx.is_finite() && dfx != 0.0 {
            clamp(x - fx / dfx)
        } else {
            Real::NAN
        };

        let (x_new, f_new, df_new) = match bracket {
            Some((xn, xp)) => {
                let inside = newton_x.is_finite() && newton_x > xn.min(xp) && newton_x < xn.max(xp);
                let midpoint = 0.5 * (xn + xp);
                let trial = if inside { newton_x } else { midpoint };
                let (f_trial, df_trial) = f_df(trial);
                let f_trial = finite(f_trial, trial, iteration)?;
                if inside && f_trial.abs() >= fx.abs() {
                    let (f_mid, df_mid) = f_df(midpoint);
                    (midpoint, finite(f_mid, midpoint, iteration)?, df_mid)
                } else {
                    (trial, f_trial, df_trial)
                }
            }
            None => {
                if !newton_x.is_finite() {
                    return Err(Error::Convergence {
                        iterations: iteration,
                        reason: format!("zero derivative at x = {x} and no bracket known"),
                    });
                }
                let mut step = newton_x - x;
                let mut trial = newton_x;
                let (mut f_trial, mut df_trial) = f_df(trial);
                let mut halvings = 0;
                // accept once |f| drops or the sign flips (a bracket forms)
                while !(f_trial.is_finite() && (f_trial.abs() < fx.abs() || f_trial * fx < 0.0)) {
                    halvings += 1;
                    if halvings > MAX_HALVINGS || step.abs() < cfg.x_accuracy {
                        return Err(Error::Convergence {
                            iterations: iteration,
                            reason: format!("step halving stalled at x = {x}, f(x) = {fx}"),
                        });
                    }
                    step *= 0.5;
                    trial = clamp(x + step);
                    (f_trial, df_trial) = f_df(trial);
                }
                (trial, f_trial, df_trial)
            }
        };

        if f_new == 0.0 {
            return Ok(x_new);
        }
        bracket = match bracket {
            Some((_, xp)) if f_new < 0.0 => Some((x_new, xp)),
            Some((xn, _)) => Some((xn, x_new)),
            None if f_new * fx < 0.0 => Some(if f_new < 0.0 { (x_new, x) } else { (x, x_new) }),
            None => None,
        };
        let step = (x_new - x).abs();
        x = x_new;
        fx = f_new;
        dfx = df_new;
        if step < cfg.x_accuracy && fx.abs() < cfg.accuracy.sqrt() {
            return Ok(x);
        }
    }
    Err(exhausted(cfg, "newton", x, fx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cfg() -> Solver1DConfig {
        Solver1DConfig::default()
    }

    #[test]
    fn brent_sqrt2() {
        let root = brent(|x| x * x - 2.0, 0.0, 2.0, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn bisection_sqrt2() {
        let root = bisection(|x| x * x - 2.0, 0.0, 2.0, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn bisection_decreasing_function() {
        let root = bisection(|x| 1.0 - x, 0.0, 3.0, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn newton_safe_sqrt2() {
        let root = newton_safe(|x| (x * x - 2.0, 2.0 * x), 0.0, 2.0, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn newton_safe_from_guess() {
        let root = newton_safe_from(|x| (x.cos() - x, -x.sin() - 1.0), 0.0, 1.0, 0.9, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 0.739_085_133_215_160_6, epsilon = 1e-10);
    }

    #[test]
    fn newton_sqrt2() {
        let root = newton(|x| (x * x - 2.0, 2.0 * x), 1.5, None, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn newton_atan_does_not_diverge() {
        // Pure Newton on atan diverges from |x0| > ~1.39
        let root = newton(|x| (x.atan(), 1.0 / (1.0 + x * x)), 3.0, None, &cfg()).unwrap();
        assert_abs_diff_eq!(root, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn newton_zero_derivative_without_bracket() {
        let err = newton(|x| (x * x + 1.0, 2.0 * x), 0.0, None, &cfg()).unwrap_err();
        assert!(matches!(err, Error::Convergence { .. }), "{err}");
    }

    #[test]
    fn newton_respects_bounds() {
        let root = newton(|x| (x * x - 4.0, 2.0 * x), 10.0, Some((0.0, 5.0)), &cfg()).unwrap();
        assert_abs_diff_eq!(root, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn find_root_guess_uses_numerical_derivative() {
        let root = find_root(
            |x| x.exp() - 3.0,
            RootSearch::Guess {
                x0: 0.0,
                bounds: None,
            },
            &cfg(),
        )
        .unwrap();
        assert_abs_diff_eq!(root, 3.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn find_root_with_derivative_bracket() {
        let root = find_root_with_derivative(
            |x| (x * x * x - 27.0, 3.0 * x * x),
            RootSearch::Bracket { lo: 0.0, hi: 10.0 },
            &cfg(),
        )
        .unwrap();
        assert_abs_diff_eq!(root, 3.0, epsilon = 1e-10);
    }

    #[test]
    fn no_sign_change_is_invalid_bracket() {
        let err = brent(|x| x, 1.0, 2.0, &cfg()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidBracket {
                lo: 1.0,
                hi: 2.0,
                f_lo: 1.0,
                f_hi: 2.0
            }
        );
        assert!(matches!(
            newton_safe(|x| (x * x - 2.0, 2.0 * x), 3.0, 5.0, &cfg()),
            Err(Error::InvalidBracket { .. })
        ));
        assert!(matches!(bisection(|x| x, 1.0, 2.0, &cfg()), Err(Error::InvalidBracket { .. })));
    }

    #[test]
    fn reversed_bracket_rejected() {
        assert!(matches!(
            brent(|x| x, 1.0, -1.0, &cfg()),
            Err(Error::InvalidBracket { .. })
        ));
    }

    #[test]
    fn budget_exhaustion_is_convergence_error() {
        let tight = Solver1DConfig {
            max_iterations: 3,
            ..Solver1DConfig::default()
        };
        let err = bisection(|x| x - 0.123_456, 0.0, 1.0, &tight).unwrap_err();
        assert!(matches!(err, Error::Convergence { iterations: 3, .. }), "{err}");
    }

    #[test]
    fn non_finite_objective_is_convergence_error() {
        let err = brent(|x| if x > 0.5 { Real::NAN } else { x - 0.75 }, 0.0, 1.0, &cfg()).unwrap_err();
        assert!(matches!(err, Error::Convergence { .. }));
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = Solver1DConfig {
            accuracy: 0.0,
            ..Solver1DConfig::default()
        };
        assert!(matches!(brent(|x| x, -1.0, 1.0, &bad), Err(Error::Configuration(_))));
    }

    #[test]
    fn root_at_bracket_end() {
        assert_eq!(brent(|x| x - 1.0, 1.0, 2.0, &cfg()).unwrap(), 1.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn brent_root_inside_bracket(c in -50.0..50.0_f64, lo_off in 0.01..20.0_f64, hi_off in 0.01..20.0_f64) {
                let root_true = c.cbrt();
                let (lo, hi) = (root_true - lo_off, root_true + hi_off);
                let f = |x: Real| x * x * x - c;
                let x = find_root(f, RootSearch::Bracket { lo, hi }, &cfg()).unwrap();
                prop_assert!(x >= lo && x <= hi);
                prop_assert!(f(x).abs() < 1e-8, "f({x}) = {}", f(x));
            }

            #[test]
            fn newton_safe_root_inside_bracket(c in 0.1..100.0_f64) {
                let x = newton_safe(|x| (x * x - c, 2.0 * x), 0.0, 11.0, &cfg()).unwrap();
                prop_assert!((0.0..=11.0).contains(&x));
                prop_assert!((x * x - c).abs() < 1e-8);
            }
        }
    }
}
