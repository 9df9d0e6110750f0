//! 1D interpolation trait and implementations.
//!
//! Three schemes are supported, selected through the closed
//! [`InterpolationMethod`] tag:
//!
//! - **Linear**: straight lines between nodes.
//! - **LogLinear**: linear in `ln y`, used for discount factors.
//! - **CubicSpline**: natural cubic spline (zero second derivative at both
//!   ends), see [`cubic`].
//!
//! Queries outside the sample range follow an [`Extrapolation`] policy:
//! flat (boundary value) by default, or a hard `OutOfRange` failure.

use ql_core::{
    errors::{Error, Result},
    Real,
};

pub mod cubic;

pub use cubic::CubicNaturalSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the underlying polynomial piece at `x`.
    ///
    /// Outside `[x_min, x_max]` the boundary piece is continued; apply an
    /// [`Extrapolation`] policy through [`Interpolation::value`] instead when
    /// that matters.
    fn operator(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Which interpolation scheme to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMethod {
    /// Piecewise linear.
    #[default]
    Linear,
    /// Piecewise linear in `ln y`; all `y` must be positive.
    LogLinear,
    /// Natural cubic spline.
    CubicSpline,
}

impl InterpolationMethod {
    /// Minimum number of samples the scheme needs.
    pub fn min_points(self) -> usize {
        match self {
            InterpolationMethod::Linear | InterpolationMethod::LogLinear => 2,
            InterpolationMethod::CubicSpline => 3,
        }
    }

    /// `true` if moving one node changes the interpolant away from that
    /// node's neighbouring intervals.
    pub fn is_global(self) -> bool {
        matches!(self, InterpolationMethod::CubicSpline)
    }
}

/// Policy for queries outside the sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extrapolation {
    /// Return the value at the nearest boundary node.
    #[default]
    Flat,
    /// Fail with `Error::OutOfRange`.
    Fail,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Check the preconditions shared by every scheme.
pub(crate) fn validate(xs: &[Real], ys: &[Real], min_points: usize, scheme: &str) -> Result<()> {
    ql_core::ensure!(
        xs.len() == ys.len(),
        Configuration,
        "{scheme}: xs ({}) and ys ({}) must have the same length",
        xs.len(),
        ys.len()
    );
    ql_core::ensure!(
        xs.len() >= min_points,
        Configuration,
        "{scheme}: need at least {min_points} points, got {}",
        xs.len()
    );
    if let Some(i) = xs.iter().zip(ys).position(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(Error::Configuration(format!(
            "{scheme}: non-finite sample ({}, {}) at index {i}",
            xs[i], ys[i]
        )));
    }
    if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::Configuration(format!(
            "{scheme}: x values must be strictly increasing, x[{i}] = {} >= x[{}] = {}",
            xs[i],
            i + 1,
            xs[i + 1]
        )));
    }
    Ok(())
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped to the
/// first and last interval.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // partition_point gives the first index with xs[i] > x
    xs.partition_point(|&xi| xi <= x) - 1
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// `Configuration` if the slices differ in length, hold fewer than 2
    /// points, contain non-finite values, or `xs` is not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        validate(xs, ys, 2, "linear interpolation")?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Sample abscissae.
    pub fn xs(&self) -> &[Real] {
        &self.xs
    }

    /// Sample ordinates.
    pub fn ys(&self) -> &[Real] {
        &self.ys
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

// ── Log-linear ────────────────────────────────────────────────────────────────

/// Log-linear interpolation.
///
/// Interpolates `log(y)` linearly and exponentiates the result.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLinearInterpolation {
    inner: LinearInterpolation,
}

impl LogLinearInterpolation {
    /// Construct a log-linear interpolation.
    ///
    /// All `ys` values must be strictly positive.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        validate(xs, ys, 2, "log-linear interpolation")?;
        if let Some(i) = ys.iter().position(|&y| y <= 0.0) {
            return Err(Error::Configuration(format!(
                "log-linear interpolation: y[{i}] = {} must be positive",
                ys[i]
            )));
        }
        let log_ys: Vec<Real> = ys.iter().map(|&y| y.ln()).collect();
        Ok(Self {
            inner: LinearInterpolation {
                xs: xs.to_vec(),
                ys: log_ys,
            },
        })
    }
}

impl Interpolation1D for LogLinearInterpolation {
    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }

    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x).exp()
    }
}

// ── Tagged variant ────────────────────────────────────────────────────────────

/// An interpolation whose scheme was chosen by an [`InterpolationMethod`].
///
/// Holds the precomputed state (log values, spline coefficients) so repeated
/// queries do no set-up work.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    /// See [`LinearInterpolation`].
    Linear(LinearInterpolation),
    /// See [`LogLinearInterpolation`].
    LogLinear(LogLinearInterpolation),
    /// See [`CubicNaturalSpline`].
    CubicSpline(CubicNaturalSpline),
}

impl Interpolation {
    /// Build the interpolation selected by `method`.
    pub fn new(method: InterpolationMethod, xs: &[Real], ys: &[Real]) -> Result<Self> {
        Ok(match method {
            InterpolationMethod::Linear => Self::Linear(LinearInterpolation::new(xs, ys)?),
            InterpolationMethod::LogLinear => Self::LogLinear(LogLinearInterpolation::new(xs, ys)?),
            InterpolationMethod::CubicSpline => Self::CubicSpline(CubicNaturalSpline::new(xs, ys)?),
        })
    }

    /// The scheme in use.
    pub fn method(&self) -> InterpolationMethod {
        match self {
            Self::Linear(_) => InterpolationMethod::Linear,
            Self::LogLinear(_) => InterpolationMethod::LogLinear,
            Self::CubicSpline(_) => InterpolationMethod::CubicSpline,
        }
    }

    /// Evaluate at `x` under the given extrapolation policy.
    ///
    /// # Errors
    /// `OutOfRange` for a non-finite `x`, or for `x` outside the nodes under
    /// [`Extrapolation::Fail`].
    pub fn value(&self, x: Real, extrapolation: Extrapolation) -> Result<Real> {
        let (lo, hi) = (self.x_min(), self.x_max());
        if !x.is_finite() {
            return Err(Error::OutOfRange {
                x,
                x_min: lo,
                x_max: hi,
            });
        }
        if x < lo || x > hi {
            return match extrapolation {
                Extrapolation::Flat => Ok(self.operator(x.clamp(lo, hi))),
                Extrapolation::Fail => Err(Error::OutOfRange {
                    x,
                    x_min: lo,
                    x_max: hi,
                }),
            };
        }
        Ok(self.operator(x))
    }
}

impl Interpolation1D for Interpolation {
    fn operator(&self, x: Real) -> Real {
        match self {
            Self::Linear(i) => i.operator(x),
            Self::LogLinear(i) => i.operator(x),
            Self::CubicSpline(i) => i.operator(x),
        }
    }

    fn x_min(&self) -> Real {
        match self {
            Self::Linear(i) => i.x_min(),
            Self::LogLinear(i) => i.x_min(),
            Self::CubicSpline(i) => i.x_min(),
        }
    }

    fn x_max(&self) -> Real {
        match self {
            Self::Linear(i) => i.x_max(),
            Self::LogLinear(i) => i.x_max(),
            Self::CubicSpline(i) => i.x_max(),
        }
    }
}

/// One-shot interpolation with flat extrapolation.
///
/// ```
/// use ql_math::interpolations::{interpolate, InterpolationMethod};
/// let y = interpolate(&[0.0, 1.0], &[1.0, 3.0], InterpolationMethod::Linear, 0.25).unwrap();
/// assert!((y - 1.5).abs() < 1e-15);
/// ```
pub fn interpolate(xs: &[Real], ys: &[Real], method: InterpolationMethod, x: Real) -> Result<Real> {
    interpolate_with(xs, ys, method, x, Extrapolation::Flat)
}

/// One-shot interpolation with an explicit extrapolation policy.
pub fn interpolate_with(
    xs: &[Real],
    ys: &[Real],
    method: InterpolationMethod,
    x: Real,
    extrapolation: Extrapolation,
) -> Result<Real> {
    Interpolation::new(method, xs, ys)?.value(x, extrapolation)
}
