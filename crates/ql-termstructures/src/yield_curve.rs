//! `Curve`: an immutable discount curve on pivot maturities.
//!
//! A curve holds pivots `(t, P(t))` with an implicit pivot `(0, 1)`, the
//! interpolation method tag, and the interpolation built once at
//! construction:
//!
//! - **LogLinear** interpolates `ln P(t)` (piecewise-flat forwards).
//! - **Linear** and **CubicSpline** interpolate continuously-compounded zero
//!   rates `z(t) = −ln P(t) / t`, with `z(0)` taken equal to the first
//!   pivot's rate.  A spline needs three nodes; with a single pivot the curve
//!   falls back to linear (i.e. flat) zero rates.
//!
//! Beyond the last pivot the zero rate is held flat.  Discount factors that
//! increase with maturity are recorded as [`CurveWarning`]s, never corrected.

use ql_core::{
    compounding::implied_rate,
    errors::{Error, Result},
    Compounding, Date, DayCounter, DiscountFactor, Frequency, Rate, Time,
};
use ql_math::interpolations::{Interpolation, Interpolation1D, InterpolationMethod};
use std::fmt;
use tracing::warn;

/// Version written into [`CurveRecord`]; bump on layout changes.
pub const CURVE_RECORD_VERSION: u32 = 1;

/// A flagged no-arbitrage violation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveWarning {
    /// `P(t)` rises between two consecutive pivots (negative forward rate).
    IncreasingDiscountFactor {
        /// Earlier pivot maturity.
        t_prev: Time,
        /// Discount factor at `t_prev`.
        df_prev: DiscountFactor,
        /// Later pivot maturity.
        t: Time,
        /// Discount factor at `t`.
        df: DiscountFactor,
    },
}

impl fmt::Display for CurveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveWarning::IncreasingDiscountFactor { t_prev, df_prev, t, df } => write!(
                f,
                "discount factor increases from {df_prev} at t = {t_prev} to {df} at t = {t}"
            ),
        }
    }
}

/// An immutable, interpolated discount curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "CurveRecord", into = "CurveRecord")
)]
pub struct Curve {
    valuation_date: Date,
    day_counter: DayCounter,
    method: InterpolationMethod,
    /// Pivot maturities, `times[0] == 0`.
    times: Vec<Time>,
    /// Discount factors, `discounts[0] == 1`.
    discounts: Vec<DiscountFactor>,
    /// Over `ln P` for log-linear, over zero rates otherwise.
    interp: Interpolation,
    warnings: Vec<CurveWarning>,
}

impl Curve {
    /// Build a curve from `(maturity, discount_factor)` pivots.
    ///
    /// A pivot at maturity 0 is optional; if present its discount factor
    /// must be exactly 1.  Violations of monotonicity are logged at `warn!`
    /// and kept in [`Curve::warnings`].
    ///
    /// # Errors
    /// `Configuration` if there is no pivot beyond 0, maturities are not
    /// strictly increasing, or any discount factor is not positive.
    pub fn from_pivots(
        valuation_date: Date,
        pivots: &[(Time, DiscountFactor)],
        method: InterpolationMethod,
        day_counter: DayCounter,
    ) -> Result<Self> {
        let skip_origin = matches!(pivots.first(), Some(&(t, _)) if t == 0.0);
        if skip_origin && pivots[0].1 != 1.0 {
            return Err(Error::Configuration(format!(
                "discount factor at maturity 0 must be 1, got {}",
                pivots[0].1
            )));
        }
        let rest = if skip_origin { &pivots[1..] } else { pivots };

        let mut times = Vec::with_capacity(rest.len() + 1);
        let mut discounts = Vec::with_capacity(rest.len() + 1);
        times.push(0.0);
        discounts.push(1.0);
        for &(t, df) in rest {
            times.push(t);
            discounts.push(df);
        }

        let curve = Self::assemble(valuation_date, day_counter, method, times, discounts)?;
        for w in &curve.warnings {
            warn!(valuation_date = %valuation_date, "{w}");
        }
        Ok(curve)
    }

    /// A curve with the same continuously-compounded zero rate everywhere.
    pub fn flat(valuation_date: Date, rate: Rate, day_counter: DayCounter) -> Result<Self> {
        ql_core::ensure!(rate.is_finite(), InvalidParameter, "flat rate must be finite, got {rate}");
        const LONG_END: Time = 100.0;
        Self::from_pivots(
            valuation_date,
            &[(LONG_END, (-rate * LONG_END).exp())],
            InterpolationMethod::LogLinear,
            day_counter,
        )
    }

    /// Validate the nodes, build the interpolation and collect warnings.
    /// Does not log; used for trial curves during bootstrapping.
    pub(crate) fn assemble(
        valuation_date: Date,
        day_counter: DayCounter,
        method: InterpolationMethod,
        times: Vec<Time>,
        discounts: Vec<DiscountFactor>,
    ) -> Result<Self> {
        ql_core::ensure!(
            times.len() >= 2,
            Configuration,
            "a curve needs at least one pivot beyond maturity 0"
        );
        if let Some(i) = discounts.iter().position(|df| !(df.is_finite() && *df > 0.0)) {
            return Err(Error::Configuration(format!(
                "discount factor at t = {} must be positive, got {}",
                times[i], discounts[i]
            )));
        }

        let interp = match method {
            InterpolationMethod::LogLinear => Interpolation::new(method, &times, &discounts)?,
            _ => {
                let mut zeros = Vec::with_capacity(times.len());
                zeros.push(0.0);
                zeros.extend(
                    times[1..]
                        .iter()
                        .zip(&discounts[1..])
                        .map(|(&t, &df)| -df.ln() / t),
                );
                zeros[0] = zeros[1];
                let effective = if times.len() < method.min_points() {
                    InterpolationMethod::Linear
                } else {
                    method
                };
                Interpolation::new(effective, &times, &zeros)?
            }
        };

        let warnings = times
            .windows(2)
            .zip(discounts.windows(2))
            .filter(|(_, df)| df[1] > df[0])
            .map(|(t, df)| CurveWarning::IncreasingDiscountFactor {
                t_prev: t[0],
                df_prev: df[0],
                t: t[1],
                df: df[1],
            })
            .collect();

        Ok(Self {
            valuation_date,
            day_counter,
            method,
            times,
            discounts,
            interp,
            warnings,
        })
    }

    // ── Inspectors ───────────────────────────────────────────────────────────

    /// The valuation (reference) date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Day counter used by [`Curve::discount_on`].
    pub fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    /// Interpolation method tag.
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Pivots `(maturity, discount_factor)`, including `(0, 1)`.
    pub fn pivots(&self) -> Vec<(Time, DiscountFactor)> {
        self.times.iter().copied().zip(self.discounts.iter().copied()).collect()
    }

    /// Pivot maturities, starting at 0.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Last pivot maturity.
    pub fn max_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// Flagged no-arbitrage violations.
    pub fn warnings(&self) -> &[CurveWarning] {
        &self.warnings
    }

    /// `true` if no discount factor increases with maturity.
    pub fn is_arbitrage_free(&self) -> bool {
        self.warnings.is_empty()
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Discount factor `P(t)`.
    ///
    /// # Errors
    /// `InvalidParameter` for negative or non-finite `t`.
    pub fn discount(&self, t: Time) -> Result<DiscountFactor> {
        check_time(t)?;
        if t == 0.0 {
            return Ok(1.0);
        }
        Ok((-self.continuous_zero(t) * t).exp())
    }

    /// Discount factor for a calendar date.
    pub fn discount_on(&self, date: Date) -> Result<DiscountFactor> {
        self.discount(self.time_from_reference(date))
    }

    /// Year fraction from the valuation date to `date`.
    pub fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter.year_fraction(self.valuation_date, date)
    }

    /// Zero rate to `t` under the given compounding.  At `t = 0` the short
    /// end rate (first pivot) is returned.
    pub fn zero_rate(&self, t: Time, compounding: Compounding, frequency: Frequency) -> Result<Rate> {
        check_time(t)?;
        let t = if t == 0.0 { self.times[1] } else { t };
        let z = self.continuous_zero(t);
        match compounding {
            Compounding::Continuous => Ok(z),
            _ => implied_rate((z * t).exp(), t, compounding, frequency),
        }
    }

    /// Continuously-compounded forward rate over `[t1, t2]`.
    pub fn forward_rate(&self, t1: Time, t2: Time) -> Result<Rate> {
        check_time(t1)?;
        ql_core::ensure!(
            t2.is_finite() && t2 > t1,
            InvalidParameter,
            "forward period [{t1}, {t2}] must have t2 > t1"
        );
        Ok((self.discount(t1)? / self.discount(t2)?).ln() / (t2 - t1))
    }

    /// Simply-compounded forward rate over `[t1, t2]`.
    pub fn simple_forward_rate(&self, t1: Time, t2: Time) -> Result<Rate> {
        check_time(t1)?;
        ql_core::ensure!(
            t2.is_finite() && t2 > t1,
            InvalidParameter,
            "forward period [{t1}, {t2}] must have t2 > t1"
        );
        Ok((self.discount(t1)? / self.discount(t2)? - 1.0) / (t2 - t1))
    }

    /// `z(t)` for `t > 0`, flat beyond the last pivot.
    fn continuous_zero(&self, t: Time) -> Rate {
        let t_last = self.max_time();
        if t > t_last {
            return -self.discounts[self.discounts.len() - 1].ln() / t_last;
        }
        match &self.interp {
            Interpolation::LogLinear(i) => -i.operator(t).ln() / t,
            other => other.operator(t),
        }
    }
}

fn check_time(t: Time) -> Result<()> {
    ql_core::ensure!(
        t.is_finite() && t >= 0.0,
        InvalidParameter,
        "time must be non-negative, got {t}"
    );
    Ok(())
}

// ── Serialization ─────────────────────────────────────────────────────────────

/// Units of the rates in a [`CurveRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RateUnits {
    /// Continuously-compounded, decimal.
    Continuous,
}

/// Units of the maturities in a [`CurveRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MaturityUnits {
    /// Year fractions under the record's day counter.
    Years,
}

/// One pivot in a [`CurveRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PivotRecord {
    /// Maturity in `maturity_units`.
    pub maturity: Time,
    /// Zero rate in `rate_units`.
    pub zero_rate: Rate,
}

/// Versioned, self-describing wire form of a [`Curve`].
///
/// The implicit pivot at maturity 0 is not written.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveRecord {
    /// Layout version, see [`CURVE_RECORD_VERSION`].
    pub version: u32,
    /// Valuation date.
    pub valuation_date: Date,
    /// Day counter for date queries.
    pub day_counter: DayCounter,
    /// Units of `pivots[].zero_rate`.
    pub rate_units: RateUnits,
    /// Units of `pivots[].maturity`.
    pub maturity_units: MaturityUnits,
    /// Interpolation method.
    pub method: InterpolationMethod,
    /// Pivots beyond maturity 0.
    pub pivots: Vec<PivotRecord>,
}

impl From<Curve> for CurveRecord {
    fn from(curve: Curve) -> Self {
        let pivots = curve.times[1..]
            .iter()
            .zip(&curve.discounts[1..])
            .map(|(&t, &df)| PivotRecord {
                maturity: t,
                zero_rate: -df.ln() / t,
            })
            .collect();
        Self {
            version: CURVE_RECORD_VERSION,
            valuation_date: curve.valuation_date,
            day_counter: curve.day_counter,
            rate_units: RateUnits::Continuous,
            maturity_units: MaturityUnits::Years,
            method: curve.method,
            pivots,
        }
    }
}

impl TryFrom<CurveRecord> for Curve {
    type Error = Error;

    fn try_from(record: CurveRecord) -> Result<Self> {
        ql_core::ensure!(
            record.version == CURVE_RECORD_VERSION,
            Configuration,
            "unsupported curve record version {} (expected {CURVE_RECORD_VERSION})",
            record.version
        );
        let pivots: Vec<(Time, DiscountFactor)> = record
            .pivots
            .iter()
            .map(|p| (p.maturity, (-p.zero_rate * p.maturity).exp()))
            .collect();
        if let Some(p) = record.pivots.iter().find(|p| !(p.maturity > 0.0)) {
            return Err(Error::Configuration(format!(
                "curve record pivot maturity must be positive, got {}",
                p.maturity
            )));
        }
        Curve::from_pivots(record.valuation_date, &pivots, record.method, record.day_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn today() -> Date {
        Date::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn sample(method: InterpolationMethod) -> Curve {
        let pivots = [(0.5, 0.985), (1.0, 0.968), (2.0, 0.934), (5.0, 0.84)];
        Curve::from_pivots(today(), &pivots, method, DayCounter::Actual365Fixed).unwrap()
    }

    #[test]
    fn curve_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Curve>();
    }

    #[test]
    fn pivots_are_reproduced() {
        for method in [
            InterpolationMethod::Linear,
            InterpolationMethod::LogLinear,
            InterpolationMethod::CubicSpline,
        ] {
            let curve = sample(method);
            assert_eq!(curve.discount(0.0).unwrap(), 1.0);
            for (t, df) in curve.pivots() {
                assert_abs_diff_eq!(curve.discount(t).unwrap(), df, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn flat_curve() {
        let curve = Curve::flat(today(), 0.05, DayCounter::Actual365Fixed).unwrap();
        for t in [0.1, 1.0, 7.5, 30.0, 150.0] {
            assert_abs_diff_eq!(curve.discount(t).unwrap(), (-0.05 * t).exp(), epsilon = 1e-14);
            let z = curve.zero_rate(t, Compounding::Continuous, Frequency::Annual).unwrap();
            assert_abs_diff_eq!(z, 0.05, epsilon = 1e-13);
        }
        assert_abs_diff_eq!(curve.forward_rate(1.0, 2.0).unwrap(), 0.05, epsilon = 1e-13);
    }

    #[test]
    fn flat_zero_extrapolation() {
        let curve = sample(InterpolationMethod::Linear);
        let z5 = curve.zero_rate(5.0, Compounding::Continuous, Frequency::Annual).unwrap();
        let z10 = curve.zero_rate(10.0, Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(z5, z10, epsilon = 1e-15);
    }

    #[test]
    fn short_end_is_flat_at_first_rate() {
        let curve = sample(InterpolationMethod::Linear);
        let z_first = -(0.985_f64).ln() / 0.5;
        let z = curve.zero_rate(0.1, Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(z, z_first, epsilon = 1e-15);
        let z0 = curve.zero_rate(0.0, Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(z0, z_first, epsilon = 1e-15);
    }

    #[test]
    fn compounded_zero_rate() {
        let curve = Curve::flat(today(), 0.04, DayCounter::Actual365Fixed).unwrap();
        let annual = curve.zero_rate(2.0, Compounding::Compounded, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(annual, 0.04_f64.exp() - 1.0, epsilon = 1e-13);
    }

    #[test]
    fn discount_on_date() {
        let curve = Curve::flat(today(), 0.03, DayCounter::Actual365Fixed).unwrap();
        let d = Date::from_ymd_opt(2026, 1, 2).unwrap();
        assert_abs_diff_eq!(curve.discount_on(d).unwrap(), (-0.03_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn negative_time_rejected() {
        let curve = sample(InterpolationMethod::LogLinear);
        assert!(matches!(curve.discount(-0.1), Err(Error::InvalidParameter(_))));
        assert!(matches!(curve.forward_rate(2.0, 1.0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn increasing_discount_is_flagged_not_corrected() {
        let curve = Curve::from_pivots(
            today(),
            &[(1.0, 0.97), (2.0, 0.98)],
            InterpolationMethod::LogLinear,
            DayCounter::Actual365Fixed,
        )
        .unwrap();
        assert!(!curve.is_arbitrage_free());
        assert_eq!(curve.warnings().len(), 1);
        assert_abs_diff_eq!(curve.discount(2.0).unwrap(), 0.98, epsilon = 1e-15);
    }

    #[test]
    fn invalid_pivots() {
        let build = |p: &[(Time, DiscountFactor)]| {
            Curve::from_pivots(today(), p, InterpolationMethod::Linear, DayCounter::Actual365Fixed)
        };
        assert!(matches!(build(&[]), Err(Error::Configuration(_))));
        assert!(matches!(build(&[(0.0, 0.99), (1.0, 0.95)]), Err(Error::Configuration(_))));
        assert!(matches!(build(&[(1.0, 0.95), (1.0, 0.94)]), Err(Error::Configuration(_))));
        assert!(matches!(build(&[(1.0, -0.95)]), Err(Error::Configuration(_))));
    }

    #[test]
    fn spline_with_one_pivot_is_flat() {
        let curve = Curve::from_pivots(
            today(),
            &[(1.0, (-0.02_f64).exp())],
            InterpolationMethod::CubicSpline,
            DayCounter::Actual365Fixed,
        )
        .unwrap();
        assert_eq!(curve.method(), InterpolationMethod::CubicSpline);
        assert_abs_diff_eq!(curve.discount(0.5).unwrap(), (-0.01_f64).exp(), epsilon = 1e-15);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_round_trip() {
        let curve = sample(InterpolationMethod::CubicSpline);
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.contains("\"version\":1"));
        assert!(json.contains("\"rate_units\":\"continuous\""));
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(back.method(), curve.method());
        for ((t1, d1), (t2, d2)) in back.pivots().into_iter().zip(curve.pivots()) {
            assert_eq!(t1, t2);
            assert_abs_diff_eq!(d1, d2, epsilon = 1e-15);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_record_version_rejected() {
        let mut record = CurveRecord::from(sample(InterpolationMethod::Linear));
        record.version = 99;
        let json = serde_json::to_string(&record).unwrap();
        assert!(serde_json::from_str::<Curve>(&json).is_err());
        assert!(matches!(Curve::try_from(record), Err(Error::Configuration(_))));
    }
}
