//! `ForwardPriceCurve`: forward prices implied by option quotes.
//!
//! For each maturity, every strike quoted with both a call and a put gives a
//! forward through put-call parity, `F = K + (C − P) / P(T)`; the forwards
//! are averaged across strikes.  The resulting pivots are joined with a
//! natural cubic spline (linear with fewer than three maturities) and held
//! flat outside the quoted range.

use crate::yield_curve::Curve;
use ql_core::{
    errors::{Error, Result},
    Price, Real, Time,
};
use ql_instruments::OptionType;
use ql_math::interpolations::{Extrapolation, Interpolation, InterpolationMethod};
use ql_quotes::OptionQuote;
use std::collections::BTreeMap;
use tracing::debug;

/// Forward prices by maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPriceCurve {
    pivots: Vec<(Time, Price)>,
    /// `None` with a single pivot.
    interp: Option<Interpolation>,
}

impl ForwardPriceCurve {
    /// Build directly from `(maturity, forward)` pivots.
    ///
    /// # Errors
    /// `Configuration` if empty, maturities are not strictly increasing and
    /// positive, or a forward is not positive.
    pub fn new(pivots: Vec<(Time, Price)>) -> Result<Self> {
        ql_core::ensure!(!pivots.is_empty(), Configuration, "forward curve needs at least one pivot");
        if let Some(&(t, f)) = pivots
            .iter()
            .find(|(t, f)| !(t.is_finite() && *t > 0.0 && f.is_finite() && *f > 0.0))
        {
            return Err(Error::Configuration(format!(
                "invalid forward pivot ({t}, {f})"
            )));
        }
        let interp = if pivots.len() == 1 {
            None
        } else {
            let method = if pivots.len() >= InterpolationMethod::CubicSpline.min_points() {
                InterpolationMethod::CubicSpline
            } else {
                InterpolationMethod::Linear
            };
            let (ts, fs): (Vec<Time>, Vec<Price>) = pivots.iter().copied().unzip();
            Some(Interpolation::new(method, &ts, &fs)?)
        };
        Ok(Self { pivots, interp })
    }

    /// Derive forwards from call/put pairs discounted on `curve`.
    ///
    /// Maturities without a usable call/put pair are skipped.
    ///
    /// # Errors
    /// `Configuration` for an invalid quote or if no maturity is usable.
    pub fn from_option_quotes(quotes: &[OptionQuote], curve: &Curve) -> Result<Self> {
        for q in quotes {
            q.validate()?;
        }

        // maturity -> strike -> (call, put); keyed on bit patterns so equal
        // floats group together and iteration is ordered for positive values.
        let mut grid: BTreeMap<u64, BTreeMap<u64, (Option<Price>, Option<Price>)>> =
            BTreeMap::new();
        for q in quotes {
            let slot = grid
                .entry(q.maturity.to_bits())
                .or_default()
                .entry(q.strike.to_bits())
                .or_default();
            match q.option_type {
                OptionType::Call => slot.0 = Some(q.price),
                OptionType::Put => slot.1 = Some(q.price),
            }
        }

        let mut pivots = Vec::with_capacity(grid.len());
        for (t_bits, strikes) in &grid {
            let t = Time::from_bits(*t_bits);
            let df = curve.discount(t)?;
            let forwards: Vec<Real> = strikes
                .iter()
                .filter_map(|(k_bits, pair)| match *pair {
                    (Some(c), Some(p)) => Some(Real::from_bits(*k_bits) + (c - p) / df),
                    _ => None,
                })
                .collect();
            if forwards.is_empty() {
                debug!(maturity = t, "no call/put pair, maturity skipped");
                continue;
            }
            let forward = forwards.iter().sum::<Real>() / forwards.len() as Real;
            if forward <= 0.0 {
                debug!(maturity = t, forward, "non-positive forward, maturity skipped");
                continue;
            }
            debug!(maturity = t, forward, strikes = forwards.len(), "forward from parity");
            pivots.push((t, forward));
        }

        ql_core::ensure!(
            !pivots.is_empty(),
            Configuration,
            "no maturity has both a call and a put quoted at the same strike"
        );
        Self::new(pivots)
    }

    /// `(maturity, forward)` pivots, ascending.
    pub fn pivots(&self) -> &[(Time, Price)] {
        &self.pivots
    }

    /// Forward price for delivery at `t`, flat outside the pivot range.
    pub fn forward(&self, t: Time) -> Result<Price> {
        ql_core::ensure!(
            t.is_finite() && t >= 0.0,
            InvalidParameter,
            "time must be non-negative, got {t}"
        );
        match &self.interp {
            Some(i) => i.value(t, Extrapolation::Flat),
            None => Ok(self.pivots[0].1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::{Date, DayCounter};

    fn curve() -> Curve {
        Curve::flat(Date::from_ymd_opt(2025, 1, 2).unwrap(), 0.05, DayCounter::Actual365Fixed)
            .unwrap()
    }

    /// Call and put premiums consistent with forward `f` by parity.
    fn pair(t: Time, k: Price, f: Price, put: Price) -> [OptionQuote; 2] {
        let df = (-0.05 * t).exp();
        let call = put + df * (f - k);
        [
            OptionQuote::new(format!("C{k}"), t, k, OptionType::Call, call),
            OptionQuote::new(format!("P{k}"), t, k, OptionType::Put, put),
        ]
    }

    #[test]
    fn recovers_forward_from_parity() {
        let mut quotes = Vec::new();
        quotes.extend(pair(0.5, 95.0, 101.0, 2.0));
        quotes.extend(pair(0.5, 105.0, 101.0, 6.5));
        quotes.extend(pair(1.0, 100.0, 103.0, 5.0));
        let fc = ForwardPriceCurve::from_option_quotes(&quotes, &curve()).unwrap();
        assert_eq!(fc.pivots().len(), 2);
        assert_abs_diff_eq!(fc.forward(0.5).unwrap(), 101.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fc.forward(1.0).unwrap(), 103.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fc.forward(0.75).unwrap(), 102.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fc.forward(3.0).unwrap(), 103.0, epsilon = 1e-10);
    }

    #[test]
    fn unpaired_maturities_are_skipped() {
        let mut quotes = pair(1.0, 100.0, 102.0, 4.0).to_vec();
        quotes.push(OptionQuote::new("C2Y", 2.0, 100.0, OptionType::Call, 9.0));
        let fc = ForwardPriceCurve::from_option_quotes(&quotes, &curve()).unwrap();
        assert_eq!(fc.pivots().len(), 1);
        assert_abs_diff_eq!(fc.forward(2.0).unwrap(), 102.0, epsilon = 1e-10);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let quotes = [OptionQuote::new("C", 1.0, 100.0, OptionType::Call, 9.0)];
        assert!(matches!(
            ForwardPriceCurve::from_option_quotes(&quotes, &curve()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn spline_through_three_maturities() {
        let fc = ForwardPriceCurve::new(vec![(0.5, 100.0), (1.0, 102.0), (2.0, 101.0)]).unwrap();
        for (t, f) in fc.pivots().to_vec() {
            assert_abs_diff_eq!(fc.forward(t).unwrap(), f, epsilon = 1e-12);
        }
        assert!(fc.forward(-1.0).is_err());
    }
}
