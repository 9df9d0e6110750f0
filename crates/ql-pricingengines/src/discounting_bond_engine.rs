//! Discounting engine for fixed-rate bonds.
//!
//! The dirty price is the sum of the remaining cash flows discounted either
//! on a [`Curve`] or at a flat yield:
//!
//! $$\text{dirty} = \sum_i c_i \, d(t_i) + F \, d(T)$$
//!
//! and the clean price subtracts the coupon accrued since the previous
//! coupon date.

use ql_core::{
    compounding::discount_factor, errors::Result, Compounding, Price, Rate, Real, Time,
};
use ql_instruments::FixedRateBond;
use ql_math::solvers1d::{brent, Solver1DConfig};
use ql_termstructures::Curve;

/// Upper end of the yield search.
const MAX_YIELD: Rate = 2.0;
/// Lower end of the yield search, before the simple-compounding cap.
const MIN_YIELD: Rate = -0.2;

/// Dirty and clean price of a bond, with the accrued interest between them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondPrice {
    /// Present value of all remaining cash flows.
    pub dirty: Price,
    /// `dirty − accrued`.
    pub clean: Price,
    /// Coupon accrued since the previous coupon date.
    pub accrued: Real,
}

impl BondPrice {
    fn from_dirty(bond: &FixedRateBond, dirty: Price) -> Self {
        let accrued = bond.accrued_interest();
        Self {
            dirty,
            clean: dirty - accrued,
            accrued,
        }
    }
}

/// Price `bond` off a discount curve.
///
/// # Errors
/// `InvalidParameter` for malformed bond terms.
pub fn bond_price(bond: &FixedRateBond, curve: &Curve) -> Result<BondPrice> {
    bond.validate()?;
    let dirty = discounted_cash_flows(bond, |t| curve.discount(t))?;
    Ok(BondPrice::from_dirty(bond, dirty))
}

/// Price `bond` at a flat yield.
///
/// With [`Compounding::Compounded`] the yield compounds at the bond's
/// coupon frequency.
///
/// # Errors
/// `InvalidParameter` for malformed bond terms or a yield whose compound
/// factor is not positive.
pub fn bond_price_from_yield(bond: &FixedRateBond, yield_rate: Rate, compounding: Compounding) -> Result<BondPrice> {
    bond.validate()?;
    ql_core::ensure!(yield_rate.is_finite(), InvalidParameter, "yield must be finite, got {yield_rate}");
    let dirty = discounted_cash_flows(bond, |t| {
        discount_factor(yield_rate, t, compounding, bond.frequency)
    })?;
    Ok(BondPrice::from_dirty(bond, dirty))
}

/// Yield that reproduces `clean_price`.
///
/// # Errors
/// - `InvalidParameter` for a non-positive price or malformed bond.
/// - `InvalidBracket` if no yield in the search range reproduces the price.
/// - `Convergence` if the solver budget runs out.
pub fn bond_yield(
    bond: &FixedRateBond,
    clean_price: Price,
    compounding: Compounding,
    cfg: &Solver1DConfig,
) -> Result<Rate> {
    bond.validate()?;
    ql_core::ensure!(
        clean_price.is_finite() && clean_price > 0.0,
        InvalidParameter,
        "clean price must be positive, got {clean_price}"
    );
    // A simple-compounding factor 1 + y·T must stay positive.
    let lo = match compounding {
        Compounding::Simple => MIN_YIELD.max(-0.9 / bond.maturity),
        _ => MIN_YIELD,
    };
    brent(
        |y| match bond_price_from_yield(bond, y, compounding) {
            Ok(p) => p.clean - clean_price,
            Err(_) => Real::NAN,
        },
        lo,
        MAX_YIELD,
        cfg,
    )
}

fn discounted_cash_flows<D>(bond: &FixedRateBond, discount: D) -> Result<Real>
where
    D: Fn(Time) -> Result<Real>,
{
    let coupon = bond.coupon_amount();
    let mut pv = 0.0;
    for t in bond.coupon_times() {
        pv += coupon * discount(t)?;
    }
    Ok(pv + bond.face * discount(bond.maturity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::{errors::Error, Date, DayCounter, Frequency};

    fn curve(rate: Rate) -> Curve {
        Curve::flat(Date::from_ymd_opt(2025, 1, 2).unwrap(), rate, DayCounter::Actual365Fixed)
            .unwrap()
    }

    #[test]
    fn zero_coupon_from_yield() {
        let bond = FixedRateBond::zero_coupon(1000.0, 20.0).unwrap();
        let p = bond_price_from_yield(&bond, 0.05, Compounding::Compounded).unwrap();
        assert_abs_diff_eq!(p.dirty, 376.889_482_873, epsilon = 1e-6);
        assert_eq!(p.accrued, 0.0);
        assert_eq!(p.clean, p.dirty);
    }

    #[test]
    fn discount_bond_from_yield() {
        let bond = FixedRateBond::new(1000.0, 0.025, Frequency::Annual, 20.0, 0.0).unwrap();
        let p = bond_price_from_yield(&bond, 0.04, Compounding::Compounded).unwrap();
        assert_abs_diff_eq!(p.clean, 796.145_104_825, epsilon = 1e-6);
    }

    #[test]
    fn par_bond_prices_at_par() {
        let bond = FixedRateBond::new(100.0, 0.05, Frequency::Semiannual, 10.0, 0.0).unwrap();
        let p = bond_price_from_yield(&bond, 0.05, Compounding::Compounded).unwrap();
        assert_abs_diff_eq!(p.clean, 100.0, epsilon = 1e-10);

        // continuous 5 % is semiannual 2·(e^{0.025} − 1)
        let coupon = 2.0 * ((0.025_f64).exp() - 1.0);
        let bond = FixedRateBond::new(100.0, coupon, Frequency::Semiannual, 10.0, 0.0).unwrap();
        let p = bond_price(&bond, &curve(0.05)).unwrap();
        assert_abs_diff_eq!(p.clean, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn curve_and_yield_agree_on_a_flat_curve() {
        let bond = FixedRateBond::new(100.0, 0.05, Frequency::Semiannual, 5.0, 0.0).unwrap();
        let on_curve = bond_price(&bond, &curve(0.03)).unwrap();
        let at_yield = bond_price_from_yield(&bond, 0.03, Compounding::Continuous).unwrap();
        assert_abs_diff_eq!(on_curve.dirty, at_yield.dirty, epsilon = 1e-9);
        assert_abs_diff_eq!(on_curve.dirty, 23.041_657_518_963 + 100.0 * (-0.15_f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn accrued_between_coupons() {
        // 0.25y into a semiannual period of a 4 % bond
        let bond = FixedRateBond::new(100.0, 0.04, Frequency::Semiannual, 1.75, 3.0).unwrap();
        let p = bond_price_from_yield(&bond, 0.04, Compounding::Compounded).unwrap();
        assert_abs_diff_eq!(p.accrued, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.dirty - p.clean, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn yield_round_trip() {
        let cfg = Solver1DConfig::default();
        for compounding in [Compounding::Simple, Compounding::Compounded, Compounding::Continuous] {
            let bond = FixedRateBond::new(100.0, 0.06, Frequency::Quarterly, 7.3, 1.0).unwrap();
            let clean = bond_price_from_yield(&bond, 0.045, compounding).unwrap().clean;
            let y = bond_yield(&bond, clean, compounding, &cfg).unwrap();
            assert_abs_diff_eq!(y, 0.045, epsilon = 1e-9);
        }
    }

    #[test]
    fn par_yield_is_the_coupon() {
        let bond = FixedRateBond::new(100.0, 0.035, Frequency::Annual, 12.0, 0.0).unwrap();
        let y = bond_yield(&bond, 100.0, Compounding::Compounded, &Solver1DConfig::default()).unwrap();
        assert_abs_diff_eq!(y, 0.035, epsilon = 1e-10);
    }

    #[test]
    fn unreachable_price() {
        let bond = FixedRateBond::new(100.0, 0.05, Frequency::Annual, 5.0, 0.0).unwrap();
        let err = bond_yield(&bond, 1000.0, Compounding::Compounded, &Solver1DConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidBracket { .. }), "{err}");
        let err = bond_yield(&bond, -1.0, Compounding::Compounded, &Solver1DConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
